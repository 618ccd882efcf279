//! # RIVALVERSO Stats
//!
//! Backend for the RIVALVERSO Challenge leaderboard.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (match records, filter results, stats)
//! - **competition**: Competition-window filtering and aggregation
//! - **storage**: JSONL match store and key/value settings store
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod competition;
pub mod config;
pub mod models;
pub mod storage;

pub use models::*;
