//! Filesystem data store.
//!
//! Handles the two files the service owns:
//! - `matches.jsonl` — the imported match records
//! - `settings.jsonl` — the key/value configuration store

use std::path::PathBuf;
use thiserror::Error;

mod jsonl;
mod settings;

pub use jsonl::{JsonlReader, JsonlWriter};
pub use settings::{read_setting, write_setting, Setting};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn matches_path(&self) -> PathBuf {
        self.data_dir.join("matches.jsonl")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.jsonl")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_paths() {
        let config = StorageConfig::new(PathBuf::from("/data"));

        assert_eq!(config.matches_path(), PathBuf::from("/data/matches.jsonl"));
        assert_eq!(
            config.settings_path(),
            PathBuf::from("/data/settings.jsonl")
        );
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }
}
