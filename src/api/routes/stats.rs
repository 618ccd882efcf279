use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::api::state::AppState;
use crate::api::{dedup_by_id, ApiError};
use crate::competition::{
    calculate_stats_from_matches, competition_start_timestamp, filter_matches_for_competition,
    log_competition_filtering,
};
use crate::models::{CompetitionStats, FilterMode, MatchRecord};
use crate::storage::JsonlReader;

/// Read every stored match. Storage failures surface as an empty list
/// plus an error log; this is a read path for a public leaderboard and
/// must stay up.
fn load_matches(state: &AppState) -> Vec<MatchRecord> {
    let reader: JsonlReader<MatchRecord> = JsonlReader::new(state.storage.matches_path());
    let matches = match reader.read_all() {
        Ok(matches) => matches,
        Err(e) => {
            tracing::error!("failed to read match store: {e}");
            Vec::new()
        }
    };
    dedup_by_id(matches, |m| m.id.as_ref().map(|id| id.as_str()))
}

/// Collapse whitespace and lowercase for player-name comparison.
fn normalize_player(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Run the full pipeline over a set of matches: config lookup, window
/// filter, diagnostics, aggregation.
fn compute_stats(state: &AppState, matches: Vec<MatchRecord>) -> StatsResponse {
    let start = competition_start_timestamp(&state.storage);
    let original_count = matches.len();

    let result = filter_matches_for_competition(matches, start.as_deref());
    log_competition_filtering(
        original_count,
        result.matches.competition_matches,
        start.as_deref(),
    );

    let stats = calculate_stats_from_matches(&result.matches.valid_matches);

    StatsResponse {
        stats,
        total_matches: result.matches.total_matches,
        competition_matches: result.matches.competition_matches,
        filtered_out: result.matches.filtered_out(),
        filter: result.mode,
    }
}

// ── Stats Endpoints ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub stats: CompetitionStats,
    pub total_matches: usize,
    pub competition_matches: usize,
    pub filtered_out: usize,
    pub filter: FilterMode,
}

pub async fn competition_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let matches = load_matches(&state);
    Json(compute_stats(&state, matches))
}

pub async fn player_stats(
    State(state): State<AppState>,
    Path(player): Path<String>,
) -> Result<Json<StatsResponse>, ApiError> {
    if player.trim().is_empty() {
        return Err(ApiError::BadRequest("player name is empty".to_string()));
    }

    let needle = normalize_player(&player);
    let matches: Vec<MatchRecord> = load_matches(&state)
        .into_iter()
        .filter(|m| {
            m.player
                .as_deref()
                .is_some_and(|p| normalize_player(p) == needle)
        })
        .collect();

    // A player with no stored matches gets zeroed stats, not a 404:
    // the store can't distinguish "unknown" from "no matches yet".
    Ok(Json(compute_stats(&state, matches)))
}

// ── Leaderboard Endpoint ────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub player: String,
    pub stats: CompetitionStats,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub players: Vec<LeaderboardEntry>,
    pub total_players: usize,
    pub filter: FilterMode,
}

pub async fn leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Json<LeaderboardResponse> {
    let matches = load_matches(&state);
    let start = competition_start_timestamp(&state.storage);
    let original_count = matches.len();

    let result = filter_matches_for_competition(matches, start.as_deref());
    log_competition_filtering(
        original_count,
        result.matches.competition_matches,
        start.as_deref(),
    );

    // Group valid matches by normalized player name.
    struct PlayerMatches {
        display_name: String,
        matches: Vec<MatchRecord>,
    }

    let mut by_player: HashMap<String, PlayerMatches> = HashMap::new();
    for m in result.matches.valid_matches {
        let Some(name) = m.player.clone() else {
            continue;
        };
        let entry = by_player
            .entry(normalize_player(&name))
            .or_insert_with(|| PlayerMatches {
                display_name: name,
                matches: Vec::new(),
            });
        entry.matches.push(m);
    }

    let total_players = by_player.len();
    let limit = params.limit.unwrap_or(25).min(100) as usize;

    let mut players: Vec<LeaderboardEntry> = by_player
        .into_values()
        .map(|data| LeaderboardEntry {
            stats: calculate_stats_from_matches(&data.matches),
            player: data.display_name,
        })
        .collect();

    // Wins first, then win rate, then volume; name breaks ties so the
    // ordering is stable across requests.
    players.sort_by(|a, b| {
        b.stats
            .wins
            .cmp(&a.stats.wins)
            .then_with(|| {
                b.stats
                    .win_rate
                    .partial_cmp(&a.stats.win_rate)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| b.stats.games_played.cmp(&a.stats.games_played))
            .then_with(|| a.player.cmp(&b.player))
    });
    players.truncate(limit);

    Json(LeaderboardResponse {
        players,
        total_players,
        filter: result.mode,
    })
}
