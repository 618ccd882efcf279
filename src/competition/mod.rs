//! Competition-window filtering and statistics aggregation.
//!
//! The pipeline an API handler runs for every stats read:
//! 1. load match records from the store,
//! 2. look up the configured competition start timestamp,
//! 3. partition matches into valid (at or after the start) and
//!    invalid (before it),
//! 4. reduce the valid subset into summary statistics.
//!
//! This is read-path logic feeding a public leaderboard, so every
//! failure mode is fail-open: an unparseable record timestamp keeps
//! the record, an unparseable start timestamp disables filtering for
//! the batch, and a broken settings read behaves like no configured
//! start. Showing stats computed from over-inclusive data beats
//! showing nothing.

use tracing::{error, info, warn};

use crate::models::{
    parse_utc_timestamp, CompetitionStats, FilterMode, FilterResult, FilteredMatches, MatchRecord,
    UnfilteredReason,
};
use crate::storage::{self, StorageConfig};

/// Settings-store key holding the competition start timestamp.
pub const COMPETITION_START_KEY: &str = "competition_start_timestamp";

/// Partition matches against the competition start instant.
///
/// A match's timestamp is resolved via the ordered field chain on
/// [`MatchRecord`]; records whose timestamp is missing or unparseable
/// are classified valid rather than dropped. With no configured start
/// (or no matches) every match is valid and the returned
/// [`FilterMode`] says why.
pub fn filter_matches_for_competition(
    matches: Vec<MatchRecord>,
    competition_start_utc: Option<&str>,
) -> FilterResult {
    if matches.is_empty() {
        return FilterResult::unfiltered(matches, UnfilteredReason::NoMatches);
    }

    let Some(raw_start) = competition_start_utc else {
        return FilterResult::unfiltered(matches, UnfilteredReason::NoStartConfigured);
    };

    let Some(start) = parse_utc_timestamp(raw_start) else {
        error!(
            start = raw_start,
            "competition start timestamp did not parse; serving all matches unfiltered"
        );
        return FilterResult::unfiltered(matches, UnfilteredReason::StartUnparseable);
    };

    let mut valid = Vec::new();
    let mut invalid = Vec::new();
    for record in matches {
        match record.played_at() {
            Some(played_at) if played_at < start => invalid.push(record),
            // At or after the start, or the timestamp didn't parse:
            // over-inclusion beats silent data loss.
            _ => valid.push(record),
        }
    }

    FilterResult {
        matches: FilteredMatches::new(valid, invalid),
        mode: FilterMode::Applied { start },
    }
}

/// Reduce a set of valid matches into summary statistics.
///
/// Single accumulation pass; the derived ratios are computed once at
/// the end. An empty input yields all zeros. `total_damage` and
/// `total_healing` stay zero because the upstream record shape has no
/// per-match fields for them.
pub fn calculate_stats_from_matches(matches: &[MatchRecord]) -> CompetitionStats {
    let mut stats = CompetitionStats::default();

    for record in matches {
        stats.games_played += 1;
        if record.is_win() {
            stats.wins += 1;
        }
        stats.kills += record.kills;
        stats.deaths += record.deaths;
        stats.assists += record.assists;
        stats.time_played += record.duration;
    }

    stats.kd_ratio = if stats.deaths > 0.0 {
        stats.kills / stats.deaths
    } else {
        stats.kills
    };
    stats.kda_ratio = if stats.deaths > 0.0 {
        (stats.kills + stats.assists) / stats.deaths
    } else {
        stats.kills + stats.assists
    };
    stats.win_rate = if stats.games_played > 0 {
        (stats.wins as f64 / stats.games_played as f64) * 100.0
    } else {
        0.0
    };

    stats
}

/// Read the configured competition start timestamp.
///
/// Any settings-store failure is logged and swallowed; the read path
/// must keep working as if no start were configured.
pub fn competition_start_timestamp(storage: &StorageConfig) -> Option<String> {
    match storage::read_setting(storage, COMPETITION_START_KEY) {
        Ok(value) => value,
        Err(e) => {
            error!("failed to read competition start timestamp: {e}");
            None
        }
    }
}

/// Log what a filtering pass did to the match counts.
///
/// Warns when filtering removed every match, which usually means the
/// configured start date is wrong.
pub fn log_competition_filtering(
    original_count: usize,
    filtered_count: usize,
    competition_start_utc: Option<&str>,
) {
    let Some(start) = competition_start_utc else {
        info!(
            matches = original_count,
            "no competition start configured; serving unfiltered totals"
        );
        return;
    };

    info!(
        start,
        original = original_count,
        valid = filtered_count,
        filtered_out = original_count.saturating_sub(filtered_count),
        "applied competition window"
    );

    if filtered_count == 0 && original_count > 0 {
        warn!(
            start,
            original = original_count,
            "competition window removed every match; the start date is likely wrong"
        );
    }
}
