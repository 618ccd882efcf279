//! Filtered match data and aggregated statistics models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::MatchRecord;

/// Why a filtering pass served unfiltered data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnfilteredReason {
    /// No competition start timestamp is configured.
    NoStartConfigured,

    /// The input match list was empty.
    NoMatches,

    /// The configured start timestamp did not parse.
    StartUnparseable,
}

/// How the competition filter was (or was not) applied.
///
/// The fallback path is part of the return type rather than hidden in
/// an error branch: callers can always tell whether the counts they
/// received were actually filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FilterMode {
    /// Matches were compared against the competition start instant.
    Applied { start: DateTime<Utc> },

    /// Every match was served as valid, unfiltered.
    Unfiltered { reason: UnfilteredReason },
}

impl FilterMode {
    /// Whether the competition window was actually applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, FilterMode::Applied { .. })
    }
}

/// Match records partitioned by the competition window.
#[derive(Debug, Clone, Serialize)]
pub struct FilteredMatches {
    /// Matches at or after the competition start (or all matches when
    /// unfiltered).
    pub valid_matches: Vec<MatchRecord>,

    /// Matches strictly before the competition start.
    pub invalid_matches: Vec<MatchRecord>,

    /// Count of all supplied matches.
    pub total_matches: usize,

    /// Count of matches inside the competition window; always equals
    /// `valid_matches.len()`.
    pub competition_matches: usize,
}

impl FilteredMatches {
    /// Build from a valid/invalid partition, deriving the counts.
    pub fn new(valid_matches: Vec<MatchRecord>, invalid_matches: Vec<MatchRecord>) -> Self {
        let competition_matches = valid_matches.len();
        let total_matches = competition_matches + invalid_matches.len();
        Self {
            valid_matches,
            invalid_matches,
            total_matches,
            competition_matches,
        }
    }

    /// Build an unfiltered result: every match valid, none invalid.
    pub fn all_valid(matches: Vec<MatchRecord>) -> Self {
        Self::new(matches, Vec::new())
    }

    /// Count of matches the filter removed.
    pub fn filtered_out(&self) -> usize {
        self.invalid_matches.len()
    }
}

/// Result of a filtering pass: the partition plus how it was produced.
#[derive(Debug, Clone, Serialize)]
pub struct FilterResult {
    pub matches: FilteredMatches,
    pub mode: FilterMode,
}

impl FilterResult {
    /// Fail-open result: all matches valid, with the reason recorded.
    pub fn unfiltered(matches: Vec<MatchRecord>, reason: UnfilteredReason) -> Self {
        Self {
            matches: FilteredMatches::all_valid(matches),
            mode: FilterMode::Unfiltered { reason },
        }
    }
}

/// Summary statistics aggregated from a set of valid matches.
///
/// `total_damage` and `total_healing` are always zero: the upstream
/// match-record shape does not carry per-match damage or healing, and
/// the fields are kept so the response shape stays stable for
/// consumers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompetitionStats {
    pub games_played: u32,
    pub wins: u32,
    pub kills: f64,
    pub deaths: f64,
    pub assists: f64,
    pub total_damage: f64,
    pub total_healing: f64,
    /// Total time played, in seconds.
    pub time_played: f64,
    /// Kills per death; equals raw kills when deaths is zero.
    pub kd_ratio: f64,
    /// (Kills + assists) per death; equals the raw sum when deaths is
    /// zero.
    pub kda_ratio: f64,
    /// Win percentage, 0 to 100.
    pub win_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn match_with_timestamp(ts: &str) -> MatchRecord {
        serde_json::from_str(&format!(r#"{{"match_timestamp": "{ts}"}}"#)).unwrap()
    }

    #[test]
    fn test_filtered_matches_counts() {
        let valid = vec![
            match_with_timestamp("2025-01-02T00:00:00Z"),
            match_with_timestamp("2025-01-03T00:00:00Z"),
        ];
        let invalid = vec![match_with_timestamp("2024-12-01T00:00:00Z")];

        let filtered = FilteredMatches::new(valid, invalid);
        assert_eq!(filtered.total_matches, 3);
        assert_eq!(filtered.competition_matches, 2);
        assert_eq!(filtered.filtered_out(), 1);
    }

    #[test]
    fn test_all_valid() {
        let matches = vec![
            match_with_timestamp("2025-01-02T00:00:00Z"),
            match_with_timestamp("2025-01-03T00:00:00Z"),
        ];
        let filtered = FilteredMatches::all_valid(matches);
        assert_eq!(filtered.total_matches, 2);
        assert_eq!(filtered.competition_matches, 2);
        assert!(filtered.invalid_matches.is_empty());
    }

    #[test]
    fn test_filter_mode_is_applied() {
        let applied = FilterMode::Applied {
            start: chrono::Utc::now(),
        };
        assert!(applied.is_applied());

        let unfiltered = FilterMode::Unfiltered {
            reason: UnfilteredReason::NoStartConfigured,
        };
        assert!(!unfiltered.is_applied());
    }

    #[test]
    fn test_filter_mode_serialization() {
        let mode = FilterMode::Unfiltered {
            reason: UnfilteredReason::StartUnparseable,
        };
        let json = serde_json::to_value(&mode).unwrap();
        assert_eq!(json["mode"], "unfiltered");
        assert_eq!(json["reason"], "start_unparseable");
    }

    #[test]
    fn test_competition_stats_default_is_all_zero() {
        let stats = CompetitionStats::default();
        assert_eq!(stats.games_played, 0);
        assert_eq!(stats.wins, 0);
        assert_eq!(stats.kd_ratio, 0.0);
        assert_eq!(stats.kda_ratio, 0.0);
        assert_eq!(stats.win_rate, 0.0);
    }
}
