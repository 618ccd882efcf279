//! Match record model.
//!
//! Match records come from an upstream source the service does not
//! control. Field names for the same timestamp concept vary between
//! feed versions, numeric fields sometimes arrive as strings, and any
//! field may be missing entirely. The model absorbs all of that at the
//! deserialization boundary so the filtering and aggregation code
//! downstream sees a single resolved shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::MatchId;

/// The `result` value that counts as a win. Any other value (or no
/// value at all) is treated as a non-win.
pub const WIN_RESULT: &str = "win";

/// A single match played by a streamer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Stable identifier, assigned at import time. Records straight
    /// from the upstream feed may not have one yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MatchId>,

    /// Streamer the match belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,

    /// Preferred timestamp field (RFC 3339 UTC).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_timestamp: Option<String>,

    /// Legacy timestamp field used by older feed versions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Record creation time, the last-resort timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Match outcome; `"win"` or anything else.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub kills: f64,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub deaths: f64,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub assists: f64,

    /// Match duration in seconds.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub duration: f64,
}

impl MatchRecord {
    /// Resolve the raw timestamp string using the ordered field
    /// preference chain: `match_timestamp`, then `timestamp`, then
    /// `created_at`.
    pub fn raw_timestamp(&self) -> Option<&str> {
        self.match_timestamp
            .as_deref()
            .or(self.timestamp.as_deref())
            .or(self.created_at.as_deref())
    }

    /// Parse the resolved timestamp into an instant. Returns `None`
    /// when no timestamp field is present or none of them parse.
    pub fn played_at(&self) -> Option<DateTime<Utc>> {
        self.raw_timestamp().and_then(parse_utc_timestamp)
    }

    /// Whether this match was a win.
    pub fn is_win(&self) -> bool {
        self.result.as_deref() == Some(WIN_RESULT)
    }
}

/// Parse an ISO-8601 / RFC 3339 UTC timestamp string.
pub fn parse_utc_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Deserialize a numeric field leniently: JSON numbers pass through,
/// numeric strings are parsed, and everything else (missing, null,
/// garbage) coerces to 0.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_json(json: &str) -> MatchRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_timestamp_priority_order() {
        let m = from_json(
            r#"{
                "match_timestamp": "2025-01-03T10:00:00Z",
                "timestamp": "2025-01-02T10:00:00Z",
                "created_at": "2025-01-01T10:00:00Z"
            }"#,
        );
        assert_eq!(m.raw_timestamp(), Some("2025-01-03T10:00:00Z"));
    }

    #[test]
    fn test_timestamp_falls_back_to_legacy_field() {
        let m = from_json(
            r#"{"timestamp": "2025-01-02T10:00:00Z", "created_at": "2025-01-01T10:00:00Z"}"#,
        );
        assert_eq!(m.raw_timestamp(), Some("2025-01-02T10:00:00Z"));
    }

    #[test]
    fn test_timestamp_falls_back_to_created_at() {
        let m = from_json(r#"{"created_at": "2025-01-01T10:00:00Z"}"#);
        assert_eq!(m.raw_timestamp(), Some("2025-01-01T10:00:00Z"));
    }

    #[test]
    fn test_no_timestamp_fields() {
        let m = from_json(r#"{"result": "win"}"#);
        assert_eq!(m.raw_timestamp(), None);
        assert_eq!(m.played_at(), None);
    }

    #[test]
    fn test_played_at_parses_utc() {
        let m = from_json(r#"{"match_timestamp": "2025-01-01T00:00:00Z"}"#);
        let at = m.played_at().unwrap();
        assert_eq!(at.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_played_at_unparseable() {
        let m = from_json(r#"{"match_timestamp": "yesterday-ish"}"#);
        assert!(m.played_at().is_none());
    }

    #[test]
    fn test_lenient_numbers_from_json_number() {
        let m = from_json(r#"{"kills": 7, "deaths": 2.0, "assists": 3}"#);
        assert_eq!(m.kills, 7.0);
        assert_eq!(m.deaths, 2.0);
        assert_eq!(m.assists, 3.0);
    }

    #[test]
    fn test_lenient_numbers_from_string() {
        let m = from_json(r#"{"kills": "7", "duration": " 600 "}"#);
        assert_eq!(m.kills, 7.0);
        assert_eq!(m.duration, 600.0);
    }

    #[test]
    fn test_lenient_numbers_garbage_coerces_to_zero() {
        let m = from_json(r#"{"kills": "lots", "deaths": null, "assists": [1]}"#);
        assert_eq!(m.kills, 0.0);
        assert_eq!(m.deaths, 0.0);
        assert_eq!(m.assists, 0.0);
    }

    #[test]
    fn test_missing_numbers_default_to_zero() {
        let m = from_json(r#"{}"#);
        assert_eq!(m.kills, 0.0);
        assert_eq!(m.deaths, 0.0);
        assert_eq!(m.assists, 0.0);
        assert_eq!(m.duration, 0.0);
    }

    #[test]
    fn test_is_win() {
        let m = from_json(r#"{"result": "win"}"#);
        assert!(m.is_win());

        let m = from_json(r#"{"result": "loss"}"#);
        assert!(!m.is_win());

        let m = from_json(r#"{}"#);
        assert!(!m.is_win());
    }

    #[test]
    fn test_parse_utc_timestamp_with_offset() {
        let at = parse_utc_timestamp("2025-01-01T02:00:00+02:00").unwrap();
        assert_eq!(at.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_serialization_round_trip() {
        let m = from_json(
            r#"{
                "id": "abc123",
                "player": "shroud",
                "match_timestamp": "2025-01-01T00:00:00Z",
                "result": "win",
                "kills": 12,
                "deaths": 3,
                "assists": 4,
                "duration": 540
            }"#,
        );
        let json = serde_json::to_string(&m).unwrap();
        let back: MatchRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.player.as_deref(), Some("shroud"));
        assert_eq!(back.kills, 12.0);
        assert!(back.is_win());
    }
}
