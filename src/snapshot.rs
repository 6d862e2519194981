//! Typed view of the charger's live session document
//!
//! The EO cloud reports charger state as a flat JSON object whose keys come
//! and go with session state. This module parses one poll cycle's document
//! into an explicit schema so downstream projections never do ad hoc key
//! lookups on untyped data.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::error::Result;

/// One poll cycle's snapshot of charger state.
///
/// Every device-reported field is optional; an absent key parses to `None`
/// and never aborts the poll. Unknown keys in the document are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct LiveSnapshot {
    /// Session energy as reported by the charger. The firmware stores this
    /// as an energy rate per second (nominally kWh/s); consumers divide by
    /// 3600 to obtain the session energy figure shown to users.
    #[serde(rename = "ESKWH")]
    pub eskwh: Option<f64>,

    /// Elapsed charging duration in seconds
    #[serde(rename = "ChargingTime")]
    pub charging_time: Option<i64>,

    /// Unix timestamp of snapshot collection on the charger hub
    #[serde(rename = "PiTime")]
    pub pi_time: Option<i64>,

    /// When this document was parsed, stamped locally; not a wire field
    #[serde(skip, default = "Utc::now")]
    pub fetched_at: DateTime<Utc>,
}

impl LiveSnapshot {
    /// Parse a snapshot from the raw live session document
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Whether this snapshot marks a session boundary (exact zero reading)
    pub fn is_session_boundary(&self) -> bool {
        matches!(self.eskwh, Some(v) if v == 0.0)
    }

    /// Timestamp to record as the session reset marker.
    ///
    /// Prefers the charger hub's own clock (`PiTime`); falls back to the
    /// local fetch time when the hub omits it.
    pub fn reset_timestamp(&self) -> DateTime<Utc> {
        self.pi_time
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or(self.fetched_at)
    }
}

impl Default for LiveSnapshot {
    fn default() -> Self {
        Self {
            eskwh: None,
            charging_time: None,
            pi_time: None,
            fetched_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_document() {
        let snap = LiveSnapshot::from_value(serde_json::json!({
            "ESKWH": 3600.0,
            "ChargingTime": 120,
            "PiTime": 1700000000,
            "Voltage": 238
        }))
        .unwrap();
        assert_eq!(snap.eskwh, Some(3600.0));
        assert_eq!(snap.charging_time, Some(120));
        assert_eq!(snap.pi_time, Some(1700000000));
    }

    #[test]
    fn absent_fields_parse_to_none() {
        let snap = LiveSnapshot::from_value(serde_json::json!({})).unwrap();
        assert!(snap.eskwh.is_none());
        assert!(snap.charging_time.is_none());
        assert!(snap.pi_time.is_none());
    }

    #[test]
    fn session_boundary_requires_exact_zero() {
        let mut snap = LiveSnapshot::default();
        snap.eskwh = Some(0.0);
        assert!(snap.is_session_boundary());

        snap.eskwh = Some(0.001);
        assert!(!snap.is_session_boundary());

        snap.eskwh = None;
        assert!(!snap.is_session_boundary());
    }

    #[test]
    fn reset_timestamp_prefers_hub_clock() {
        let mut snap = LiveSnapshot::default();
        snap.pi_time = Some(1700000000);
        assert_eq!(
            snap.reset_timestamp(),
            Utc.timestamp_opt(1700000000, 0).single().unwrap()
        );

        snap.pi_time = None;
        assert_eq!(snap.reset_timestamp(), snap.fetched_at);
    }
}
