//! Feed period buckets and age classification.
//!
//! # Responsibility
//! - Define the day/week/month buckets that split the wall into feeds.
//! - Classify a note into exactly one bucket by elapsed age.
//!
//! # Invariants
//! - Classification is total and mutually exclusive per pass: a note sits in
//!   one bucket at a time and migrates day -> week -> month as it ages.
//! - Slot identifiers use the feed token (`dia`/`semana`/`mes`); persisted
//!   records use the storage token (`day`/`week`/`month`).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One wall feed bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    /// All buckets in display order.
    pub const ALL: [Period; 3] = [Period::Day, Period::Week, Period::Month];

    /// Token used inside persisted note records.
    pub fn storage_token(self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        }
    }

    /// Token embedded in slot identifiers and feed section ids.
    pub fn feed_token(self) -> &'static str {
        match self {
            Period::Day => "dia",
            Period::Week => "semana",
            Period::Month => "mes",
        }
    }

    /// Parses a persisted storage token.
    pub fn parse_storage_token(value: &str) -> Option<Period> {
        match value {
            "day" => Some(Period::Day),
            "week" => Some(Period::Week),
            "month" => Some(Period::Month),
            _ => None,
        }
    }

    /// Classifies a creation instant into its current bucket.
    ///
    /// Buckets are age-based and mutually exclusive: up to 24 hours is `Day`,
    /// up to 7 days is `Week`, anything older is `Month`. Liveness is a
    /// separate concern; callers filter with the retention policy first.
    /// A future-dated instant (client clock skew) classifies as `Day`.
    pub fn classify(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> Period {
        let age = now.signed_duration_since(timestamp);
        if age <= Duration::hours(24) {
            Period::Day
        } else if age <= Duration::days(7) {
            Period::Week
        } else {
            Period::Month
        }
    }
}
