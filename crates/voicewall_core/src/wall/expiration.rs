//! Note liveness policy.
//!
//! # Responsibility
//! - Decide whether a note is still live, and when it stops being so.
//!
//! # Invariants
//! - Pure and deterministic given inputs.
//! - One uniform retention window for every note; the declared publish
//!   period is never consulted.
//! - A cancelled note is never live, regardless of age.

use crate::model::note::Note;
use chrono::{DateTime, Duration, Utc};

/// Default retention window applied to every note.
pub const DEFAULT_RETENTION_DAYS: i64 = 28;

/// Uniform retention policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    window: Duration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::with_days(DEFAULT_RETENTION_DAYS)
    }
}

impl RetentionPolicy {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn with_days(days: i64) -> Self {
        Self {
            window: Duration::days(days),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Whether the note is visible on the wall at `now`.
    pub fn is_live(&self, note: &Note, now: DateTime<Utc>) -> bool {
        !note.cancelled && !self.is_expired(note.timestamp, now)
    }

    /// Whether a creation instant has aged past the window.
    pub fn is_expired(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(timestamp) > self.window
    }

    /// The instant a note created at `timestamp` stops being live.
    pub fn expiration_instant(&self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        timestamp + self.window
    }
}

#[cfg(test)]
mod tests {
    use super::RetentionPolicy;
    use crate::model::note::{Note, NoteDraft};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn cancelled_note_is_never_live() {
        let now = Utc.with_ymd_and_hms(2025, 4, 10, 12, 0, 0).unwrap();
        let policy = RetentionPolicy::default();

        let mut note = Note::from_draft(NoteDraft::default(), now);
        assert!(policy.is_live(&note, now));
        note.cancel();
        assert!(!policy.is_live(&note, now));
    }

    #[test]
    fn liveness_is_the_window_comparison() {
        let now = Utc.with_ymd_and_hms(2025, 4, 10, 12, 0, 0).unwrap();
        let policy = RetentionPolicy::default();

        let fresh = Note::from_draft(NoteDraft::default(), now);
        let on_edge = Note::from_draft(NoteDraft::default(), now - Duration::days(28));
        let stale = Note::from_draft(NoteDraft::default(), now - Duration::days(29));

        assert!(policy.is_live(&fresh, now));
        assert!(policy.is_live(&on_edge, now));
        assert!(!policy.is_live(&stale, now));
    }

    #[test]
    fn expiration_instant_is_timestamp_plus_window() {
        let created = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap();
        let policy = RetentionPolicy::with_days(7);
        assert_eq!(
            policy.expiration_instant(created),
            created + Duration::days(7)
        );
    }
}
