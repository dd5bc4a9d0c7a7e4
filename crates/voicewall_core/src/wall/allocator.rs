//! Slot allocation for one feed bucket.
//!
//! # Responsibility
//! - Bind the most recent live notes of a bucket to numbered positions.
//! - Pad remaining capacity with empty placeholders.
//!
//! # Invariants
//! - Total function: always exactly `max_slots` slots out, positions
//!   1..=max_slots in order, each with a unique slot identifier.
//! - Sorting is stable: notes with identical timestamps keep their relative
//!   input order across repeated passes.
//! - Excess live notes are unslotted this pass, never deleted.

use crate::model::note::Note;
use crate::model::period::Period;
use crate::wall::expiration::RetentionPolicy;
use chrono::{DateTime, Utc};

/// Display positions per feed bucket.
pub const DEFAULT_MAX_SLOTS: u32 = 20;

/// One display position, occupied or empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub period: Period,
    /// 1-based position within the feed.
    pub position: u32,
    pub slot_number: String,
    /// Snapshot of the bound note, with `slot_number` already assigned.
    pub note: Option<Note>,
}

impl Slot {
    pub fn is_empty(&self) -> bool {
        self.note.is_none()
    }
}

/// Formats the deterministic slot identifier for a position.
pub fn slot_number(prefix: &str, period: Period, position: u32) -> String {
    format!("{prefix}_{}_{position:02}", period.feed_token())
}

/// Assigns the `max_slots` most recent live notes of `period` to positions
/// 1..=`max_slots`, most recent first, padding the tail with placeholders.
pub fn allocate(
    period: Period,
    notes: &[Note],
    max_slots: u32,
    prefix: &str,
    policy: &RetentionPolicy,
    now: DateTime<Utc>,
) -> Vec<Slot> {
    let mut eligible: Vec<&Note> = notes
        .iter()
        .filter(|note| policy.is_live(note, now) && Period::classify(note.timestamp, now) == period)
        .collect();
    // Stable: ties keep input order.
    eligible.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    (1..=max_slots)
        .map(|position| {
            let number = slot_number(prefix, period, position);
            let note = eligible.get(position as usize - 1).map(|note| {
                let mut bound = (*note).clone();
                bound.slot_number = Some(number.clone());
                bound
            });
            Slot {
                period,
                position,
                slot_number: number,
                note,
            }
        })
        .collect()
}
