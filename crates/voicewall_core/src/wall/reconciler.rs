//! Periodic cleanup pass over the note collection.
//!
//! # Responsibility
//! - Partition stored notes into keep/remove against the retention policy.
//! - Record one liberation entry per removed note that still holds a slot.
//! - Persist the surviving collection when anything was removed.
//!
//! # Invariants
//! - Idempotent: a second pass with no elapsed expirations removes nothing,
//!   persists nothing and logs nothing.
//! - Persistence errors are swallowed and logged; the next pass retries
//!   naturally. A pass never fails terminally.
//! - Cancelled notes whose liberation was already recorded at cancel time
//!   carry no slot number here and are not logged again.

use crate::model::note::Note;
use crate::storage::kv::KvStore;
use crate::storage::note_store::NoteStore;
use crate::storage::slot_log::{history_timestamp, LiberationEntry, LiberationReason, SlotLog};
use crate::wall::expiration::RetentionPolicy;
use chrono::{DateTime, Utc};
use log::{error, info};

/// Result of one reconcile pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub removed_expired: usize,
    pub removed_cancelled: usize,
    /// Whether the surviving collection reached storage.
    pub persisted: bool,
}

impl ReconcileOutcome {
    pub fn removed(&self) -> usize {
        self.removed_expired + self.removed_cancelled
    }

    /// Whether the caller should trigger a full re-render.
    pub fn needs_render(&self) -> bool {
        self.removed() > 0
    }
}

/// Executes cleanup passes for one room.
#[derive(Debug, Clone)]
pub struct Reconciler {
    store: NoteStore,
    history: SlotLog,
    policy: RetentionPolicy,
    language: String,
}

impl Reconciler {
    pub fn new(
        store: NoteStore,
        history: SlotLog,
        policy: RetentionPolicy,
        language: impl Into<String>,
    ) -> Self {
        Self {
            store,
            history,
            policy,
            language: language.into(),
        }
    }

    /// Runs one pass over `notes`, mutating it to the surviving collection.
    pub fn run_pass<S: KvStore>(
        &self,
        kv: &mut S,
        notes: &mut Vec<Note>,
        now: DateTime<Utc>,
    ) -> ReconcileOutcome {
        let mut outcome = ReconcileOutcome::default();
        let mut removed: Vec<Note> = Vec::new();

        notes.retain(|note| {
            let expired = self.policy.is_expired(note.timestamp, now);
            if expired || note.cancelled {
                removed.push(note.clone());
                false
            } else {
                true
            }
        });

        for note in &removed {
            let expired = self.policy.is_expired(note.timestamp, now);
            if expired {
                outcome.removed_expired += 1;
            } else {
                outcome.removed_cancelled += 1;
            }

            if let Some(slot) = &note.slot_number {
                let reason = if expired {
                    LiberationReason::Expired
                } else {
                    LiberationReason::Cancelled
                };
                self.history.record_liberation(
                    kv,
                    LiberationEntry {
                        slot_number: slot.clone(),
                        reason,
                        language: self.language.clone(),
                        timestamp: history_timestamp(now),
                    },
                );
            }
        }

        if !removed.is_empty() {
            match self.store.save(kv, notes) {
                Ok(()) => outcome.persisted = true,
                Err(err) => {
                    error!(
                        "event=reconcile module=wall status=error key={} error_code=save_failed error={err}",
                        self.store.key()
                    );
                }
            }
            info!(
                "event=reconcile module=wall status=ok key={} removed_expired={} removed_cancelled={} kept={}",
                self.store.key(),
                outcome.removed_expired,
                outcome.removed_cancelled,
                notes.len()
            );
        }

        outcome
    }
}
