//! Wall use-case facade.
//!
//! # Responsibility
//! - Own the storage handle, the in-memory collection and the identity.
//! - Expose publish/cancel/render/poll as the only mutation entry points.
//!
//! # Invariants
//! - All mutation happens synchronously inside one of these calls; there is
//!   a single logical thread of control.
//! - Cancelling records at most one liberation entry per note.
//! - A render pass logs each slot occupation once per note lifetime.

use crate::config::{ConfigError, WallConfig};
use crate::db::DbError;
use crate::identity;
use crate::model::note::{Note, NoteDraft, NoteId};
use crate::model::period::Period;
use crate::storage::kv::KvStore;
use crate::storage::note_store::NoteStore;
use crate::storage::slot_log::{
    history_timestamp, LiberationEntry, LiberationReason, OccupationEntry, SlotLog,
};
use crate::storage::StorageError;
use crate::wall::allocator::{allocate, Slot};
use crate::wall::expiration::RetentionPolicy;
use crate::wall::reconciler::{ReconcileOutcome, Reconciler};
use crate::wall::scheduler::ReconcileScheduler;
use chrono::{DateTime, Utc};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Wall service error.
#[derive(Debug)]
pub enum WallError {
    Config(ConfigError),
    UnknownNote(NoteId),
    Storage(StorageError),
    Db(DbError),
}

impl Display for WallError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::UnknownNote(id) => write!(f, "note not found: {id}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for WallError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::UnknownNote(_) => None,
            Self::Storage(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<ConfigError> for WallError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<StorageError> for WallError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<DbError> for WallError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// One full render pass: every bucket's slots, positions in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallSnapshot {
    pub day: Vec<Slot>,
    pub week: Vec<Slot>,
    pub month: Vec<Slot>,
}

/// Facade owning one room's wall state.
pub struct WallService<S: KvStore> {
    kv: S,
    config: WallConfig,
    user_id: String,
    notes: Vec<Note>,
    store: NoteStore,
    history: SlotLog,
    policy: RetentionPolicy,
    reconciler: Reconciler,
    scheduler: ReconcileScheduler,
}

impl<S: KvStore> WallService<S> {
    /// Opens the room: resolves identity, loads notes, arms the scheduler.
    pub fn open(mut kv: S, config: WallConfig, now: DateTime<Utc>) -> Result<Self, WallError> {
        config.validate()?;

        let user_id = identity::ensure_user_id(&mut kv, now)?;
        let store = NoteStore::new(&config.storage_key);
        let history = SlotLog::new();
        let policy = RetentionPolicy::with_days(config.retention_days);
        let notes = store.load_backfilled(&kv, &user_id);
        let reconciler = Reconciler::new(store.clone(), history, policy, config.lang.as_str());
        let mut scheduler = ReconcileScheduler::with_interval_secs(config.reconcile_interval_secs);
        scheduler.start(now);

        info!(
            "event=wall_open module=wall status=ok key={} lang={} count={}",
            config.storage_key,
            config.lang,
            notes.len()
        );

        Ok(Self {
            kv,
            config,
            user_id,
            notes,
            store,
            history,
            policy,
            reconciler,
            scheduler,
        })
    }

    pub fn config(&self) -> &WallConfig {
        &self.config
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The in-memory collection, including notes awaiting cleanup.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Publishes a new note and persists the collection.
    pub fn publish(&mut self, draft: NoteDraft, now: DateTime<Utc>) -> Result<NoteId, WallError> {
        let mut note = Note::from_draft(draft, now);
        note.language.get_or_insert_with(|| self.config.lang.clone());
        note.country.get_or_insert_with(|| self.config.country.clone());
        note.user_id = Some(self.user_id.clone());

        let id = note.id;
        self.notes.push(note);
        self.store.save(&mut self.kv, &self.notes)?;

        info!(
            "event=note_published module=wall status=ok key={} note_id={id}",
            self.config.storage_key
        );
        Ok(id)
    }

    /// Cancels a note: it disappears from the next render pass of every
    /// bucket, and its slot (if any) gets exactly one liberation entry.
    ///
    /// Unknown ids abort without mutating state. Re-cancelling is a no-op.
    pub fn cancel(&mut self, id: NoteId, now: DateTime<Utc>) -> Result<(), WallError> {
        let note = self
            .notes
            .iter_mut()
            .find(|note| note.id == id)
            .ok_or(WallError::UnknownNote(id))?;

        if note.cancelled {
            return Ok(());
        }

        let freed = note.cancel();
        if let Some(slot_number) = freed {
            self.history.record_liberation(
                &mut self.kv,
                LiberationEntry {
                    slot_number,
                    reason: LiberationReason::Cancelled,
                    language: self.config.lang.clone(),
                    timestamp: history_timestamp(now),
                },
            );
        }
        self.store.save(&mut self.kv, &self.notes)?;

        info!(
            "event=note_cancelled module=wall status=ok key={} note_id={id}",
            self.config.storage_key
        );
        Ok(())
    }

    /// Allocates one bucket's slots and records first-time occupations.
    pub fn slots(&mut self, period: Period, now: DateTime<Utc>) -> Vec<Slot> {
        let slots = allocate(
            period,
            &self.notes,
            self.config.max_slots,
            &self.config.slot_prefix,
            &self.policy,
            now,
        );

        for slot in &slots {
            let Some(bound) = &slot.note else { continue };
            let Some(note) = self.notes.iter_mut().find(|note| note.id == bound.id) else {
                continue;
            };
            note.slot_number = Some(slot.slot_number.clone());
            if !note.logged {
                note.logged = true;
                self.history.record_occupation(
                    &mut self.kv,
                    OccupationEntry {
                        slot_number: slot.slot_number.clone(),
                        user_id: note.user_id.clone().unwrap_or_else(|| self.user_id.clone()),
                        language: self.config.lang.clone(),
                        timestamp: history_timestamp(now),
                        note_type: note.kind,
                        note_id: note.id,
                    },
                );
            }
        }

        slots
    }

    /// Runs the render pass for all three buckets.
    pub fn render(&mut self, now: DateTime<Utc>) -> WallSnapshot {
        WallSnapshot {
            day: self.slots(Period::Day, now),
            week: self.slots(Period::Week, now),
            month: self.slots(Period::Month, now),
        }
    }

    /// Cooperative tick: runs a cleanup pass when the interval elapsed.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<ReconcileOutcome> {
        if !self.scheduler.poll(now) {
            return None;
        }
        Some(self.reconcile_now(now))
    }

    /// Runs one cleanup pass immediately, regardless of the schedule.
    pub fn reconcile_now(&mut self, now: DateTime<Utc>) -> ReconcileOutcome {
        self.reconciler.run_pass(&mut self.kv, &mut self.notes, now)
    }

    /// Stops the periodic cleanup; `poll` becomes a no-op until restarted.
    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    /// Re-arms the periodic cleanup.
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.scheduler.start(now);
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Read access to the slot histories for diagnostics.
    pub fn occupation_history(&self) -> Vec<OccupationEntry> {
        self.history.occupations(&self.kv)
    }

    pub fn liberation_history(&self) -> Vec<LiberationEntry> {
        self.history.liberations(&self.kv)
    }

    /// Releases the underlying storage handle.
    pub fn into_store(self) -> S {
        self.kv
    }
}
