//! Core domain logic for the voice wall.
//! This crate is the single source of truth for feed and lifecycle
//! invariants; rendering hosts consume it through the service facade.

pub mod auth;
pub mod carousel;
pub mod config;
pub mod db;
pub mod identity;
pub mod logging;
pub mod model;
pub mod storage;
pub mod wall;

pub use config::{ConfigError, WallConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{Note, NoteDraft, NoteId, NoteKind};
pub use model::period::Period;
pub use storage::kv::{KvStore, MemoryKvStore, SqliteKvStore};
pub use storage::note_store::NoteStore;
pub use storage::slot_log::{LiberationEntry, LiberationReason, OccupationEntry, SlotLog};
pub use storage::{StorageError, StorageResult};
pub use wall::allocator::{allocate, slot_number, Slot, DEFAULT_MAX_SLOTS};
pub use wall::expiration::{RetentionPolicy, DEFAULT_RETENTION_DAYS};
pub use wall::reconciler::{ReconcileOutcome, Reconciler};
pub use wall::scheduler::{ReconcileScheduler, DEFAULT_RECONCILE_INTERVAL_SECS};
pub use wall::service::{WallError, WallService, WallSnapshot};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
