//! Domain model for the voice wall.
//!
//! # Responsibility
//! - Define the canonical note record shared by storage and feed logic.
//! - Define the period buckets that partition the wall into feeds.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - A cancelled or expired note is hard-deleted by the next reconcile pass;
//!   there are no tombstones.

pub mod note;
pub mod period;
