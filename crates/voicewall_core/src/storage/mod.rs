//! Persistence adapters over the keyed local storage medium.
//!
//! # Responsibility
//! - Expose the `KvStore` seam that models browser-local storage.
//! - Keep JSON wire encoding inside this boundary.
//!
//! # Invariants
//! - Every write is a full-document overwrite at one key; last write wins.
//! - Reads fail soft where the contract says so (`NoteStore::load`,
//!   slot history); writes surface typed errors.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod kv;
pub mod note_store;
pub mod slot_log;

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage-layer error for key-value access and JSON encoding.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    Encode(serde_json::Error),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode stored document: {err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}
