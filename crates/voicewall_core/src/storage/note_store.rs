//! Note collection persistence over one storage key.
//!
//! # Responsibility
//! - Serialize the full note collection as one JSON array at the room key.
//! - Reconstruct typed notes on load, degrading instead of failing.
//!
//! # Invariants
//! - `load` never errors: missing key, corrupt JSON and storage failures all
//!   yield an empty collection (logged).
//! - Records with unparseable timestamps are dropped at this boundary; they
//!   could never satisfy the liveness check downstream.
//! - `save` overwrites the whole collection; timestamps are written as
//!   ISO-8601 with millisecond precision.

use crate::model::note::{Note, NoteId, NoteKind};
use crate::model::period::Period;
use crate::storage::kv::KvStore;
use crate::storage::StorageResult;
use chrono::{DateTime, SecondsFormat, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Wire form of one persisted note. All variant payloads stay optional so
/// records written by earlier front-end revisions keep loading.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredNote {
    id: NoteId,
    timestamp: String,
    #[serde(rename = "type")]
    kind: NoteKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    publish_period: Option<Period>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cover_image: Option<String>,
    #[serde(default)]
    cancelled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    slot_number: Option<String>,
    #[serde(default, rename = "userID", skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
}

/// Persistence adapter for one room's note collection.
#[derive(Debug, Clone)]
pub struct NoteStore {
    key: String,
}

impl NoteStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Storage key this store reads and writes.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Loads the note collection, recovering to empty on any read problem.
    pub fn load<S: KvStore>(&self, kv: &S) -> Vec<Note> {
        self.load_with_identity(kv, None)
    }

    /// Loads the note collection and backfills a missing `user_id` on
    /// records written before identities existed.
    pub fn load_backfilled<S: KvStore>(&self, kv: &S, user_id: &str) -> Vec<Note> {
        self.load_with_identity(kv, Some(user_id))
    }

    fn load_with_identity<S: KvStore>(&self, kv: &S, user_id: Option<&str>) -> Vec<Note> {
        let raw = match kv.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(
                    "event=notes_load module=store status=error key={} error_code=kv_read_failed error={err}",
                    self.key
                );
                return Vec::new();
            }
        };

        let stored: Vec<StoredNote> = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(err) => {
                warn!(
                    "event=notes_load module=store status=error key={} error_code=corrupt_json error={err}",
                    self.key
                );
                return Vec::new();
            }
        };

        let total = stored.len();
        let notes: Vec<Note> = stored
            .into_iter()
            .filter_map(|record| decode_note(record, user_id, &self.key))
            .collect();

        info!(
            "event=notes_load module=store status=ok key={} count={} dropped={}",
            self.key,
            notes.len(),
            total - notes.len()
        );
        notes
    }

    /// Overwrites the persisted collection with the given notes.
    pub fn save<S: KvStore>(&self, kv: &mut S, notes: &[Note]) -> StorageResult<()> {
        let stored: Vec<StoredNote> = notes.iter().map(encode_note).collect();
        let raw = serde_json::to_string(&stored)?;
        kv.put(&self.key, &raw)?;

        info!(
            "event=notes_save module=store status=ok key={} count={}",
            self.key,
            notes.len()
        );
        Ok(())
    }
}

fn decode_note(record: StoredNote, user_id: Option<&str>, key: &str) -> Option<Note> {
    let timestamp = match DateTime::parse_from_rfc3339(&record.timestamp) {
        Ok(parsed) => parsed.with_timezone(&Utc),
        Err(err) => {
            warn!(
                "event=notes_load module=store status=warn key={key} note_id={} error_code=invalid_timestamp error={err}",
                record.id
            );
            return None;
        }
    };

    Some(Note {
        id: record.id,
        timestamp,
        kind: record.kind,
        title: record.title,
        content: record.content,
        url: record.url,
        description: record.description,
        language: record.language,
        country: record.country,
        publish_period: record.publish_period,
        style: record.style,
        cover_image: record.cover_image,
        cancelled: record.cancelled,
        slot_number: record.slot_number,
        user_id: record
            .user_id
            .or_else(|| user_id.map(|value| value.to_string())),
        logged: false,
    })
}

fn encode_note(note: &Note) -> StoredNote {
    StoredNote {
        id: note.id,
        timestamp: note.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        kind: note.kind,
        title: note.title.clone(),
        content: note.content.clone(),
        url: note.url.clone(),
        description: note.description.clone(),
        language: note.language.clone(),
        country: note.country.clone(),
        publish_period: note.publish_period,
        style: note.style.clone(),
        cover_image: note.cover_image.clone(),
        cancelled: note.cancelled,
        slot_number: note.slot_number.clone(),
        user_id: note.user_id.clone(),
    }
}
