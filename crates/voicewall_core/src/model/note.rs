//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical record behind every wall post variant.
//! - Provide lifecycle helpers for cancellation.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `timestamp` is the creation instant on the client clock, immutable.
//! - `cancelled` is set once by user action and never unset.
//! - `slot_number` is derived state: recomputed every render pass, cached
//!   only so a freed slot can be named in the liberation history.

use crate::model::period::Period;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for every note on the wall.
pub type NoteId = Uuid;

/// Rendering variant of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    /// Plain text post with title and body.
    Text,
    /// Shared link with optional description.
    Url,
    /// Recording captured in the browser.
    VoiceRecording,
    /// Uploaded audio file.
    AudioUpload,
    /// Uploaded image.
    Image,
}

/// Canonical note record.
///
/// Payload fields are optional and variant-dependent; one shape covers all
/// post variants without copying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Stable id assigned at creation.
    pub id: NoteId,
    /// Creation instant (client clock).
    pub timestamp: DateTime<Utc>,
    pub kind: NoteKind,
    pub title: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    /// Room language the note was posted in.
    pub language: Option<String>,
    pub country: Option<String>,
    /// Declared publish intent. Metadata only: neither bucketing nor
    /// expiration reads it.
    pub publish_period: Option<Period>,
    /// Presentation metadata (later variant).
    pub style: Option<String>,
    pub cover_image: Option<String>,
    pub cancelled: bool,
    /// Slot identifier cached from the latest allocation pass.
    pub slot_number: Option<String>,
    /// Per-browser pseudo-identity of the author.
    pub user_id: Option<String>,
    /// Occupation-log dedup flag. Never persisted.
    pub logged: bool,
}

/// Author-supplied fields for a new note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub kind: Option<NoteKind>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub publish_period: Option<Period>,
    pub style: Option<String>,
    pub cover_image: Option<String>,
}

impl Note {
    /// Creates a note from a draft with a generated stable id.
    ///
    /// Missing `kind` defaults to `VoiceRecording`, matching how untyped
    /// legacy records render.
    pub fn from_draft(draft: NoteDraft, timestamp: DateTime<Utc>) -> Self {
        Self::from_draft_with_id(Uuid::new_v4(), draft, timestamp)
    }

    /// Creates a note with a caller-provided stable id.
    pub fn from_draft_with_id(id: NoteId, draft: NoteDraft, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            timestamp,
            kind: draft.kind.unwrap_or(NoteKind::VoiceRecording),
            title: draft.title,
            content: draft.content,
            url: draft.url,
            description: draft.description,
            language: None,
            country: None,
            publish_period: draft.publish_period,
            style: draft.style,
            cover_image: draft.cover_image,
            cancelled: false,
            slot_number: None,
            user_id: None,
            logged: false,
        }
    }

    /// Marks the note cancelled and releases its cached slot identifier.
    ///
    /// Returns the freed slot so the caller can record exactly one liberation
    /// entry; the reconcile pass only logs for notes that still carry one.
    pub fn cancel(&mut self) -> Option<String> {
        self.cancelled = true;
        self.logged = false;
        self.slot_number.take()
    }
}
