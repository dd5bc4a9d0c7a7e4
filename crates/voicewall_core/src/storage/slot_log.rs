//! Occupation/liberation history, capped and best-effort.
//!
//! # Responsibility
//! - Append slot-binding and slot-freeing events to two persisted histories.
//! - Evict oldest entries first past the cap (newest-last ordering).
//!
//! # Invariants
//! - Histories never exceed the cap; the 1001st entry evicts the oldest.
//! - Recording is best-effort: a storage failure is logged and never blocks
//!   the caller's state transition.
//! - This type is injected where needed; nothing reads it as ambient state.

use crate::model::note::{NoteId, NoteKind};
use crate::storage::kv::KvStore;
use chrono::{DateTime, SecondsFormat, Utc};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const OCCUPATION_HISTORY_KEY: &str = "slot_occupation_history";
pub const LIBERATION_HISTORY_KEY: &str = "slot_liberation_history";

const HISTORY_CAP: usize = 1000;

/// Why a slot was freed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiberationReason {
    Expired,
    Cancelled,
}

impl LiberationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            LiberationReason::Expired => "expired",
            LiberationReason::Cancelled => "cancelled",
        }
    }
}

/// One slot-binding event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupationEntry {
    pub slot_number: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    pub language: String,
    pub timestamp: String,
    pub note_type: NoteKind,
    #[serde(rename = "noteID")]
    pub note_id: NoteId,
}

/// One slot-freeing event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiberationEntry {
    pub slot_number: String,
    pub reason: LiberationReason,
    pub language: String,
    pub timestamp: String,
}

/// Capped diagnostic history for slot events.
#[derive(Debug, Clone, Copy)]
pub struct SlotLog {
    cap: usize,
}

impl Default for SlotLog {
    fn default() -> Self {
        Self { cap: HISTORY_CAP }
    }
}

impl SlotLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// History with a custom cap; tests exercise eviction with small caps.
    pub fn with_cap(cap: usize) -> Self {
        Self { cap }
    }

    /// Appends one occupation event. Best-effort.
    pub fn record_occupation<S: KvStore>(&self, kv: &mut S, entry: OccupationEntry) {
        info!(
            "event=slot_occupied module=wall slot={} user={} note_id={}",
            entry.slot_number, entry.user_id, entry.note_id
        );
        self.append(kv, OCCUPATION_HISTORY_KEY, entry);
    }

    /// Appends one liberation event. Best-effort.
    pub fn record_liberation<S: KvStore>(&self, kv: &mut S, entry: LiberationEntry) {
        info!(
            "event=slot_freed module=wall slot={} reason={}",
            entry.slot_number,
            entry.reason.as_str()
        );
        self.append(kv, LIBERATION_HISTORY_KEY, entry);
    }

    /// Reads the occupation history, oldest first. Fails soft to empty.
    pub fn occupations<S: KvStore>(&self, kv: &S) -> Vec<OccupationEntry> {
        read_history(kv, OCCUPATION_HISTORY_KEY)
    }

    /// Reads the liberation history, oldest first. Fails soft to empty.
    pub fn liberations<S: KvStore>(&self, kv: &S) -> Vec<LiberationEntry> {
        read_history(kv, LIBERATION_HISTORY_KEY)
    }

    fn append<S, E>(&self, kv: &mut S, key: &str, entry: E)
    where
        S: KvStore,
        E: Serialize + DeserializeOwned,
    {
        let mut history: Vec<E> = read_history(kv, key);
        history.push(entry);
        if history.len() > self.cap {
            let excess = history.len() - self.cap;
            history.drain(..excess);
        }

        let raw = match serde_json::to_string(&history) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(
                    "event=slot_history module=wall status=error key={key} error_code=encode_failed error={err}"
                );
                return;
            }
        };
        if let Err(err) = kv.put(key, &raw) {
            warn!(
                "event=slot_history module=wall status=error key={key} error_code=kv_write_failed error={err}"
            );
        }
    }
}

/// Formats an event timestamp the way the histories expect it.
pub fn history_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn read_history<S: KvStore, E: DeserializeOwned>(kv: &S, key: &str) -> Vec<E> {
    let raw = match kv.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!(
                "event=slot_history module=wall status=error key={key} error_code=kv_read_failed error={err}"
            );
            return Vec::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(history) => history,
        Err(err) => {
            warn!(
                "event=slot_history module=wall status=error key={key} error_code=corrupt_json error={err}"
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{history_timestamp, LiberationEntry, LiberationReason, SlotLog};
    use crate::storage::kv::MemoryKvStore;
    use chrono::{TimeZone, Utc};

    fn entry(slot: &str) -> LiberationEntry {
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap();
        LiberationEntry {
            slot_number: slot.to_string(),
            reason: LiberationReason::Expired,
            language: "es".to_string(),
            timestamp: history_timestamp(now),
        }
    }

    #[test]
    fn append_keeps_newest_entries_within_cap() {
        let mut kv = MemoryKvStore::new();
        let log = SlotLog::with_cap(3);

        for i in 0..5 {
            log.record_liberation(&mut kv, entry(&format!("grafiter_dia_{i:02}")));
        }

        let history = log.liberations(&kv);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].slot_number, "grafiter_dia_02");
        assert_eq!(history[2].slot_number, "grafiter_dia_04");
    }

    #[test]
    fn corrupt_history_resets_to_empty_instead_of_failing() {
        let mut kv = MemoryKvStore::new();
        let log = SlotLog::new();

        use crate::storage::kv::KvStore;
        kv.put(super::LIBERATION_HISTORY_KEY, "{not json").unwrap();

        assert!(log.liberations(&kv).is_empty());
        log.record_liberation(&mut kv, entry("grafiter_mes_01"));
        assert_eq!(log.liberations(&kv).len(), 1);
    }
}
