use chrono::{Duration, TimeZone, Utc};
use voicewall_core::{
    KvStore, MemoryKvStore, Note, NoteDraft, NoteKind, NoteStore, Period, SqliteKvStore,
};

fn sample_note(hours_ago: i64) -> Note {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let mut note = Note::from_draft(
        NoteDraft {
            kind: Some(NoteKind::Text),
            title: Some("hola".to_string()),
            content: Some("primera nota".to_string()),
            publish_period: Some(Period::Day),
            ..NoteDraft::default()
        },
        now - Duration::hours(hours_ago),
    );
    note.language = Some("es".to_string());
    note.country = Some("ES".to_string());
    note.user_id = Some("user_1735689600000_abc123def".to_string());
    note
}

#[test]
fn save_then_load_reconstructs_all_persisted_fields() {
    let mut kv = MemoryKvStore::new();
    let store = NoteStore::new("sala_es");

    let notes = vec![sample_note(1), sample_note(2)];
    store.save(&mut kv, &notes).unwrap();

    let loaded = store.load(&kv);
    assert_eq!(loaded, notes);
    // Instants survive the ISO round trip exactly.
    assert_eq!(loaded[0].timestamp, notes[0].timestamp);
}

#[test]
fn save_then_load_roundtrips_through_sqlite_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wall.db");

    let notes = vec![sample_note(3)];
    {
        let mut kv = SqliteKvStore::open(&path).unwrap();
        NoteStore::new("sala_es").save(&mut kv, &notes).unwrap();
    }

    let kv = SqliteKvStore::open(&path).unwrap();
    let loaded = NoteStore::new("sala_es").load(&kv);
    assert_eq!(loaded, notes);
}

#[test]
fn missing_key_loads_as_empty() {
    let kv = MemoryKvStore::new();
    assert!(NoteStore::new("sala_es").load(&kv).is_empty());
}

#[test]
fn corrupt_json_recovers_to_empty_collection() {
    let mut kv = MemoryKvStore::new();
    kv.put("sala_es", "{definitely not an array").unwrap();

    assert!(NoteStore::new("sala_es").load(&kv).is_empty());
}

#[test]
fn record_with_invalid_timestamp_is_dropped_not_fatal() {
    let mut kv = MemoryKvStore::new();
    let store = NoteStore::new("sala_es");
    store.save(&mut kv, &[sample_note(1)]).unwrap();

    // Splice a record with a broken timestamp next to the valid one.
    let raw = kv.get("sala_es").unwrap().unwrap();
    let mut parsed: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
    let mut broken = parsed[0].clone();
    broken["id"] = serde_json::json!("7f9c0a52-1111-4222-8333-444455556666");
    broken["timestamp"] = serde_json::json!("ayer por la tarde");
    parsed.push(broken);
    kv.put("sala_es", &serde_json::to_string(&parsed).unwrap())
        .unwrap();

    let loaded = store.load(&kv);
    assert_eq!(loaded.len(), 1);
}

#[test]
fn load_backfills_missing_user_id() {
    let mut kv = MemoryKvStore::new();
    let store = NoteStore::new("sala_es");

    let mut legacy = sample_note(1);
    legacy.user_id = None;
    store.save(&mut kv, &[legacy]).unwrap();

    let loaded = store.load_backfilled(&kv, "user_1735689600000_zzz999zzz");
    assert_eq!(
        loaded[0].user_id.as_deref(),
        Some("user_1735689600000_zzz999zzz")
    );
}

#[test]
fn unknown_fields_from_other_frontend_revisions_are_tolerated() {
    let mut kv = MemoryKvStore::new();
    kv.put(
        "sala_es",
        r#"[{
            "id": "7f9c0a52-1111-4222-8333-444455556666",
            "timestamp": "2025-06-01T10:00:00.000Z",
            "type": "voice_recording",
            "expirationDate": "2025-06-02T10:00:00.000Z",
            "vacio": false,
            "publicado": true
        }]"#,
    )
    .unwrap();

    let loaded = NoteStore::new("sala_es").load(&kv);
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].kind, NoteKind::VoiceRecording);
    assert!(!loaded[0].cancelled);
}
