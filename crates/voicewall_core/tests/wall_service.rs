use chrono::{DateTime, Duration, TimeZone, Utc};
use voicewall_core::{
    LiberationReason, MemoryKvStore, NoteDraft, NoteKind, Period, WallConfig, WallError,
    WallService,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn open_service() -> WallService<MemoryKvStore> {
    let config = WallConfig::for_room("sala_es", "grafiter", "es", "ES");
    WallService::open(MemoryKvStore::new(), config, t0()).unwrap()
}

fn voice_draft() -> NoteDraft {
    NoteDraft {
        kind: Some(NoteKind::VoiceRecording),
        ..NoteDraft::default()
    }
}

#[test]
fn published_note_lands_in_the_day_bucket_with_room_metadata() {
    let mut service = open_service();
    let id = service.publish(voice_draft(), t0()).unwrap();

    let snapshot = service.render(t0());
    assert_eq!(snapshot.day[0].note.as_ref().map(|note| note.id), Some(id));
    assert!(snapshot.week.iter().all(|slot| slot.is_empty()));
    assert!(snapshot.month.iter().all(|slot| slot.is_empty()));

    let note = &service.notes()[0];
    assert_eq!(note.language.as_deref(), Some("es"));
    assert_eq!(note.country.as_deref(), Some("ES"));
    assert_eq!(note.user_id.as_deref(), Some(service.user_id()));
}

#[test]
fn occupation_is_logged_once_per_note_across_render_passes() {
    let mut service = open_service();
    let id = service.publish(voice_draft(), t0()).unwrap();

    service.render(t0());
    service.render(t0() + Duration::minutes(5));
    service.render(t0() + Duration::minutes(10));

    let history = service.occupation_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].note_id, id);
    assert_eq!(history[0].slot_number, "grafiter_dia_01");
    assert_eq!(history[0].language, "es");
    assert_eq!(history[0].user_id, service.user_id());
}

#[test]
fn cancel_removes_note_from_every_bucket_and_logs_exactly_once() {
    let mut service = open_service();
    let id = service.publish(voice_draft(), t0()).unwrap();
    service.render(t0());

    service.cancel(id, t0() + Duration::minutes(1)).unwrap();

    let snapshot = service.render(t0() + Duration::minutes(2));
    assert!(snapshot.day.iter().all(|slot| slot.is_empty()));
    assert!(snapshot.week.iter().all(|slot| slot.is_empty()));
    assert!(snapshot.month.iter().all(|slot| slot.is_empty()));

    let liberations = service.liberation_history();
    assert_eq!(liberations.len(), 1);
    assert_eq!(liberations[0].reason, LiberationReason::Cancelled);
    assert_eq!(liberations[0].slot_number, "grafiter_dia_01");

    // Re-cancelling and the follow-up cleanup add nothing.
    service.cancel(id, t0() + Duration::minutes(3)).unwrap();
    let outcome = service.reconcile_now(t0() + Duration::minutes(4));
    assert_eq!(outcome.removed(), 1);
    assert_eq!(service.liberation_history().len(), 1);
}

#[test]
fn cancelling_an_unslotted_note_logs_no_liberation() {
    let mut service = open_service();
    let id = service.publish(voice_draft(), t0()).unwrap();

    // Never rendered, so no slot was ever assigned.
    service.cancel(id, t0() + Duration::minutes(1)).unwrap();
    assert!(service.liberation_history().is_empty());
}

#[test]
fn cancel_of_unknown_note_aborts_without_mutation() {
    let mut service = open_service();
    service.publish(voice_draft(), t0()).unwrap();

    let unknown = uuid_from(7);
    let err = service.cancel(unknown, t0()).unwrap_err();
    assert!(matches!(err, WallError::UnknownNote(id) if id == unknown));
    assert_eq!(service.notes().len(), 1);
    assert!(!service.notes()[0].cancelled);
}

#[test]
fn expired_note_is_removed_once_and_reconcile_is_idempotent() {
    let mut service = open_service();
    service.publish(voice_draft(), t0()).unwrap();
    service.render(t0());

    let later = t0() + Duration::days(29);
    let first = service.reconcile_now(later);
    assert_eq!(first.removed_expired, 1);
    assert!(first.persisted);
    assert_eq!(service.liberation_history().len(), 1);
    assert_eq!(
        service.liberation_history()[0].reason,
        LiberationReason::Expired
    );

    let second = service.reconcile_now(later + Duration::minutes(1));
    assert_eq!(second.removed(), 0);
    assert!(!second.persisted);
    assert_eq!(service.liberation_history().len(), 1);
}

#[test]
fn note_migrates_between_buckets_as_it_ages() {
    let mut service = open_service();
    let id = service.publish(voice_draft(), t0()).unwrap();

    let day = service.slots(Period::Day, t0());
    assert_eq!(day[0].note.as_ref().map(|note| note.id), Some(id));

    let two_days = t0() + Duration::days(2);
    assert!(service.slots(Period::Day, two_days)[0].is_empty());
    let week = service.slots(Period::Week, two_days);
    assert_eq!(week[0].note.as_ref().map(|note| note.id), Some(id));

    let ten_days = t0() + Duration::days(10);
    assert!(service.slots(Period::Week, ten_days)[0].is_empty());
    let month = service.slots(Period::Month, ten_days);
    assert_eq!(month[0].note.as_ref().map(|note| note.id), Some(id));
}

#[test]
fn poll_fires_on_open_then_every_interval_until_stopped() {
    let mut service = open_service();

    assert!(service.poll(t0()).is_some());
    assert!(service.poll(t0() + Duration::seconds(30)).is_none());
    assert!(service.poll(t0() + Duration::seconds(60)).is_some());

    service.stop();
    assert!(!service.is_running());
    assert!(service.poll(t0() + Duration::seconds(300)).is_none());

    service.start(t0() + Duration::seconds(300));
    assert!(service.poll(t0() + Duration::seconds(300)).is_some());
}

#[test]
fn collection_and_identity_survive_reopen() {
    let mut service = open_service();
    let id = service.publish(voice_draft(), t0()).unwrap();
    let user_id = service.user_id().to_string();

    let kv = service.into_store();
    let config = WallConfig::for_room("sala_es", "grafiter", "es", "ES");
    let reopened = WallService::open(kv, config, t0() + Duration::hours(1)).unwrap();

    assert_eq!(reopened.user_id(), user_id);
    assert_eq!(reopened.notes().len(), 1);
    assert_eq!(reopened.notes()[0].id, id);
}

#[test]
fn invalid_config_is_rejected_before_touching_storage() {
    let config = WallConfig {
        storage_key: String::new(),
        ..WallConfig::default()
    };
    let result = WallService::open(MemoryKvStore::new(), config, t0());
    assert!(matches!(result, Err(WallError::Config(_))));
}

fn uuid_from(byte: u8) -> voicewall_core::NoteId {
    voicewall_core::NoteId::from_bytes([byte; 16])
}
