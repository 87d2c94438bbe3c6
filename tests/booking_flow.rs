use std::fs;
use std::path::PathBuf;

use innkeep::store::{FileSlots, JournalStore, SlotBackend, SlotStore};
use innkeep::{BookingConfig, BookingEngine, BookingRequest, Rejection, ReservationStore};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("innkeep_test_flow").join(name);
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn request(check_in: &str, check_out: &str) -> BookingRequest {
    BookingRequest::new("Grace Hopper", "grace@example.com", check_in, check_out)
}

#[test]
fn slot_file_survives_restart() {
    init_tracing();
    let dir = test_dir("slot_restart");
    let config = BookingConfig::default();

    let first = {
        let store = SlotStore::new(FileSlots::open(&dir).unwrap(), config.storage_key.clone());
        let mut engine = BookingEngine::new(config.clone(), store);
        engine.submit(&request("2026-03-01", "2026-03-05")).unwrap()
    };

    let store = SlotStore::new(FileSlots::open(&dir).unwrap(), config.storage_key.clone());
    let mut engine = BookingEngine::new(config, store);
    assert_eq!(engine.reservations(), vec![first.clone()]);
    assert_eq!(
        engine.submit(&request("2026-03-04", "2026-03-06")),
        Err(Rejection::DateClash { existing: first.id })
    );
    assert!(engine.submit(&request("2026-03-05", "2026-03-10")).is_ok());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn slot_file_written_by_widget_is_readable() {
    init_tracing();
    let dir = test_dir("slot_widget_format");
    let key = "aurora_premium_single_room_reservations_v1";
    let mut slots = FileSlots::open(&dir).unwrap();
    slots
        .set(
            key,
            r#"[{"id":"3b241101-e2bb-4255-8caf-4136c566a962","room_id":1,"full_name":"Ada","email":"ada@example.com","check_in":"2026-03-01","check_out":"2026-03-05","created_at":"2026-02-10T09:30:00.000Z"}]"#,
        )
        .unwrap();

    let mut engine = BookingEngine::new(BookingConfig::default(), SlotStore::new(slots, key));
    let listed = engine.reservations();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].full_name, "Ada");
    assert_eq!(listed[0].id, "3b241101-e2bb-4255-8caf-4136c566a962");
    assert_eq!(
        engine.submit(&request("2026-03-02", "2026-03-03")),
        Err(Rejection::DateClash {
            existing: listed[0].id.clone()
        })
    );
    drop(engine);

    // The widget's guest is still on file after a later booking and a restart.
    let store = SlotStore::new(FileSlots::open(&dir).unwrap(), key);
    let mut engine = BookingEngine::new(BookingConfig::default(), store);
    let added = engine.submit(&request("2026-03-05", "2026-03-08")).unwrap();
    assert_eq!(engine.reservations(), vec![listed[0].clone(), added]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_and_non_list_slots_read_empty() {
    init_tracing();
    let dir = test_dir("slot_corrupt");
    let key = "reservations";

    let mut store = SlotStore::new(FileSlots::open(&dir).unwrap(), key);
    assert!(store.list().is_empty());

    store.backend_mut().set(key, r#"{"reservations": []}"#).unwrap();
    assert!(store.list().is_empty());
    assert_eq!(store.list(), store.list());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn journal_single_use_lockout_survives_restart() {
    init_tracing();
    let dir = test_dir("journal_lockout");
    let path = dir.join("reservations.journal");
    let config = BookingConfig::single_use();

    let rec = {
        let store = JournalStore::open(&path, config.compact_threshold).unwrap();
        let mut engine = BookingEngine::new(config.clone(), store);
        engine.submit(&request("2026-08-01", "2026-08-03")).unwrap()
    };

    let store = JournalStore::open(&path, config.compact_threshold).unwrap();
    let mut engine = BookingEngine::new(config.clone(), store);
    assert!(!engine.booking_allowed());
    assert_eq!(
        engine.submit(&request("2027-01-01", "2027-01-02")),
        Err(Rejection::CapacityExhausted { limit: 1 })
    );

    assert!(engine.cancel(&rec.id).unwrap());
    drop(engine);

    let store = JournalStore::open(&path, config.compact_threshold).unwrap();
    let mut engine = BookingEngine::new(config, store);
    assert!(engine.booking_allowed());
    assert!(engine.submit(&request("2026-08-02", "2026-08-04")).is_ok());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn journal_compacts_under_churn() {
    init_tracing();
    let dir = test_dir("journal_churn");
    let path = dir.join("reservations.journal");
    let config = BookingConfig::default().with_compact_threshold(8);

    let store = JournalStore::open(&path, config.compact_threshold).unwrap();
    let mut engine = BookingEngine::new(config.clone(), store);
    let keep = engine.submit(&request("2026-09-20", "2026-09-25")).unwrap();
    for _ in 0..20 {
        let tmp = engine.submit(&request("2026-09-01", "2026-09-02")).unwrap();
        assert!(engine.cancel(&tmp.id).unwrap());
    }
    drop(engine);

    let store = JournalStore::open(&path, config.compact_threshold).unwrap();
    assert_eq!(store.list(), vec![keep]);

    let _ = fs::remove_dir_all(&dir);
}
