use super::*;
use std::sync::Arc;
use std::thread;

#[test]
fn test_status_thresholds() {
    assert_eq!(GateStatus::from_occupancy(0, 1200), GateStatus::Normal);
    assert_eq!(GateStatus::from_occupancy(900, 1200), GateStatus::Normal);
    assert_eq!(GateStatus::from_occupancy(901, 1200), GateStatus::Moderate);
    assert_eq!(GateStatus::from_occupancy(1200, 1200), GateStatus::Moderate);
    assert_eq!(GateStatus::from_occupancy(1201, 1200), GateStatus::Critical);
}

#[test]
fn test_status_zero_capacity() {
    assert_eq!(GateStatus::from_occupancy(0, 0), GateStatus::Normal);
    assert_eq!(GateStatus::from_occupancy(1, 0), GateStatus::Critical);
}

#[test]
fn test_default_gates_seeded_in_name_order() {
    let store = StateStore::with_default_gates();
    let gates = store.list_gates();

    let names: Vec<&str> = gates.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Gate A", "Gate B", "Gate C", "Gate D", "Gate E", "Gate F"]
    );

    let gate_a = store.get_gate_by_name("Gate A").unwrap();
    assert_eq!(gate_a.current_count, 1247);
    assert_eq!(gate_a.status, GateStatus::Critical);

    // Derived, not copied from a seed value
    let gate_e = store.get_gate_by_name("Gate E").unwrap();
    assert_eq!(gate_e.status, GateStatus::Normal);
}

#[test]
fn test_update_gate_recomputes_status_and_timestamp() {
    let store = StateStore::new();
    let gate = store.create_gate("Gate A", 100, 10);

    let updated = store
        .update_gate(
            &gate.id,
            GateUpdate {
                current_count: Some(101),
                capacity: None,
            },
        )
        .unwrap();

    assert_eq!(updated.current_count, 101);
    assert_eq!(updated.status, GateStatus::Critical);
    assert!(updated.last_updated >= gate.last_updated);
    assert_eq!(store.get_gate(&gate.id).unwrap(), updated);
}

#[test]
fn test_update_capacity_changes_status() {
    let store = StateStore::new();
    let gate = store.create_gate("Gate A", 100, 80);
    assert_eq!(gate.status, GateStatus::Moderate);

    let updated = store
        .update_gate(
            &gate.id,
            GateUpdate {
                current_count: None,
                capacity: Some(200),
            },
        )
        .unwrap();
    assert_eq!(updated.status, GateStatus::Normal);
}

#[test]
fn test_update_missing_gate() {
    let store = StateStore::new();
    let err = store.update_gate("nope", GateUpdate::default()).unwrap_err();
    assert_eq!(
        err,
        StoreError::NotFound {
            entity: "gate",
            id: "nope".to_string()
        }
    );
    assert_eq!(err.to_string(), "gate 'nope' not found");
}

#[test]
fn test_modify_gate_returns_closure_result() {
    let store = StateStore::new();
    let gate = store.create_gate("Gate A", 100, 40);

    let (previous, updated) = store
        .modify_gate(&gate.id, |g| {
            let previous = g.current_count;
            g.current_count = 95;
            previous
        })
        .unwrap();

    assert_eq!(previous, 40);
    assert_eq!(updated.current_count, 95);
    assert_eq!(updated.status, GateStatus::Moderate);
}

#[test]
fn test_acknowledge_alert_removes_from_active() {
    let store = StateStore::new();
    let gate = store.create_gate("Gate A", 100, 150);
    let alert = store.create_alert(NewAlert::capacity_exceeded(&gate));

    assert!(alert.is_active);
    assert_eq!(alert.message, "Gate A has exceeded capacity (150/100)");
    assert_eq!(store.list_active_alerts().len(), 1);

    let acked = store.acknowledge_alert(&alert.id).unwrap();
    assert!(!acked.is_active);
    assert!(acked.acknowledged_at.is_some());
    assert!(store.list_active_alerts().is_empty());

    // Retained after acknowledgement
    assert!(store.get_alert(&alert.id).is_some());
}

#[test]
fn test_acknowledge_twice_keeps_first_timestamp() {
    let store = StateStore::new();
    let gate = store.create_gate("Gate A", 100, 150);
    let alert = store.create_alert(NewAlert::capacity_exceeded(&gate));

    let first = store.acknowledge_alert(&alert.id).unwrap();
    let second = store.acknowledge_alert(&alert.id).unwrap();
    assert_eq!(first.acknowledged_at, second.acknowledged_at);
}

#[test]
fn test_acknowledge_missing_alert() {
    let store = StateStore::new();
    assert!(matches!(
        store.acknowledge_alert("missing"),
        Err(StoreError::NotFound { entity: "alert", .. })
    ));
}

#[test]
fn test_chat_history_newest_first_with_limit() {
    let store = StateStore::new();
    store.append_chat_message("one", "1");
    store.append_chat_message("two", "2");
    store.append_chat_message("three", "3");

    let recent = store.recent_chat_messages(2);
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].message, "three");
    assert_eq!(recent[1].message, "two");
}

#[test]
fn test_update_media_missing_record_is_none() {
    let store = StateStore::new();
    let update = MediaUpdate {
        is_processed: Some(true),
        ..Default::default()
    };
    assert!(store.update_media("ghost", update).is_none());
}

#[test]
fn test_media_update_sets_processed_fields() {
    let store = StateStore::new();
    let record = store.create_media(NewMedia {
        filename: "abc".to_string(),
        original_name: "match.mp4".to_string(),
        size: 42,
        mime_type: "video/mp4".to_string(),
    });
    assert!(!record.is_processed);

    let now = chrono::Utc::now();
    let updated = store
        .update_media(
            &record.id,
            MediaUpdate {
                is_processed: Some(true),
                processed_at: Some(now),
                heatmap_data: None,
            },
        )
        .unwrap();

    assert!(updated.is_processed);
    assert_eq!(updated.processed_at, Some(now));
    assert_eq!(store.list_media().len(), 1);
}

#[test]
fn test_gate_updates_broadcast() {
    let store = StateStore::new();
    let gate = store.create_gate("Gate A", 100, 10);
    let mut rx = store.subscribe();

    store
        .update_gate(
            &gate.id,
            GateUpdate {
                current_count: Some(20),
                capacity: None,
            },
        )
        .unwrap();

    match rx.try_recv().unwrap() {
        StoreEvent::GateUpdated(g) => assert_eq!(g.current_count, 20),
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn test_concurrent_updates_same_gate() {
    let store = Arc::new(StateStore::new());
    let gate = store.create_gate("Gate A", 10_000, 0);
    let mut handles = vec![];

    // Each thread increments under the entry lock; no increment may be lost
    for _ in 0..10 {
        let store = Arc::clone(&store);
        let id = gate.id.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..100 {
                store
                    .modify_gate(&id, |g| g.current_count += 1)
                    .unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.get_gate(&gate.id).unwrap().current_count, 1000);
}
