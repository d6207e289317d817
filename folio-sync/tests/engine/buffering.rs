use crate::common::{applied_texts, change_from, joined_engine, sent};
use folio_sync::{ClientMessage, ConflictKind, ContentChange, Resolution, SyncEvent};
use std::time::{Duration, Instant};

#[test]
fn operation_four_waits_for_three() {
    let now = Instant::now();
    let mut engine = joined_engine("ana", now);

    engine.handle(change_from("bo", 1, "s1", "one"), now);
    engine.handle(change_from("bo", 2, "s1", "two"), now);
    engine.handle(change_from("bo", 4, "s1", "four"), now);
    assert_eq!(
        applied_texts(&engine.drain_events()),
        vec![(1, "one".to_string()), (2, "two".to_string())]
    );
    assert_eq!(engine.head(), 2);

    engine.handle(change_from("bo", 3, "s1", "three"), now);
    assert_eq!(
        applied_texts(&engine.drain_events()),
        vec![(3, "three".to_string()), (4, "four".to_string())]
    );
    assert_eq!(engine.head(), 4);
}

#[test]
fn duplicates_are_applied_once() {
    let now = Instant::now();
    let mut engine = joined_engine("ana", now);
    engine.handle(change_from("bo", 1, "s1", "one"), now);
    engine.handle(change_from("bo", 1, "s1", "one"), now);
    assert_eq!(applied_texts(&engine.drain_events()).len(), 1);
}

#[test]
fn gap_becomes_a_conflict_after_the_window() {
    let now = Instant::now();
    let mut engine = joined_engine("ana", now);
    engine.handle(change_from("bo", 1, "s1", "one"), now);
    engine.handle(change_from("bo", 3, "s1", "three"), now);
    engine.drain_events();

    engine.tick(now + Duration::from_secs(1));
    assert!(engine.conflicts().next().is_none());

    engine.tick(now + Duration::from_secs(2));
    let conflict = engine.conflicts().next().cloned().expect("gap conflict");
    assert_eq!(
        conflict.kind,
        ConflictKind::SequenceGap {
            expected: 2,
            buffered: 1
        }
    );

    // Outgoing operations wait while the gap is open.
    engine.submit_change(ContentChange::new("s2", "mine")).unwrap();
    assert!(sent(&mut engine).is_empty());

    engine.resolve(conflict.id, Resolution::AcceptRemote).unwrap();
    assert_eq!(
        applied_texts(&engine.drain_events()),
        vec![(3, "three".to_string())]
    );
    let outgoing = sent(&mut engine);
    assert_eq!(outgoing.len(), 1);
    assert_eq!(outgoing[0].0, 4);
}

#[test]
fn keeping_local_on_a_gap_resyncs() {
    let now = Instant::now();
    let mut engine = joined_engine("ana", now);
    engine.handle(change_from("bo", 1, "s1", "one"), now);
    engine.handle(change_from("bo", 3, "s1", "three"), now);
    engine.tick(now + Duration::from_secs(5));
    let id = engine.conflicts().next().map(|c| c.id).expect("gap conflict");

    engine.resolve(id, Resolution::KeepLocal).unwrap();
    assert_eq!(
        engine.drain_outbox(),
        vec![ClientMessage::Resync { from: 1 }]
    );
    assert!(engine
        .drain_events()
        .iter()
        .any(|event| matches!(event, SyncEvent::Resolved { resolution: Resolution::KeepLocal, .. })));
    assert_eq!(engine.head(), 1);
}
