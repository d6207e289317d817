use crate::common::{applied_texts, change_from, joined_engine, sent, SESSION};
use folio_sync::{
    ConflictKind, ContentChange, Operation, RealtimeOperation, Resolution, ServerMessage, SyncError,
    SyncEvent,
};
use std::time::Instant;

/// `ana` has `local` in flight on `target` when `bo`'s change lands first.
fn concurrent_edit(target: &str, local: &str, remote: &str) -> (folio_sync::SyncEngine, u64) {
    let now = Instant::now();
    let mut engine = joined_engine("ana", now);
    engine.submit_change(ContentChange::new(target, local)).unwrap();
    assert_eq!(sent(&mut engine).len(), 1);

    engine.handle(change_from("bo", 1, target, remote), now);
    let id = engine
        .drain_events()
        .into_iter()
        .find_map(|event| match event {
            SyncEvent::Conflict(conflict) => Some(conflict.id),
            _ => None,
        })
        .expect("conflict event");
    (engine, id)
}

#[test]
fn conflict_freezes_only_its_section() {
    let now = Instant::now();
    let (mut engine, _) = concurrent_edit("camera", "Sharp.", "Soft.");

    assert!(engine.is_frozen("camera"));
    assert_eq!(
        engine.submit_change(ContentChange::new("camera", "Sharper.")),
        Err(SyncError::Frozen("camera".into()))
    );

    engine.handle(change_from("bo", 2, "pricing", "From $699."), now);
    assert_eq!(
        applied_texts(&engine.drain_events()),
        vec![(2, "From $699.".to_string())]
    );

    engine.submit_change(ContentChange::new("verdict", "Buy it.")).unwrap();
    let outgoing = sent(&mut engine);
    assert_eq!(outgoing.len(), 1);
    assert_eq!(outgoing[0].0, 3);
}

#[test]
fn later_remote_changes_update_the_open_conflict() {
    let now = Instant::now();
    let (mut engine, _) = concurrent_edit("camera", "Sharp.", "Soft.");
    engine.handle(change_from("bo", 2, "camera", "Softer."), now);

    assert!(applied_texts(&engine.drain_events()).is_empty());
    let conflict = engine.conflicts().next().expect("still open");
    match &conflict.kind {
        ConflictKind::ConcurrentEdit { remote, .. } => assert_eq!(remote.text, "Softer."),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn keep_local_resends_the_local_text() {
    let (mut engine, id) = concurrent_edit("camera", "Sharp.", "Soft.");
    let settled = engine.resolve(id, Resolution::KeepLocal).unwrap();
    assert_eq!(settled.map(|c| c.text), Some("Sharp.".to_string()));
    assert!(!engine.is_frozen("camera"));

    let outgoing = sent(&mut engine);
    assert_eq!(outgoing.len(), 1);
    assert_eq!(outgoing[0].0, 2);
    assert_eq!(
        outgoing[0].1,
        Operation::ContentChange(ContentChange::new("camera", "Sharp."))
    );
}

#[test]
fn accept_remote_sends_nothing() {
    let (mut engine, id) = concurrent_edit("camera", "Sharp.", "Soft.");
    let settled = engine.resolve(id, Resolution::AcceptRemote).unwrap();
    assert_eq!(settled.map(|c| c.text), Some("Soft.".to_string()));
    assert!(sent(&mut engine).is_empty());
    assert_eq!(engine.unacknowledged(), 0);
}

#[test]
fn merge_combines_disjoint_lines_against_the_acknowledged_base() {
    let now = Instant::now();
    let mut engine = joined_engine("ana", now);

    engine.submit_change(ContentChange::new("camera", "a\nb\nc")).unwrap();
    let (sequence, operation) = sent(&mut engine).remove(0);
    engine.handle(
        ServerMessage::Operation {
            operation: RealtimeOperation {
                session_id: SESSION.into(),
                user_id: "ana".into(),
                sequence,
                operation,
            },
        },
        now,
    );
    assert_eq!(engine.drain_events(), vec![SyncEvent::Acknowledged(1)]);

    engine.submit_change(ContentChange::new("camera", "A\nb\nc")).unwrap();
    assert_eq!(sent(&mut engine).len(), 1);
    engine.handle(change_from("bo", 2, "camera", "a\nb\nC"), now);
    let id = engine.conflicts().next().map(|c| c.id).expect("conflict");

    let merged = engine.resolve(id, Resolution::Merge).unwrap().expect("merged change");
    assert_eq!(merged.text, "A\nb\nC");
    let outgoing = sent(&mut engine);
    assert_eq!(outgoing[0].0, 3);
}

#[test]
fn overlapping_merge_falls_back_to_local() {
    let (mut engine, id) = concurrent_edit("pricing", "$8", "$10");
    let merged = engine.resolve(id, Resolution::Merge).unwrap().expect("merged change");
    assert_eq!(merged.text, "$8");
}

#[test]
fn resolving_twice_is_an_error() {
    let (mut engine, id) = concurrent_edit("camera", "Sharp.", "Soft.");
    engine.resolve(id, Resolution::AcceptRemote).unwrap();
    assert_eq!(
        engine.resolve(id, Resolution::AcceptRemote),
        Err(SyncError::UnknownConflict(id))
    );
}
