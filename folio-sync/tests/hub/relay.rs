use crate::common::SESSION;
use folio_sync::{
    ClientMessage, ContentChange, Operation, RealtimeOperation, ServerMessage, SessionHub,
    TransportError,
};

fn operation(user: &str, sequence: u64, text: &str) -> ClientMessage {
    ClientMessage::Operation {
        operation: RealtimeOperation {
            session_id: SESSION.into(),
            user_id: user.into(),
            sequence,
            operation: Operation::ContentChange(ContentChange::new("s1", text)),
        },
    }
}

#[tokio::test]
async fn accepts_only_the_next_sequence() {
    let hub = SessionHub::new();
    let mut ana = hub.join(SESSION, "ana", None).await;
    assert!(matches!(ana.recv().await, Some(ServerMessage::Joined { head: 0, .. })));

    ana.send(operation("ana", 2, "early")).await.unwrap();
    assert_eq!(
        ana.recv().await,
        Some(ServerMessage::Rejected { sequence: 2, head: 0 })
    );

    ana.send(operation("ana", 1, "next")).await.unwrap();
    match ana.recv().await {
        Some(ServerMessage::Operation { operation }) => assert_eq!(operation.sequence, 1),
        other => panic!("expected the acknowledgement, got {other:?}"),
    }
    assert_eq!(hub.head(SESSION).await, Some(1));
}

#[tokio::test]
async fn accepted_operations_reach_every_participant() {
    let hub = SessionHub::new();
    let mut ana = hub.join(SESSION, "ana", None).await;
    let mut bo = hub.join(SESSION, "bo", None).await;
    ana.recv().await;
    assert!(matches!(
        ana.recv().await,
        Some(ServerMessage::ParticipantJoined { .. })
    ));
    match bo.recv().await {
        Some(ServerMessage::Joined { participants, .. }) => assert_eq!(participants.len(), 2),
        other => panic!("expected joined, got {other:?}"),
    }

    ana.send(operation("ana", 1, "hello")).await.unwrap();
    assert!(matches!(bo.recv().await, Some(ServerMessage::Operation { .. })));
    assert!(matches!(ana.recv().await, Some(ServerMessage::Operation { .. })));
}

#[tokio::test]
async fn rejoin_replays_missed_operations() {
    let hub = SessionHub::new();
    let ana = hub.join(SESSION, "ana", None).await;
    ana.send(operation("ana", 1, "one")).await.unwrap();
    ana.send(operation("ana", 2, "two")).await.unwrap();
    ana.send(operation("ana", 3, "three")).await.unwrap();

    let mut bo = hub.join(SESSION, "bo", Some(1)).await;
    assert!(matches!(bo.recv().await, Some(ServerMessage::Joined { head: 3, .. })));
    let mut replayed = Vec::new();
    while let Some(ServerMessage::Operation { operation }) = bo.try_recv() {
        replayed.push(operation.sequence);
    }
    assert_eq!(replayed, vec![2, 3]);
}

#[tokio::test]
async fn leaving_notifies_the_others() {
    let hub = SessionHub::new();
    let mut ana = hub.join(SESSION, "ana", None).await;
    let bo = hub.join(SESSION, "bo", None).await;
    bo.send(ClientMessage::Leave).await.unwrap();

    ana.recv().await;
    ana.recv().await;
    assert_eq!(
        ana.recv().await,
        Some(ServerMessage::ParticipantLeft { user_id: "bo".into() })
    );
    assert_eq!(
        bo.send(operation("bo", 1, "late")).await,
        Err(TransportError::NotJoined {
            session_id: SESSION.into(),
            user_id: "bo".into()
        })
    );
}

#[tokio::test]
async fn dropped_connection_is_announced_as_left() {
    let hub = SessionHub::new();
    let ana = hub.join(SESSION, "ana", None).await;
    let mut bo = hub.join(SESSION, "bo", None).await;
    let cy = hub.join(SESSION, "cy", None).await;
    drop(cy);

    ana.send(operation("ana", 1, "hello")).await.unwrap();

    let mut received = Vec::new();
    while let Some(message) = bo.try_recv() {
        received.push(message);
    }
    assert_eq!(received.len(), 4, "{received:?}");
    assert!(matches!(received[0], ServerMessage::Joined { .. }));
    assert!(matches!(received[1], ServerMessage::ParticipantJoined { .. }));
    assert!(matches!(
        &received[2],
        ServerMessage::Operation { operation } if operation.sequence == 1
    ));
    assert_eq!(
        received[3],
        ServerMessage::ParticipantLeft { user_id: "cy".into() }
    );

    let mut dana = hub.join(SESSION, "dana", None).await;
    match dana.recv().await {
        Some(ServerMessage::Joined { participants, .. }) => {
            let names: Vec<_> = participants.iter().map(|p| p.user_id.as_str()).collect();
            assert_eq!(names, ["ana", "bo", "dana"]);
        }
        other => panic!("expected joined, got {other:?}"),
    }
}

#[tokio::test]
async fn connections_must_open_with_join() {
    let hub = SessionHub::new();
    assert!(matches!(
        hub.accept(ClientMessage::Leave).await,
        Err(TransportError::ExpectedJoin)
    ));
}

#[tokio::test]
async fn operations_for_another_session_are_refused() {
    let hub = SessionHub::new();
    let ana = hub.join(SESSION, "ana", None).await;
    let mut foreign = operation("ana", 1, "x");
    if let ClientMessage::Operation { operation } = &mut foreign {
        operation.session_id = "elsewhere".into();
    }
    assert!(matches!(
        ana.send(foreign).await,
        Err(TransportError::WrongSession { .. })
    ));
}
