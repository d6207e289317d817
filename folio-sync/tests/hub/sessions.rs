use crate::common::SESSION;
use folio_sync::{
    ContentChange, HubConnection, Operation, RealtimeOperation, Resolution, SessionHub,
    SyncContext, SyncEngine, SyncEvent,
};
use std::time::Instant;

struct Peer {
    engine: SyncEngine,
    connection: HubConnection,
    events: Vec<SyncEvent>,
}

impl Peer {
    async fn join(hub: &SessionHub, user: &str) -> Peer {
        let mut engine = SyncEngine::new(SyncContext::new(SESSION, user));
        engine.connect();
        let join = engine.drain_outbox().remove(0);
        let connection = hub.accept(join).await.unwrap();
        Peer {
            engine,
            connection,
            events: Vec::new(),
        }
    }

    /// Move messages both ways once; `true` if anything moved.
    async fn pump(&mut self, now: Instant) -> bool {
        let mut moved = false;
        for message in self.engine.drain_outbox() {
            self.connection.send(message).await.unwrap();
            moved = true;
        }
        while let Some(message) = self.connection.try_recv() {
            self.engine.handle(message, now);
            moved = true;
        }
        self.events.extend(self.engine.drain_events());
        moved
    }

    fn applied(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SyncEvent::Applied(RealtimeOperation {
                    operation: Operation::ContentChange(change),
                    ..
                }) => Some(change.text.clone()),
                _ => None,
            })
            .collect()
    }
}

async fn settle(a: &mut Peer, b: &mut Peer) {
    let now = Instant::now();
    while a.pump(now).await | b.pump(now).await {}
}

#[tokio::test]
async fn two_editors_converge_through_the_hub() {
    let hub = SessionHub::new();
    let mut ana = Peer::join(&hub, "ana").await;
    let mut bo = Peer::join(&hub, "bo").await;
    settle(&mut ana, &mut bo).await;
    assert!(ana.engine.presence().get("bo").is_some());

    ana.engine
        .submit_change(ContentChange::new("overview", "A bright phone."))
        .unwrap();
    bo.engine
        .submit_change(ContentChange::new("pricing", "From $699."))
        .unwrap();
    settle(&mut ana, &mut bo).await;

    assert_eq!(bo.applied(), vec!["A bright phone."]);
    assert_eq!(ana.applied(), vec!["From $699."]);
    assert_eq!(ana.engine.head(), 2);
    assert_eq!(bo.engine.head(), 2);
    assert_eq!(ana.engine.unacknowledged() + bo.engine.unacknowledged(), 0);
}

#[tokio::test]
async fn same_section_race_is_a_conflict_for_the_loser() {
    let hub = SessionHub::new();
    let mut ana = Peer::join(&hub, "ana").await;
    let mut bo = Peer::join(&hub, "bo").await;
    settle(&mut ana, &mut bo).await;

    ana.engine.submit_change(ContentChange::new("verdict", "Buy.")).unwrap();
    bo.engine.submit_change(ContentChange::new("verdict", "Skip.")).unwrap();
    settle(&mut ana, &mut bo).await;

    assert!(ana.engine.conflicts().next().is_none());
    let id = bo.engine.conflicts().next().map(|c| c.id).expect("bo lost the race");
    assert!(bo.engine.is_frozen("verdict"));

    bo.engine.resolve(id, Resolution::KeepLocal).unwrap();
    settle(&mut ana, &mut bo).await;
    assert_eq!(ana.applied(), vec!["Skip."]);
    assert_eq!(hub.head(SESSION).await, Some(2));
}

#[tokio::test]
async fn rejoining_editor_catches_up() {
    let hub = SessionHub::new();
    let mut ana = Peer::join(&hub, "ana").await;
    let mut bo = Peer::join(&hub, "bo").await;
    settle(&mut ana, &mut bo).await;

    bo.engine.transport_error();
    ana.engine.submit_change(ContentChange::new("camera", "Sharp.")).unwrap();
    ana.pump(Instant::now()).await;
    ana.pump(Instant::now()).await;

    // Whatever reached the dead connection is lost.
    while bo.connection.try_recv().is_some() {}
    assert_eq!(bo.engine.head(), 0);

    assert!(bo.engine.reconnect());
    let join = bo.engine.drain_outbox().remove(0);
    bo.connection = hub.accept(join).await.unwrap();
    settle(&mut ana, &mut bo).await;

    assert_eq!(bo.engine.head(), 1);
    assert_eq!(bo.applied(), vec!["Sharp."]);
}
