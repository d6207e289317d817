use folio_sync::{
    ContentChange, Operation, Participant, RealtimeOperation, Sequence, ServerMessage, SyncContext,
    SyncEngine, SyncEvent,
};
use std::time::Instant;

pub const SESSION: &str = "review-42";

/// An engine for `user` that has joined an empty session.
pub fn joined_engine(user: &str, now: Instant) -> SyncEngine {
    let mut engine = SyncEngine::new(SyncContext::new(SESSION, user));
    engine.connect();
    engine.handle(
        ServerMessage::Joined {
            session_id: SESSION.into(),
            head: 0,
            participants: vec![Participant { user_id: user.into() }],
        },
        now,
    );
    engine.drain_outbox();
    engine.drain_events();
    engine
}

pub fn change_from(user: &str, sequence: Sequence, target: &str, text: &str) -> ServerMessage {
    ServerMessage::Operation {
        operation: RealtimeOperation {
            session_id: SESSION.into(),
            user_id: user.into(),
            sequence,
            operation: Operation::ContentChange(ContentChange::new(target, text)),
        },
    }
}

/// Sequences of operations the engine wants to send.
pub fn sent(engine: &mut SyncEngine) -> Vec<(Sequence, Operation)> {
    engine
        .drain_outbox()
        .into_iter()
        .filter_map(|message| match message {
            folio_sync::ClientMessage::Operation { operation } => {
                Some((operation.sequence, operation.operation))
            }
            _ => None,
        })
        .collect()
}

/// Text of every applied remote content change, in order.
pub fn applied_texts(events: &[SyncEvent]) -> Vec<(Sequence, String)> {
    events
        .iter()
        .filter_map(|event| match event {
            SyncEvent::Applied(RealtimeOperation {
                sequence,
                operation: Operation::ContentChange(change),
                ..
            }) => Some((*sequence, change.text.clone())),
            _ => None,
        })
        .collect()
}
