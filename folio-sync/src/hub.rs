//! In-process relay for collaboration sessions.
//!
//! The hub owns each session's head and operation log. It accepts an
//! operation only when its sequence is exactly one past the head and then
//! broadcasts it to every participant, the author included. Anything else
//! is answered with `Rejected` to the author alone. The log is kept so a
//! participant rejoining with `last_acked` gets what it missed. A participant
//! whose connection was dropped without `Leave` is removed the next time the
//! hub writes to it, and the others get `ParticipantLeft`.

use crate::error::TransportError;
use crate::protocol::{ClientMessage, Participant, RealtimeOperation, Sequence, ServerMessage};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

#[derive(Default)]
struct Session {
    head: Sequence,
    log: Vec<RealtimeOperation>,
    participants: HashMap<String, mpsc::UnboundedSender<ServerMessage>>,
}

impl Session {
    fn send(&mut self, user_id: &str, message: ServerMessage) {
        let Some(tx) = self.participants.get(user_id) else {
            return;
        };
        if tx.send(message).is_err() {
            self.drop_participants(vec![user_id.to_string()]);
        }
    }

    fn broadcast(&mut self, message: &ServerMessage, except: Option<&str>) {
        let closed: Vec<String> = self
            .participants
            .iter()
            .filter(|(user_id, tx)| {
                Some(user_id.as_str()) != except && tx.send(message.clone()).is_err()
            })
            .map(|(user_id, _)| user_id.clone())
            .collect();
        self.drop_participants(closed);
    }

    /// Remove participants whose connection is gone and announce each one
    /// as having left. Closed channels found while announcing are dropped too.
    fn drop_participants(&mut self, mut closed: Vec<String>) {
        while let Some(user_id) = closed.pop() {
            if self.participants.remove(&user_id).is_none() {
                continue;
            }
            tracing::info!(user = %user_id, "dropping participant with a closed connection");
            let notice = ServerMessage::ParticipantLeft { user_id };
            for (other, tx) in &self.participants {
                if tx.send(notice.clone()).is_err() && !closed.contains(other) {
                    closed.push(other.clone());
                }
            }
        }
    }

    fn replay_after(&mut self, user_id: &str, from: Sequence) {
        let missed: Vec<RealtimeOperation> = self
            .log
            .iter()
            .filter(|op| op.sequence > from)
            .cloned()
            .collect();
        for operation in missed {
            self.send(user_id, ServerMessage::Operation { operation });
        }
    }

    fn participant_list(&self) -> Vec<Participant> {
        let mut participants: Vec<Participant> = self
            .participants
            .keys()
            .map(|user_id| Participant {
                user_id: user_id.clone(),
            })
            .collect();
        participants.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        participants
    }
}

/// Shared handle to the relay; clones talk to the same sessions.
#[derive(Clone, Default)]
pub struct SessionHub {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a connection from its first message, which must be a join.
    pub async fn accept(&self, join: ClientMessage) -> Result<HubConnection, TransportError> {
        match join {
            ClientMessage::Join {
                session_id,
                user_id,
                last_acked,
                ..
            } => Ok(self.join(&session_id, &user_id, last_acked).await),
            _ => Err(TransportError::ExpectedJoin),
        }
    }

    /// Join a session, creating it on first use.
    pub async fn join(
        &self,
        session_id: &str,
        user_id: &str,
        last_acked: Option<Sequence>,
    ) -> HubConnection {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(session_id.to_string()).or_default();
        let is_new = session.participants.insert(user_id.to_string(), tx).is_none();

        let joined = ServerMessage::Joined {
            session_id: session_id.to_string(),
            head: session.head,
            participants: session.participant_list(),
        };
        session.send(user_id, joined);
        if let Some(from) = last_acked {
            session.replay_after(user_id, from);
        }
        if is_new {
            let notice = ServerMessage::ParticipantJoined {
                participant: Participant {
                    user_id: user_id.to_string(),
                },
            };
            session.broadcast(&notice, Some(user_id));
        }
        tracing::info!(session = session_id, user = user_id, head = session.head, "participant joined");

        HubConnection {
            hub: self.clone(),
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
            rx,
        }
    }

    pub async fn head(&self, session_id: &str) -> Option<Sequence> {
        self.sessions.read().await.get(session_id).map(|s| s.head)
    }

    /// Process one message from a joined participant.
    pub async fn handle(
        &self,
        session_id: &str,
        user_id: &str,
        message: ClientMessage,
    ) -> Result<(), TransportError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| TransportError::SessionNotFound(session_id.to_string()))?;
        if !session.participants.contains_key(user_id) {
            return Err(TransportError::NotJoined {
                session_id: session_id.to_string(),
                user_id: user_id.to_string(),
            });
        }

        match message {
            ClientMessage::Operation { operation } => {
                if operation.session_id != session_id {
                    return Err(TransportError::WrongSession {
                        sequence: operation.sequence,
                        expected: session_id.to_string(),
                        found: operation.session_id,
                    });
                }
                if operation.sequence != session.head + 1 {
                    tracing::debug!(
                        session = session_id,
                        sequence = operation.sequence,
                        head = session.head,
                        "rejecting out-of-sequence operation"
                    );
                    let rejected = ServerMessage::Rejected {
                        sequence: operation.sequence,
                        head: session.head,
                    };
                    session.send(user_id, rejected);
                    return Ok(());
                }
                session.head = operation.sequence;
                session.log.push(operation.clone());
                session.broadcast(&ServerMessage::Operation { operation }, None);
            }
            ClientMessage::Resync { from } => session.replay_after(user_id, from),
            ClientMessage::Join { last_acked, .. } => {
                let joined = ServerMessage::Joined {
                    session_id: session_id.to_string(),
                    head: session.head,
                    participants: session.participant_list(),
                };
                session.send(user_id, joined);
                if let Some(from) = last_acked {
                    session.replay_after(user_id, from);
                }
            }
            ClientMessage::Leave => {
                session.participants.remove(user_id);
                let notice = ServerMessage::ParticipantLeft {
                    user_id: user_id.to_string(),
                };
                session.broadcast(&notice, None);
                tracing::info!(session = session_id, user = user_id, "participant left");
            }
        }
        Ok(())
    }
}

/// One participant's end of a session.
pub struct HubConnection {
    hub: SessionHub,
    session_id: String,
    user_id: String,
    rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl HubConnection {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub async fn send(&self, message: ClientMessage) -> Result<(), TransportError> {
        self.hub.handle(&self.session_id, &self.user_id, message).await
    }

    /// Next message; `None` once the hub dropped this participant.
    pub async fn recv(&mut self) -> Option<ServerMessage> {
        self.rx.recv().await
    }

    /// Next message if one is already waiting.
    pub fn try_recv(&mut self) -> Option<ServerMessage> {
        self.rx.try_recv().ok()
    }
}
