//! Who else is in the session, where their cursor is and which mode they edit in.

use crate::protocol::{CursorPosition, Operation, Participant, RealtimeOperation};
use folio_babel::EditorMode;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeerState {
    pub cursor: Option<CursorPosition>,
    pub mode: Option<EditorMode>,
}

/// Peers of one participant; the participant itself is never listed.
#[derive(Debug, Clone, Default)]
pub struct Presence {
    own: String,
    peers: BTreeMap<String, PeerState>,
}

impl Presence {
    pub fn new(own: impl Into<String>) -> Self {
        Self {
            own: own.into(),
            peers: BTreeMap::new(),
        }
    }

    /// Replace the peer list with the relay's view, keeping known state.
    pub fn reset(&mut self, participants: &[Participant]) {
        let mut peers = BTreeMap::new();
        for participant in participants.iter().filter(|p| p.user_id != self.own) {
            let state = self.peers.remove(&participant.user_id).unwrap_or_default();
            peers.insert(participant.user_id.clone(), state);
        }
        self.peers = peers;
    }

    pub fn join(&mut self, user_id: &str) -> bool {
        if user_id == self.own || self.peers.contains_key(user_id) {
            return false;
        }
        self.peers.insert(user_id.to_string(), PeerState::default());
        true
    }

    pub fn leave(&mut self, user_id: &str) -> bool {
        self.peers.remove(user_id).is_some()
    }

    /// Record cursor moves and mode switches; `true` when something changed.
    pub fn observe(&mut self, operation: &RealtimeOperation) -> bool {
        if operation.user_id == self.own {
            return false;
        }
        let peer = self.peers.entry(operation.user_id.clone()).or_default();
        match &operation.operation {
            Operation::Cursor(cursor) => {
                peer.cursor = Some(cursor.clone());
                true
            }
            Operation::FormatSwitch(switch) => {
                peer.mode = Some(switch.mode);
                true
            }
            Operation::ContentChange(_) => false,
        }
    }

    pub fn get(&self, user_id: &str) -> Option<&PeerState> {
        self.peers.get(user_id)
    }

    pub fn peers(&self) -> impl Iterator<Item = (&str, &PeerState)> {
        self.peers.iter().map(|(id, state)| (id.as_str(), state))
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
