//! Wire types for the client↔relay protocol.
//!
//! Every message is a JSON object tagged by a kebab-case `type`. Operations
//! carry the session, the author and a per-session sequence number; the relay
//! accepts an operation only when its sequence is exactly one past its head.

use crate::error::SyncError;
use folio_babel::ir::nodes::Metadata;
use folio_babel::EditorMode;
use serde::{Deserialize, Serialize};

/// Position in a session's operation log. The first operation is 1.
pub type Sequence = u64;

/// New full text of one target (a section id, or a node id in flat modes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentChange {
    pub target: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl ContentChange {
    pub fn new(target: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            text: text.into(),
            metadata: Metadata::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSwitch {
    pub mode: EditorMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorPosition {
    pub user_id: String,
    pub node_id: String,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Operation {
    ContentChange(ContentChange),
    FormatSwitch(FormatSwitch),
    Cursor(CursorPosition),
}

impl Operation {
    /// Target of a content change.
    pub fn content_target(&self) -> Option<&str> {
        match self {
            Operation::ContentChange(change) => Some(&change.target),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeOperation {
    pub session_id: String,
    pub user_id: String,
    pub sequence: Sequence,
    pub operation: Operation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub user_id: String,
}

/// Client → relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    Join {
        session_id: String,
        user_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
        /// Last sequence this client applied; the relay replays what follows.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_acked: Option<Sequence>,
    },
    Operation {
        operation: RealtimeOperation,
    },
    /// Ask for every operation after `from` again.
    Resync {
        from: Sequence,
    },
    Leave,
}

/// Relay → client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    Joined {
        session_id: String,
        head: Sequence,
        participants: Vec<Participant>,
    },
    /// An accepted operation; the author receives it too, as acknowledgement.
    Operation {
        operation: RealtimeOperation,
    },
    Rejected {
        sequence: Sequence,
        head: Sequence,
    },
    ParticipantJoined {
        participant: Participant,
    },
    #[serde(rename_all = "camelCase")]
    ParticipantLeft {
        user_id: String,
    },
    Error {
        message: String,
    },
}

impl ClientMessage {
    pub fn to_json(&self) -> Result<String, SyncError> {
        serde_json::to_string(self).map_err(|e| SyncError::Encode(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SyncError> {
        serde_json::from_str(json).map_err(|e| SyncError::Decode(e.to_string()))
    }
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String, SyncError> {
        serde_json::to_string(self).map_err(|e| SyncError::Encode(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SyncError> {
        serde_json::from_str(json).map_err(|e| SyncError::Decode(e.to_string()))
    }
}
