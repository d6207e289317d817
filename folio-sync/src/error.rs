//! Error types for the engine and the relay

use crate::protocol::Sequence;
use thiserror::Error;

/// Misuse of the engine or undecodable wire data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The target has an open conflict; local edits wait for its resolution.
    #[error("'{0}' is frozen by an unresolved conflict")]
    Frozen(String),
    #[error("no open conflict with id {0}")]
    UnknownConflict(u64),
    #[error("cannot decode message: {0}")]
    Decode(String),
    #[error("cannot encode message: {0}")]
    Encode(String),
}

/// Failures of the relay transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("session '{0}' does not exist")]
    SessionNotFound(String),
    #[error("'{user_id}' has not joined session '{session_id}'")]
    NotJoined { session_id: String, user_id: String },
    #[error("operation {sequence} belongs to session '{found}', not '{expected}'")]
    WrongSession {
        sequence: Sequence,
        expected: String,
        found: String,
    },
    #[error("a connection must open with a join message")]
    ExpectedJoin,
    #[error("connection closed")]
    Closed,
}
