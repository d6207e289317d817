//! Error types for editing, switching and saving

use folio_babel::{EditorMode, FormatError, ModelError};
use thiserror::Error;

/// Errors raised by [`EditorState`](crate::EditorState) operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    /// A mode switch is running; edits and new jobs must wait for it.
    #[error("a switch to {0} mode is in progress")]
    SwitchInProgress(EditorMode),
    /// `complete_switch` was called with a ticket that is not the running job.
    #[error("switch ticket {0} is not the running switch")]
    StaleSwitch(u64),
    /// The draft handed in belongs to another editing mode.
    #[error("draft is for {found} mode but the editor is in {expected} mode")]
    DraftMismatch {
        expected: EditorMode,
        found: EditorMode,
    },
    #[error("nothing to undo")]
    NothingToUndo,
    /// Converting the content failed; the previous mode and content are kept.
    #[error("conversion failed: {0}")]
    Transform(#[from] FormatError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Errors raised while writing or reading persisted documents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("document '{0}' not found")]
    NotFound(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("could not encode document: {0}")]
    Encode(String),
}
