//! Editor state, mode switching and saving for folio documents
//!
//!     An author edits one draft at a time, in one of three modes (traditional rich text,
//!     Markdown, sections). The draft is never the source of truth across modes: every edit
//!     is turned into the node model (folio-babel's `UnifiedContent`), and every mode switch
//!     renders the node model into the new mode's draft.
//!
//!     The file structure :
//!     .
//!     ├── error.rs        # EditorError, PersistenceError
//!     ├── state.rs        # Draft, EditorState and edits
//!     ├── switcher.rs     # Two-phase mode switching with coalescing
//!     ├── history.rs      # Bounded undo snapshots
//!     ├── autosave.rs     # Debounce timer state machine
//!     ├── persist.rs      # Persisted form, stores, save coordination
//!     └── lib.rs
//!
//!     Nothing in here spawns threads or reads clocks on its own: switch jobs are handed back
//!     to the caller to run, and timers are driven by the `Instant`s the caller passes in.

pub mod autosave;
pub mod error;
pub mod history;
pub mod persist;
pub mod state;
pub mod switcher;

pub use autosave::{AutoSaveScheduler, AutoSaveSettings};
pub use error::{EditorError, PersistenceError};
pub use history::{History, Snapshot};
pub use persist::{
    ContentType, DocumentStore, MemoryStore, PersistedDocument, SaveCoordinator, SaveJob,
    SaveOutcome, SaveStatus, SaveTrigger, StoredDocument,
};
pub use state::{Draft, EditorState, SwitcherSettings};
pub use switcher::SwitchJob;
