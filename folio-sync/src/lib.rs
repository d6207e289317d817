//! Real-time sync for one collaboration session
//!
//!     Participants exchange operations (content changes, mode switches, cursor moves) through
//!     a relay. Every operation carries a per-session sequence number; the relay accepts only
//!     head+1, so the accepted log is the single order everybody applies.
//!
//!     The client side, `SyncEngine`, is sans-IO: it takes relay messages plus an `Instant` and
//!     hands back messages to send and events to show. Whoever owns the socket (or, in tests,
//!     the in-process `SessionHub`) moves the bytes.
//!
//!     The file structure :
//!     .
//!     ├── protocol.rs             # Wire types, JSON with kebab-case tags
//!     ├── connection.rs           # Connection states and reconnect backoff
//!     ├── buffer.rs               # Reordering of early operations
//!     ├── merge.rs                # Three-way line merge, metadata union
//!     ├── conflict.rs             # Conflict kinds and resolutions
//!     ├── presence.rs             # Peer cursors and modes
//!     ├── engine.rs               # SyncEngine
//!     ├── hub.rs                  # tokio relay
//!     └── lib.rs
//!
//! Conflicts
//!
//!     Two content changes to the same target conflict when a remote one is applied while a local
//!     one is still unacknowledged. The target is frozen for local edits until the user picks
//!     keep local, accept remote or merge; other targets keep syncing. A sequence gap that
//!     outlives the reorder window is a conflict too, and holds outgoing operations until resolved.

pub mod buffer;
pub mod conflict;
pub mod connection;
pub mod engine;
pub mod error;
pub mod hub;
pub mod merge;
pub mod presence;
pub mod protocol;

pub use conflict::{Conflict, ConflictId, ConflictKind, Resolution};
pub use connection::{BackoffConfig, ConnectionState};
pub use engine::{SyncContext, SyncEngine, SyncEvent, SyncSettings};
pub use error::{SyncError, TransportError};
pub use hub::{HubConnection, SessionHub};
pub use protocol::{
    ClientMessage, ContentChange, CursorPosition, FormatSwitch, Operation, Participant,
    RealtimeOperation, Sequence, ServerMessage,
};
