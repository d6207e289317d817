//! The client side of a collaboration session.
//!
//! [`SyncEngine`] does no I/O. The caller feeds it relay messages and the
//! current [`Instant`], then drains the messages it wants sent and the
//! events it wants shown. Local operations are sequenced one at a time: the
//! next goes out only after the relay has acknowledged the previous one and
//! the engine has applied everything up to the relay's head.

use crate::buffer::{Push, ReorderBuffer};
use crate::conflict::{settle_edit, Conflict, ConflictId, ConflictKind, Resolution};
use crate::connection::{BackoffConfig, Connection, ConnectionState};
use crate::error::SyncError;
use crate::presence::Presence;
use crate::protocol::{
    ClientMessage, ContentChange, CursorPosition, FormatSwitch, Operation, RealtimeOperation,
    Sequence, ServerMessage,
};
use folio_babel::EditorMode;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub struct SyncSettings {
    /// How long an out-of-order operation may wait for the gap before it.
    pub reorder_window: Duration,
    pub backoff: BackoffConfig,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            reorder_window: Duration::from_secs(2),
            backoff: BackoffConfig::default(),
        }
    }
}

/// Identity and settings of one participant in one session.
#[derive(Debug, Clone)]
pub struct SyncContext {
    pub session_id: String,
    pub user_id: String,
    pub token: Option<String>,
    pub settings: SyncSettings,
}

impl SyncContext {
    pub fn new(session_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            token: None,
            settings: SyncSettings::default(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_settings(mut self, settings: SyncSettings) -> Self {
        self.settings = settings;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    StateChanged(ConnectionState),
    /// A remote operation to apply to the local document.
    Applied(RealtimeOperation),
    /// The relay accepted our operation with this sequence.
    Acknowledged(Sequence),
    Conflict(Conflict),
    Resolved {
        id: ConflictId,
        resolution: Resolution,
    },
    PresenceChanged,
}

pub struct SyncEngine {
    context: SyncContext,
    connection: Connection,
    /// Last applied sequence.
    head: Sequence,
    /// Latest head the relay reported.
    server_head: Sequence,
    joined_once: bool,
    /// Set on rejoin until the replay shows whether the in-flight operation landed.
    confirm_in_flight: bool,
    buffer: ReorderBuffer,
    in_flight: Option<RealtimeOperation>,
    pending: VecDeque<Operation>,
    /// Last accepted change per target, the base for merges.
    acked: HashMap<String, ContentChange>,
    conflicts: BTreeMap<ConflictId, Conflict>,
    next_conflict: ConflictId,
    presence: Presence,
    outbox: VecDeque<ClientMessage>,
    events: VecDeque<SyncEvent>,
}

impl SyncEngine {
    pub fn new(context: SyncContext) -> Self {
        let connection = Connection::new(context.settings.backoff.clone());
        let buffer = ReorderBuffer::new(1, context.settings.reorder_window);
        let presence = Presence::new(context.user_id.clone());
        Self {
            context,
            connection,
            head: 0,
            server_head: 0,
            joined_once: false,
            confirm_in_flight: false,
            buffer,
            in_flight: None,
            pending: VecDeque::new(),
            acked: HashMap::new(),
            conflicts: BTreeMap::new(),
            next_conflict: 1,
            presence,
            outbox: VecDeque::new(),
            events: VecDeque::new(),
        }
    }

    pub fn context(&self) -> &SyncContext {
        &self.context
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn head(&self) -> Sequence {
        self.head
    }

    pub fn presence(&self) -> &Presence {
        &self.presence
    }

    pub fn conflicts(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.values()
    }

    /// Local operations not yet acknowledged, the in-flight one included.
    pub fn unacknowledged(&self) -> usize {
        self.pending.len() + usize::from(self.in_flight.is_some())
    }

    pub fn is_frozen(&self, target: &str) -> bool {
        self.conflicts.values().any(|c| c.target() == Some(target))
    }

    /// Start joining the session.
    pub fn connect(&mut self) {
        self.connection.connecting();
        self.send_join();
    }

    /// The link dropped. Local operations stay queued for after the rejoin.
    pub fn disconnect(&mut self, now: Instant) {
        self.connection.disconnected(now);
        self.events.push_back(SyncEvent::StateChanged(self.connection.state()));
    }

    /// The transport failed; only [`SyncEngine::reconnect`] leaves this state.
    pub fn transport_error(&mut self) {
        self.connection.failed();
        self.events.push_back(SyncEvent::StateChanged(self.connection.state()));
    }

    pub fn reconnect(&mut self) -> bool {
        if !self.connection.reconnect() {
            return false;
        }
        self.send_join();
        true
    }

    /// Drive timers: scheduled reconnects and expired sequence gaps.
    pub fn tick(&mut self, now: Instant) {
        if self.connection.poll_reconnect(now) {
            self.send_join();
        }
        if let Some(gap) = self.buffer.expired(now) {
            if !self.conflicts.values().any(Conflict::is_gap) {
                tracing::warn!(expected = gap.expected, resumes_at = gap.resumes_at, "sequence gap outlived the reorder window");
                self.open_conflict(ConflictKind::SequenceGap {
                    expected: gap.expected,
                    buffered: self.buffer.buffered(),
                });
            }
        }
    }

    pub fn handle(&mut self, message: ServerMessage, now: Instant) {
        match message {
            ServerMessage::Joined {
                session_id,
                head,
                participants,
            } => {
                if session_id != self.context.session_id {
                    tracing::warn!(%session_id, "joined an unexpected session");
                    return;
                }
                self.connection.connected();
                self.events.push_back(SyncEvent::StateChanged(self.connection.state()));
                if self.joined_once {
                    self.confirm_in_flight = self.in_flight.is_some();
                } else {
                    self.joined_once = true;
                    self.head = head;
                    self.buffer.reset(head + 1);
                }
                self.server_head = head.max(self.head);
                self.presence.reset(&participants);
                self.events.push_back(SyncEvent::PresenceChanged);
            }
            ServerMessage::Operation { operation } => {
                if operation.session_id != self.context.session_id {
                    tracing::warn!(session = %operation.session_id, "operation for another session");
                    return;
                }
                self.server_head = self.server_head.max(operation.sequence);
                match self.buffer.push(operation, now) {
                    Push::Ready(ready) => ready.into_iter().for_each(|op| self.apply(op)),
                    Push::Buffered | Push::Duplicate => {}
                }
            }
            ServerMessage::Rejected { sequence, head } => {
                tracing::debug!(sequence, head, "operation rejected");
                self.server_head = self.server_head.max(head);
                if self.in_flight.as_ref().is_some_and(|op| op.sequence == sequence) {
                    if let Some(rejected) = self.in_flight.take() {
                        self.requeue(rejected.operation);
                    }
                }
                if head > self.head && self.buffer.missing().is_none() {
                    self.outbox.push_back(ClientMessage::Resync { from: self.head });
                }
            }
            ServerMessage::ParticipantJoined { participant } => {
                if self.presence.join(&participant.user_id) {
                    self.events.push_back(SyncEvent::PresenceChanged);
                }
            }
            ServerMessage::ParticipantLeft { user_id } => {
                if self.presence.leave(&user_id) {
                    self.events.push_back(SyncEvent::PresenceChanged);
                }
            }
            ServerMessage::Error { message } => {
                tracing::warn!(%message, "relay error");
                self.transport_error();
            }
        }
        self.settle_in_flight();
        self.flush();
    }

    /// Queue a local operation.
    pub fn submit(&mut self, operation: Operation) -> Result<(), SyncError> {
        if let Some(target) = operation.content_target() {
            if self.is_frozen(target) {
                return Err(SyncError::Frozen(target.to_string()));
            }
        }
        self.enqueue(operation);
        self.flush();
        Ok(())
    }

    pub fn submit_change(&mut self, change: ContentChange) -> Result<(), SyncError> {
        self.submit(Operation::ContentChange(change))
    }

    pub fn submit_cursor(&mut self, node_id: impl Into<String>, offset: usize) -> Result<(), SyncError> {
        self.submit(Operation::Cursor(CursorPosition {
            user_id: self.context.user_id.clone(),
            node_id: node_id.into(),
            offset,
        }))
    }

    pub fn submit_switch(&mut self, mode: EditorMode) -> Result<(), SyncError> {
        self.submit(Operation::FormatSwitch(FormatSwitch { mode }))
    }

    /// Settle a conflict. For edit conflicts, returns the text the local
    /// document should now hold for the target.
    pub fn resolve(
        &mut self,
        id: ConflictId,
        resolution: Resolution,
    ) -> Result<Option<ContentChange>, SyncError> {
        let conflict = self
            .conflicts
            .remove(&id)
            .ok_or(SyncError::UnknownConflict(id))?;

        let settled = match conflict.kind {
            ConflictKind::ConcurrentEdit {
                base,
                local,
                remote,
                ..
            } => {
                let change = settle_edit(base.as_ref(), &local, &remote, resolution);
                if change != remote {
                    self.enqueue(Operation::ContentChange(change.clone()));
                }
                Some(change)
            }
            ConflictKind::SequenceGap { .. } => {
                match resolution {
                    Resolution::KeepLocal => {
                        let dropped = self.buffer.discard();
                        tracing::debug!(dropped, from = self.head, "discarding buffered operations; resyncing");
                        self.outbox.push_back(ClientMessage::Resync { from: self.head });
                    }
                    Resolution::AcceptRemote | Resolution::Merge => {
                        for operation in self.buffer.skip_gap() {
                            self.apply(operation);
                        }
                    }
                }
                None
            }
        };

        tracing::info!(id, ?resolution, "conflict resolved");
        self.events.push_back(SyncEvent::Resolved { id, resolution });
        self.flush();
        Ok(settled)
    }

    pub fn drain_outbox(&mut self) -> Vec<ClientMessage> {
        self.outbox.drain(..).collect()
    }

    pub fn drain_events(&mut self) -> Vec<SyncEvent> {
        self.events.drain(..).collect()
    }

    /// Send the next queued operation when the engine is free to.
    fn flush(&mut self) {
        let ready = self.connection.state() == ConnectionState::Connected
            && self.in_flight.is_none()
            && !self.confirm_in_flight
            && self.head >= self.server_head
            && self.buffer.missing().is_none()
            && !self.conflicts.values().any(Conflict::is_gap);
        if !ready {
            return;
        }
        let Some(operation) = self.pending.pop_front() else {
            return;
        };
        let operation = RealtimeOperation {
            session_id: self.context.session_id.clone(),
            user_id: self.context.user_id.clone(),
            sequence: self.head + 1,
            operation,
        };
        tracing::debug!(sequence = operation.sequence, "sending operation");
        self.in_flight = Some(operation.clone());
        self.outbox.push_back(ClientMessage::Operation { operation });
    }

    fn apply(&mut self, operation: RealtimeOperation) {
        self.head = operation.sequence;

        let own = operation.user_id == self.context.user_id;
        if own && self.in_flight.as_ref().map(|op| op.sequence) == Some(operation.sequence) {
            self.in_flight = None;
            self.confirm_in_flight = false;
            if let Operation::ContentChange(change) = operation.operation {
                self.acked.insert(change.target.clone(), change);
            }
            self.events.push_back(SyncEvent::Acknowledged(operation.sequence));
            return;
        }

        match &operation.operation {
            Operation::ContentChange(remote) => {
                if self.absorb_into_conflict(remote) {
                    return;
                }
                if let Some(local) = self.take_local_change(&remote.target) {
                    let base = self.acked.insert(remote.target.clone(), remote.clone());
                    tracing::warn!(section = %remote.target, sequence = operation.sequence, "concurrent edit");
                    self.open_conflict(ConflictKind::ConcurrentEdit {
                        target: remote.target.clone(),
                        base,
                        local,
                        remote: remote.clone(),
                    });
                    return;
                }
                self.acked.insert(remote.target.clone(), remote.clone());
                self.events.push_back(SyncEvent::Applied(operation));
            }
            Operation::FormatSwitch(_) | Operation::Cursor(_) => {
                let changed = self.presence.observe(&operation);
                if matches!(operation.operation, Operation::FormatSwitch(_)) {
                    self.events.push_back(SyncEvent::Applied(operation));
                }
                if changed {
                    self.events.push_back(SyncEvent::PresenceChanged);
                }
            }
        }
    }

    /// A newer remote change to a frozen target replaces the conflict's remote side.
    fn absorb_into_conflict(&mut self, remote: &ContentChange) -> bool {
        let Some(conflict) = self
            .conflicts
            .values_mut()
            .find(|c| c.target() == Some(remote.target.as_str()))
        else {
            return false;
        };
        if let ConflictKind::ConcurrentEdit { remote: held, .. } = &mut conflict.kind {
            *held = remote.clone();
        }
        self.acked.insert(remote.target.clone(), remote.clone());
        true
    }

    /// Pull every unacknowledged local change of `target`; the newest is returned.
    fn take_local_change(&mut self, target: &str) -> Option<ContentChange> {
        let mut latest = None;
        let in_flight_hit = self
            .in_flight
            .as_ref()
            .is_some_and(|op| op.operation.content_target() == Some(target));
        if in_flight_hit {
            if let Some(RealtimeOperation {
                operation: Operation::ContentChange(change),
                ..
            }) = self.in_flight.take()
            {
                latest = Some(change);
            }
            self.confirm_in_flight = false;
        }
        let mut kept = VecDeque::with_capacity(self.pending.len());
        for operation in self.pending.drain(..) {
            match operation {
                Operation::ContentChange(change) if change.target == target => latest = Some(change),
                other => kept.push_back(other),
            }
        }
        self.pending = kept;
        latest
    }

    fn open_conflict(&mut self, kind: ConflictKind) {
        let conflict = Conflict {
            id: self.next_conflict,
            kind,
        };
        self.next_conflict += 1;
        self.conflicts.insert(conflict.id, conflict.clone());
        self.events.push_back(SyncEvent::Conflict(conflict));
    }

    /// Queue an operation, replacing a queued one it supersedes.
    fn enqueue(&mut self, operation: Operation) {
        let superseded = self.pending.iter().position(|queued| match (queued, &operation) {
            (Operation::ContentChange(a), Operation::ContentChange(b)) => a.target == b.target,
            (Operation::Cursor(_), Operation::Cursor(_)) => true,
            (Operation::FormatSwitch(_), Operation::FormatSwitch(_)) => true,
            _ => false,
        });
        match superseded {
            Some(index) => self.pending[index] = operation,
            None => self.pending.push_back(operation),
        }
    }

    /// Put a rejected operation back at the front, unless it became moot.
    fn requeue(&mut self, operation: Operation) {
        if let Some(target) = operation.content_target() {
            if self.is_frozen(target) {
                tracing::debug!(section = %target, "dropping rejected change to a frozen target");
                return;
            }
            let newer_queued = self
                .pending
                .iter()
                .any(|queued| queued.content_target() == Some(target));
            if newer_queued {
                return;
            }
        }
        self.pending.push_front(operation);
    }

    /// After a rejoin, an in-flight operation the replay did not acknowledge was lost.
    fn settle_in_flight(&mut self) {
        if !self.confirm_in_flight || self.head < self.server_head || self.buffer.missing().is_some() {
            return;
        }
        self.confirm_in_flight = false;
        if let Some(lost) = self.in_flight.take() {
            tracing::debug!(sequence = lost.sequence, "in-flight operation was not accepted; resending");
            self.requeue(lost.operation);
        }
    }

    fn send_join(&mut self) {
        self.events.push_back(SyncEvent::StateChanged(self.connection.state()));
        self.outbox.push_back(ClientMessage::Join {
            session_id: self.context.session_id.clone(),
            user_id: self.context.user_id.clone(),
            token: self.context.token.clone(),
            last_acked: self.joined_once.then_some(self.head),
        });
    }
}
