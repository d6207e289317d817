//! Reordering of incoming operations.
//!
//! Operations are released strictly in sequence. One that arrives early waits
//! here until the gap before it fills; a gap that stays open longer than the
//! window is reported so the engine can raise a conflict.

use crate::protocol::{RealtimeOperation, Sequence};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub enum Push {
    /// Already applied, or already waiting here.
    Duplicate,
    /// Held until the missing sequences arrive.
    Buffered,
    /// In-order operations to apply now, the pushed one first.
    Ready(Vec<RealtimeOperation>),
}

/// A gap that outlived the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    /// First missing sequence.
    pub expected: Sequence,
    /// First sequence waiting after the gap.
    pub resumes_at: Sequence,
}

#[derive(Debug, Clone)]
pub struct ReorderBuffer {
    next: Sequence,
    pending: BTreeMap<Sequence, RealtimeOperation>,
    gap_since: Option<Instant>,
    window: Duration,
}

impl ReorderBuffer {
    /// A buffer expecting `next` as the next sequence.
    pub fn new(next: Sequence, window: Duration) -> Self {
        Self {
            next,
            pending: BTreeMap::new(),
            gap_since: None,
            window,
        }
    }

    pub fn next_expected(&self) -> Sequence {
        self.next
    }

    /// The sequence being waited for, if anything is buffered behind it.
    pub fn missing(&self) -> Option<Sequence> {
        (!self.pending.is_empty()).then_some(self.next)
    }

    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    pub fn push(&mut self, operation: RealtimeOperation, now: Instant) -> Push {
        let sequence = operation.sequence;
        if sequence < self.next || self.pending.contains_key(&sequence) {
            tracing::debug!(sequence, next = self.next, "dropping duplicate operation");
            return Push::Duplicate;
        }
        if sequence > self.next {
            tracing::debug!(sequence, expected = self.next, "operation ahead of sequence; buffering");
            self.pending.insert(sequence, operation);
            self.gap_since.get_or_insert(now);
            return Push::Buffered;
        }

        self.next += 1;
        let mut ready = vec![operation];
        ready.extend(self.drain_consecutive());
        self.gap_since = if self.pending.is_empty() { None } else { Some(now) };
        Push::Ready(ready)
    }

    /// The open gap, once it has been open for the whole window.
    pub fn expired(&self, now: Instant) -> Option<Gap> {
        let since = self.gap_since?;
        let (&resumes_at, _) = self.pending.iter().next()?;
        (now.duration_since(since) >= self.window).then_some(Gap {
            expected: self.next,
            resumes_at,
        })
    }

    /// Give up on the missing sequences and release what waits behind them.
    pub fn skip_gap(&mut self) -> Vec<RealtimeOperation> {
        if let Some((&first, _)) = self.pending.iter().next() {
            tracing::warn!(from = self.next, to = first - 1, "skipping missing operations");
            self.next = first;
        }
        let ready = self.drain_consecutive();
        self.gap_since = None;
        ready
    }

    /// Drop everything buffered; returns how many operations were dropped.
    pub fn discard(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        self.gap_since = None;
        dropped
    }

    /// Start over expecting `next`.
    pub fn reset(&mut self, next: Sequence) {
        self.discard();
        self.next = next;
    }

    fn drain_consecutive(&mut self) -> Vec<RealtimeOperation> {
        let mut ready = Vec::new();
        while let Some(operation) = self.pending.remove(&self.next) {
            ready.push(operation);
            self.next += 1;
        }
        ready
    }
}
