//! Debounced auto-save timing.
//!
//! A pure state machine: callers report edits and poll with the current
//! [`Instant`]; the scheduler says when a save is due. Each edit pushes the
//! deadline back by the debounce interval.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoSaveSettings {
    pub enabled: bool,
    pub debounce: Duration,
}

impl Default for AutoSaveSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AutoSaveScheduler {
    settings: AutoSaveSettings,
    deadline: Option<Instant>,
}

impl AutoSaveScheduler {
    pub fn new(settings: AutoSaveSettings) -> Self {
        Self {
            settings,
            deadline: None,
        }
    }

    /// Record an edit made at `now`.
    pub fn note_edit(&mut self, now: Instant) {
        if self.settings.enabled {
            self.deadline = Some(now + self.settings.debounce);
        }
    }

    /// True once the deadline has passed; the pending save is consumed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drop the pending save, e.g. because a manual save just ran.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}
