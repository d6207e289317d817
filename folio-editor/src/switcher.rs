//! Mode switching.
//!
//! A switch is two-phase so the conversion can run off the caller's thread:
//! [`EditorState::request_switch`] hands out a [`SwitchJob`], the caller runs it
//! and feeds the result to [`EditorState::complete_switch`]. While a job is out,
//! edits are refused and further requests are coalesced: only the last one is
//! started once the running job completes.

use crate::error::EditorError;
use crate::state::{Draft, EditorState};
use folio_babel::{EditorMode, FormatError, UnifiedContent};

/// A pending conversion of the node model into another mode's draft.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchJob {
    ticket: u64,
    from: EditorMode,
    to: EditorMode,
    content: UnifiedContent,
}

impl SwitchJob {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub fn from(&self) -> EditorMode {
        self.from
    }

    pub fn to(&self) -> EditorMode {
        self.to
    }

    /// Render the target draft. Pure; safe to run anywhere.
    pub fn run(&self) -> Result<Draft, FormatError> {
        Draft::render(&self.content, self.to)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SwitchSlot {
    running: Option<(u64, EditorMode)>,
    queued: Option<EditorMode>,
    next_ticket: u64,
}

impl SwitchSlot {
    pub(crate) fn running(&self) -> Option<EditorMode> {
        self.running.map(|(_, to)| to)
    }
}

impl EditorState {
    /// Ask for a switch to `to`.
    ///
    /// Returns the job to run, or `None` when there is nothing to do now: the
    /// editor is already in `to`, or another switch is running and this request
    /// was queued behind it.
    pub fn request_switch(&mut self, to: EditorMode) -> Option<SwitchJob> {
        if self.switch.running.is_some() {
            tracing::debug!(%to, "switch requested while another runs; queued");
            self.switch.queued = Some(to);
            return None;
        }
        self.switch.queued = None;
        if to == self.mode {
            return None;
        }

        let ticket = self.switch.next_ticket;
        self.switch.next_ticket += 1;
        self.switch.running = Some((ticket, to));
        Some(SwitchJob {
            ticket,
            from: self.mode,
            to,
            content: self.content.clone(),
        })
    }

    /// Finish the running switch with the result of [`SwitchJob::run`].
    ///
    /// On success the mode and draft change and the next queued request, if
    /// any, is started and returned. On failure the previous mode and content
    /// stay, queued requests are dropped and the error is returned.
    pub fn complete_switch(
        &mut self,
        ticket: u64,
        result: Result<Draft, FormatError>,
    ) -> Result<Option<SwitchJob>, EditorError> {
        let to = match self.switch.running {
            Some((running, to)) if running == ticket => to,
            _ => return Err(EditorError::StaleSwitch(ticket)),
        };
        self.switch.running = None;

        let draft = match result {
            Ok(draft) if draft.mode() == to => draft,
            Ok(draft) => {
                self.switch.queued = None;
                return Err(EditorError::DraftMismatch {
                    expected: to,
                    found: draft.mode(),
                });
            }
            Err(err) => {
                tracing::warn!(from = %self.mode, %to, %err, "mode switch failed; keeping current mode");
                self.switch.queued = None;
                return Err(err.into());
            }
        };

        self.history.push(self.snapshot());
        let derived = draft.to_content();
        self.adopt(derived);
        tracing::debug!(from = %self.mode, %to, "switched editing mode");
        self.mode = to;
        self.draft = draft;

        Ok(match self.switch.queued.take() {
            Some(next) => self.request_switch(next),
            None => None,
        })
    }

    /// Run a switch to `to` to completion, including anything queued meanwhile.
    pub fn switch_to(&mut self, to: EditorMode) -> Result<(), EditorError> {
        self.ensure_idle()?;
        let mut job = self.request_switch(to);
        while let Some(current) = job {
            let result = current.run();
            job = self.complete_switch(current.ticket(), result)?;
        }
        Ok(())
    }
}
