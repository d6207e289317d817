//! Persisted documents and save coordination.
//!
//! [`SaveCoordinator`] decides when to write and whether a write is needed:
//! a snapshot identical to the last one written is skipped, a manual save
//! cancels a pending auto-save, and only one save is in flight at a time.
//! A manual save requested while another write runs is queued and taken
//! from the live state once that write finishes.
//! The write itself goes through a [`DocumentStore`].

use crate::autosave::{AutoSaveScheduler, AutoSaveSettings};
use crate::error::{EditorError, PersistenceError};
use crate::state::{Draft, EditorState, SwitcherSettings};
use chrono::Utc;
use folio_babel::{from_sectioned, to_markdown, EditorMode, FormatError, SectionList, UnifiedContent};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::time::Instant;

/// Editing mode as recorded in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentType {
    Traditional,
    Sectioned,
    Markdown,
}

impl From<EditorMode> for ContentType {
    fn from(mode: EditorMode) -> Self {
        match mode {
            EditorMode::Traditional => ContentType::Traditional,
            EditorMode::Sectioned => ContentType::Sectioned,
            EditorMode::Markdown => ContentType::Markdown,
        }
    }
}

impl From<ContentType> for EditorMode {
    fn from(content_type: ContentType) -> Self {
        match content_type {
            ContentType::Traditional => EditorMode::Traditional,
            ContentType::Sectioned => EditorMode::Sectioned,
            ContentType::Markdown => EditorMode::Markdown,
        }
    }
}

/// The stored form of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDocument {
    pub content_type: ContentType,
    pub content_data: UnifiedContent,
    /// Flattened HTML or Markdown, for consumers that do not read the node model.
    pub content: String,
    /// Section list, present for documents saved in sectioned mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<SectionList>,
}

impl PersistedDocument {
    pub fn from_state(state: &EditorState) -> Result<Self, FormatError> {
        let (content, sections) = match state.draft() {
            Draft::Traditional(html) => (html.clone(), None),
            Draft::Markdown(markdown) => (markdown.clone(), None),
            Draft::Sectioned(sections) => (to_markdown(state.content())?, Some(sections.clone())),
        };
        Ok(Self {
            content_type: state.mode().into(),
            content_data: state.content().clone(),
            content,
            sections,
        })
    }

    /// Reopen in the stored mode.
    ///
    /// Older records carry only a section list; their content is rebuilt from it.
    pub fn restore(&self, settings: &SwitcherSettings) -> Result<EditorState, EditorError> {
        let content = match &self.sections {
            Some(sections) if self.content_data.is_empty() => {
                from_sectioned(sections).with_metadata(self.content_data.metadata.clone())
            }
            _ => self.content_data.clone(),
        };
        EditorState::open(content, self.content_type.into(), settings)
    }

    /// Identity of the editable content, ignoring timestamps.
    fn fingerprint(&self) -> Result<u64, PersistenceError> {
        let key = serde_json::to_string(&(
            self.content_type,
            &self.content_data.content,
            &self.content_data.metadata.title,
            &self.content_data.metadata.description,
            &self.sections,
        ))
        .map_err(|e| PersistenceError::Encode(e.to_string()))?;
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        Ok(hasher.finish())
    }
}

/// A stored document with its revision number.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub revision: u64,
    pub document: PersistedDocument,
}

/// Where documents are written.
pub trait DocumentStore {
    fn load(&self, id: &str) -> Result<StoredDocument, PersistenceError>;

    /// Write a new revision and return its number.
    fn save(&mut self, id: &str, document: &PersistedDocument) -> Result<u64, PersistenceError>;
}

/// In-memory store keeping every revision as JSON.
#[derive(Debug, Default)]
pub struct MemoryStore {
    revisions: HashMap<String, Vec<String>>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of revisions written for `id`.
    pub fn revisions(&self, id: &str) -> usize {
        self.revisions.get(id).map_or(0, Vec::len)
    }

    /// Make every following write fail, as an unreachable backend would.
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self, id: &str) -> Result<StoredDocument, PersistenceError> {
        let revisions = self
            .revisions
            .get(id)
            .filter(|revisions| !revisions.is_empty())
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))?;
        let latest = &revisions[revisions.len() - 1];
        let document = serde_json::from_str(latest)
            .map_err(|e| PersistenceError::Encode(e.to_string()))?;
        Ok(StoredDocument {
            revision: revisions.len() as u64,
            document,
        })
    }

    fn save(&mut self, id: &str, document: &PersistedDocument) -> Result<u64, PersistenceError> {
        if self.unavailable {
            return Err(PersistenceError::Unavailable("memory store is offline".into()));
        }
        let json =
            serde_json::to_string(document).map_err(|e| PersistenceError::Encode(e.to_string()))?;
        let revisions = self.revisions.entry(id.to_string()).or_default();
        revisions.push(json);
        Ok(revisions.len() as u64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTrigger {
    Auto,
    Manual,
}

/// What the author sees as the save indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved { revision: u64 },
    Failed(PersistenceError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Written { revision: u64 },
    /// Nothing changed since the last write.
    Skipped,
    /// A write is running; the manual save runs after it.
    Queued,
}

/// A write handed out by [`SaveCoordinator::begin`].
#[derive(Debug, Clone)]
pub struct SaveJob {
    fingerprint: u64,
    trigger: SaveTrigger,
    document: PersistedDocument,
}

impl SaveJob {
    pub fn document(&self) -> &PersistedDocument {
        &self.document
    }

    pub fn trigger(&self) -> SaveTrigger {
        self.trigger
    }
}

#[derive(Debug)]
pub struct SaveCoordinator {
    document_id: String,
    scheduler: AutoSaveScheduler,
    last_saved: Option<u64>,
    in_flight: bool,
    queued_manual: bool,
    status: SaveStatus,
}

impl SaveCoordinator {
    pub fn new(document_id: impl Into<String>, settings: AutoSaveSettings) -> Self {
        Self {
            document_id: document_id.into(),
            scheduler: AutoSaveScheduler::new(settings),
            last_saved: None,
            in_flight: false,
            queued_manual: false,
            status: SaveStatus::Idle,
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    pub fn scheduler(&self) -> &AutoSaveScheduler {
        &self.scheduler
    }

    /// Whether a manual save is waiting for the running write.
    pub fn has_queued_save(&self) -> bool {
        self.queued_manual
    }

    pub fn note_edit(&mut self, now: Instant) {
        self.scheduler.note_edit(now);
    }

    /// Start a write of the current state.
    ///
    /// Returns `None` when the content matches the last write or another write
    /// is running. A manual trigger always cancels the pending auto-save, and
    /// is queued when it meets a running write.
    pub fn begin(
        &mut self,
        state: &mut EditorState,
        trigger: SaveTrigger,
    ) -> Result<Option<SaveJob>, PersistenceError> {
        if trigger == SaveTrigger::Manual {
            self.scheduler.cancel();
        }
        if self.in_flight {
            if trigger == SaveTrigger::Manual {
                self.queued_manual = true;
            }
            tracing::debug!(document = %self.document_id, ?trigger, "save already running");
            return Ok(None);
        }
        if trigger == SaveTrigger::Manual {
            self.queued_manual = false;
        }

        let mut document = PersistedDocument::from_state(state)
            .map_err(|e| PersistenceError::Encode(e.to_string()))?;
        let fingerprint = document.fingerprint()?;
        if self.last_saved == Some(fingerprint) {
            tracing::debug!(document = %self.document_id, "content unchanged since last save");
            return Ok(None);
        }

        document.content_data.touch(Utc::now());
        self.in_flight = true;
        self.status = SaveStatus::Saving;
        state.set_saving(true);
        Ok(Some(SaveJob {
            fingerprint,
            trigger,
            document,
        }))
    }

    /// Record the result of writing `job`. The draft is never touched.
    ///
    /// A manual save queued behind `job` stays queued; run it with
    /// [`SaveCoordinator::save_queued`].
    pub fn finish(
        &mut self,
        state: &mut EditorState,
        job: SaveJob,
        result: Result<u64, PersistenceError>,
    ) -> Result<SaveOutcome, PersistenceError> {
        self.in_flight = false;
        state.set_saving(false);
        match result {
            Ok(revision) => {
                self.last_saved = Some(job.fingerprint);
                self.status = SaveStatus::Saved { revision };
                Ok(SaveOutcome::Written { revision })
            }
            Err(err) => {
                tracing::warn!(document = %self.document_id, %err, "save failed; draft kept");
                self.status = SaveStatus::Failed(err.clone());
                Err(err)
            }
        }
    }

    /// Manual save or publish.
    pub fn save_now<S: DocumentStore>(
        &mut self,
        state: &mut EditorState,
        store: &mut S,
    ) -> Result<SaveOutcome, PersistenceError> {
        self.run(state, store, SaveTrigger::Manual)
    }

    /// Run a manual save that was queued behind an earlier write.
    pub fn save_queued<S: DocumentStore>(
        &mut self,
        state: &mut EditorState,
        store: &mut S,
    ) -> Result<Option<SaveOutcome>, PersistenceError> {
        if !self.queued_manual || self.in_flight {
            return Ok(None);
        }
        self.run(state, store, SaveTrigger::Manual).map(Some)
    }

    /// Run a queued manual save, or the auto-save if its deadline has passed.
    pub fn tick<S: DocumentStore>(
        &mut self,
        now: Instant,
        state: &mut EditorState,
        store: &mut S,
    ) -> Result<Option<SaveOutcome>, PersistenceError> {
        if let Some(outcome) = self.save_queued(state, store)? {
            return Ok(Some(outcome));
        }
        if !self.scheduler.poll(now) {
            return Ok(None);
        }
        self.run(state, store, SaveTrigger::Auto).map(Some)
    }

    fn run<S: DocumentStore>(
        &mut self,
        state: &mut EditorState,
        store: &mut S,
        trigger: SaveTrigger,
    ) -> Result<SaveOutcome, PersistenceError> {
        match self.begin(state, trigger)? {
            Some(job) => {
                let result = store.save(&self.document_id, job.document());
                self.finish(state, job, result)
            }
            None if self.queued_manual => Ok(SaveOutcome::Queued),
            None => Ok(SaveOutcome::Skipped),
        }
    }
}
