//! Runtime editor state.
//!
//! The draft is what the author is editing, in the representation of the
//! current mode. The content is the node model derived from that draft; every
//! edit goes draft → node model, every switch goes node model → draft.

use crate::error::EditorError;
use crate::history::{History, Snapshot};
use crate::switcher::SwitchSlot;
use folio_babel::{
    from_html, from_markdown, from_sectioned, to_html, to_markdown, to_sectioned, EditorMode,
    FormatError, ModelError, SectionList, UnifiedContent,
};
use serde::{Deserialize, Serialize};

/// The editable text of one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "draft", rename_all = "lowercase")]
pub enum Draft {
    /// Rich-text body fragment.
    Traditional(String),
    Markdown(String),
    Sectioned(SectionList),
}

impl Draft {
    pub fn mode(&self) -> EditorMode {
        match self {
            Draft::Traditional(_) => EditorMode::Traditional,
            Draft::Markdown(_) => EditorMode::Markdown,
            Draft::Sectioned(_) => EditorMode::Sectioned,
        }
    }

    /// The starting draft for a new document.
    pub fn empty(mode: EditorMode, seed_template: bool) -> Self {
        match mode {
            EditorMode::Traditional => Draft::Traditional(String::new()),
            EditorMode::Markdown => Draft::Markdown(String::new()),
            EditorMode::Sectioned if seed_template => {
                Draft::Sectioned(SectionList::review_template())
            }
            EditorMode::Sectioned => Draft::Sectioned(SectionList::new()),
        }
    }

    /// Render the node model in the representation of `mode`.
    pub fn render(content: &UnifiedContent, mode: EditorMode) -> Result<Self, FormatError> {
        Ok(match mode {
            EditorMode::Traditional => Draft::Traditional(to_html(content)?),
            EditorMode::Markdown => Draft::Markdown(to_markdown(content)?),
            EditorMode::Sectioned => Draft::Sectioned(to_sectioned(content)?),
        })
    }

    /// Derive the node model. Never fails; unparseable input degrades.
    pub fn to_content(&self) -> UnifiedContent {
        match self {
            Draft::Traditional(html) => from_html(html),
            Draft::Markdown(markdown) => from_markdown(markdown),
            Draft::Sectioned(sections) => from_sectioned(sections),
        }
    }
}

/// Knobs for a new editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitcherSettings {
    pub history_limit: usize,
    /// Seed new sectioned drafts with the review template instead of nothing.
    pub seed_template: bool,
}

impl Default for SwitcherSettings {
    fn default() -> Self {
        Self {
            history_limit: 100,
            seed_template: true,
        }
    }
}

/// One author's editor: mode, draft, derived content and history.
#[derive(Debug, Clone)]
pub struct EditorState {
    pub(crate) mode: EditorMode,
    pub(crate) content: UnifiedContent,
    pub(crate) draft: Draft,
    pub(crate) is_saving: bool,
    pub(crate) history: History,
    pub(crate) switch: SwitchSlot,
}

impl EditorState {
    /// Start a new document in `mode`.
    pub fn new(mode: EditorMode, settings: &SwitcherSettings) -> Self {
        let draft = Draft::empty(mode, settings.seed_template);
        Self {
            mode,
            content: draft.to_content(),
            draft,
            is_saving: false,
            history: History::new(settings.history_limit),
            switch: SwitchSlot::default(),
        }
    }

    /// Open existing content in `mode`.
    pub fn open(
        content: UnifiedContent,
        mode: EditorMode,
        settings: &SwitcherSettings,
    ) -> Result<Self, EditorError> {
        content.validate()?;
        let draft = Draft::render(&content, mode)?;
        Ok(Self {
            mode,
            content,
            draft,
            is_saving: false,
            history: History::new(settings.history_limit),
            switch: SwitchSlot::default(),
        })
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn content(&self) -> &UnifiedContent {
        &self.content
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn is_saving(&self) -> bool {
        self.is_saving
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// False while a mode switch is running.
    pub fn can_switch_mode(&self) -> bool {
        self.switch.running().is_none()
    }

    /// Replace the draft of the current mode and re-derive the content.
    pub fn edit(&mut self, draft: Draft) -> Result<(), EditorError> {
        self.ensure_idle()?;
        if draft.mode() != self.mode {
            return Err(EditorError::DraftMismatch {
                expected: self.mode,
                found: draft.mode(),
            });
        }
        if draft == self.draft {
            return Ok(());
        }

        let derived = draft.to_content();
        self.history.push(self.snapshot());
        self.adopt(derived);
        self.draft = draft;
        Ok(())
    }

    pub fn edit_markdown(&mut self, markdown: impl Into<String>) -> Result<(), EditorError> {
        self.edit(Draft::Markdown(markdown.into()))
    }

    pub fn edit_html(&mut self, html: impl Into<String>) -> Result<(), EditorError> {
        self.edit(Draft::Traditional(html.into()))
    }

    /// Apply a structural change to the section list of a sectioned draft.
    pub fn edit_sections<F>(&mut self, change: F) -> Result<(), EditorError>
    where
        F: FnOnce(&mut SectionList) -> Result<(), ModelError>,
    {
        let Draft::Sectioned(sections) = &self.draft else {
            return Err(EditorError::DraftMismatch {
                expected: self.mode,
                found: EditorMode::Sectioned,
            });
        };
        let mut sections = sections.clone();
        change(&mut sections)?;
        self.edit(Draft::Sectioned(sections))
    }

    /// Restore the state before the last edit or switch.
    pub fn undo(&mut self) -> Result<(), EditorError> {
        self.ensure_idle()?;
        let snapshot = self.history.pop().ok_or(EditorError::NothingToUndo)?;
        self.mode = snapshot.mode;
        self.draft = snapshot.draft;
        self.content = snapshot.content;
        Ok(())
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            mode: self.mode,
            draft: self.draft.clone(),
            content: self.content.clone(),
        }
    }

    /// Take the nodes of a freshly derived document, keeping our metadata.
    pub(crate) fn adopt(&mut self, derived: UnifiedContent) {
        if derived.metadata.title.is_some() {
            self.content.metadata.title = derived.metadata.title;
        }
        self.content.replace_nodes(derived.content);
    }

    pub(crate) fn ensure_idle(&self) -> Result<(), EditorError> {
        match self.switch.running() {
            Some(target) => Err(EditorError::SwitchInProgress(target)),
            None => Ok(()),
        }
    }

    pub(crate) fn set_saving(&mut self, saving: bool) {
        self.is_saving = saving;
    }
}
