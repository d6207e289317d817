//! Conflicts the engine cannot settle on its own.

use crate::merge::{merge_metadata, merge_text};
use crate::protocol::{ContentChange, Sequence};
use serde::{Deserialize, Serialize};

pub type ConflictId = u64;

/// How the user settled a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resolution {
    KeepLocal,
    AcceptRemote,
    Merge,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConflictKind {
    /// Local and remote both changed `target` since the last acknowledged state.
    ConcurrentEdit {
        target: String,
        /// Last acknowledged change of the target, if any was seen.
        base: Option<ContentChange>,
        local: ContentChange,
        remote: ContentChange,
    },
    /// Sequence `expected` never arrived while `buffered` operations waited.
    SequenceGap { expected: Sequence, buffered: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub id: ConflictId,
    pub kind: ConflictKind,
}

impl Conflict {
    /// The frozen target, for edit conflicts.
    pub fn target(&self) -> Option<&str> {
        match &self.kind {
            ConflictKind::ConcurrentEdit { target, .. } => Some(target),
            ConflictKind::SequenceGap { .. } => None,
        }
    }

    pub fn is_gap(&self) -> bool {
        matches!(self.kind, ConflictKind::SequenceGap { .. })
    }
}

/// The change that settles an edit conflict.
pub(crate) fn settle_edit(
    base: Option<&ContentChange>,
    local: &ContentChange,
    remote: &ContentChange,
    resolution: Resolution,
) -> ContentChange {
    match resolution {
        Resolution::KeepLocal => local.clone(),
        Resolution::AcceptRemote => remote.clone(),
        Resolution::Merge => {
            let base_text = base.map(|change| change.text.as_str()).unwrap_or_default();
            ContentChange {
                target: local.target.clone(),
                text: merge_text(base_text, &local.text, &remote.text).or_local(&local.text),
                metadata: merge_metadata(&local.metadata, &remote.metadata),
            }
        }
    }
}
