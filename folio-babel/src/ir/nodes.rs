//! Core data structures for the Intermediate Representation (IR).
//!
//! The wire shape of a node is `{ "type": ..., "content": ..., "metadata": {...} }`.
//! Each variant carries a typed metadata struct so the per-type invariants
//! (heading level, list items, table shape) are expressed in the type system
//! rather than checked against a loose map. Keys the model does not know about
//! are kept in the flattened `extra` map of each metadata struct.

use crate::error::ModelError;
use crate::ir::inline::normalize_inline;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema version written into every [`UnifiedContent`].
pub const CURRENT_VERSION: u32 = 1;

/// Free-form metadata attached to nodes and documents.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Heading level, always within `1..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub fn new(level: u8) -> Result<Self, ModelError> {
        if (1..=6).contains(&level) {
            Ok(Self(level))
        } else {
            Err(ModelError::HeadingLevel(level))
        }
    }

    /// Clamp an arbitrary depth into the representable range.
    pub fn clamped(level: usize) -> Self {
        Self(level.clamp(1, 6) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for HeadingLevel {
    type Error = ModelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HeadingLevel> for u8 {
    fn from(level: HeadingLevel) -> Self {
        level.0
    }
}

/// Alignment of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableCellAlignment {
    Left,
    Center,
    Right,
    #[default]
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingMeta {
    pub level: HeadingLevel,
    #[serde(flatten)]
    pub extra: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListMeta {
    pub items: Vec<String>,
    #[serde(default)]
    pub ordered: bool,
    #[serde(flatten)]
    pub extra: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMeta {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Per-column alignment. Empty when every column is unaligned.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alignments: Vec<TableCellAlignment>,
    #[serde(flatten)]
    pub extra: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMeta {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Metadata,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CodeMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(flatten)]
    pub extra: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomMeta {
    #[serde(default = "CustomMeta::default_kind")]
    pub kind: String,
    #[serde(flatten)]
    pub extra: Metadata,
}

impl CustomMeta {
    fn default_kind() -> String {
        "raw".to_string()
    }
}

impl Default for CustomMeta {
    fn default() -> Self {
        Self {
            kind: Self::default_kind(),
            extra: Metadata::new(),
        }
    }
}

/// The primitive structural unit of a review document.
///
/// Text-bearing fields hold inline Markdown source (`a **bold** word`).
/// Lists and tables have no `content` of their own; their text lives in
/// `metadata.items` and `metadata.headers`/`metadata.rows`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentNode {
    Paragraph {
        content: String,
        #[serde(default, skip_serializing_if = "Metadata::is_empty")]
        metadata: Metadata,
    },
    Heading {
        content: String,
        metadata: HeadingMeta,
    },
    List {
        metadata: ListMeta,
    },
    Table {
        metadata: TableMeta,
    },
    Image {
        /// Alternative text.
        #[serde(default)]
        content: String,
        metadata: ImageMeta,
    },
    Code {
        content: String,
        #[serde(default)]
        metadata: CodeMeta,
    },
    /// A block no other variant can represent, carried verbatim.
    Custom {
        content: String,
        #[serde(default)]
        metadata: CustomMeta,
    },
}

/// Discriminant of a [`ContentNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Paragraph,
    Heading,
    List,
    Table,
    Image,
    Code,
    Custom,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Paragraph => "paragraph",
            NodeType::Heading => "heading",
            NodeType::List => "list",
            NodeType::Table => "table",
            NodeType::Image => "image",
            NodeType::Code => "code",
            NodeType::Custom => "custom",
        }
    }
}

impl ContentNode {
    pub fn paragraph(content: impl Into<String>) -> Self {
        ContentNode::Paragraph {
            content: content.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn heading(level: HeadingLevel, content: impl Into<String>) -> Self {
        ContentNode::Heading {
            content: content.into(),
            metadata: HeadingMeta {
                level,
                extra: Metadata::new(),
            },
        }
    }

    pub fn list(ordered: bool, items: Vec<String>) -> Self {
        ContentNode::List {
            metadata: ListMeta {
                items,
                ordered,
                extra: Metadata::new(),
            },
        }
    }

    /// Build a table, rejecting ragged rows.
    pub fn table(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, ModelError> {
        let meta = TableMeta {
            headers,
            rows,
            alignments: Vec::new(),
            extra: Metadata::new(),
        };
        validate_table(&meta)?;
        Ok(ContentNode::Table { metadata: meta })
    }

    pub fn image(src: impl Into<String>, alt: impl Into<String>) -> Self {
        ContentNode::Image {
            content: alt.into(),
            metadata: ImageMeta {
                src: src.into(),
                title: None,
                extra: Metadata::new(),
            },
        }
    }

    pub fn code(language: Option<String>, content: impl Into<String>) -> Self {
        ContentNode::Code {
            content: content.into(),
            metadata: CodeMeta {
                language,
                extra: Metadata::new(),
            },
        }
    }

    pub fn custom(kind: impl Into<String>, content: impl Into<String>) -> Self {
        ContentNode::Custom {
            content: content.into(),
            metadata: CustomMeta {
                kind: kind.into(),
                extra: Metadata::new(),
            },
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            ContentNode::Paragraph { .. } => NodeType::Paragraph,
            ContentNode::Heading { .. } => NodeType::Heading,
            ContentNode::List { .. } => NodeType::List,
            ContentNode::Table { .. } => NodeType::Table,
            ContentNode::Image { .. } => NodeType::Image,
            ContentNode::Code { .. } => NodeType::Code,
            ContentNode::Custom { .. } => NodeType::Custom,
        }
    }

    /// Metadata keys not modelled by the node's typed fields.
    pub fn extra(&self) -> &Metadata {
        match self {
            ContentNode::Paragraph { metadata, .. } => metadata,
            ContentNode::Heading { metadata, .. } => &metadata.extra,
            ContentNode::List { metadata } => &metadata.extra,
            ContentNode::Table { metadata } => &metadata.extra,
            ContentNode::Image { metadata, .. } => &metadata.extra,
            ContentNode::Code { metadata, .. } => &metadata.extra,
            ContentNode::Custom { metadata, .. } => &metadata.extra,
        }
    }

    pub fn extra_mut(&mut self) -> &mut Metadata {
        match self {
            ContentNode::Paragraph { metadata, .. } => metadata,
            ContentNode::Heading { metadata, .. } => &mut metadata.extra,
            ContentNode::List { metadata } => &mut metadata.extra,
            ContentNode::Table { metadata } => &mut metadata.extra,
            ContentNode::Image { metadata, .. } => &mut metadata.extra,
            ContentNode::Code { metadata, .. } => &mut metadata.extra,
            ContentNode::Custom { metadata, .. } => &mut metadata.extra,
        }
    }

    /// Attach an extra metadata entry, builder style.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra_mut().insert(key.into(), value.into());
        self
    }

    /// Heading level, if this node is a heading.
    pub fn heading_level(&self) -> Option<HeadingLevel> {
        match self {
            ContentNode::Heading { metadata, .. } => Some(metadata.level),
            _ => None,
        }
    }

    /// The text segments of this node, in reading order.
    pub fn text_segments(&self) -> Vec<&str> {
        match self {
            ContentNode::Paragraph { content, .. }
            | ContentNode::Heading { content, .. }
            | ContentNode::Image { content, .. }
            | ContentNode::Code { content, .. }
            | ContentNode::Custom { content, .. } => vec![content.as_str()],
            ContentNode::List { metadata } => metadata.items.iter().map(String::as_str).collect(),
            ContentNode::Table { metadata } => metadata
                .headers
                .iter()
                .chain(metadata.rows.iter().flatten())
                .map(String::as_str)
                .collect(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            ContentNode::Table { metadata } => validate_table(metadata),
            _ => Ok(()),
        }
    }

    /// Rewrite inline text in the spelling the transformers produce.
    ///
    /// Image alt text, code and custom blocks are not inline Markdown and
    /// are left alone.
    pub fn normalized(mut self) -> Self {
        match &mut self {
            ContentNode::Paragraph { content, .. } | ContentNode::Heading { content, .. } => {
                *content = normalize_inline(content);
            }
            ContentNode::List { metadata } => {
                for item in &mut metadata.items {
                    *item = normalize_inline(item);
                }
            }
            ContentNode::Table { metadata } => {
                for cell in metadata.headers.iter_mut().chain(metadata.rows.iter_mut().flatten()) {
                    *cell = normalize_inline(cell);
                }
            }
            ContentNode::Image { .. } | ContentNode::Code { .. } | ContentNode::Custom { .. } => {}
        }
        self
    }
}

fn validate_table(meta: &TableMeta) -> Result<(), ModelError> {
    if meta.headers.is_empty() {
        return Err(ModelError::EmptyTableHeader);
    }
    for (index, row) in meta.rows.iter().enumerate() {
        if row.len() != meta.headers.len() {
            return Err(ModelError::TableShape {
                row: index,
                expected: meta.headers.len(),
                found: row.len(),
            });
        }
    }
    Ok(())
}

/// Document-level metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Metadata,
}

/// The canonical, format-agnostic document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedContent {
    pub version: u32,
    pub content: Vec<ContentNode>,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl Default for UnifiedContent {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl UnifiedContent {
    pub fn new(content: Vec<ContentNode>) -> Self {
        Self {
            version: CURRENT_VERSION,
            content,
            metadata: DocumentMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Check every node invariant.
    pub fn validate(&self) -> Result<(), ModelError> {
        self.content.iter().try_for_each(ContentNode::validate)
    }

    /// Stamp creation (if unset) and update times.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if self.metadata.created_at.is_none() {
            self.metadata.created_at = Some(now);
        }
        self.metadata.updated_at = Some(now);
    }

    /// Normalize the inline text of every node. Markdown and HTML round trips
    /// of a normalized document give it back unchanged.
    pub fn normalized(mut self) -> Self {
        self.content = self.content.into_iter().map(ContentNode::normalized).collect();
        self
    }

    /// Replace the node list, keeping version and document metadata.
    pub fn replace_nodes(&mut self, nodes: Vec<ContentNode>) {
        self.content = nodes;
    }
}
