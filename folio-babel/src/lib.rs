//! Multi-format interoperability for review documents
//!
//!     This crate converts review content between its three editing representations
//!     (rich-text HTML, flat Markdown, ordered sections) and the persisted JSON form.
//!
//!     TLDR: For format authors:
//!         - Babel never parses or serializes any format itself, but relies on the format's libraries
//!           (comrak for Markdown, html5ever for HTML, serde_json for JSON).
//!         - Every conversion goes through the node model (./ir/nodes.rs). No format converts
//!           directly into another one.
//!         - Import never fails: what cannot be mapped degrades to a paragraph or a custom node.
//!         - Each format has unit tests next to its parser and serializer, and round-trip tests
//!           under tests/.
//!
//! Architecture
//!
//!     The node model (`UnifiedContent`, a flat sequence of `ContentNode`s) is the hub. Each format
//!     implements one adapter in each direction, so adding a format costs two adapters instead of
//!     one per existing format.
//!
//!     Node text is stored as inline Markdown. ./ir/inline.rs converts that text to and from a
//!     structured inline tree for the serializers that need structure (HTML export, comrak ASTs).
//!
//!     This is a pure lib, that is, it powers folio-cli and folio-editor but is shell agnostic:
//!     no code here supposes a shell environment, be it std print, env vars etc.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── format.rs               # Format trait: import, export, extensions
//!     ├── registry.rs             # Format table, extension detection
//!     ├── mode.rs                 # Editing modes
//!     ├── formats
//!     │   ├── <format>
//!     │   │   ├── parser.rs       # Parser implementation
//!     │   │   ├── serializer.rs   # Serializer implementation
//!     │   │   └── mod.rs
//!     ├── ir                      # Node model and inline content
//!     ├── sections                # Section model, heading classifier, section parser
//!     └── lib.rs
//!
//! Testing
//!     tests
//!     ├── lib.rs                  # Aggregates the per-format directories
//!     └── <format>
//!         └── <testname>.rs
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include these
//!     in the mod.
//!
//! Sections
//!
//!     The sectioned mode is a projection of the node model: a section starts at every top-level
//!     heading. ./sections/parser.rs applies the same rule directly to Markdown source for import,
//!     keeping section bodies byte-for-byte, and collects reading statistics on the way.

pub mod error;
pub mod format;
pub mod formats;
pub mod ir;
pub mod mode;
pub mod registry;
pub mod sections;

pub use error::{FormatError, ModelError};
pub use format::{ExportOptions, Format};
pub use ir::nodes::{ContentNode, DocumentMetadata, HeadingLevel, NodeType, UnifiedContent};
pub use mode::EditorMode;
pub use registry::FormatRegistry;
pub use sections::parser::{parse_markdown_sections, DocumentStats, ParsedDocument, ParserSettings};
pub use sections::{BlogSection, SectionList, SectionType};

/// Node model → Markdown.
pub fn to_markdown(doc: &UnifiedContent) -> Result<String, FormatError> {
    formats::markdown::serializer::serialize_to_markdown(doc)
}

/// Markdown → node model.
pub fn from_markdown(source: &str) -> UnifiedContent {
    formats::markdown::parser::parse_from_markdown(source)
}

/// Node model → HTML body fragment, as edited in traditional mode.
pub fn to_html(doc: &UnifiedContent) -> Result<String, FormatError> {
    formats::html::serialize_fragment(&doc.content)
}

/// HTML (fragment or full document) → node model.
pub fn from_html(source: &str) -> UnifiedContent {
    formats::html::parse_from_html(source)
}

/// Node model → sections.
pub fn to_sectioned(doc: &UnifiedContent) -> Result<SectionList, FormatError> {
    formats::sectioned::to_sectioned(doc)
}

/// Sections → node model.
pub fn from_sectioned(sections: &SectionList) -> UnifiedContent {
    formats::sectioned::from_sectioned(sections)
}
