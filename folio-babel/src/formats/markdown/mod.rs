//! Markdown format implementation
//!
//! This module implements bidirectional conversion between [`UnifiedContent`] and
//! CommonMark Markdown (with the GFM table and strikethrough extensions).
//!
//! # Library Choice
//!
//! We use the `comrak` crate for Markdown parsing and serialization:
//! - Single crate for both parsing and serialization
//! - CommonMark compliant, with GFM extensions
//! - Source positions on every block, which the section parser relies on
//!
//! # Element Mapping Table
//!
//! | Node      | Markdown Equivalent        | Export Notes                     | Import Notes                          |
//! |-----------|----------------------------|----------------------------------|---------------------------------------|
//! | Heading   | ATX heading (`#`..`######`)| Level preserved                  | Setext headings become ATX            |
//! | Paragraph | Paragraph                  | Inline Markdown re-rendered      | Inline Markdown normalized            |
//! | List      | `-` / `1.` list            | Tight, one paragraph per item    | Nested blocks degrade to `custom`     |
//! | Table     | GFM table                  | Alignment row from metadata      | Header row + body rows                |
//! | Image     | `![alt](src "title")`      | Own paragraph                    | Paragraph holding only an image       |
//! | Code      | Fenced block               | Language → info string           | Info string → language                |
//! | Custom    | Raw block                  | Written verbatim                 | Block quotes, rules, HTML blocks      |
//!
//! # Lossy Conversions
//!
//! - Node `extra` metadata is not representable and is dropped on export
//!   (section ids and types included; the sectioned view re-derives them).
//! - Ordered list start numbers are not kept; lists always restart at 1.
//! - Emphasis spelling is normalized (`_a_` → `*a*`).
//! - Node text comes back in its normalized spelling
//!   ([`normalize_inline`](crate::ir::inline::normalize_inline)). Text that
//!   would read as block syntax is escaped (`1. x` → `1\. x`, `# x` → `\# x`).
//!   Outer spaces are trimmed.
//!   A [normalized](crate::UnifiedContent::normalized) document round-trips
//!   unchanged.
//! - Document metadata is only written when front matter is requested.

pub mod parser;
pub mod serializer;

use crate::error::FormatError;
use crate::format::{ExportOptions, Format};
use crate::ir::nodes::UnifiedContent;
use comrak::nodes::{Ast, AstNode, NodeValue};
use comrak::{Arena, ComrakOptions};
use std::cell::RefCell;

pub use serializer::MarkdownOptions;

/// Format implementation for Markdown
pub struct MarkdownFormat;

impl Format for MarkdownFormat {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn description(&self) -> &'static str {
        "CommonMark + GFM tables, optional YAML front matter"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["md", "markdown"]
    }

    fn import(&self, source: &str) -> Result<UnifiedContent, FormatError> {
        Ok(parser::parse_from_markdown(source))
    }

    fn export(&self, doc: &UnifiedContent, options: &ExportOptions) -> Result<String, FormatError> {
        let mut md_options = MarkdownOptions::default();
        for (key, value) in options {
            match key.as_str() {
                "front-matter" => md_options.front_matter = value == "true",
                other => {
                    return Err(FormatError::NotSupported(format!(
                        "markdown export has no option '{other}'"
                    )))
                }
            }
        }
        serializer::serialize_to_markdown_with_options(doc, &md_options)
    }
}

pub(crate) fn comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options
}

/// Options for reading whole documents, which may open with YAML front matter.
pub(crate) fn document_options() -> ComrakOptions<'static> {
    let mut options = comrak_options();
    options.extension.front_matter_delimiter = Some("---".to_string());
    options
}

/// Allocate a detached comrak node in `arena`.
pub(crate) fn alloc_node<'a>(arena: &'a Arena<AstNode<'a>>, value: NodeValue) -> &'a AstNode<'a> {
    arena.alloc(AstNode::new(RefCell::new(Ast::new(value, (0, 0).into()))))
}
