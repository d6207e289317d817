//! HTML format implementation
//!
//! This module implements bidirectional conversion between [`UnifiedContent`] and HTML5.
//! Traditional (rich-text) editing mode keeps its draft as the body fragment produced
//! here; export wraps the same fragment in a standalone document with embedded CSS.
//!
//! # Library Choice
//!
//! We use the `html5ever` + `rcdom` + `markup5ever` ecosystem for HTML parsing and serialization:
//! - `html5ever`: Browser-grade HTML5 parser from the Servo project
//! - `markup5ever_rcdom`: Reference-counted DOM tree implementation
//! - `markup5ever`: Serialization infrastructure
//!
//! Rich-text editors produce loose markup; the html5ever tree builder recovers from
//! unclosed tags and stray text the same way a browser does.
//!
//! # Element Mapping Table
//!
//! | Node      | HTML Equivalent                                      | Import Notes                              |
//! |-----------|------------------------------------------------------|-------------------------------------------|
//! | Heading   | `<hN class="folio-heading">`                         | `h1`..`h6`                                |
//! | Paragraph | `<p class="folio-paragraph">`                        | Stray text and inline elements too        |
//! | List      | `<ul>`/`<ol>` with `class="folio-list"`              | Nested lists flatten into item text       |
//! | Table     | `<table class="folio-table">` thead/tbody            | First row is the header when no `thead`   |
//! | Image     | `<figure class="folio-image">` `<img>`               | Bare `<img>` blocks too                   |
//! | Code      | `<pre class="folio-code">` `<code>`                  | Language from `data-language`/`language-` |
//! | Custom    | `<div class="folio-custom" data-kind="...">`         | `blockquote`, `hr` map to custom kinds    |
//!
//! Inline Markdown inside node text becomes `strong`, `em`, `del`, `code`, `a`, `img`
//! and `br`; import maps `b`/`i`/`s`/`strike` onto the same nodes.
//!
//! # Node Metadata
//!
//! Extra node metadata is written as `data-*` attributes and read back on import.
//! String values are written verbatim; other JSON values are written as JSON text.
//!
//! # CSS and Theming
//!
//! Standalone export includes embedded CSS from:
//! - `css/baseline.css`: Browser reset + default presentation (always included)
//! - `css/themes/theme-*.css`: Optional overrides layered on top of the baseline
//!
//! # Lossy Conversions
//!
//! - Attribute names are lowercased by the HTML parser, so camelCase metadata keys
//!   come back lowercased.
//! - Presentational markup with no node equivalent (spans, fonts, colors) is dropped.
//! - Whitespace inside paragraphs is collapsed.
//! - Imported text is stored in the normalized inline Markdown spelling, so
//!   literal `*`, `#` or `1.` come back escaped. See
//!   [`UnifiedContent::normalized`](crate::UnifiedContent::normalized).

mod parser;
mod serializer;

pub use parser::parse_from_html;
pub use serializer::{
    serialize_fragment, serialize_to_html, serialize_to_html_with_options, HtmlOptions,
};

use crate::error::FormatError;
use crate::format::{ExportOptions, Format};
use crate::ir::nodes::UnifiedContent;
use serde::{Deserialize, Serialize};

/// Format implementation for HTML
pub struct HtmlFormat {
    /// CSS theme to use for export
    theme: HtmlTheme,
}

/// Available CSS themes for HTML export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HtmlTheme {
    /// Serif typography override (fonts only, layout comes from baseline)
    #[serde(alias = "fancy-serif")]
    Serif,
    /// Baseline modern theme (no-op; relies on baseline.css)
    #[default]
    #[serde(alias = "default")]
    Modern,
}

impl HtmlTheme {
    /// Parse a theme name as used in configuration and CLI flags.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "serif" | "fancy-serif" => Some(HtmlTheme::Serif),
            "modern" | "default" => Some(HtmlTheme::Modern),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HtmlTheme::Serif => "serif",
            HtmlTheme::Modern => "modern",
        }
    }
}

impl Default for HtmlFormat {
    fn default() -> Self {
        Self::new(HtmlTheme::Modern)
    }
}

impl HtmlFormat {
    /// Create a new HTML format with the specified theme
    pub fn new(theme: HtmlTheme) -> Self {
        Self { theme }
    }
}

impl Format for HtmlFormat {
    fn name(&self) -> &'static str {
        "html"
    }

    fn description(&self) -> &'static str {
        "Standalone HTML page with embedded stylesheet"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["html", "htm"]
    }

    fn import(&self, source: &str) -> Result<UnifiedContent, FormatError> {
        Ok(parser::parse_from_html(source))
    }

    fn export(&self, doc: &UnifiedContent, options: &ExportOptions) -> Result<String, FormatError> {
        let mut html_options = HtmlOptions::new(self.theme);
        for (key, value) in options {
            match key.as_str() {
                "theme" => {
                    html_options.theme = HtmlTheme::from_name(value).ok_or_else(|| {
                        FormatError::NotSupported(format!("Unknown HTML theme '{value}'"))
                    })?;
                }
                "css" => html_options.custom_css = Some(value.clone()),
                "fragment" => html_options.fragment = value == "true",
                other => {
                    return Err(FormatError::NotSupported(format!(
                        "html export has no option '{other}'"
                    )))
                }
            }
        }
        serializer::serialize_to_html_with_options(doc, &html_options)
    }
}
