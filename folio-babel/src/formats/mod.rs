//! Format implementations
//!
//! This module contains all format implementations that convert between
//! [`UnifiedContent`](crate::ir::nodes::UnifiedContent) and a text representation.

pub mod html;
pub mod json;
pub mod markdown;
pub mod sectioned;

pub use html::{HtmlFormat, HtmlOptions, HtmlTheme};
pub use json::JsonFormat;
pub use markdown::{MarkdownFormat, MarkdownOptions};
pub use sectioned::SectionsFormat;
