//! The [`Format`] trait: one text representation of a review.
//!
//! A format imports text into [`UnifiedContent`] and exports it back. Formats
//! never convert into each other; `markdown → html` is an import followed by
//! an export, so adding a format costs one implementation rather than one per
//! pair.

use crate::error::FormatError;
use crate::ir::nodes::UnifiedContent;
use std::collections::HashMap;

/// Export options as `key → value` strings, from `--extra-*` flags or the
/// `[export.*]` configuration tables.
pub type ExportOptions = HashMap<String, String>;

pub trait Format: Send + Sync {
    /// Registry key; also what `--from` and `--to` accept.
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Lowercase file extensions, without the dot, that this format imports.
    ///
    /// The first one is used when a file is written in this format.
    fn extensions(&self) -> &'static [&'static str] {
        &[]
    }

    /// Read `source`. Text formats degrade rather than fail; only structured
    /// formats (JSON) reject input.
    fn import(&self, source: &str) -> Result<UnifiedContent, FormatError>;

    fn export(&self, doc: &UnifiedContent, options: &ExportOptions) -> Result<String, FormatError>;
}

/// Error for the first option (in key order) that `format` does not know.
pub(crate) fn unknown_option(format: &str, options: &ExportOptions) -> Result<(), FormatError> {
    match options.keys().min() {
        Some(key) => Err(FormatError::NotSupported(format!(
            "{format} export has no option '{key}'"
        ))),
        None => Ok(()),
    }
}
