//! The format table used by imports, exports and the CLI.
//!
//! | Format     | Reads                          | Writes                        |
//! |------------|--------------------------------|-------------------------------|
//! | `markdown` | `.md`, `.markdown`             | Markdown                      |
//! | `html`     | `.html`, `.htm`                | Standalone page with CSS      |
//! | `json`     | `.json` (`contentData` shape)  | `contentData` JSON            |
//! | `sections` | Section JSON array or Markdown | Section JSON array            |
//!
//! Formats are kept in registration order, so listings and extension lookups
//! do not depend on hashing. Section import and the default HTML theme come
//! from the settings the registry is built with.

use crate::error::FormatError;
use crate::format::{ExportOptions, Format};
use crate::formats::{HtmlFormat, HtmlTheme, JsonFormat, MarkdownFormat, SectionsFormat};
use crate::ir::nodes::UnifiedContent;
use crate::sections::parser::ParserSettings;
use std::path::Path;

pub struct FormatRegistry {
    formats: Vec<Box<dyn Format>>,
}

impl FormatRegistry {
    /// A registry with no formats.
    pub fn empty() -> Self {
        Self {
            formats: Vec::new(),
        }
    }

    /// The built-in formats, using `parser` for Markdown given to `sections`
    /// and `theme` for HTML pages.
    pub fn new(parser: ParserSettings, theme: HtmlTheme) -> Self {
        let mut registry = Self::empty();
        registry.register(MarkdownFormat);
        registry.register(HtmlFormat::new(theme));
        registry.register(JsonFormat);
        registry.register(SectionsFormat::new(parser));
        registry
    }

    /// Add `format`, replacing a registered format of the same name in place.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        match self.position(format.name()) {
            Some(index) => self.formats[index] = Box::new(format),
            None => self.formats.push(Box::new(format)),
        }
    }

    pub fn get(&self, name: &str) -> Result<&dyn Format, FormatError> {
        self.position(name)
            .map(|index| self.formats[index].as_ref())
            .ok_or_else(|| FormatError::FormatNotFound(name.to_string()))
    }

    /// Formats in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Format> + '_ {
        self.formats.iter().map(|format| format.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(|format| format.name()).collect()
    }

    /// The format that reads `path`, by extension, ignoring case.
    pub fn detect(&self, path: impl AsRef<Path>) -> Option<&dyn Format> {
        let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        self.iter()
            .find(|format| format.extensions().contains(&extension.as_str()))
    }

    pub fn import(&self, format: &str, source: &str) -> Result<UnifiedContent, FormatError> {
        let format = self.get(format)?;
        tracing::debug!(format = format.name(), bytes = source.len(), "importing");
        format.import(source)
    }

    pub fn export(
        &self,
        doc: &UnifiedContent,
        format: &str,
        options: &ExportOptions,
    ) -> Result<String, FormatError> {
        self.get(format)?.export(doc, options)
    }

    /// Import with one format and export with another.
    pub fn convert(
        &self,
        source: &str,
        from: &str,
        to: &str,
        options: &ExportOptions,
    ) -> Result<String, FormatError> {
        let target = self.get(to)?;
        let doc = self.import(from, source)?;
        target.export(&doc, options)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.formats.iter().position(|format| format.name() == name)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new(ParserSettings::default(), HtmlTheme::default())
    }
}
