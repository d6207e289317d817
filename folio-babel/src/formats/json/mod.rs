//! JSON format: the node model's own wire shape.
//!
//! This is what the persistence layer stores in `contentData`, so parsing
//! validates every node invariant instead of trusting the input.

use crate::error::FormatError;
use crate::format::{unknown_option, ExportOptions, Format};
use crate::ir::nodes::UnifiedContent;

/// Format implementation for UnifiedContent JSON
pub struct JsonFormat;

impl Format for JsonFormat {
    fn name(&self) -> &'static str {
        "json"
    }

    fn description(&self) -> &'static str {
        "Node model JSON, as stored in contentData"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn import(&self, source: &str) -> Result<UnifiedContent, FormatError> {
        let doc: UnifiedContent = serde_json::from_str(source)
            .map_err(|e| FormatError::ParseError(format!("Invalid content JSON: {e}")))?;
        doc.validate()?;
        Ok(doc)
    }

    fn export(&self, doc: &UnifiedContent, options: &ExportOptions) -> Result<String, FormatError> {
        unknown_option(self.name(), options)?;
        serde_json::to_string_pretty(doc)
            .map_err(|e| FormatError::SerializationError(format!("JSON encoding failed: {e}")))
    }
}
