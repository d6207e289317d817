//! Error types for format and model operations

use thiserror::Error;

/// Errors that can occur during format operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),
    /// Error during parsing
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Error during serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// Export option the format does not know, or a value it cannot use
    #[error("Operation not supported: {0}")]
    NotSupported(String),
    /// The document violates a node invariant
    #[error("Invalid document: {0}")]
    Model(#[from] ModelError),
}

/// Violations of the content node invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("heading level {0} is outside 1..=6")]
    HeadingLevel(u8),
    #[error("table row {row} has {found} cells, expected {expected}")]
    TableShape {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("table has no header cells")]
    EmptyTableHeader,
    #[error("unknown section type '{0}'")]
    UnknownSectionType(String),
    #[error("section '{0}' not found")]
    SectionNotFound(String),
    #[error("duplicate section id '{0}'")]
    DuplicateSection(String),
}
