//! Intermediate Representation (IR) for review documents.
//!
//! Every editing mode reads and writes through [`nodes::UnifiedContent`]. Text
//! inside nodes is stored as inline Markdown source; [`inline`] converts that
//! source to and from the structured [`inline::InlineContent`] tree the
//! format serializers work with.

pub mod inline;
pub mod nodes;
