//! Editing modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three interchangeable editing representations of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    /// Rich text; the draft is an HTML fragment.
    #[default]
    Traditional,
    /// Ordered titled sections with Markdown bodies.
    Sectioned,
    /// One flat Markdown document.
    Markdown,
}

impl EditorMode {
    pub const ALL: [EditorMode; 3] = [
        EditorMode::Traditional,
        EditorMode::Sectioned,
        EditorMode::Markdown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EditorMode::Traditional => "traditional",
            EditorMode::Sectioned => "sectioned",
            EditorMode::Markdown => "markdown",
        }
    }
}

impl fmt::Display for EditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EditorMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown editor mode '{s}'"))
    }
}
