//! Shared fixtures for the integration tests

use folio_babel::{ContentNode, HeadingLevel, UnifiedContent};

pub const PHONE_REVIEW: &str = include_str!("../fixtures/phone-review.md");

pub fn level(n: u8) -> HeadingLevel {
    HeadingLevel::new(n).expect("valid heading level")
}

/// A small document touching every block type the formats map natively.
pub fn sample_document() -> UnifiedContent {
    UnifiedContent::new(vec![
        ContentNode::heading(level(2), "Design"),
        ContentNode::paragraph("Glass **back**."),
        ContentNode::list(false, vec!["Light".into(), "Stiff".into()]),
        ContentNode::table(
            vec!["Model".into(), "Price".into()],
            vec![vec!["X".into(), "$9".into()]],
        )
        .expect("rectangular table"),
    ])
}
