//! Markdown import and export against the review fixture

mod export;
mod import;
