//! Markdown → sections.
//!
//! Splits a Markdown document at its top-level headings. Section bodies are
//! slices of the original source, so whatever the author typed inside a
//! section comes back unchanged. Front matter is not part of any section.

use super::classify::classify_heading;
use super::{BlogSection, SectionList, SectionType};
use crate::ir::inline::{collect_inline, plain_text_of, render_inline};
use crate::ir::nodes::Metadata;
use comrak::nodes::{AstNode, NodeValue};
use comrak::{parse_document, Arena};
use serde::{Deserialize, Serialize};

/// Tunables for the section parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserSettings {
    pub words_per_minute: u32,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            words_per_minute: 200,
        }
    }
}

/// Whole-document statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    pub word_count: usize,
    pub reading_time_minutes: usize,
    pub has_images: bool,
    pub has_tables: bool,
    pub has_code_blocks: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub sections: SectionList,
    pub stats: DocumentStats,
}

/// A heading found at the top level of the document.
#[derive(Debug, Clone)]
pub(crate) struct HeadingMark {
    pub level: u8,
    /// Inline Markdown of the heading text.
    pub title: String,
    /// Zero-based line range of the heading itself.
    pub start_line: usize,
    pub end_line: usize,
}

/// Which headings start sections, and whether the first is an article title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SectionStarts {
    pub title_index: Option<usize>,
    pub top_level: u8,
}

/// Decide the top level for a sequence of heading levels.
///
/// A lone leading heading shallower than everything after it is an article
/// title; the top level is then the shallowest of the remaining headings.
pub(crate) fn section_starts(levels: &[u8]) -> Option<SectionStarts> {
    let (&first, rest) = levels.split_first()?;
    match rest.iter().min() {
        Some(&rest_min) if first < rest_min => Some(SectionStarts {
            title_index: Some(0),
            top_level: rest_min,
        }),
        Some(&rest_min) => Some(SectionStarts {
            title_index: None,
            top_level: first.min(rest_min),
        }),
        None => Some(SectionStarts {
            title_index: None,
            top_level: first,
        }),
    }
}

/// Split Markdown into typed sections and gather document statistics.
pub fn parse_markdown_sections(source: &str, settings: &ParserSettings) -> ParsedDocument {
    let arena = Arena::new();
    let root = parse_document(&arena, source, &crate::formats::markdown::document_options());
    // Source positions restart at line 1 after the front matter.
    let body = after_front_matter(root, source);
    let lines: Vec<&str> = body.lines().collect();

    let headings = top_level_headings(root);
    let sections = match split_sections(&lines, &headings) {
        Some(sections) => sections,
        None => {
            tracing::warn!("heading positions out of range; splitting by blocks");
            split_blocks(body)
        }
    };

    ParsedDocument {
        sections,
        stats: document_stats(root, body, settings),
    }
}

fn after_front_matter<'s, 'a>(root: &'a AstNode<'a>, source: &'s str) -> &'s str {
    let Some(first) = root.first_child() else {
        return source;
    };
    let start = match &first.data.borrow().value {
        NodeValue::FrontMatter(raw) => source.find(raw.as_str()).map(|at| at + raw.len()),
        _ => None,
    };
    start.map_or(source, |start| &source[start..])
}

fn top_level_headings<'a>(root: &'a AstNode<'a>) -> Vec<HeadingMark> {
    root.children()
        .filter_map(|node| {
            let data = node.data.borrow();
            match &data.value {
                NodeValue::Heading(heading) => {
                    let mut inline = Vec::new();
                    for child in node.children() {
                        collect_inline(child, &mut inline);
                    }
                    Some(HeadingMark {
                        level: heading.level,
                        title: render_inline(&inline),
                        start_line: data.sourcepos.start.line.saturating_sub(1),
                        end_line: data.sourcepos.end.line.saturating_sub(1),
                    })
                }
                _ => None,
            }
        })
        .collect()
}

fn split_sections(lines: &[&str], headings: &[HeadingMark]) -> Option<SectionList> {
    let mut sections = Vec::new();

    let levels: Vec<u8> = headings.iter().map(|h| h.level).collect();
    let Some(starts) = section_starts(&levels) else {
        let body = slice_lines(lines, 0, lines.len())?;
        if !body.is_empty() {
            sections.push(BlogSection::new("s0", SectionType::Custom, "", body));
        }
        return SectionList::from_sections(sections).ok();
    };

    let starting: Vec<(usize, &HeadingMark)> = headings
        .iter()
        .enumerate()
        .filter(|(index, heading)| {
            starts.title_index == Some(*index) || heading.level <= starts.top_level
        })
        .collect();

    let first_line = starting.first().map(|(_, h)| h.start_line).unwrap_or(lines.len());
    let preamble = slice_lines(lines, 0, first_line)?;
    if !preamble.is_empty() {
        sections.push(BlogSection::new("s0", SectionType::Custom, "", preamble));
    }

    for (position, (index, heading)) in starting.iter().enumerate() {
        let body_end = starting
            .get(position + 1)
            .map(|(_, next)| next.start_line)
            .unwrap_or(lines.len());
        let body = slice_lines(lines, heading.end_line + 1, body_end)?;

        let kind = if starts.title_index == Some(*index) {
            SectionType::TitleMeta
        } else {
            classify_heading(&plain_text_of(&heading.title))
        };

        let mut section = BlogSection::new(
            format!("s{}", sections.len()),
            kind,
            heading.title.clone(),
            body,
        );
        section.metadata = heading_metadata(heading.level);
        sections.push(section);
    }

    SectionList::from_sections(renumbered(sections)).ok()
}

fn renumbered(mut sections: Vec<BlogSection>) -> Vec<BlogSection> {
    for (index, section) in sections.iter_mut().enumerate() {
        section.order = index;
    }
    sections
}

pub(crate) fn heading_metadata(level: u8) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("heading_level".to_string(), level.into());
    metadata
}

/// Join `lines[start..end]`, dropping blank lines at both ends.
fn slice_lines(lines: &[&str], start: usize, end: usize) -> Option<String> {
    if start > end || end > lines.len() {
        return None;
    }
    let slice = &lines[start..end];
    let first = slice.iter().position(|line| !line.trim().is_empty());
    let last = slice.iter().rposition(|line| !line.trim().is_empty());
    Some(match (first, last) {
        (Some(first), Some(last)) => slice[first..=last].join("\n"),
        _ => String::new(),
    })
}

/// Last resort: one custom section per blank-line separated block.
fn split_blocks(source: &str) -> SectionList {
    let sections = source
        .split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .enumerate()
        .map(|(index, block)| {
            let mut section = BlogSection::new(format!("s{index}"), SectionType::Custom, "", block);
            section.order = index;
            section
        })
        .collect();
    SectionList::from_sections(sections).unwrap_or_default()
}

fn document_stats<'a>(
    root: &'a AstNode<'a>,
    source: &str,
    settings: &ParserSettings,
) -> DocumentStats {
    let mut word_count = 0;
    for node in root.descendants() {
        match &node.data.borrow().value {
            NodeValue::Text(text) => word_count += text.split_whitespace().count(),
            NodeValue::Code(code) => word_count += code.literal.split_whitespace().count(),
            _ => {}
        }
    }

    let wpm = settings.words_per_minute.max(1) as usize;
    DocumentStats {
        word_count,
        reading_time_minutes: word_count.div_ceil(wpm),
        has_images: source.contains("![") || source.contains("<img"),
        has_tables: source.lines().any(is_table_delimiter_row),
        has_code_blocks: source.lines().any(|line| {
            let line = line.trim_start();
            line.starts_with("```") || line.starts_with("~~~")
        }),
    }
}

fn is_table_delimiter_row(line: &str) -> bool {
    let line = line.trim();
    line.contains('|')
        && line.contains('-')
        && line
            .chars()
            .all(|c| matches!(c, '|' | ':' | '-' | ' ' | '\t'))
}
