//! Sectioned projection: UnifiedContent ⇄ ordered review sections.
//!
//! `to_sectioned` splits the node list at top-level headings using the same
//! rule as the Markdown section parser, and renders each body back to
//! Markdown. `from_sectioned` writes one heading per titled section, tagged
//! with `section_id` and `section_type`, followed by the nodes of its body.
//! Those two keys are what let a section keep its identity and type across a
//! trip through the other editing modes.
//!
//! # Lossy Conversions
//!
//! - Untitled sections emit no heading. Only a leading untitled section
//!   survives as its own section; later ones merge into the section before.
//! - A heading in a section body at or above the section's own level starts
//!   a new section on the way back.

use crate::error::FormatError;
use crate::format::{unknown_option, ExportOptions, Format};
use crate::formats::markdown::parser::parse_nodes;
use crate::formats::markdown::serializer::serialize_nodes;
use crate::ir::inline::plain_text_of;
use crate::ir::nodes::{ContentNode, HeadingLevel, Metadata, UnifiedContent};
use crate::sections::classify::classify_heading;
use crate::sections::parser::{heading_metadata, parse_markdown_sections, section_starts, ParserSettings};
use crate::sections::{BlogSection, SectionList, SectionType};
use std::collections::HashSet;

/// Heading metadata key holding the section id.
pub const SECTION_ID_KEY: &str = "section_id";
/// Heading metadata key holding the section type.
pub const SECTION_TYPE_KEY: &str = "section_type";
const HEADING_LEVEL_KEY: &str = "heading_level";

/// Project a document onto sections.
pub fn to_sectioned(doc: &UnifiedContent) -> Result<SectionList, FormatError> {
    let heading_positions: Vec<(usize, u8)> = doc
        .content
        .iter()
        .enumerate()
        .filter_map(|(index, node)| node.heading_level().map(|level| (index, level.get())))
        .collect();
    let levels: Vec<u8> = heading_positions.iter().map(|(_, level)| *level).collect();

    let mut ids = IdAllocator::default();
    let mut sections = Vec::new();

    let Some(starts) = section_starts(&levels) else {
        if !doc.content.is_empty() {
            let body = render_body(&doc.content)?;
            sections.push(BlogSection::new(ids.fresh(), SectionType::Custom, "", body));
        }
        return Ok(SectionList::from_sections(sections)?);
    };

    let starting: Vec<(usize, usize)> = heading_positions
        .iter()
        .enumerate()
        .filter(|(nth, (_, level))| starts.title_index == Some(*nth) || *level <= starts.top_level)
        .map(|(nth, (index, _))| (nth, *index))
        .collect();

    let first = starting.first().map(|(_, index)| *index).unwrap_or(doc.content.len());
    if first > 0 {
        let body = render_body(&doc.content[..first])?;
        sections.push(BlogSection::new(ids.fresh(), SectionType::Custom, "", body));
    }

    for (position, (nth, index)) in starting.iter().enumerate() {
        let end = starting
            .get(position + 1)
            .map(|(_, next)| *next)
            .unwrap_or(doc.content.len());
        let ContentNode::Heading { content, metadata } = &doc.content[*index] else {
            continue;
        };

        let mut extra = metadata.extra.clone();
        let stored_id = extra
            .remove(SECTION_ID_KEY)
            .and_then(|value| value.as_str().map(str::to_string));
        let stored_type = extra
            .remove(SECTION_TYPE_KEY)
            .and_then(|value| value.as_str().and_then(|s| s.parse::<SectionType>().ok()));

        let section_type = match stored_type {
            Some(kind) => kind,
            None if starts.title_index == Some(*nth) => SectionType::TitleMeta,
            None => classify_heading(&plain_text_of(content)),
        };

        let mut section = BlogSection::new(
            ids.claim(stored_id),
            section_type,
            content.clone(),
            render_body(&doc.content[index + 1..end])?,
        );
        section.metadata = heading_metadata(metadata.level.get());
        section.metadata.extend(extra);
        sections.push(section);
    }

    Ok(SectionList::from_sections(sections)?)
}

/// Rebuild a document from sections.
pub fn from_sectioned(sections: &SectionList) -> UnifiedContent {
    let mut nodes = Vec::new();
    for section in sections {
        if !section.title.is_empty() {
            nodes.push(section_heading(section));
        }
        nodes.extend(parse_nodes(&section.content));
    }
    UnifiedContent::new(nodes)
}

fn section_heading(section: &BlogSection) -> ContentNode {
    let default_level = if section.section_type == SectionType::TitleMeta {
        1
    } else {
        2
    };
    let level = section
        .metadata
        .get(HEADING_LEVEL_KEY)
        .and_then(|value| value.as_u64())
        .map(|level| HeadingLevel::clamped(level as usize))
        .unwrap_or_else(|| HeadingLevel::clamped(default_level));

    let mut heading = ContentNode::heading(level, section.title.clone())
        .with_extra(SECTION_ID_KEY, section.id.clone())
        .with_extra(SECTION_TYPE_KEY, section.section_type.as_str());
    let extra: Metadata = section
        .metadata
        .iter()
        .filter(|(key, _)| key.as_str() != HEADING_LEVEL_KEY)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    heading.extra_mut().extend(extra);
    heading
}

fn render_body(nodes: &[ContentNode]) -> Result<String, FormatError> {
    Ok(serialize_nodes(nodes)?.trim_end().to_string())
}

/// Hands out section ids, keeping stored ids where they are unique.
#[derive(Default)]
struct IdAllocator {
    taken: HashSet<String>,
    next: usize,
}

impl IdAllocator {
    fn claim(&mut self, stored: Option<String>) -> String {
        match stored {
            Some(id) if !id.is_empty() && !self.taken.contains(&id) => {
                self.taken.insert(id.clone());
                id
            }
            _ => self.fresh(),
        }
    }

    fn fresh(&mut self) -> String {
        loop {
            let id = format!("s{}", self.next);
            self.next += 1;
            if self.taken.insert(id.clone()) {
                return id;
            }
        }
    }
}

/// Format implementation exposing the sectioned projection as JSON.
///
/// Parsing accepts either a JSON section array or Markdown, which is run
/// through the section parser first.
pub struct SectionsFormat {
    settings: ParserSettings,
}

impl Default for SectionsFormat {
    fn default() -> Self {
        Self::new(ParserSettings::default())
    }
}

impl SectionsFormat {
    pub fn new(settings: ParserSettings) -> Self {
        Self { settings }
    }
}

impl Format for SectionsFormat {
    fn name(&self) -> &'static str {
        "sections"
    }

    fn description(&self) -> &'static str {
        "Review sections as a JSON array"
    }

    fn import(&self, source: &str) -> Result<UnifiedContent, FormatError> {
        let sections = if source.trim_start().starts_with('[') {
            serde_json::from_str::<SectionList>(source)
                .map_err(|e| FormatError::ParseError(format!("Invalid sections JSON: {e}")))?
        } else {
            parse_markdown_sections(source, &self.settings).sections
        };
        Ok(from_sectioned(&sections))
    }

    fn export(&self, doc: &UnifiedContent, options: &ExportOptions) -> Result<String, FormatError> {
        unknown_option(self.name(), options)?;
        let sections = to_sectioned(doc)?;
        serde_json::to_string_pretty(&sections)
            .map_err(|e| FormatError::SerializationError(format!("JSON encoding failed: {e}")))
    }
}
