//! Review sections: the unit of the sectioned editing mode.
//!
//! A review is a sequence of titled sections (overview, pricing, camera, verdict...),
//! each holding a Markdown body. [`SectionList`] keeps the sequence ordered and
//! renumbered; [`classify`] maps heading text to a [`SectionType`]; [`parser`]
//! splits a Markdown document into sections.

pub mod classify;
pub mod parser;

use crate::error::ModelError;
use crate::ir::nodes::Metadata;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of review section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    TitleMeta,
    Hero,
    Overview,
    Highlights,
    Pricing,
    Design,
    Display,
    Performance,
    Camera,
    Battery,
    ProsCons,
    Comparison,
    Verdict,
    SpecsTable,
    Custom,
}

impl SectionType {
    pub const ALL: [SectionType; 15] = [
        SectionType::TitleMeta,
        SectionType::Hero,
        SectionType::Overview,
        SectionType::Highlights,
        SectionType::Pricing,
        SectionType::Design,
        SectionType::Display,
        SectionType::Performance,
        SectionType::Camera,
        SectionType::Battery,
        SectionType::ProsCons,
        SectionType::Comparison,
        SectionType::Verdict,
        SectionType::SpecsTable,
        SectionType::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionType::TitleMeta => "title_meta",
            SectionType::Hero => "hero",
            SectionType::Overview => "overview",
            SectionType::Highlights => "highlights",
            SectionType::Pricing => "pricing",
            SectionType::Design => "design",
            SectionType::Display => "display",
            SectionType::Performance => "performance",
            SectionType::Camera => "camera",
            SectionType::Battery => "battery",
            SectionType::ProsCons => "pros_cons",
            SectionType::Comparison => "comparison",
            SectionType::Verdict => "verdict",
            SectionType::SpecsTable => "specs_table",
            SectionType::Custom => "custom",
        }
    }

    /// Title used when a section of this type is created from scratch.
    pub fn default_title(self) -> &'static str {
        match self {
            SectionType::TitleMeta => "Title",
            SectionType::Hero => "Hero",
            SectionType::Overview => "Overview",
            SectionType::Highlights => "Key Highlights",
            SectionType::Pricing => "💰 Pricing",
            SectionType::Design => "Design & Build",
            SectionType::Display => "Display",
            SectionType::Performance => "Performance",
            SectionType::Camera => "📸 Camera",
            SectionType::Battery => "🔋 Battery Life",
            SectionType::ProsCons => "Pros & Cons",
            SectionType::Comparison => "Comparison",
            SectionType::Verdict => "🏆 Verdict",
            SectionType::SpecsTable => "Specifications",
            SectionType::Custom => "Section",
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionType::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ModelError::UnknownSectionType(s.to_string()))
    }
}

/// One titled block of a review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogSection {
    pub id: String,
    #[serde(rename = "type")]
    pub section_type: SectionType,
    pub title: String,
    /// Markdown body, without the heading line.
    pub content: String,
    pub order: usize,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl BlogSection {
    pub fn new(
        id: impl Into<String>,
        section_type: SectionType,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            section_type,
            title: title.into(),
            content: content.into(),
            order: 0,
            metadata: Metadata::new(),
        }
    }

    /// A fresh empty section with a random id and the type's default title.
    pub fn blank(section_type: SectionType) -> Self {
        Self::new(
            uuid::Uuid::new_v4().to_string(),
            section_type,
            section_type.default_title(),
            String::new(),
        )
    }
}

/// Ordered sections; `order` is always `0..len` in sequence.
///
/// Serializes as a plain array. Deserializing sorts by `order`, renumbers and
/// rejects duplicate ids.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<BlogSection>", into = "Vec<BlogSection>")]
pub struct SectionList {
    sections: Vec<BlogSection>,
}

impl SectionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from sections in any order; they are sorted by `order` and renumbered.
    pub fn from_sections(mut sections: Vec<BlogSection>) -> Result<Self, ModelError> {
        sections.sort_by_key(|section| section.order);
        let mut list = Self::new();
        for section in sections {
            list.push(section)?;
        }
        Ok(list)
    }

    /// The starter layout offered for a new review.
    pub fn review_template() -> Self {
        let mut list = Self::new();
        for kind in [
            SectionType::Hero,
            SectionType::Overview,
            SectionType::Highlights,
            SectionType::Design,
            SectionType::Display,
            SectionType::Performance,
            SectionType::Camera,
            SectionType::Battery,
            SectionType::Pricing,
            SectionType::ProsCons,
            SectionType::Verdict,
        ] {
            list.sections.push(BlogSection::blank(kind));
        }
        list.renumber();
        list
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BlogSection> {
        self.sections.iter()
    }

    pub fn as_slice(&self) -> &[BlogSection] {
        &self.sections
    }

    pub fn into_vec(self) -> Vec<BlogSection> {
        self.sections
    }

    pub fn get(&self, id: &str) -> Option<&BlogSection> {
        self.sections.iter().find(|section| section.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|section| section.id == id)
    }

    pub fn push(&mut self, section: BlogSection) -> Result<(), ModelError> {
        let index = self.len();
        self.insert(index, section)
    }

    /// Insert at `index` (clamped to the end).
    pub fn insert(&mut self, index: usize, section: BlogSection) -> Result<(), ModelError> {
        if self.get(&section.id).is_some() {
            return Err(ModelError::DuplicateSection(section.id));
        }
        let index = index.min(self.len());
        self.sections.insert(index, section);
        self.renumber();
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<BlogSection, ModelError> {
        let index = self
            .position(id)
            .ok_or_else(|| ModelError::SectionNotFound(id.to_string()))?;
        let removed = self.sections.remove(index);
        self.renumber();
        Ok(removed)
    }

    /// Move a section to a new index (clamped to the end).
    pub fn move_section(&mut self, id: &str, to: usize) -> Result<(), ModelError> {
        let from = self
            .position(id)
            .ok_or_else(|| ModelError::SectionNotFound(id.to_string()))?;
        let section = self.sections.remove(from);
        let to = to.min(self.sections.len());
        self.sections.insert(to, section);
        self.renumber();
        Ok(())
    }

    /// Edit a section in place. Changes to `id` and `order` are discarded.
    pub fn update<F>(&mut self, id: &str, edit: F) -> Result<(), ModelError>
    where
        F: FnOnce(&mut BlogSection),
    {
        let index = self
            .position(id)
            .ok_or_else(|| ModelError::SectionNotFound(id.to_string()))?;
        let section = &mut self.sections[index];
        edit(section);
        section.id = id.to_string();
        section.order = index;
        Ok(())
    }

    fn renumber(&mut self) {
        for (index, section) in self.sections.iter_mut().enumerate() {
            section.order = index;
        }
    }
}

impl TryFrom<Vec<BlogSection>> for SectionList {
    type Error = ModelError;

    fn try_from(sections: Vec<BlogSection>) -> Result<Self, Self::Error> {
        Self::from_sections(sections)
    }
}

impl From<SectionList> for Vec<BlogSection> {
    fn from(list: SectionList) -> Self {
        list.sections
    }
}

impl<'a> IntoIterator for &'a SectionList {
    type Item = &'a BlogSection;
    type IntoIter = std::slice::Iter<'a, BlogSection>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
