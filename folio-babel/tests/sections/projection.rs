//! Node model ⇄ sections through the hub functions

use crate::common::{level, PHONE_REVIEW};
use folio_babel::format::{ExportOptions, Format};
use folio_babel::formats::sectioned::{SectionsFormat, SECTION_ID_KEY, SECTION_TYPE_KEY};
use folio_babel::{
    from_markdown, from_sectioned, to_markdown, to_sectioned, BlogSection, ContentNode,
    FormatRegistry, SectionList, SectionType, UnifiedContent,
};

#[test]
fn projection_matches_the_source_parser() {
    let doc = from_markdown(PHONE_REVIEW);
    let sections = to_sectioned(&doc).unwrap();
    let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Nimbus 9 Pro Review", "Overview", "📸 Camera", "💰 Pricing", "🏆 Verdict"]
    );
}

#[test]
fn markdown_survives_a_trip_through_sections() {
    let doc = from_markdown(PHONE_REVIEW);
    let back = from_sectioned(&to_sectioned(&doc).unwrap());
    assert_eq!(to_markdown(&back).unwrap(), to_markdown(&doc).unwrap());
}

#[test]
fn rebuilt_headings_carry_section_identity() {
    let mut list = SectionList::new();
    list.push(BlogSection::new("cam", SectionType::Camera, "Shooting", "Sharp."))
        .unwrap();
    let doc = from_sectioned(&list);
    let extra = doc.content[0].extra();
    assert_eq!(extra[SECTION_ID_KEY], "cam");
    assert_eq!(extra[SECTION_TYPE_KEY], "camera");

    // The stored type wins over what the heading text would classify as.
    let sections = to_sectioned(&doc).unwrap();
    assert_eq!(sections.as_slice()[0].section_type, SectionType::Camera);
    assert_eq!(sections.as_slice()[0].id, "cam");
}

#[test]
fn section_type_survives_html_round_trip() {
    let mut list = SectionList::new();
    list.push(BlogSection::new("p1", SectionType::Pricing, "What it costs", "$699."))
        .unwrap();
    let html = folio_babel::to_html(&from_sectioned(&list)).unwrap();
    let sections = to_sectioned(&folio_babel::from_html(&html)).unwrap();
    assert_eq!(sections.as_slice()[0].section_type, SectionType::Pricing);
    assert_eq!(sections.as_slice()[0].id, "p1");
    assert_eq!(sections.as_slice()[0].content, "$699.");
}

#[test]
fn sections_format_accepts_json_or_markdown() {
    let format = SectionsFormat::default();
    let from_md = format.import("## Verdict\n\nBuy it.").unwrap();
    let json = format.export(&from_md, &ExportOptions::new()).unwrap();
    let from_json = format.import(&json).unwrap();
    assert_eq!(from_json, from_md);
}

#[test]
fn registry_converts_markdown_to_sections() {
    let registry = FormatRegistry::default();
    let doc = registry.import("markdown", "## Battery\n\nTwo days.").unwrap();
    let json = registry.export(&doc, "sections", &ExportOptions::new()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value[0]["type"], "battery");
    assert_eq!(value[0]["content"], "Two days.");
}

#[test]
fn headings_deeper_than_top_level_stay_inside() {
    let doc = UnifiedContent::new(vec![
        ContentNode::heading(level(2), "Display"),
        ContentNode::heading(level(4), "Outdoors"),
        ContentNode::paragraph("Bright."),
    ]);
    let sections = to_sectioned(&doc).unwrap();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections.as_slice()[0].content, "#### Outdoors\n\nBright.");
}
