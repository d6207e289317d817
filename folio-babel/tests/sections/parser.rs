//! Markdown → sections, straight from source

use crate::common::PHONE_REVIEW;
use folio_babel::{parse_markdown_sections, ParserSettings, SectionType};
use insta::assert_snapshot;

#[test]
fn review_fixture_splits_at_h2() {
    let parsed = parse_markdown_sections(PHONE_REVIEW, &ParserSettings::default());
    let kinds: Vec<SectionType> = parsed.sections.iter().map(|s| s.section_type).collect();
    assert_eq!(
        kinds,
        vec![
            SectionType::TitleMeta,
            SectionType::Overview,
            SectionType::Camera,
            SectionType::Pricing,
            SectionType::Verdict,
        ]
    );

    let camera = &parsed.sections.as_slice()[2];
    assert_eq!(camera.title, "📸 Camera");
    assert!(camera.content.starts_with("- 50MP main sensor"));
    assert!(camera.content.ends_with("Low light shots hold up *surprisingly* well."));

    assert!(parsed.stats.has_tables);
    assert!(!parsed.stats.has_images);
    assert!(!parsed.stats.has_code_blocks);
    assert_eq!(parsed.stats.reading_time_minutes, 1);
}

#[test]
fn sections_serialize_as_a_plain_array() {
    let parsed = parse_markdown_sections(
        "## 💰 Pricing\n\n| Variant | Price |\n|---|---|\n|8GB|44999|",
        &ParserSettings::default(),
    );
    let json = serde_json::to_string_pretty(&parsed.sections).unwrap();
    assert_snapshot!(json, @r#"
    [
      {
        "id": "s0",
        "type": "pricing",
        "title": "💰 Pricing",
        "content": "| Variant | Price |\n|---|---|\n|8GB|44999|",
        "order": 0,
        "metadata": {
          "heading_level": 2
        }
      }
    ]
    "#);
}

#[test]
fn words_per_minute_drives_reading_time() {
    let text = vec!["word"; 120].join(" ");
    let slow = parse_markdown_sections(&text, &ParserSettings { words_per_minute: 50 });
    assert_eq!(slow.stats.word_count, 120);
    assert_eq!(slow.stats.reading_time_minutes, 3);
}
