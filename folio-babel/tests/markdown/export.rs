//! Node model → Markdown

use crate::common::{level, sample_document, PHONE_REVIEW};
use folio_babel::format::{ExportOptions, Format};
use folio_babel::formats::markdown::MarkdownFormat;
use folio_babel::{from_markdown, to_markdown, ContentNode, UnifiedContent};
use insta::assert_snapshot;

#[test]
fn exports_headings_paragraphs_and_lists() {
    let doc = UnifiedContent::new(vec![
        ContentNode::heading(level(2), "Battery"),
        ContentNode::paragraph("Two days of *light* use."),
        ContentNode::list(false, vec!["5000mAh".into(), "65W wired".into()]),
    ]);
    let output = to_markdown(&doc).unwrap();
    assert_snapshot!(output, @r"
    ## Battery

    Two days of *light* use.

    - 5000mAh
    - 65W wired
    ");
}

#[test]
fn table_export_has_header_and_delimiter_rows() {
    let output = to_markdown(&sample_document()).unwrap();
    let lines: Vec<&str> = output.lines().filter(|l| l.starts_with('|')).collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("Model") && lines[0].contains("Price"));
    assert!(lines[1].contains("---"));
    assert!(lines[2].contains("$9"));
}

#[test]
fn custom_nodes_are_written_back_verbatim() {
    let doc = UnifiedContent::new(vec![
        ContentNode::paragraph("Before."),
        ContentNode::custom("blockquote", "> keep me"),
    ]);
    let output = to_markdown(&doc).unwrap();
    assert!(output.contains("\n> keep me\n"), "{output}");
}

#[test]
fn front_matter_option_writes_title() {
    let doc = from_markdown(PHONE_REVIEW);
    let options = ExportOptions::from([("front-matter".to_string(), "true".to_string())]);
    let output = MarkdownFormat
        .export(&doc, &options)
        .unwrap();
    assert!(output.starts_with("---\ntitle: \"Nimbus 9 Pro Review\"\n---\n\n# Nimbus 9 Pro Review"));

    let again = from_markdown(&output);
    assert_eq!(again.metadata.title, doc.metadata.title);
    assert_eq!(again.content, doc.content);
}

#[test]
fn unknown_option_is_rejected() {
    let options = ExportOptions::from([("theme".to_string(), "serif".to_string())]);
    assert!(MarkdownFormat
        .export(&sample_document(), &options)
        .is_err());
}

#[test]
fn fixture_export_is_stable() {
    let first = to_markdown(&from_markdown(PHONE_REVIEW)).unwrap();
    let second = to_markdown(&from_markdown(&first)).unwrap();
    assert_eq!(first, second);
}
