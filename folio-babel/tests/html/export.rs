//! Node model → HTML

use crate::common::{level, sample_document};
use folio_babel::format::{ExportOptions, Format};
use folio_babel::formats::html::{HtmlFormat, HtmlTheme};
use folio_babel::{to_html, ContentNode, DocumentMetadata, UnifiedContent};
use insta::assert_snapshot;

#[test]
fn fragment_has_one_block_per_line() {
    let html = to_html(&sample_document()).unwrap();
    assert_snapshot!(html, @r#"
    <h2 class="folio-heading">Design</h2>
    <p class="folio-paragraph">Glass <strong>back</strong>.</p>
    <ul class="folio-list"><li>Light</li><li>Stiff</li></ul>
    <table class="folio-table"><thead><tr><th>Model</th><th>Price</th></tr></thead><tbody><tr><td>X</td><td>$9</td></tr></tbody></table>
    "#);
}

#[test]
fn standalone_document_embeds_theme_css() {
    let doc = UnifiedContent::new(vec![ContentNode::heading(level(1), "Review")]).with_metadata(
        DocumentMetadata {
            title: Some("Nimbus 9 Pro".into()),
            ..Default::default()
        },
    );
    let html = HtmlFormat::new(HtmlTheme::Serif)
        .export(&doc, &ExportOptions::new())
        .unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>Nimbus 9 Pro</title>"));
    assert!(html.contains("<article class=\"folio-document\">"));
    assert!(html.contains("<style>"));
}

#[test]
fn fragment_option_skips_the_wrapper() {
    let options = ExportOptions::from([("fragment".to_string(), "true".to_string())]);
    let html = HtmlFormat::default()
        .export(&sample_document(), &options)
        .unwrap();
    assert!(html.starts_with("<h2 class=\"folio-heading\">"));
    assert!(!html.contains("<style>"));
}

#[test]
fn unknown_theme_is_rejected() {
    let options = ExportOptions::from([("theme".to_string(), "neon".to_string())]);
    assert!(HtmlFormat::default()
        .export(&sample_document(), &options)
        .is_err());
}

#[test]
fn text_is_escaped() {
    let doc = UnifiedContent::new(vec![ContentNode::paragraph("a < b & c")]);
    assert_eq!(
        to_html(&doc).unwrap(),
        "<p class=\"folio-paragraph\">a &lt; b &amp; c</p>"
    );
}
