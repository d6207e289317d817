//! HTML → node model

use folio_babel::{from_html, ContentNode, NodeType};

#[test]
fn loose_editor_markup_becomes_blocks() {
    let doc = from_html(
        "<h2>Camera</h2>Stray <b>bold</b> text<p>Proper <i>paragraph</i></p><ol><li>One</li><li>Two</li></ol>",
    );
    assert_eq!(
        doc.content,
        vec![
            ContentNode::heading(folio_babel::HeadingLevel::new(2).unwrap(), "Camera"),
            ContentNode::paragraph("Stray **bold** text"),
            ContentNode::paragraph("Proper *paragraph*"),
            ContentNode::list(true, vec!["One".into(), "Two".into()]),
        ]
    );
}

#[test]
fn table_without_thead_uses_first_row() {
    let doc = from_html(
        "<table><tr><th>Variant</th><th>Price</th></tr><tr><td>8GB</td><td>44999</td></tr></table>",
    );
    let ContentNode::Table { metadata } = &doc.content[0] else {
        panic!("expected table, got {:?}", doc.content);
    };
    assert_eq!(metadata.headers, vec!["Variant", "Price"]);
    assert_eq!(metadata.rows, vec![vec!["8GB", "44999"]]);
}

#[test]
fn ragged_table_degrades_to_paragraph() {
    let doc = from_html(
        "<table><thead><tr><th>A</th><th>B</th></tr></thead><tbody><tr><td>1</td></tr></tbody></table>",
    );
    assert_eq!(doc.content.len(), 1);
    assert_eq!(doc.content[0].node_type(), NodeType::Paragraph);
}

#[test]
fn full_document_title_is_read() {
    let doc = from_html(
        "<!DOCTYPE html><html><head><title>Nimbus</title></head><body><p>Hi</p></body></html>",
    );
    assert_eq!(doc.metadata.title.as_deref(), Some("Nimbus"));
    assert_eq!(doc.content, vec![ContentNode::paragraph("Hi")]);
}

#[test]
fn data_attributes_come_back_as_metadata() {
    let doc = from_html(
        "<h2 class=\"folio-heading\" data-section_id=\"cam\" data-section_type=\"camera\">Camera</h2>",
    );
    let extra = doc.content[0].extra();
    assert_eq!(extra["section_id"], "cam");
    assert_eq!(extra["section_type"], "camera");
}

#[test]
fn figure_becomes_image() {
    let doc = from_html(
        "<figure class=\"folio-image\"><img src=\"shot.jpg\" alt=\"Night shot\"><figcaption>Night shot</figcaption></figure>",
    );
    assert_eq!(
        doc.content,
        vec![ContentNode::image("shot.jpg", "Night shot")]
    );
}

#[test]
fn blockquote_and_rule_become_custom_nodes() {
    let doc = from_html("<blockquote><p>Quoted</p></blockquote><hr>");
    let kinds: Vec<&str> = doc
        .content
        .iter()
        .map(|node| match node {
            ContentNode::Custom { metadata, .. } => metadata.kind.as_str(),
            _ => "",
        })
        .collect();
    assert_eq!(kinds, vec!["blockquote", "thematic_break"]);
}
