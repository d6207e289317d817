//! Markdown → node model

use crate::common::PHONE_REVIEW;
use folio_babel::format::Format;
use folio_babel::formats::markdown::MarkdownFormat;
use folio_babel::ir::nodes::TableCellAlignment;
use folio_babel::{ContentNode, NodeType};

#[test]
fn imports_review_blocks_in_order() {
    let doc = MarkdownFormat
        .import(PHONE_REVIEW)
        .expect("markdown import never fails");

    let types: Vec<NodeType> = doc.content.iter().map(ContentNode::node_type).collect();
    assert_eq!(
        types,
        vec![
            NodeType::Heading,
            NodeType::Paragraph,
            NodeType::Heading,
            NodeType::Paragraph,
            NodeType::Heading,
            NodeType::List,
            NodeType::Heading,
            NodeType::Paragraph,
            NodeType::Heading,
            NodeType::Table,
            NodeType::Heading,
            NodeType::Paragraph,
        ]
    );
    assert_eq!(doc.metadata.title.as_deref(), Some("Nimbus 9 Pro Review"));
}

#[test]
fn inline_formatting_stays_as_markdown() {
    let doc = MarkdownFormat.import(PHONE_REVIEW).unwrap();
    let ContentNode::Paragraph { content, .. } = &doc.content[3] else {
        panic!("expected paragraph, got {:?}", doc.content[3]);
    };
    assert_eq!(
        content,
        "The Nimbus 9 Pro is the **third** phone in the line and the first with a periscope lens."
    );

    let ContentNode::Paragraph { content, .. } = &doc.content[11] else {
        panic!("expected paragraph");
    };
    assert_eq!(
        content,
        "Buy it if you want a [balanced](https://example.com/nimbus) phone."
    );
}

#[test]
fn table_keeps_cells_and_alignment() {
    let doc = MarkdownFormat.import(PHONE_REVIEW).unwrap();
    let ContentNode::Table { metadata } = &doc.content[9] else {
        panic!("expected table");
    };
    assert_eq!(metadata.headers, vec!["Variant", "Price"]);
    assert_eq!(
        metadata.rows,
        vec![vec!["8GB/128GB", "$699"], vec!["12GB/256GB", "$799"]]
    );
    assert_eq!(
        metadata.alignments,
        vec![TableCellAlignment::None, TableCellAlignment::Right]
    );
}

#[test]
fn list_items_are_flat_strings() {
    let doc = MarkdownFormat.import(PHONE_REVIEW).unwrap();
    let ContentNode::List { metadata } = &doc.content[5] else {
        panic!("expected list");
    };
    assert!(!metadata.ordered);
    assert_eq!(
        metadata.items,
        vec!["50MP main sensor", "3x periscope", "4K video at 60fps"]
    );
}

#[test]
fn unsupported_blocks_are_kept_verbatim() {
    let source = "> quoted\n> twice\n\n---\n\n<aside>note</aside>\n";
    let doc = MarkdownFormat.import(source).unwrap();
    let kinds: Vec<(&str, &str)> = doc
        .content
        .iter()
        .map(|node| match node {
            ContentNode::Custom { content, metadata } => (metadata.kind.as_str(), content.as_str()),
            other => panic!("expected custom node, got {other:?}"),
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("blockquote", "> quoted\n> twice"),
            ("thematic_break", "---"),
            ("html", "<aside>note</aside>"),
        ]
    );
}
