//! Markdown serialization (UnifiedContent → Markdown export)
//!
//! Pipeline: content nodes → Comrak AST → Markdown string.
//! The AST is handed to comrak's CommonMark writer so escaping and list
//! markers follow one consistent spelling.

use crate::error::FormatError;
use crate::ir::inline::{append_inline, parse_inline, Image, InlineContent};
use crate::ir::nodes::{ContentNode, TableCellAlignment, UnifiedContent};
use comrak::nodes::{
    AstNode, ListDelimType, ListType, NodeCodeBlock, NodeHeading, NodeHtmlBlock, NodeList,
    NodeTable, NodeValue, TableAlignment,
};
use comrak::{format_commonmark, Arena};

use super::{alloc_node, comrak_options};

/// Options for Markdown export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Write document title and description as YAML front matter.
    pub front_matter: bool,
}

/// Serialize a document to Markdown with default options.
pub fn serialize_to_markdown(doc: &UnifiedContent) -> Result<String, FormatError> {
    serialize_to_markdown_with_options(doc, &MarkdownOptions::default())
}

pub fn serialize_to_markdown_with_options(
    doc: &UnifiedContent,
    options: &MarkdownOptions,
) -> Result<String, FormatError> {
    let body = serialize_nodes(&doc.content)?;
    if !options.front_matter {
        return Ok(body);
    }

    let mut header = String::new();
    if let Some(title) = &doc.metadata.title {
        header.push_str(&format!("title: \"{}\"\n", title.replace('"', "'")));
    }
    if let Some(description) = &doc.metadata.description {
        header.push_str(&format!(
            "description: \"{}\"\n",
            description.replace('"', "'")
        ));
    }
    if header.is_empty() {
        return Ok(body);
    }
    Ok(format!("---\n{header}---\n\n{body}"))
}

/// Serialize a slice of nodes to Markdown.
pub fn serialize_nodes(nodes: &[ContentNode]) -> Result<String, FormatError> {
    let arena = Arena::new();
    let root = alloc_node(&arena, NodeValue::Document);
    for node in nodes {
        root.append(build_block(&arena, node));
    }

    let mut output = Vec::new();
    format_commonmark(root, &comrak_options(), &mut output).map_err(|e| {
        FormatError::SerializationError(format!("Comrak serialization failed: {e}"))
    })?;

    String::from_utf8(output)
        .map_err(|e| FormatError::SerializationError(format!("UTF-8 conversion failed: {e}")))
}

fn build_block<'a>(arena: &'a Arena<AstNode<'a>>, node: &ContentNode) -> &'a AstNode<'a> {
    match node {
        ContentNode::Paragraph { content, .. } => inline_block(arena, NodeValue::Paragraph, content),

        ContentNode::Heading { content, metadata } => inline_block(
            arena,
            NodeValue::Heading(NodeHeading {
                level: metadata.level.get(),
                setext: false,
            }),
            content,
        ),

        ContentNode::List { metadata } => {
            let list_node = alloc_node(arena, NodeValue::List(list_marker(metadata.ordered)));
            for item in &metadata.items {
                let item_node = alloc_node(arena, NodeValue::Item(list_marker(metadata.ordered)));
                item_node.append(inline_block(arena, NodeValue::Paragraph, item));
                list_node.append(item_node);
            }
            list_node
        }

        ContentNode::Table { metadata } => {
            let num_columns = metadata.headers.len();
            let mut alignments: Vec<TableAlignment> = metadata
                .alignments
                .iter()
                .take(num_columns)
                .map(convert_alignment)
                .collect();
            alignments.resize(num_columns, TableAlignment::None);

            let table = alloc_node(
                arena,
                NodeValue::Table(NodeTable {
                    alignments,
                    num_columns,
                    num_rows: metadata.rows.len() + 1,
                    num_nonempty_cells: 0,
                }),
            );
            table.append(table_row(arena, true, &metadata.headers, num_columns));
            for row in &metadata.rows {
                table.append(table_row(arena, false, row, num_columns));
            }
            table
        }

        ContentNode::Image { content, metadata } => {
            let paragraph = alloc_node(arena, NodeValue::Paragraph);
            append_inline(
                arena,
                paragraph,
                &InlineContent::Image(Image {
                    src: metadata.src.clone(),
                    alt: content.clone(),
                    title: metadata.title.clone(),
                }),
            );
            paragraph
        }

        ContentNode::Code { content, metadata } => {
            let mut literal = content.clone();
            if !literal.ends_with('\n') {
                literal.push('\n');
            }
            alloc_node(
                arena,
                NodeValue::CodeBlock(NodeCodeBlock {
                    fenced: true,
                    fence_char: b'`',
                    fence_length: 3,
                    fence_offset: 0,
                    info: metadata.language.clone().unwrap_or_default(),
                    literal,
                }),
            )
        }

        // Raw source is written back as-is.
        ContentNode::Custom { content, .. } => alloc_node(
            arena,
            NodeValue::HtmlBlock(NodeHtmlBlock {
                block_type: 0,
                literal: format!("{}\n", content.trim_end_matches('\n')),
            }),
        ),
    }
}

fn list_marker(ordered: bool) -> NodeList {
    NodeList {
        list_type: if ordered {
            ListType::Ordered
        } else {
            ListType::Bullet
        },
        marker_offset: 0,
        padding: 0,
        start: 1,
        delimiter: ListDelimType::Period,
        bullet_char: b'-',
        tight: true,
    }
}

fn inline_block<'a>(
    arena: &'a Arena<AstNode<'a>>,
    value: NodeValue,
    source: &str,
) -> &'a AstNode<'a> {
    let block = alloc_node(arena, value);
    for inline in parse_inline(source) {
        append_inline(arena, block, &inline);
    }
    block
}

fn table_row<'a>(
    arena: &'a Arena<AstNode<'a>>,
    header: bool,
    cells: &[String],
    num_columns: usize,
) -> &'a AstNode<'a> {
    let row = alloc_node(arena, NodeValue::TableRow(header));
    for index in 0..num_columns {
        let text = cells.get(index).map(String::as_str).unwrap_or("");
        row.append(inline_block(arena, NodeValue::TableCell, text));
    }
    row
}

fn convert_alignment(alignment: &TableCellAlignment) -> TableAlignment {
    match alignment {
        TableCellAlignment::Left => TableAlignment::Left,
        TableCellAlignment::Right => TableAlignment::Right,
        TableCellAlignment::Center => TableAlignment::Center,
        TableCellAlignment::None => TableAlignment::None,
    }
}
