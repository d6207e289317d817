//! Markdown parsing (Markdown → UnifiedContent import)
//!
//! Pipeline: Markdown string → Comrak AST → content nodes.
//!
//! Import never fails. Blocks the node model cannot express keep their source
//! text in a `custom` node; constructs that do not parse cleanly fall back to
//! whatever comrak made of them, usually a paragraph.

use crate::ir::inline::{collect_inline, plain_text_of, render_inline, Image, InlineContent};
use crate::ir::nodes::{
    ContentNode, DocumentMetadata, HeadingLevel, ImageMeta, Metadata, TableCellAlignment,
    TableMeta, UnifiedContent,
};
use comrak::nodes::{AstNode, ListType, NodeValue, TableAlignment};
use comrak::{parse_document, Arena};

/// The marker comrak writes between two adjacent lists.
pub(crate) const LIST_SEPARATOR: &str = "<!-- end list -->";

/// Parse a Markdown string into a document.
pub fn parse_from_markdown(source: &str) -> UnifiedContent {
    let arena = Arena::new();
    let root = parse_document(&arena, source, &super::document_options());

    let lines: Vec<&str> = source.lines().collect();
    let mut metadata = DocumentMetadata::default();
    let mut nodes = Vec::new();

    for child in root.children() {
        let value = child.data.borrow().value.clone();
        match value {
            NodeValue::FrontMatter(raw) => read_front_matter(&raw, &mut metadata),
            NodeValue::HtmlBlock(html) if html.literal.trim() == LIST_SEPARATOR => {}
            _ => nodes.push(block_to_node(child, &lines)),
        }
    }

    if metadata.title.is_none() {
        metadata.title = nodes.iter().find_map(|node| match node {
            ContentNode::Heading { content, metadata } if metadata.level.get() == 1 => {
                Some(plain_text_of(content))
            }
            _ => None,
        });
    }

    UnifiedContent::new(nodes).with_metadata(metadata)
}

/// Parse a Markdown fragment into content nodes, ignoring document metadata.
pub fn parse_nodes(source: &str) -> Vec<ContentNode> {
    parse_from_markdown(source).content
}

fn block_to_node<'a>(node: &'a AstNode<'a>, lines: &[&str]) -> ContentNode {
    let value = node.data.borrow().value.clone();
    match value {
        NodeValue::Heading(heading) => ContentNode::heading(
            HeadingLevel::clamped(heading.level as usize),
            render_inline(&inline_children(node)),
        ),

        NodeValue::Paragraph => {
            let inline = inline_children(node);
            match sole_image(&inline) {
                Some(image) => ContentNode::Image {
                    content: image.alt.clone(),
                    metadata: ImageMeta {
                        src: image.src.clone(),
                        title: image.title.clone(),
                        extra: Metadata::new(),
                    },
                },
                None => ContentNode::paragraph(render_inline(&inline)),
            }
        }

        NodeValue::List(list) => match list_items(node) {
            Some(items) => ContentNode::list(list.list_type == ListType::Ordered, items),
            None => {
                tracing::debug!("nested list content kept as raw markdown");
                ContentNode::custom("list", source_text(node, lines))
            }
        },

        NodeValue::Table(table) => {
            let alignments: Vec<TableCellAlignment> =
                table.alignments.iter().map(convert_alignment).collect();
            match table_cells(node) {
                Some((headers, rows)) => {
                    let meta = TableMeta {
                        headers,
                        rows,
                        alignments: if alignments
                            .iter()
                            .all(|a| *a == TableCellAlignment::None)
                        {
                            Vec::new()
                        } else {
                            alignments
                        },
                        extra: Metadata::new(),
                    };
                    let table = ContentNode::Table { metadata: meta };
                    match table.validate() {
                        Ok(()) => table,
                        Err(err) => {
                            tracing::warn!(%err, "malformed table imported as paragraph");
                            ContentNode::paragraph(source_text(node, lines))
                        }
                    }
                }
                None => ContentNode::paragraph(source_text(node, lines)),
            }
        }

        NodeValue::CodeBlock(code) => {
            let language = code
                .info
                .split_whitespace()
                .next()
                .map(str::to_string);
            let content = code
                .literal
                .strip_suffix('\n')
                .unwrap_or(&code.literal)
                .to_string();
            ContentNode::code(language, content)
        }

        NodeValue::HtmlBlock(html) => {
            ContentNode::custom("html", html.literal.trim_end_matches('\n'))
        }
        NodeValue::BlockQuote => ContentNode::custom("blockquote", source_text(node, lines)),
        NodeValue::ThematicBreak => ContentNode::custom("thematic_break", source_text(node, lines)),
        _ => ContentNode::custom("raw", source_text(node, lines)),
    }
}

fn inline_children<'a>(node: &'a AstNode<'a>) -> Vec<InlineContent> {
    let mut content = Vec::new();
    for child in node.children() {
        collect_inline(child, &mut content);
    }
    content
}

fn sole_image(content: &[InlineContent]) -> Option<&Image> {
    let mut image = None;
    for inline in content {
        match inline {
            InlineContent::Image(found) if image.is_none() => image = Some(found),
            InlineContent::Text(text) if text.trim().is_empty() => {}
            _ => return None,
        }
    }
    image
}

/// Item texts of a list, or `None` when an item holds more than one paragraph.
fn list_items<'a>(list: &'a AstNode<'a>) -> Option<Vec<String>> {
    let mut items = Vec::new();
    for item in list.children() {
        let mut blocks = item.children();
        let text = match blocks.next() {
            None => String::new(),
            Some(block) => {
                if !matches!(block.data.borrow().value, NodeValue::Paragraph) {
                    return None;
                }
                render_inline(&inline_children(block))
            }
        };
        if blocks.next().is_some() {
            return None;
        }
        items.push(text);
    }
    Some(items)
}

type TableCells = (Vec<String>, Vec<Vec<String>>);

fn table_cells<'a>(table: &'a AstNode<'a>) -> Option<TableCells> {
    let mut headers = None;
    let mut rows = Vec::new();
    for row in table.children() {
        let is_header = matches!(row.data.borrow().value, NodeValue::TableRow(true));
        let cells: Vec<String> = row
            .children()
            .map(|cell| render_inline(&inline_children(cell)))
            .collect();
        if is_header && headers.is_none() {
            headers = Some(cells);
        } else {
            rows.push(cells);
        }
    }
    headers.map(|headers| (headers, rows))
}

fn convert_alignment(alignment: &TableAlignment) -> TableCellAlignment {
    match alignment {
        TableAlignment::Left => TableCellAlignment::Left,
        TableAlignment::Right => TableCellAlignment::Right,
        TableAlignment::Center => TableCellAlignment::Center,
        TableAlignment::None => TableCellAlignment::None,
    }
}

/// The source lines a block was parsed from.
fn source_text<'a>(node: &'a AstNode<'a>, lines: &[&str]) -> String {
    let pos = node.data.borrow().sourcepos;
    let start = pos.start.line.saturating_sub(1);
    let end = pos.end.line.min(lines.len());
    if start >= end {
        let mut text = String::new();
        for child in node.descendants() {
            if let NodeValue::Text(t) = &child.data.borrow().value {
                text.push_str(t);
            }
        }
        return text;
    }
    lines[start..end].join("\n").trim_end().to_string()
}

/// Read simple `key: value` pairs from a YAML front matter block.
fn read_front_matter(raw: &str, metadata: &mut DocumentMetadata) {
    let body = raw.trim().trim_start_matches("---").trim_end_matches("---");
    for line in body.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim().trim_matches('"').trim_matches('\'').to_string();
        match key {
            "title" => metadata.title = Some(value),
            "description" => metadata.description = Some(value),
            "" => {}
            other => {
                metadata
                    .extra
                    .insert(other.to_string(), serde_json::Value::String(value));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::nodes::NodeType;

    fn types(doc: &UnifiedContent) -> Vec<NodeType> {
        doc.content.iter().map(ContentNode::node_type).collect()
    }

    #[test]
    fn parses_basic_blocks() {
        let doc = parse_from_markdown("# Title\n\nBody text.\n\n- one\n- two\n");
        assert_eq!(
            types(&doc),
            vec![NodeType::Heading, NodeType::Paragraph, NodeType::List]
        );
        assert_eq!(doc.metadata.title.as_deref(), Some("Title"));
    }

    #[test]
    fn image_only_paragraph_becomes_image() {
        let doc = parse_from_markdown("![A phone](phone.png \"Front\")\n");
        match &doc.content[0] {
            ContentNode::Image { content, metadata } => {
                assert_eq!(content, "A phone");
                assert_eq!(metadata.src, "phone.png");
                assert_eq!(metadata.title.as_deref(), Some("Front"));
            }
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn code_block_keeps_language_and_drops_final_newline() {
        let doc = parse_from_markdown("```rust\nfn main() {}\n```\n");
        assert_eq!(
            doc.content[0],
            ContentNode::code(Some("rust".into()), "fn main() {}")
        );
    }

    #[test]
    fn blockquote_is_kept_as_raw_custom_node() {
        let doc = parse_from_markdown("> quoted\n> text\n");
        assert_eq!(doc.content[0], ContentNode::custom("blockquote", "> quoted\n> text"));
    }

    #[test]
    fn table_without_delimiter_row_is_a_paragraph() {
        let doc = parse_from_markdown("| a | b |\n| 1 |\n");
        assert_eq!(types(&doc), vec![NodeType::Paragraph]);
    }

    #[test]
    fn front_matter_fills_document_metadata() {
        let doc = parse_from_markdown("---\ntitle: \"Phone X\"\nauthor: sam\n---\n\nBody\n");
        assert_eq!(doc.metadata.title.as_deref(), Some("Phone X"));
        assert_eq!(
            doc.metadata.extra.get("author"),
            Some(&serde_json::Value::String("sam".into()))
        );
        assert_eq!(types(&doc), vec![NodeType::Paragraph]);
    }

    #[test]
    fn nested_list_degrades_to_custom() {
        let doc = parse_from_markdown("- a\n  - b\n");
        assert_eq!(types(&doc), vec![NodeType::Custom]);
    }
}
