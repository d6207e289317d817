//! Inline content: the structured form of the inline Markdown stored in nodes.
//!
//! Node text is kept as inline Markdown source so that every editing mode
//! shares one canonical spelling. Serializers that need structure (HTML
//! export, comrak AST building) call [`parse_inline`]; importers that read
//! structure (HTML import, comrak AST walking) call [`render_inline`].
//! Rendering goes through comrak's CommonMark writer, so the output of
//! `render_inline(&parse_inline(s))` is the normalized spelling of `s`.

use crate::formats::markdown::{alloc_node, comrak_options};
use comrak::nodes::{AstNode, NodeCode, NodeLink, NodeValue};
use comrak::{format_commonmark, parse_document, Arena};

/// Represents inline content, such as text, bold, italics, etc.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineContent {
    Text(String),
    Bold(Vec<InlineContent>),
    Italic(Vec<InlineContent>),
    Strikethrough(Vec<InlineContent>),
    Code(String),
    Link {
        url: String,
        title: Option<String>,
        content: Vec<InlineContent>,
    },
    Image(Image),
    LineBreak,
    /// Raw inline HTML, carried through untouched.
    Html(String),
}

/// Represents an inline image.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub src: String,
    pub alt: String,
    pub title: Option<String>,
}

/// Parse inline Markdown source into structured inline content.
///
/// Block constructs in the source are not interpreted: anything that does not
/// parse to a paragraph is kept as literal text.
pub fn parse_inline(source: &str) -> Vec<InlineContent> {
    if source.is_empty() {
        return Vec::new();
    }

    let arena = Arena::new();
    let options = comrak_options();
    let root = parse_document(&arena, source, &options);

    let mut content = Vec::new();
    for (index, block) in root.children().enumerate() {
        if index > 0 {
            content.push(InlineContent::LineBreak);
        }
        if matches!(block.data.borrow().value, NodeValue::Paragraph) {
            for child in block.children() {
                collect_inline(child, &mut content);
            }
        } else {
            return vec![InlineContent::Text(source.to_string())];
        }
    }
    content
}

/// Collect inline content from a comrak inline node.
pub(crate) fn collect_inline<'a>(node: &'a AstNode<'a>, content: &mut Vec<InlineContent>) {
    let value = node.data.borrow().value.clone();
    match value {
        NodeValue::Text(text) => push_text(content, &text),
        NodeValue::SoftBreak => push_text(content, " "),
        NodeValue::LineBreak => content.push(InlineContent::LineBreak),
        NodeValue::Code(code) => content.push(InlineContent::Code(code.literal)),
        NodeValue::HtmlInline(html) => content.push(InlineContent::Html(html)),
        NodeValue::Strong => content.push(InlineContent::Bold(collect_children(node))),
        NodeValue::Emph => content.push(InlineContent::Italic(collect_children(node))),
        NodeValue::Strikethrough => {
            content.push(InlineContent::Strikethrough(collect_children(node)))
        }
        NodeValue::Link(link) => content.push(InlineContent::Link {
            url: link.url,
            title: non_empty(link.title),
            content: collect_children(node),
        }),
        NodeValue::Image(link) => content.push(InlineContent::Image(Image {
            src: link.url,
            alt: plain_text(&collect_children(node)),
            title: non_empty(link.title),
        })),
        _ => {
            for child in node.children() {
                collect_inline(child, content);
            }
        }
    }
}

fn collect_children<'a>(node: &'a AstNode<'a>) -> Vec<InlineContent> {
    let mut children = Vec::new();
    for child in node.children() {
        collect_inline(child, &mut children);
    }
    children
}

/// Append text, merging with a preceding text run.
pub(crate) fn push_text(content: &mut Vec<InlineContent>, text: &str) {
    if let Some(InlineContent::Text(last)) = content.last_mut() {
        last.push_str(text);
    } else {
        content.push(InlineContent::Text(text.to_string()));
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Render structured inline content back to inline Markdown source.
pub fn render_inline(content: &[InlineContent]) -> String {
    if content.is_empty() {
        return String::new();
    }

    let arena = Arena::new();
    let root = alloc_node(&arena, NodeValue::Document);
    let paragraph = alloc_node(&arena, NodeValue::Paragraph);
    root.append(paragraph);
    for inline in content {
        append_inline(&arena, paragraph, inline);
    }

    let mut output = Vec::new();
    if format_commonmark(root, &comrak_options(), &mut output).is_err() {
        return plain_text(content);
    }
    match String::from_utf8(output) {
        Ok(text) => text.trim_end_matches('\n').to_string(),
        Err(_) => plain_text(content),
    }
}

/// Append inline content to a comrak node.
pub(crate) fn append_inline<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    inline: &InlineContent,
) {
    match inline {
        InlineContent::Text(text) => {
            parent.append(alloc_node(arena, NodeValue::Text(text.clone())));
        }
        InlineContent::Bold(children) => {
            append_container(arena, parent, NodeValue::Strong, children);
        }
        InlineContent::Italic(children) => {
            append_container(arena, parent, NodeValue::Emph, children);
        }
        InlineContent::Strikethrough(children) => {
            append_container(arena, parent, NodeValue::Strikethrough, children);
        }
        InlineContent::Code(literal) => {
            parent.append(alloc_node(
                arena,
                NodeValue::Code(NodeCode {
                    num_backticks: 1,
                    literal: literal.clone(),
                }),
            ));
        }
        InlineContent::Link {
            url,
            title,
            content,
        } => {
            let value = NodeValue::Link(NodeLink {
                url: url.clone(),
                title: title.clone().unwrap_or_default(),
            });
            append_container(arena, parent, value, content);
        }
        InlineContent::Image(image) => {
            let node = alloc_node(
                arena,
                NodeValue::Image(NodeLink {
                    url: image.src.clone(),
                    title: image.title.clone().unwrap_or_default(),
                }),
            );
            node.append(alloc_node(arena, NodeValue::Text(image.alt.clone())));
            parent.append(node);
        }
        InlineContent::LineBreak => {
            parent.append(alloc_node(arena, NodeValue::LineBreak));
        }
        InlineContent::Html(html) => {
            parent.append(alloc_node(arena, NodeValue::HtmlInline(html.clone())));
        }
    }
}

fn append_container<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    value: NodeValue,
    children: &[InlineContent],
) {
    let node = alloc_node(arena, value);
    parent.append(node);
    for child in children {
        append_inline(arena, node, child);
    }
}

/// The spelling of `source` that every transformer produces.
///
/// Literal syntax characters come back escaped, so `1. x` becomes `1\. x`.
/// Hard breaks are written as a trailing backslash. Applying it twice
/// changes nothing.
pub fn normalize_inline(source: &str) -> String {
    render_inline(&parse_inline(source))
}

/// Flatten inline content to plain text (markup dropped).
pub fn plain_text(content: &[InlineContent]) -> String {
    let mut text = String::new();
    write_plain(content, &mut text);
    text
}

fn write_plain(content: &[InlineContent], out: &mut String) {
    for inline in content {
        match inline {
            InlineContent::Text(text) | InlineContent::Code(text) => out.push_str(text),
            InlineContent::Bold(children)
            | InlineContent::Italic(children)
            | InlineContent::Strikethrough(children) => write_plain(children, out),
            InlineContent::Link { content, .. } => write_plain(content, out),
            InlineContent::Image(image) => out.push_str(&image.alt),
            InlineContent::LineBreak => out.push(' '),
            InlineContent::Html(_) => {}
        }
    }
}

/// Plain text of an inline Markdown string.
pub fn plain_text_of(source: &str) -> String {
    plain_text(&parse_inline(source))
}
