//! HTML parsing (HTML → UnifiedContent import)
//!
//! Pipeline: HTML string → html5ever → RcDom → content nodes.
//!
//! Accepts both full documents and body fragments. Block elements map to nodes;
//! text and inline elements found between blocks are gathered into paragraphs.
//! Unknown containers (`div`, `section`, `article`...) are descended into.

use crate::ir::inline::{push_text, render_inline, Image, InlineContent};
use crate::ir::nodes::{
    ContentNode, CustomMeta, DocumentMetadata, HeadingLevel, ImageMeta, Metadata,
    TableCellAlignment, TableMeta, UnifiedContent,
};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Parse HTML into a document. Never fails; malformed markup is recovered by html5ever.
pub fn parse_from_html(source: &str) -> UnifiedContent {
    let dom = parse_document(RcDom::default(), Default::default()).one(source);

    let mut metadata = DocumentMetadata::default();
    let mut nodes = Vec::new();
    if let Some(html) = find_element(&dom.document, "html") {
        if let Some(head) = find_element(&html, "head") {
            if let Some(title) = find_element(&head, "title") {
                let text = text_content(&title).trim().to_string();
                if !text.is_empty() {
                    metadata.title = Some(text);
                }
            }
        }
        if let Some(body) = find_element(&html, "body") {
            let mut builder = BlockBuilder::default();
            builder.walk(&body);
            nodes = builder.finish();
        }
    }

    UnifiedContent::new(nodes).with_metadata(metadata)
}

#[derive(Default)]
struct BlockBuilder {
    nodes: Vec<ContentNode>,
    pending: Vec<InlineContent>,
}

impl BlockBuilder {
    fn finish(mut self) -> Vec<ContentNode> {
        self.flush();
        self.nodes
    }

    /// Turn gathered loose inline content into a paragraph.
    fn flush(&mut self) {
        let inline = trim_inline(std::mem::take(&mut self.pending));
        if !inline.is_empty() {
            self.nodes.push(ContentNode::paragraph(render_inline(&inline)));
        }
    }

    fn push_block(&mut self, node: ContentNode) {
        self.flush();
        self.nodes.push(node);
    }

    fn walk(&mut self, parent: &Handle) {
        for child in parent.children.borrow().iter() {
            self.visit(child);
        }
    }

    fn visit(&mut self, handle: &Handle) {
        let tag = match &handle.data {
            NodeData::Element { name, .. } => name.local.to_string(),
            NodeData::Text { .. } => {
                collect_inline(handle, &mut self.pending);
                return;
            }
            _ => return,
        };

        let extra = data_attributes(handle, &["data-kind", "data-language"]);
        match tag.as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag[1..].parse::<usize>().unwrap_or(1);
                let node = ContentNode::heading(HeadingLevel::clamped(level), inline_source(handle));
                self.push_block(with_extra(node, extra));
            }

            "p" => {
                let inline = trim_inline(inline_of(handle));
                let node = match sole_image(&inline) {
                    Some(image) => image_node(image),
                    None if inline.is_empty() => return,
                    None => ContentNode::paragraph(render_inline(&inline)),
                };
                self.push_block(with_extra(node, extra));
            }

            "ul" | "ol" => {
                let items = child_elements(handle)
                    .into_iter()
                    .filter(|(name, _)| name == "li")
                    .map(|(_, li)| inline_source(&li))
                    .collect();
                self.push_block(with_extra(ContentNode::list(tag == "ol", items), extra));
            }

            "table" => {
                if let Some(node) = table_node(handle) {
                    self.push_block(with_extra(node, extra));
                }
            }

            "figure" => match find_descendant(handle, "img") {
                Some(img) => {
                    let mut image = image_of(&img);
                    if image.alt.is_empty() {
                        if let Some(caption) = find_element(handle, "figcaption") {
                            image.alt = collapse_whitespace(&text_content(&caption))
                                .trim()
                                .to_string();
                        }
                    }
                    self.push_block(with_extra(image_node(&image), extra));
                }
                None => self.walk(handle),
            },

            "img" => {
                let image = image_of(handle);
                self.push_block(with_extra(image_node(&image), extra));
            }

            "pre" => {
                let code = find_element(handle, "code");
                let language = attribute(handle, "data-language").or_else(|| {
                    code.as_ref()
                        .and_then(|c| attribute(c, "class"))
                        .and_then(|class| {
                            class
                                .split_whitespace()
                                .find_map(|c| c.strip_prefix("language-").map(str::to_string))
                        })
                });
                let text = text_content(handle);
                let text = text.strip_suffix('\n').unwrap_or(&text).to_string();
                self.push_block(with_extra(ContentNode::code(language, text), extra));
            }

            "blockquote" => {
                let text = collapse_whitespace(&text_content(handle));
                let quoted = text
                    .trim()
                    .lines()
                    .map(|line| format!("> {}", line.trim()))
                    .collect::<Vec<_>>()
                    .join("\n");
                self.push_block(with_extra(ContentNode::custom("blockquote", quoted), extra));
            }

            "hr" => self.push_block(ContentNode::custom("thematic_break", "---")),

            "div" if has_class(handle, "folio-custom") => {
                let node = ContentNode::Custom {
                    content: text_content(handle),
                    metadata: CustomMeta {
                        kind: attribute(handle, "data-kind").unwrap_or_else(|| "raw".into()),
                        extra,
                    },
                };
                self.push_block(node);
            }

            "div" | "section" | "article" | "main" | "header" | "footer" | "aside" | "nav"
            | "body" => {
                self.flush();
                self.walk(handle);
                self.flush();
            }

            "script" | "style" | "template" | "noscript" | "head" | "title" | "meta" => {}

            _ => collect_inline(handle, &mut self.pending),
        }
    }
}

fn with_extra(mut node: ContentNode, extra: Metadata) -> ContentNode {
    node.extra_mut().extend(extra);
    node
}

fn image_node(image: &Image) -> ContentNode {
    ContentNode::Image {
        content: image.alt.clone(),
        metadata: ImageMeta {
            src: image.src.clone(),
            title: image.title.clone(),
            extra: Metadata::new(),
        },
    }
}

fn image_of(handle: &Handle) -> Image {
    Image {
        src: attribute(handle, "src").unwrap_or_default(),
        alt: attribute(handle, "alt").unwrap_or_default(),
        title: attribute(handle, "title"),
    }
}

fn sole_image(content: &[InlineContent]) -> Option<&Image> {
    match content {
        [InlineContent::Image(image)] => Some(image),
        _ => None,
    }
}

fn table_node(table: &Handle) -> Option<ContentNode> {
    let mut rows: Vec<Row> = Vec::new();
    collect_rows(table, false, &mut rows);
    if rows.is_empty() {
        return None;
    }

    let header_index = rows.iter().position(|(in_head, _)| *in_head).unwrap_or(0);
    let (_, header) = rows.remove(header_index);
    let alignments: Vec<TableCellAlignment> = header.iter().map(|(_, a)| *a).collect();
    let meta = TableMeta {
        headers: header.into_iter().map(|(text, _)| text).collect(),
        rows: rows
            .into_iter()
            .map(|(_, cells)| cells.into_iter().map(|(text, _)| text).collect())
            .collect(),
        alignments: if alignments.iter().all(|a| *a == TableCellAlignment::None) {
            Vec::new()
        } else {
            alignments
        },
        extra: Metadata::new(),
    };
    let node = ContentNode::Table { metadata: meta };
    Some(match node.validate() {
        Ok(()) => node,
        Err(err) => {
            tracing::warn!(%err, "malformed table imported as paragraph");
            ContentNode::paragraph(collapse_whitespace(&text_content(table)).trim().to_string())
        }
    })
}

type Row = (bool, Vec<(String, TableCellAlignment)>);

fn collect_rows(parent: &Handle, in_head: bool, rows: &mut Vec<Row>) {
    for (name, child) in child_elements(parent) {
        match name.as_str() {
            "thead" => collect_rows(&child, true, rows),
            "tbody" | "tfoot" => collect_rows(&child, false, rows),
            "tr" => {
                let cells = child_elements(&child)
                    .into_iter()
                    .filter(|(name, _)| name == "th" || name == "td")
                    .map(|(name, cell)| {
                        let header_cell = name == "th";
                        (inline_source(&cell), cell_alignment(&cell), header_cell)
                    })
                    .collect::<Vec<_>>();
                let all_th = !cells.is_empty() && cells.iter().all(|(_, _, th)| *th);
                rows.push((
                    in_head || (rows.is_empty() && all_th),
                    cells.into_iter().map(|(text, align, _)| (text, align)).collect(),
                ));
            }
            _ => {}
        }
    }
}

fn cell_alignment(cell: &Handle) -> TableCellAlignment {
    let from_style = attribute(cell, "style").and_then(|style| {
        style.split(';').find_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            (property.trim() == "text-align").then(|| value.trim().to_string())
        })
    });
    match from_style.or_else(|| attribute(cell, "align")).as_deref() {
        Some("left") => TableCellAlignment::Left,
        Some("center") => TableCellAlignment::Center,
        Some("right") => TableCellAlignment::Right,
        _ => TableCellAlignment::None,
    }
}

/// Inline Markdown for the inline content of an element.
fn inline_source(handle: &Handle) -> String {
    render_inline(&trim_inline(inline_of(handle)))
}

fn inline_of(handle: &Handle) -> Vec<InlineContent> {
    let mut content = Vec::new();
    for child in handle.children.borrow().iter() {
        collect_inline(child, &mut content);
    }
    content
}

fn collect_inline(handle: &Handle, content: &mut Vec<InlineContent>) {
    match &handle.data {
        NodeData::Text { contents } => {
            let text = collapse_whitespace(&contents.borrow());
            if !text.is_empty() {
                let needs_join = matches!(content.last(), Some(InlineContent::Text(last)) if last.ends_with(' '))
                    && text.starts_with(' ');
                push_text(content, if needs_join { &text[1..] } else { &text });
            }
        }
        NodeData::Element { name, .. } => {
            let tag = name.local.to_string();
            match tag.as_str() {
                "strong" | "b" => content.push(InlineContent::Bold(inline_of(handle))),
                "em" | "i" => content.push(InlineContent::Italic(inline_of(handle))),
                "del" | "s" | "strike" => {
                    content.push(InlineContent::Strikethrough(inline_of(handle)))
                }
                "code" => content.push(InlineContent::Code(text_content(handle))),
                "a" => content.push(InlineContent::Link {
                    url: attribute(handle, "href").unwrap_or_default(),
                    title: attribute(handle, "title"),
                    content: inline_of(handle),
                }),
                "img" => content.push(InlineContent::Image(image_of(handle))),
                "br" => content.push(InlineContent::LineBreak),
                "script" | "style" | "template" => {}
                _ => {
                    for child in handle.children.borrow().iter() {
                        collect_inline(child, content);
                    }
                }
            }
        }
        _ => {}
    }
}

/// Strip whitespace at the edges and around line breaks.
fn trim_inline(mut content: Vec<InlineContent>) -> Vec<InlineContent> {
    if let Some(InlineContent::Text(first)) = content.first_mut() {
        *first = first.trim_start().to_string();
    }
    if let Some(InlineContent::Text(last)) = content.last_mut() {
        *last = last.trim_end().to_string();
    }
    for index in 0..content.len() {
        if content[index] == InlineContent::LineBreak {
            if let Some(InlineContent::Text(before)) = index.checked_sub(1).and_then(|i| content.get_mut(i)) {
                *before = before.trim_end().to_string();
            }
            if let Some(InlineContent::Text(after)) = content.get_mut(index + 1) {
                *after = after.trim_start().to_string();
            }
        }
    }
    content.retain(|inline| !matches!(inline, InlineContent::Text(text) if text.is_empty()));
    while content.last() == Some(&InlineContent::LineBreak) {
        content.pop();
    }
    content
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

fn text_content(handle: &Handle) -> String {
    let mut text = String::new();
    write_text(handle, &mut text);
    text
}

fn write_text(handle: &Handle, out: &mut String) {
    match &handle.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        NodeData::Element { name, .. } if &*name.local == "br" => out.push('\n'),
        _ => {
            for child in handle.children.borrow().iter() {
                write_text(child, out);
            }
        }
    }
}

fn child_elements(handle: &Handle) -> Vec<(String, Handle)> {
    handle
        .children
        .borrow()
        .iter()
        .filter_map(|child| match &child.data {
            NodeData::Element { name, .. } => Some((name.local.to_string(), child.clone())),
            _ => None,
        })
        .collect()
}

fn find_element(parent: &Handle, tag: &str) -> Option<Handle> {
    child_elements(parent)
        .into_iter()
        .find(|(name, _)| name == tag)
        .map(|(_, handle)| handle)
}

fn find_descendant(parent: &Handle, tag: &str) -> Option<Handle> {
    for (name, child) in child_elements(parent) {
        if name == tag {
            return Some(child);
        }
        if let Some(found) = find_descendant(&child, tag) {
            return Some(found);
        }
    }
    None
}

fn attribute(handle: &Handle, key: &str) -> Option<String> {
    match &handle.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == key)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

fn has_class(handle: &Handle, class: &str) -> bool {
    attribute(handle, "class")
        .map(|classes| classes.split_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

/// Read `data-*` attributes back into node metadata.
fn data_attributes(handle: &Handle, reserved: &[&str]) -> Metadata {
    let mut extra = Metadata::new();
    if let NodeData::Element { attrs, .. } = &handle.data {
        for attr in attrs.borrow().iter() {
            let name: &str = &attr.name.local;
            if reserved.contains(&name) {
                continue;
            }
            if let Some(key) = name.strip_prefix("data-") {
                extra.insert(key.to_string(), attribute_value(&attr.value));
            }
        }
    }
    extra
}

/// Non-string values were written as compact JSON; anything else is a string.
fn attribute_value(raw: &str) -> serde_json::Value {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) if !value.is_string() && !value.is_null() && value.to_string() == raw => value,
        _ => serde_json::Value::String(raw.to_string()),
    }
}
