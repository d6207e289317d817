//! HTML serialization (UnifiedContent → HTML export)
//!
//! Pipeline: content nodes → RcDom → HTML string.

use crate::error::FormatError;
use crate::formats::html::HtmlTheme;
use crate::ir::inline::{parse_inline, InlineContent};
use crate::ir::nodes::{ContentNode, Metadata, TableCellAlignment, UnifiedContent};
use html5ever::{
    ns, serialize, serialize::SerializeOpts, serialize::TraversalScope, Attribute, LocalName,
    QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::default::Default;
use std::rc::Rc;

/// Options for HTML serialization
#[derive(Debug, Clone, Default)]
pub struct HtmlOptions {
    /// CSS theme to use
    pub theme: HtmlTheme,
    /// Optional custom CSS to append after the baseline and theme CSS
    pub custom_css: Option<String>,
    /// Emit only the body fragment, without the document wrapper
    pub fragment: bool,
}

impl HtmlOptions {
    pub fn new(theme: HtmlTheme) -> Self {
        Self {
            theme,
            ..Default::default()
        }
    }

    pub fn with_custom_css(mut self, css: String) -> Self {
        self.custom_css = Some(css);
        self
    }
}

/// Serialize a document to a standalone HTML page with the given theme
pub fn serialize_to_html(doc: &UnifiedContent, theme: HtmlTheme) -> Result<String, FormatError> {
    serialize_to_html_with_options(doc, &HtmlOptions::new(theme))
}

/// Serialize a document to HTML with full options
pub fn serialize_to_html_with_options(
    doc: &UnifiedContent,
    options: &HtmlOptions,
) -> Result<String, FormatError> {
    let body = serialize_fragment(&doc.content)?;
    if options.fragment {
        return Ok(body);
    }
    let title = doc
        .metadata
        .title
        .clone()
        .unwrap_or_else(|| "Untitled review".to_string());
    Ok(wrap_in_document(&body, &title, options))
}

/// Serialize nodes to an HTML body fragment, one block element per line.
///
/// This is the markup the traditional editor works on.
pub fn serialize_fragment(nodes: &[ContentNode]) -> Result<String, FormatError> {
    let mut blocks = Vec::with_capacity(nodes.len());
    for node in nodes {
        blocks.push(serialize_handle(&build_block(node))?);
    }
    Ok(blocks.join("\n"))
}

fn build_block(node: &ContentNode) -> Handle {
    let element = match node {
        ContentNode::Paragraph { content, .. } => {
            let p = create_element("p", vec![("class", "folio-paragraph")]);
            append_inline_source(&p, content);
            p
        }

        ContentNode::Heading { content, metadata } => {
            let tag = format!("h{}", metadata.level.get());
            let heading = create_element(&tag, vec![("class", "folio-heading")]);
            append_inline_source(&heading, content);
            heading
        }

        ContentNode::List { metadata } => {
            let tag = if metadata.ordered { "ol" } else { "ul" };
            let list = create_element(tag, vec![("class", "folio-list")]);
            for item in &metadata.items {
                let li = create_element("li", vec![]);
                append_inline_source(&li, item);
                append_child(&list, li);
            }
            list
        }

        ContentNode::Table { metadata } => {
            let table = create_element("table", vec![("class", "folio-table")]);
            let align_of = |index: usize| {
                metadata
                    .alignments
                    .get(index)
                    .copied()
                    .unwrap_or_default()
            };

            let thead = create_element("thead", vec![]);
            let header_row = create_element("tr", vec![]);
            for (index, header) in metadata.headers.iter().enumerate() {
                append_child(&header_row, table_cell("th", header, align_of(index)));
            }
            append_child(&thead, header_row);
            append_child(&table, thead);

            let tbody = create_element("tbody", vec![]);
            for row in &metadata.rows {
                let tr = create_element("tr", vec![]);
                for (index, cell) in row.iter().enumerate() {
                    append_child(&tr, table_cell("td", cell, align_of(index)));
                }
                append_child(&tbody, tr);
            }
            append_child(&table, tbody);
            table
        }

        ContentNode::Image { content, metadata } => {
            let figure = create_element("figure", vec![("class", "folio-image")]);
            let mut attrs = vec![("src", metadata.src.as_str()), ("alt", content.as_str())];
            if let Some(title) = &metadata.title {
                attrs.push(("title", title.as_str()));
            }
            append_child(&figure, create_element("img", attrs));
            if !content.is_empty() {
                let caption = create_element("figcaption", vec![]);
                append_child(&caption, create_text(content));
                append_child(&figure, caption);
            }
            figure
        }

        ContentNode::Code { content, metadata } => {
            let mut pre_attrs = vec![("class", "folio-code")];
            let class;
            let mut code_attrs = vec![];
            if let Some(language) = &metadata.language {
                pre_attrs.push(("data-language", language.as_str()));
                class = format!("language-{language}");
                code_attrs.push(("class", class.as_str()));
            }
            let pre = create_element("pre", pre_attrs);
            let code = create_element("code", code_attrs);
            append_child(&code, create_text(content));
            append_child(&pre, code);
            pre
        }

        ContentNode::Custom { content, metadata } => {
            let div = create_element(
                "div",
                vec![("class", "folio-custom"), ("data-kind", metadata.kind.as_str())],
            );
            append_child(&div, create_text(content));
            div
        }
    };

    add_data_attributes(&element, node.extra());
    element
}

fn table_cell(tag: &str, source: &str, align: TableCellAlignment) -> Handle {
    let style = match align {
        TableCellAlignment::Left => Some("text-align: left"),
        TableCellAlignment::Center => Some("text-align: center"),
        TableCellAlignment::Right => Some("text-align: right"),
        TableCellAlignment::None => None,
    };
    let cell = create_element(tag, style.map(|s| vec![("style", s)]).unwrap_or_default());
    append_inline_source(&cell, source);
    cell
}

/// Write extra metadata as `data-*` attributes.
fn add_data_attributes(element: &Handle, extra: &Metadata) {
    if let NodeData::Element { attrs, .. } = &element.data {
        let mut attrs = attrs.borrow_mut();
        for (key, value) in extra {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            attrs.push(Attribute {
                name: QualName::new(None, ns!(), LocalName::from(format!("data-{key}"))),
                value: text.into(),
            });
        }
    }
}

fn append_inline_source(parent: &Handle, source: &str) {
    for inline in parse_inline(source) {
        add_inline_to_node(parent, &inline);
    }
}

fn add_inline_to_node(parent: &Handle, inline: &InlineContent) {
    match inline {
        InlineContent::Text(text) => append_child(parent, create_text(text)),
        InlineContent::Bold(children) => wrap_inline(parent, "strong", vec![], children),
        InlineContent::Italic(children) => wrap_inline(parent, "em", vec![], children),
        InlineContent::Strikethrough(children) => wrap_inline(parent, "del", vec![], children),
        InlineContent::Code(code) => {
            let element = create_element("code", vec![]);
            append_child(&element, create_text(code));
            append_child(parent, element);
        }
        InlineContent::Link {
            url,
            title,
            content,
        } => {
            let mut attrs = vec![("href", url.as_str())];
            if let Some(title) = title {
                attrs.push(("title", title.as_str()));
            }
            wrap_inline(parent, "a", attrs, content);
        }
        InlineContent::Image(image) => {
            let mut attrs = vec![("src", image.src.as_str()), ("alt", image.alt.as_str())];
            if let Some(title) = &image.title {
                attrs.push(("title", title.as_str()));
            }
            append_child(parent, create_element("img", attrs));
        }
        InlineContent::LineBreak => append_child(parent, create_element("br", vec![])),
        // Raw inline HTML is shown as text; it is never injected into the DOM.
        InlineContent::Html(html) => append_child(parent, create_text(html)),
    }
}

fn wrap_inline(parent: &Handle, tag: &str, attrs: Vec<(&str, &str)>, children: &[InlineContent]) {
    let element = create_element(tag, attrs);
    for child in children {
        add_inline_to_node(&element, child);
    }
    append_child(parent, element);
}

fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

fn serialize_handle(handle: &Handle) -> Result<String, FormatError> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };
    let serializable = SerializableHandle::from(handle.clone());
    serialize(&mut output, &serializable, opts).map_err(|e| {
        FormatError::SerializationError(format!("HTML serialization failed: {e}"))
    })?;
    String::from_utf8(output)
        .map_err(|e| FormatError::SerializationError(format!("UTF-8 conversion failed: {e}")))
}

fn wrap_in_document(body_html: &str, title: &str, options: &HtmlOptions) -> String {
    let baseline_css = include_str!("../../../css/baseline.css");
    let theme_css = match options.theme {
        HtmlTheme::Serif => include_str!("../../../css/themes/theme-serif.css"),
        HtmlTheme::Modern => include_str!("../../../css/themes/theme-modern.css"),
    };
    let custom_css = options.custom_css.as_deref().unwrap_or("");
    let escaped_title = html_escape(title);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <meta name="generator" content="folio">
  <title>{escaped_title}</title>
  <style>
{baseline_css}
{theme_css}
{custom_css}
  </style>
</head>
<body>
<article class="folio-document">
{body_html}
</article>
</body>
</html>
"#
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
