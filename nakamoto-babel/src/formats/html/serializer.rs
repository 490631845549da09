//! HTML serialization (IR → HTML export)
//!
//! Converts IR documents to an HTML fragment for the rich-text editor, or to
//! a standalone HTML5 page.
//! Pipeline: IR → Events → RcDom nodes → HTML string

use super::parser::{body_of, parse_dom, tag_name};
use crate::common::nested_to_flat::tree_to_events;
use crate::error::FormatError;
use crate::ir::events::Event;
use crate::ir::nodes::{plain_text, DocNode, Document, Image, InlineContent};
use html5ever::{
    ns, serialize, serialize::SerializeOpts, serialize::TraversalScope, Attribute, LocalName,
    QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::default::Default;
use std::rc::Rc;

/// Placeholder emitted for an empty document so the editor has a block to type into
pub const EMPTY_DOCUMENT: &str = "<p></p>";

/// Options for HTML serialization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HtmlOptions {
    /// Wrap the fragment in a complete HTML5 document
    pub standalone: bool,
    /// Title for standalone output. Defaults to the first heading.
    pub title: Option<String>,
}

impl HtmlOptions {
    pub fn standalone() -> Self {
        Self {
            standalone: true,
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// One top-level piece of output
enum Fragment {
    Node(Handle),
    /// Raw HTML from the source, emitted untouched
    Raw(String),
}

/// Serialize an IR document to HTML
pub fn serialize_to_html(doc: &Document, options: &HtmlOptions) -> Result<String, FormatError> {
    let events = tree_to_events(doc);
    let fragments = build_fragments(&events)?;

    let body = if fragments.is_empty() {
        EMPTY_DOCUMENT.to_string()
    } else {
        serialize_fragments(&fragments)?
    };

    if !options.standalone {
        return Ok(body);
    }

    let title = options
        .title
        .clone()
        .or_else(|| first_heading(doc))
        .unwrap_or_else(|| "Article".to_string());
    Ok(wrap_in_document(&body, &title))
}

/// Build HTML nodes from IR events
fn build_fragments(events: &[Event]) -> Result<Vec<Fragment>, FormatError> {
    let mut fragments = Vec::new();
    let mut stack: Vec<Handle> = Vec::new();

    for event in events {
        match event {
            Event::StartDocument | Event::EndDocument => {}

            Event::StartHeading(level) => {
                let tag = format!("h{}", (*level).clamp(1, 6));
                let heading = create_element(&tag, vec![]);
                attach(heading.clone(), &stack, &mut fragments);
                stack.push(heading);
            }

            Event::StartParagraph => {
                let paragraph = create_element("p", vec![]);
                attach(paragraph.clone(), &stack, &mut fragments);
                stack.push(paragraph);
            }

            Event::StartList { ordered } => {
                let list = create_element(if *ordered { "ol" } else { "ul" }, vec![]);
                attach(list.clone(), &stack, &mut fragments);
                stack.push(list);
            }

            Event::StartListItem => {
                let item = create_element("li", vec![]);
                attach(item.clone(), &stack, &mut fragments);
                stack.push(item);
            }

            Event::StartBlockquote => {
                let quote = create_element("blockquote", vec![]);
                attach(quote.clone(), &stack, &mut fragments);
                stack.push(quote);
            }

            Event::EndBlockquote => {
                let quote = close(&mut stack, "blockquote")?;
                tighten_blockquote(&quote);
            }

            Event::EndHeading(_) => {
                close(&mut stack, "heading")?;
            }
            Event::EndParagraph => {
                close(&mut stack, "paragraph")?;
            }
            Event::EndList => {
                close(&mut stack, "list")?;
            }
            Event::EndListItem => {
                close(&mut stack, "list item")?;
            }

            Event::StartCodeBlock(language) => {
                let pre = create_element("pre", vec![]);
                let class = language.as_ref().map(|lang| format!("language-{lang}"));
                let code = match &class {
                    Some(class) => create_element("code", vec![("class", class.as_str())]),
                    None => create_element("code", vec![]),
                };
                pre.children.borrow_mut().push(code.clone());
                attach(pre.clone(), &stack, &mut fragments);
                stack.push(pre);
                stack.push(code);
            }

            Event::EndCodeBlock => {
                close(&mut stack, "code block")?;
                close(&mut stack, "code block")?;
            }

            Event::Image(image) => {
                attach(create_image(image), &stack, &mut fragments);
            }

            Event::RawHtml(html) => match stack.last() {
                None => fragments.push(Fragment::Raw(html.trim().to_string())),
                Some(parent) => graft_raw_html(parent, html),
            },

            Event::Inline(inline) => {
                let parent = stack.last().ok_or_else(|| {
                    FormatError::SerializationError(
                        "Inline content outside of a block".to_string(),
                    )
                })?;
                add_inline_to_node(parent, inline);
            }
        }
    }

    if !stack.is_empty() {
        return Err(FormatError::SerializationError(format!(
            "{} element(s) left open at end of document",
            stack.len()
        )));
    }

    Ok(fragments)
}

/// Appends to the innermost open element, or starts a new top-level fragment.
fn attach(node: Handle, stack: &[Handle], fragments: &mut Vec<Fragment>) {
    match stack.last() {
        Some(parent) => parent.children.borrow_mut().push(node),
        None => fragments.push(Fragment::Node(node)),
    }
}

fn close(stack: &mut Vec<Handle>, what: &str) -> Result<Handle, FormatError> {
    stack
        .pop()
        .ok_or_else(|| FormatError::SerializationError(format!("Unbalanced {what} end")))
}

/// `<blockquote><p>text</p></blockquote>` becomes `<blockquote>text</blockquote>`.
fn tighten_blockquote(quote: &Handle) {
    let only_paragraph = {
        let children = quote.children.borrow();
        match children.as_slice() {
            [only] if tag_name(only) == Some("p") => Some(only.clone()),
            _ => None,
        }
    };
    if let Some(paragraph) = only_paragraph {
        let inner = std::mem::take(&mut *paragraph.children.borrow_mut());
        *quote.children.borrow_mut() = inner;
    }
}

/// Parses nested raw HTML and appends the resulting nodes to `parent`.
fn graft_raw_html(parent: &Handle, html: &str) {
    let dom = parse_dom(html);
    let body = body_of(&dom);
    // Detach before `dom` is dropped, which would empty the subtree.
    let nodes = std::mem::take(&mut *body.children.borrow_mut());
    parent.children.borrow_mut().extend(nodes);
}

fn add_inline_to_node(parent: &Handle, inline: &InlineContent) {
    match inline {
        InlineContent::Text(text) => {
            parent.children.borrow_mut().push(create_text(text));
        }

        InlineContent::Bold(children) => append_span(parent, "strong", vec![], children),
        InlineContent::Italic(children) => append_span(parent, "em", vec![], children),
        InlineContent::Underline(children) => append_span(parent, "u", vec![], children),

        InlineContent::Code(code_text) => {
            let code = create_element("code", vec![]);
            code.children.borrow_mut().push(create_text(code_text));
            parent.children.borrow_mut().push(code);
        }

        InlineContent::Link(link) => {
            append_span(parent, "a", vec![("href", &link.href)], &link.content)
        }

        InlineContent::Image(image) => {
            parent.children.borrow_mut().push(create_image(image));
        }
    }
}

fn append_span(parent: &Handle, tag: &str, attrs: Vec<(&str, &str)>, children: &[InlineContent]) {
    let element = create_element(tag, attrs);
    parent.children.borrow_mut().push(element.clone());
    for child in children {
        add_inline_to_node(&element, child);
    }
}

fn create_image(image: &Image) -> Handle {
    let mut attrs = vec![("src", image.src.as_str()), ("alt", image.alt.as_str())];
    if let Some(title) = &image.title {
        attrs.push(("title", title.as_str()));
    }
    create_element("img", attrs)
}

/// Create an HTML element with attributes
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

/// Create a text node
fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

/// Serialize top-level fragments, one per line
fn serialize_fragments(fragments: &[Fragment]) -> Result<String, FormatError> {
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    let mut parts = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        match fragment {
            Fragment::Raw(html) => parts.push(html.clone()),
            Fragment::Node(node) => {
                let mut output = Vec::new();
                let serializable = SerializableHandle::from(node.clone());
                serialize(&mut output, &serializable, opts.clone()).map_err(|e| {
                    FormatError::SerializationError(format!("HTML serialization failed: {e}"))
                })?;
                parts.push(String::from_utf8(output).map_err(|e| {
                    FormatError::SerializationError(format!("UTF-8 conversion failed: {e}"))
                })?);
            }
        }
    }

    Ok(parts.join("\n"))
}

fn first_heading(doc: &Document) -> Option<String> {
    doc.children.iter().find_map(|node| match node {
        DocNode::Heading(heading) => {
            let title = plain_text(&heading.content);
            (!title.trim().is_empty()).then(|| title.trim().to_string())
        }
        _ => None,
    })
}

/// Wrap the content in a complete HTML document
fn wrap_in_document(body_html: &str, title: &str) -> String {
    let escaped_title = html_escape(title);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <meta name="generator" content="nakamoto-babel">
  <title>{escaped_title}</title>
</head>
<body>
<article>
{body_html}
</article>
</body>
</html>"#
    )
}

/// Escape HTML special characters in text
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
