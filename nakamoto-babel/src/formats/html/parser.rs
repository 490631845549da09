//! HTML parsing (HTML → IR import)
//!
//! Pipeline: HTML string → html5ever → RcDom → Events → IR
//!
//! The input is usually a fragment produced by a rich-text editor, so the
//! walker starts at `<body>` and is lenient about structure: unknown tags are
//! unwrapped, loose inline content between blocks becomes a paragraph and
//! `<li><p>…</p></li>` wrappers are flattened into the item.

use crate::common::flat_to_nested::events_to_tree;
use crate::error::FormatError;
use crate::ir::events::Event;
use crate::ir::nodes::{push_text, Document, Image, InlineContent, Link};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

/// Tags whose content never reaches the document
const SKIPPED: &[&str] = &[
    "head", "script", "style", "template", "noscript", "iframe", "object", "svg", "button",
    "input", "select", "textarea",
];

/// Tags that only group other blocks
const CONTAINERS: &[&str] = &[
    "address",
    "article",
    "aside",
    "body",
    "center",
    "dd",
    "details",
    "dialog",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "header",
    "hgroup",
    "html",
    "li",
    "main",
    "nav",
    "section",
    "summary",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
];

/// Parse an HTML string to an IR document
pub fn parse_from_html(source: &str) -> Result<Document, FormatError> {
    let events = html_to_events(source);
    Ok(events_to_tree(&events)?)
}

/// Convert HTML source into a balanced IR event stream
pub fn html_to_events(source: &str) -> Vec<Event> {
    let mut events = vec![Event::StartDocument];
    if !source.trim().is_empty() {
        let dom = parse_dom(source);
        collect_blocks(&body_of(&dom), &mut events);
    }
    events.push(Event::EndDocument);
    events
}

/// Parses `source` as an HTML5 document. Fragments end up inside `<body>`.
pub(crate) fn parse_dom(source: &str) -> RcDom {
    parse_document(RcDom::default(), ParseOpts::default()).one(source)
}

/// Returns the `<body>` element of a parsed document.
///
/// Dropping an `RcDom` detaches every descendant, so the handle is only
/// useful while `dom` is alive.
pub(crate) fn body_of(dom: &RcDom) -> Handle {
    let html = find_child(&dom.document, "html");
    html.as_ref()
        .and_then(|html| find_child(html, "body"))
        .or(html)
        .unwrap_or_else(|| dom.document.clone())
}

fn find_child(node: &Handle, tag: &str) -> Option<Handle> {
    node.children
        .borrow()
        .iter()
        .find(|child| tag_name(child) == Some(tag))
        .cloned()
}

pub(crate) fn tag_name(node: &Node) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

fn attr(node: &Node, key: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attribute| &*attribute.name.local == key)
            .map(|attribute| attribute.value.to_string()),
        _ => None,
    }
}

fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    append_text(node, &mut out);
    out
}

fn append_text(node: &Handle, out: &mut String) {
    match &node.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        _ => {
            for child in node.children.borrow().iter() {
                append_text(child, out);
            }
        }
    }
}

fn heading_level(tag: &str) -> Option<usize> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Walks the children of a block container, emitting block events.
fn collect_blocks(node: &Handle, events: &mut Vec<Event>) {
    let mut run = Vec::new();

    for child in node.children.borrow().iter() {
        match tag_name(child) {
            None => run.extend(inline_of(child)),
            Some(tag) if is_block(tag) => {
                flush_run(&mut run, events);
                block_element(child, tag, events);
            }
            Some(_) => run.extend(inline_of(child)),
        }
    }

    flush_run(&mut run, events);
}

fn is_block(tag: &str) -> bool {
    heading_level(tag).is_some()
        || matches!(tag, "p" | "ul" | "ol" | "blockquote" | "pre" | "hr")
        || SKIPPED.contains(&tag)
        || CONTAINERS.contains(&tag)
}

fn block_element(node: &Handle, tag: &str, events: &mut Vec<Event>) {
    if let Some(level) = heading_level(tag) {
        let content = normalize_inlines(children_inlines(node));
        if !content.is_empty() {
            events.push(Event::StartHeading(level));
            events.extend(content.into_iter().map(Event::Inline));
            events.push(Event::EndHeading(level));
        }
        return;
    }

    match tag {
        "p" => {
            let mut run = children_inlines(node);
            flush_run(&mut run, events);
        }
        "ul" | "ol" => emit_list(node, tag == "ol", events),
        "blockquote" => {
            events.push(Event::StartBlockquote);
            collect_blocks(node, events);
            events.push(Event::EndBlockquote);
        }
        "pre" => emit_code_block(node, events),
        "hr" => {}
        t if SKIPPED.contains(&t) => {}
        _ => collect_blocks(node, events),
    }
}

/// Turns a run of loose inline content into a paragraph, or an image block
/// when the run holds nothing but one image.
fn flush_run(run: &mut Vec<InlineContent>, events: &mut Vec<Event>) {
    let content = normalize_inlines(std::mem::take(run));
    if content.is_empty() {
        return;
    }
    if let [InlineContent::Image(image)] = content.as_slice() {
        events.push(Event::Image(image.clone()));
        return;
    }
    events.push(Event::StartParagraph);
    events.extend(content.into_iter().map(Event::Inline));
    events.push(Event::EndParagraph);
}

struct PendingItem {
    content: Vec<InlineContent>,
    children: Vec<Event>,
}

fn emit_list(node: &Handle, ordered: bool, events: &mut Vec<Event>) {
    let mut items: Vec<PendingItem> = Vec::new();

    for child in node.children.borrow().iter() {
        match tag_name(child) {
            Some("li") => items.push(list_item(child)),
            Some(tag @ ("ul" | "ol")) => {
                if items.is_empty() {
                    items.push(PendingItem {
                        content: Vec::new(),
                        children: Vec::new(),
                    });
                }
                if let Some(last) = items.last_mut() {
                    emit_list(child, tag == "ol", &mut last.children);
                }
            }
            Some(tag) if SKIPPED.contains(&tag) => {}
            Some(_) => {
                let item = list_item(child);
                if !item.content.is_empty() || !item.children.is_empty() {
                    items.push(item);
                }
            }
            None => {}
        }
    }

    if items.is_empty() {
        return;
    }

    events.push(Event::StartList { ordered });
    for item in items {
        events.push(Event::StartListItem);
        events.extend(item.content.into_iter().map(Event::Inline));
        events.extend(item.children);
        events.push(Event::EndListItem);
    }
    events.push(Event::EndList);
}

fn list_item(node: &Handle) -> PendingItem {
    let mut content = Vec::new();
    let mut children = Vec::new();
    collect_item(node, &mut content, &mut children);
    PendingItem {
        content: normalize_inlines(content),
        children,
    }
}

fn collect_item(node: &Handle, content: &mut Vec<InlineContent>, children: &mut Vec<Event>) {
    for child in node.children.borrow().iter() {
        match tag_name(child) {
            Some("p") => {
                if !content.is_empty() {
                    push_text(content, " ");
                }
                content.extend(children_inlines(child));
            }
            Some("div") => collect_item(child, content, children),
            Some(tag) if is_block(tag) => block_element(child, tag, children),
            _ => content.extend(inline_of(child)),
        }
    }
}

fn emit_code_block(node: &Handle, events: &mut Vec<Event>) {
    let code = find_child(node, "code");
    let language = code
        .as_deref()
        .and_then(language_of)
        .or_else(|| language_of(node));

    let mut content = text_content(node);
    if content.ends_with('\n') {
        content.pop();
    }

    events.push(Event::StartCodeBlock(language));
    events.push(Event::Inline(InlineContent::Text(content)));
    events.push(Event::EndCodeBlock);
}

fn language_of(node: &Node) -> Option<String> {
    let from_class = attr(node, "class").and_then(|class| {
        class.split_whitespace().find_map(|name| {
            name.strip_prefix("language-")
                .or_else(|| name.strip_prefix("lang-"))
                .filter(|lang| !lang.is_empty())
                .map(str::to_string)
        })
    });
    from_class.or_else(|| attr(node, "data-language").filter(|lang| !lang.is_empty()))
}

fn children_inlines(node: &Handle) -> Vec<InlineContent> {
    node.children.borrow().iter().flat_map(inline_of).collect()
}

/// Converts one DOM node in inline context.
fn inline_of(node: &Handle) -> Vec<InlineContent> {
    let tag = match &node.data {
        NodeData::Text { contents } => {
            return vec![InlineContent::Text(contents.borrow().to_string())]
        }
        NodeData::Element { name, .. } => &*name.local,
        _ => return Vec::new(),
    };

    match tag {
        "strong" | "b" => vec![InlineContent::Bold(children_inlines(node))],
        "em" | "i" => vec![InlineContent::Italic(children_inlines(node))],
        "u" | "ins" => vec![InlineContent::Underline(children_inlines(node))],
        "code" | "kbd" | "samp" | "tt" => vec![InlineContent::Code(text_content(node))],
        "a" => match attr(node, "href").filter(|href| !href.trim().is_empty()) {
            Some(href) => vec![InlineContent::Link(Link {
                href: href.trim().to_string(),
                content: children_inlines(node),
            })],
            None => children_inlines(node),
        },
        "img" => match attr(node, "src").filter(|src| !src.trim().is_empty()) {
            Some(src) => vec![InlineContent::Image(Image {
                src: src.trim().to_string(),
                alt: attr(node, "alt").unwrap_or_default(),
                title: attr(node, "title").filter(|title| !title.is_empty()),
            })],
            None => Vec::new(),
        },
        "br" => vec![InlineContent::Text(" ".to_string())],
        t if SKIPPED.contains(&t) => Vec::new(),
        _ => children_inlines(node),
    }
}

/// Collapses whitespace the way a browser renders it and drops empty spans.
pub(crate) fn normalize_inlines(content: Vec<InlineContent>) -> Vec<InlineContent> {
    let mut prev_space = true;
    let mut content = collapse_whitespace(content, &mut prev_space);
    trim_trailing(&mut content);
    prune(content)
}

fn collapse_whitespace(content: Vec<InlineContent>, prev_space: &mut bool) -> Vec<InlineContent> {
    content
        .into_iter()
        .map(|inline| match inline {
            InlineContent::Text(text) => {
                let mut out = String::with_capacity(text.len());
                for c in text.chars() {
                    if c.is_whitespace() {
                        if !*prev_space {
                            out.push(' ');
                            *prev_space = true;
                        }
                    } else {
                        out.push(c);
                        *prev_space = false;
                    }
                }
                InlineContent::Text(out)
            }
            InlineContent::Bold(children) => {
                InlineContent::Bold(collapse_whitespace(children, prev_space))
            }
            InlineContent::Italic(children) => {
                InlineContent::Italic(collapse_whitespace(children, prev_space))
            }
            InlineContent::Underline(children) => {
                InlineContent::Underline(collapse_whitespace(children, prev_space))
            }
            InlineContent::Link(Link { href, content }) => InlineContent::Link(Link {
                href,
                content: collapse_whitespace(content, prev_space),
            }),
            other => {
                *prev_space = false;
                other
            }
        })
        .collect()
}

/// Trims trailing whitespace from the last text in the run. Returns true once
/// non-whitespace content has been reached.
fn trim_trailing(content: &mut Vec<InlineContent>) -> bool {
    while let Some(last) = content.last_mut() {
        let done = match last {
            InlineContent::Text(text) => {
                let trimmed_len = text.trim_end().len();
                text.truncate(trimmed_len);
                !text.is_empty()
            }
            InlineContent::Bold(children)
            | InlineContent::Italic(children)
            | InlineContent::Underline(children) => trim_trailing(children),
            InlineContent::Link(link) => trim_trailing(&mut link.content),
            InlineContent::Code(_) | InlineContent::Image(_) => true,
        };
        if done {
            return true;
        }
        content.pop();
    }
    false
}

fn prune(content: Vec<InlineContent>) -> Vec<InlineContent> {
    let mut out = Vec::new();
    for inline in content {
        match inline {
            InlineContent::Text(text) => push_text(&mut out, &text),
            InlineContent::Bold(children) => {
                let children = prune(children);
                if !children.is_empty() {
                    out.push(InlineContent::Bold(children));
                }
            }
            InlineContent::Italic(children) => {
                let children = prune(children);
                if !children.is_empty() {
                    out.push(InlineContent::Italic(children));
                }
            }
            InlineContent::Underline(children) => {
                let children = prune(children);
                if !children.is_empty() {
                    out.push(InlineContent::Underline(children));
                }
            }
            InlineContent::Link(Link { href, content }) => {
                let content = prune(content);
                if !content.is_empty() {
                    out.push(InlineContent::Link(Link { href, content }));
                }
            }
            InlineContent::Code(code) => {
                if !code.is_empty() {
                    out.push(InlineContent::Code(code));
                }
            }
            image @ InlineContent::Image(_) => out.push(image),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::nodes::{Blockquote, CodeBlock, DocNode, Heading, List, ListItem, Paragraph};

    fn text(s: &str) -> InlineContent {
        InlineContent::Text(s.to_string())
    }

    fn parse(html: &str) -> Vec<DocNode> {
        parse_from_html(html).unwrap().children
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("   \n").is_empty());
        assert!(parse("<p></p>").is_empty());
    }

    #[test]
    fn test_heading_and_paragraph() {
        assert_eq!(
            parse("<h1>Title</h1>\n<p>Some <strong>bold</strong> text.</p>"),
            vec![
                DocNode::Heading(Heading {
                    level: 1,
                    content: vec![text("Title")]
                }),
                DocNode::Paragraph(Paragraph {
                    content: vec![
                        text("Some "),
                        InlineContent::Bold(vec![text("bold")]),
                        text(" text."),
                    ]
                }),
            ]
        );
    }

    #[test]
    fn test_whitespace_collapses() {
        assert_eq!(
            parse("<p>\n  spread   <em> out </em>\n  words  </p>"),
            vec![DocNode::Paragraph(Paragraph {
                content: vec![
                    text("spread "),
                    InlineContent::Italic(vec![text("out ")]),
                    text("words"),
                ]
            })]
        );
    }

    #[test]
    fn test_inline_tags() {
        assert_eq!(
            parse("<p><b>b</b><i>i</i><u>u</u><code>a  b</code><br>x</p>"),
            vec![DocNode::Paragraph(Paragraph {
                content: vec![
                    InlineContent::Bold(vec![text("b")]),
                    InlineContent::Italic(vec![text("i")]),
                    InlineContent::Underline(vec![text("u")]),
                    InlineContent::Code("a  b".to_string()),
                    text(" x"),
                ]
            })]
        );
    }

    #[test]
    fn test_lists_with_paragraph_wrappers() {
        assert_eq!(
            parse("<ol><li><p>first</p></li><li><p>second</p><ul><li>inner</li></ul></li></ol>"),
            vec![DocNode::List(List {
                ordered: true,
                items: vec![
                    ListItem {
                        content: vec![text("first")],
                        children: vec![],
                    },
                    ListItem {
                        content: vec![text("second")],
                        children: vec![DocNode::List(List {
                            ordered: false,
                            items: vec![ListItem {
                                content: vec![text("inner")],
                                children: vec![],
                            }],
                        })],
                    },
                ],
            })]
        );
    }

    #[test]
    fn test_blockquote_loose_text() {
        assert_eq!(
            parse("<blockquote>quoted <em>words</em></blockquote>"),
            vec![DocNode::Blockquote(Blockquote {
                children: vec![DocNode::Paragraph(Paragraph {
                    content: vec![text("quoted "), InlineContent::Italic(vec![text("words")])]
                })]
            })]
        );
    }

    #[test]
    fn test_code_block_language() {
        assert_eq!(
            parse("<pre><code class=\"language-rust\">fn main() {}\n</code></pre>"),
            vec![DocNode::CodeBlock(CodeBlock {
                language: Some("rust".to_string()),
                content: "fn main() {}".to_string(),
            })]
        );
    }

    #[test]
    fn test_link_and_image() {
        assert_eq!(
            parse("<p><a href=\"https://nakamoto.gg\">home</a> <a>plain</a></p><img src=\"b.png\" alt=\"Banner\">"),
            vec![
                DocNode::Paragraph(Paragraph {
                    content: vec![
                        InlineContent::Link(Link {
                            href: "https://nakamoto.gg".to_string(),
                            content: vec![text("home")],
                        }),
                        text(" plain"),
                    ]
                }),
                DocNode::Image(Image {
                    src: "b.png".to_string(),
                    alt: "Banner".to_string(),
                    title: None,
                }),
            ]
        );
    }

    #[test]
    fn test_unknown_tags_unwrapped_and_scripts_dropped() {
        assert_eq!(
            parse("<div><span class=\"x\">kept</span><script>alert(1)</script></div><!-- note -->"),
            vec![DocNode::Paragraph(Paragraph {
                content: vec![text("kept")]
            })]
        );
    }

    #[test]
    fn test_entities_decoded() {
        assert_eq!(
            parse("<p>Fish &amp; chips &lt;3</p>"),
            vec![DocNode::Paragraph(Paragraph {
                content: vec![text("Fish & chips <3")]
            })]
        );
    }

    #[test]
    fn test_full_document_uses_body() {
        assert_eq!(
            parse("<!DOCTYPE html><html><head><title>T</title></head><body><p>x</p></body></html>"),
            vec![DocNode::Paragraph(Paragraph {
                content: vec![text("x")]
            })]
        );
    }
}
