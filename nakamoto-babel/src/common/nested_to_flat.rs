//! Converts a nested IR tree structure into a flat event stream.
//!
//! # The Algorithm
//!
//! Traversing the document in pre-order lets us emit a sequence of
//! start/content/end events that can later be reassembled into the original
//! tree:
//!
//! 1. Containers emit their `Start*` event, then their inline content, then
//!    recurse into child blocks, then emit the matching `End*` event.
//! 2. Inline runs become one `Inline` event per top-level inline node.
//! 3. Leaf blocks (images, raw HTML) become a single event.
//!
//! This mirrors the reverse process performed in `flat_to_nested`.

use crate::ir::events::Event;
use crate::ir::nodes::{
    Blockquote, CodeBlock, DocNode, Document, Heading, InlineContent, List, ListItem, Paragraph,
};

/// Converts a `Document` to a flat vector of `Event`s.
pub fn tree_to_events(doc: &Document) -> Vec<Event> {
    let mut events = vec![Event::StartDocument];
    for child in &doc.children {
        walk_node(child, &mut events);
    }
    events.push(Event::EndDocument);
    events
}

fn walk_node(node: &DocNode, events: &mut Vec<Event>) {
    match node {
        DocNode::Heading(Heading { level, content }) => {
            events.push(Event::StartHeading(*level));
            emit_inlines(content, events);
            events.push(Event::EndHeading(*level));
        }
        DocNode::Paragraph(Paragraph { content }) => {
            events.push(Event::StartParagraph);
            emit_inlines(content, events);
            events.push(Event::EndParagraph);
        }
        DocNode::List(List { items, ordered }) => {
            events.push(Event::StartList { ordered: *ordered });
            for item in items {
                walk_list_item(item, events);
            }
            events.push(Event::EndList);
        }
        DocNode::Blockquote(Blockquote { children }) => {
            events.push(Event::StartBlockquote);
            for child in children {
                walk_node(child, events);
            }
            events.push(Event::EndBlockquote);
        }
        DocNode::CodeBlock(CodeBlock { language, content }) => {
            events.push(Event::StartCodeBlock(language.clone()));
            events.push(Event::Inline(InlineContent::Text(content.clone())));
            events.push(Event::EndCodeBlock);
        }
        DocNode::Image(image) => events.push(Event::Image(image.clone())),
        DocNode::RawHtml(html) => events.push(Event::RawHtml(html.clone())),
    }
}

fn walk_list_item(item: &ListItem, events: &mut Vec<Event>) {
    events.push(Event::StartListItem);
    emit_inlines(&item.content, events);
    for child in &item.children {
        walk_node(child, events);
    }
    events.push(Event::EndListItem);
}

fn emit_inlines(content: &[InlineContent], events: &mut Vec<Event>) {
    for inline in content {
        events.push(Event::Inline(inline.clone()));
    }
}
