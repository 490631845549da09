//! Tests for the flat <-> nested IR conversion.

use nakamoto_babel::common::flat_to_nested::{events_to_tree, ConversionError};
use nakamoto_babel::common::nested_to_flat::tree_to_events;
use nakamoto_babel::ir::events::Event;
use nakamoto_babel::ir::nodes::*;

fn text(s: &str) -> InlineContent {
    InlineContent::Text(s.to_string())
}

fn create_test_tree() -> Document {
    Document {
        children: vec![
            DocNode::Heading(Heading {
                level: 1,
                content: vec![text("Season One")],
            }),
            DocNode::List(List {
                ordered: false,
                items: vec![
                    ListItem {
                        content: vec![text("Satoshi Dojo")],
                        children: vec![],
                    },
                    ListItem {
                        content: vec![text("Vitalik Dojo")],
                        children: vec![DocNode::Blockquote(Blockquote {
                            children: vec![DocNode::Paragraph(Paragraph {
                                content: vec![text("Nested quote")],
                            })],
                        })],
                    },
                ],
            }),
            DocNode::Paragraph(Paragraph {
                content: vec![
                    text("Final "),
                    InlineContent::Bold(vec![text("paragraph")]),
                ],
            }),
        ],
    }
}

#[test]
fn test_round_trip_conversion() {
    let original_tree = create_test_tree();

    // 1. Convert tree to events (nested -> flat)
    let events = tree_to_events(&original_tree);
    assert_eq!(events.first(), Some(&Event::StartDocument));
    assert_eq!(events.last(), Some(&Event::EndDocument));

    // 2. Convert events back to tree (flat -> nested)
    let rebuilt = events_to_tree(&events).unwrap();

    assert_eq!(rebuilt, original_tree);
}

#[test]
fn test_empty_event_stream() {
    assert_eq!(events_to_tree(&[]).unwrap(), Document::default());
    assert_eq!(
        events_to_tree(&[Event::StartDocument, Event::EndDocument]).unwrap(),
        Document::default()
    );
}

#[test]
fn test_mismatched_end() {
    let events = vec![
        Event::StartDocument,
        Event::StartParagraph,
        Event::EndHeading(1),
        Event::EndDocument,
    ];
    assert!(matches!(
        events_to_tree(&events),
        Err(ConversionError::MismatchedEvents { .. })
    ));
}

#[test]
fn test_inline_outside_block() {
    let events = vec![
        Event::StartDocument,
        Event::Inline(text("loose")),
        Event::EndDocument,
    ];
    assert!(matches!(
        events_to_tree(&events),
        Err(ConversionError::UnexpectedInline(_))
    ));
}

#[test]
fn test_list_item_outside_list() {
    let events = vec![
        Event::StartDocument,
        Event::StartListItem,
        Event::EndListItem,
        Event::EndDocument,
    ];
    assert!(matches!(
        events_to_tree(&events),
        Err(ConversionError::UnexpectedBlock(_))
    ));
}

#[test]
fn test_unclosed_containers() {
    let events = vec![Event::StartDocument, Event::StartBlockquote, Event::EndDocument];
    assert_eq!(
        events_to_tree(&events),
        Err(ConversionError::UnclosedContainers(1))
    );
}

#[test]
fn test_extra_events_after_end() {
    let events = vec![
        Event::StartDocument,
        Event::EndDocument,
        Event::StartParagraph,
    ];
    assert_eq!(events_to_tree(&events), Err(ConversionError::ExtraEvents));
}
