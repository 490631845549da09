//! Converts a flat event stream back to a nested IR tree structure.
//!
//! # The High-Level Concept
//!
//! The algorithm uses a stack to keep track of the current nesting level. The
//! stack acts as a memory of "open" containers. When we encounter a `Start`
//! event for a container (like a list or a blockquote), we push it onto the
//! stack, making it the new "current" container. When we see its
//! corresponding `End` event, we pop it off and attach it to its parent.
//!
//! # The Algorithm
//!
//! 1. **Initialization:** push the root `Document` onto the stack.
//! 2. **`Start` events:** push a new, empty stack node.
//! 3. **Content events (`Inline`):** add the content to the top of the stack.
//!    Inline content is only accepted by headings, paragraphs, list items and
//!    code blocks.
//! 4. **`End` events:** pop the node, validate that it matches the event and
//!    attach it to the new top of the stack. Only list items may sit directly
//!    inside a list.
//! 5. **Completion:** after `EndDocument` the stack must be empty and no
//!    events may follow.

use crate::ir::events::Event;
use crate::ir::nodes::*;

/// Error type for flat-to-nested conversion
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// Stack was empty when trying to pop
    UnexpectedEnd(String),
    /// Mismatched start/end events
    MismatchedEvents { expected: String, found: String },
    /// Unexpected inline content in wrong context
    UnexpectedInline(String),
    /// Block placed inside a container that cannot hold it
    UnexpectedBlock(String),
    /// Events remaining after document end
    ExtraEvents,
    /// Stack not empty at end (unclosed containers)
    UnclosedContainers(usize),
}

impl std::fmt::Display for ConversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversionError::UnexpectedEnd(msg) => write!(f, "Unexpected end event: {msg}"),
            ConversionError::MismatchedEvents { expected, found } => {
                write!(f, "Mismatched events: expected {expected}, found {found}")
            }
            ConversionError::UnexpectedInline(msg) => {
                write!(f, "Unexpected inline content: {msg}")
            }
            ConversionError::UnexpectedBlock(msg) => write!(f, "Unexpected block: {msg}"),
            ConversionError::ExtraEvents => write!(f, "Extra events after document end"),
            ConversionError::UnclosedContainers(count) => {
                write!(f, "Unclosed containers: {count} nodes remain on stack")
            }
        }
    }
}

impl std::error::Error for ConversionError {}

/// Represents a node being built on the stack
#[derive(Debug)]
enum StackNode {
    Document(Vec<DocNode>),
    Heading {
        level: usize,
        content: Vec<InlineContent>,
    },
    Paragraph(Vec<InlineContent>),
    List {
        items: Vec<ListItem>,
        ordered: bool,
    },
    ListItem {
        content: Vec<InlineContent>,
        children: Vec<DocNode>,
    },
    Blockquote(Vec<DocNode>),
    CodeBlock {
        language: Option<String>,
        content: String,
    },
}

impl StackNode {
    fn name(&self) -> &'static str {
        match self {
            StackNode::Document(_) => "Document",
            StackNode::Heading { .. } => "Heading",
            StackNode::Paragraph(_) => "Paragraph",
            StackNode::List { .. } => "List",
            StackNode::ListItem { .. } => "ListItem",
            StackNode::Blockquote(_) => "Blockquote",
            StackNode::CodeBlock { .. } => "CodeBlock",
        }
    }

    fn push_inline(&mut self, inline: InlineContent) -> Result<(), ConversionError> {
        match self {
            StackNode::Heading { content, .. }
            | StackNode::Paragraph(content)
            | StackNode::ListItem { content, .. } => {
                content.push(inline);
                Ok(())
            }
            StackNode::CodeBlock { content, .. } => match inline {
                InlineContent::Text(text) => {
                    content.push_str(&text);
                    Ok(())
                }
                other => Err(ConversionError::UnexpectedInline(format!(
                    "{other:?} inside CodeBlock"
                ))),
            },
            other => Err(ConversionError::UnexpectedInline(format!(
                "inline content directly inside {}",
                other.name()
            ))),
        }
    }

    fn push_block(&mut self, block: DocNode) -> Result<(), ConversionError> {
        match self {
            StackNode::Document(children)
            | StackNode::Blockquote(children)
            | StackNode::ListItem { children, .. } => {
                children.push(block);
                Ok(())
            }
            other => Err(ConversionError::UnexpectedBlock(format!(
                "block inside {}",
                other.name()
            ))),
        }
    }
}

/// Converts a flat event stream into a `Document` tree.
pub fn events_to_tree(events: &[Event]) -> Result<Document, ConversionError> {
    let mut iter = events.iter();

    match iter.next() {
        Some(Event::StartDocument) => {}
        Some(other) => {
            return Err(ConversionError::MismatchedEvents {
                expected: "StartDocument".to_string(),
                found: format!("{other:?}"),
            })
        }
        None => return Ok(Document::default()),
    }

    let mut stack: Vec<StackNode> = vec![StackNode::Document(Vec::new())];
    let mut finished: Option<Document> = None;

    for event in iter {
        if finished.is_some() {
            return Err(ConversionError::ExtraEvents);
        }

        match event {
            Event::StartDocument => {
                return Err(ConversionError::MismatchedEvents {
                    expected: "block event".to_string(),
                    found: "StartDocument".to_string(),
                })
            }
            Event::EndDocument => {
                if stack.len() != 1 {
                    return Err(ConversionError::UnclosedContainers(stack.len() - 1));
                }
                match stack.pop() {
                    Some(StackNode::Document(children)) => {
                        finished = Some(Document { children });
                    }
                    _ => {
                        return Err(ConversionError::UnexpectedEnd("EndDocument".to_string()))
                    }
                }
            }
            Event::StartHeading(level) => stack.push(StackNode::Heading {
                level: *level,
                content: Vec::new(),
            }),
            Event::StartParagraph => stack.push(StackNode::Paragraph(Vec::new())),
            Event::StartList { ordered } => stack.push(StackNode::List {
                items: Vec::new(),
                ordered: *ordered,
            }),
            Event::StartListItem => {
                if !matches!(stack.last(), Some(StackNode::List { .. })) {
                    return Err(ConversionError::UnexpectedBlock(
                        "ListItem outside of a List".to_string(),
                    ));
                }
                stack.push(StackNode::ListItem {
                    content: Vec::new(),
                    children: Vec::new(),
                });
            }
            Event::StartBlockquote => stack.push(StackNode::Blockquote(Vec::new())),
            Event::StartCodeBlock(language) => stack.push(StackNode::CodeBlock {
                language: language.clone(),
                content: String::new(),
            }),
            Event::EndHeading(_) => {
                let node = pop_expected(&mut stack, "Heading")?;
                if let StackNode::Heading { level, content } = node {
                    attach(&mut stack, DocNode::Heading(Heading { level, content }))?;
                }
            }
            Event::EndParagraph => {
                if let StackNode::Paragraph(content) = pop_expected(&mut stack, "Paragraph")? {
                    attach(&mut stack, DocNode::Paragraph(Paragraph { content }))?;
                }
            }
            Event::EndList => {
                if let StackNode::List { items, ordered } = pop_expected(&mut stack, "List")? {
                    attach(&mut stack, DocNode::List(List { items, ordered }))?;
                }
            }
            Event::EndListItem => {
                if let StackNode::ListItem { content, children } =
                    pop_expected(&mut stack, "ListItem")?
                {
                    match stack.last_mut() {
                        Some(StackNode::List { items, .. }) => {
                            items.push(ListItem { content, children })
                        }
                        _ => {
                            return Err(ConversionError::UnexpectedEnd(
                                "ListItem without an enclosing List".to_string(),
                            ))
                        }
                    }
                }
            }
            Event::EndBlockquote => {
                if let StackNode::Blockquote(children) = pop_expected(&mut stack, "Blockquote")? {
                    attach(&mut stack, DocNode::Blockquote(Blockquote { children }))?;
                }
            }
            Event::EndCodeBlock => {
                if let StackNode::CodeBlock { language, content } =
                    pop_expected(&mut stack, "CodeBlock")?
                {
                    attach(&mut stack, DocNode::CodeBlock(CodeBlock { language, content }))?;
                }
            }
            Event::Image(image) => attach(&mut stack, DocNode::Image(image.clone()))?,
            Event::RawHtml(html) => attach(&mut stack, DocNode::RawHtml(html.clone()))?,
            Event::Inline(inline) => match stack.last_mut() {
                Some(top) => top.push_inline(inline.clone())?,
                None => return Err(ConversionError::UnexpectedInline(format!("{inline:?}"))),
            },
        }
    }

    finished.ok_or(ConversionError::UnclosedContainers(stack.len()))
}

fn pop_expected(stack: &mut Vec<StackNode>, expected: &str) -> Result<StackNode, ConversionError> {
    // The root document is only ever popped by EndDocument.
    if stack.len() <= 1 {
        return Err(ConversionError::UnexpectedEnd(format!(
            "End{expected} with no open {expected}"
        )));
    }
    let node = stack
        .pop()
        .ok_or_else(|| ConversionError::UnexpectedEnd(expected.to_string()))?;
    if node.name() != expected {
        return Err(ConversionError::MismatchedEvents {
            expected: node.name().to_string(),
            found: expected.to_string(),
        });
    }
    Ok(node)
}

fn attach(stack: &mut [StackNode], block: DocNode) -> Result<(), ConversionError> {
    match stack.last_mut() {
        Some(parent) => parent.push_block(block),
        None => Err(ConversionError::UnexpectedBlock(
            "block after the document was closed".to_string(),
        )),
    }
}
