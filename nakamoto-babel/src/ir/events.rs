//! Defines the flat event stream representation of a document.

use crate::ir::nodes::{Image, InlineContent};

/// Represents a single event in the document stream.
///
/// This enum is used to represent a document as a flat sequence of events,
/// which is how the line-oriented Markdown parser and the DOM walkers talk to
/// the tree builder (see `common/flat_to_nested.rs`).
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    StartDocument,
    EndDocument,
    StartHeading(usize),
    EndHeading(usize),
    StartParagraph,
    EndParagraph,
    StartList {
        ordered: bool,
    },
    EndList,
    StartListItem,
    EndListItem,
    StartBlockquote,
    EndBlockquote,
    StartCodeBlock(Option<String>),
    EndCodeBlock,
    Image(Image),
    RawHtml(String),
    Inline(InlineContent),
}
