//! Article statistics
//!
//! Word count and estimated reading time, sent along with an article to the
//! persistence API.

use crate::ir::nodes::{plain_text, DocNode, Document, InlineContent, ListItem};
use serde::Serialize;

/// Reading speed used when the caller has no preference
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ArticleStats {
    pub words: usize,
    pub headings: usize,
    pub images: usize,
    pub code_blocks: usize,
}

impl ArticleStats {
    /// Counts words in every block. Code is counted, image alt text is not.
    pub fn from_document(doc: &Document) -> Self {
        let mut stats = Self::default();
        for node in &doc.children {
            stats.visit(node);
        }
        stats
    }

    /// Whole minutes needed to read the article, never less than one for a
    /// non-empty article.
    pub fn reading_time_minutes(&self, words_per_minute: u32) -> u32 {
        if self.words == 0 {
            return 0;
        }
        let wpm = words_per_minute.max(1) as usize;
        self.words.div_ceil(wpm).max(1) as u32
    }

    fn visit(&mut self, node: &DocNode) {
        match node {
            DocNode::Heading(heading) => {
                self.headings += 1;
                self.words += count_words(&plain_text(&heading.content));
            }
            DocNode::Paragraph(paragraph) => {
                self.words += count_words(&plain_text(&paragraph.content));
                self.images += count_inline_images(&paragraph.content);
            }
            DocNode::List(list) => {
                for item in &list.items {
                    self.visit_item(item);
                }
            }
            DocNode::Blockquote(quote) => {
                for child in &quote.children {
                    self.visit(child);
                }
            }
            DocNode::CodeBlock(code) => {
                self.code_blocks += 1;
                self.words += count_words(&code.content);
            }
            DocNode::Image(_) => self.images += 1,
            DocNode::RawHtml(_) => {}
        }
    }

    fn visit_item(&mut self, item: &ListItem) {
        self.words += count_words(&plain_text(&item.content));
        self.images += count_inline_images(&item.content);
        for child in &item.children {
            self.visit(child);
        }
    }
}

fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

fn count_inline_images(content: &[InlineContent]) -> usize {
    content
        .iter()
        .map(|inline| match inline {
            InlineContent::Image(_) => 1,
            InlineContent::Bold(children)
            | InlineContent::Italic(children)
            | InlineContent::Underline(children) => count_inline_images(children),
            InlineContent::Link(link) => count_inline_images(&link.content),
            InlineContent::Text(_) | InlineContent::Code(_) => 0,
        })
        .sum()
}
