//! Markdown format implementation
//!
//! This module implements bidirectional conversion between the IR and the
//! article Markdown dialect used by the editor and the persistence API.
//!
//! # Library Choice
//!
//! The dialect is not CommonMark: `_x_` means underline, every line is its
//! own block and a single `>` line is a whole quote. A CommonMark parser
//! would disagree on all three, so parsing and rendering are hand written
//! (see `parser`, `inline` and `serializer`).
//!
//! # Element Mapping Table
//!
//! | IR Element       | Markdown                 | Export Notes                       | Import Notes                       |
//! |------------------|--------------------------|------------------------------------|------------------------------------|
//! | Heading          | `#`, `##`, `###`         | Deeper levels are clamped          | Only levels 1-3 are recognized     |
//! | Paragraph        | A plain line             | Leading block markers escaped      | One paragraph per line             |
//! | List             | `- ` / `1. `             | Renumbered from 1, nested by 2 sp  | Source digits ignored              |
//! | Blockquote       | `> `                     | Every line prefixed                | One quote per line                 |
//! | CodeBlock        | ```` ```lang ````        | Fence outgrows inner backtick runs | Closes on a fence at least as long |
//! | Image            | `![alt](src)`            | Optional `"title"`                 | A line holding only an image       |
//! | RawHtml          | A line starting with `<` | Emitted verbatim                   | Kept verbatim                      |
//! | InlineContent:   |                          |                                    |                                    |
//! |   Bold           | `**bold**`               |                                    |                                    |
//! |   Italic         | `*italic*`               |                                    |                                    |
//! |   Underline      | `_underline_`            | Word boundaries only               | Word boundaries only               |
//! |   Code           | `` `code` ``             |                                    | Contents are literal               |
//! |   Link           | `[text](href)`           | Text only when there is no href    |                                    |
//!
//! # Lossy Conversions
//!
//! - Multi-line quotes become one quote per line
//! - Headings deeper than the configured limit are clamped
//! - Blocks nested in list items other than lists are flattened on import
//! - Multiple blank lines → single blank line
//! - Italic wrapping only a bold span reads back as bold around italic (`***x***`)

pub mod inline;
pub mod parser;
pub mod serializer;

pub use serializer::MarkdownOptions;

use crate::error::FormatError;
use crate::format::Format;
use crate::ir::nodes::Document;
use std::collections::HashMap;

/// Format implementation for Markdown
#[derive(Debug, Clone, Default)]
pub struct MarkdownFormat {
    options: MarkdownOptions,
}

impl MarkdownFormat {
    /// Create a Markdown format with the given output options
    pub fn new(options: MarkdownOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MarkdownOptions {
        &self.options
    }
}

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "Article Markdown dialect"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        parser::parse_from_markdown(source)
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        serializer::serialize_to_markdown(doc, &self.options)
    }

    fn serialize_with_options(
        &self,
        doc: &Document,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        let mut resolved = self.options.clone();
        for (key, value) in options {
            match key.as_str() {
                "max-heading-level" => {
                    resolved.max_heading_level = value.parse().map_err(|_| {
                        FormatError::NotSupported(format!(
                            "Invalid value '{value}' for option 'max-heading-level'"
                        ))
                    })?;
                }
                other => {
                    return Err(FormatError::NotSupported(format!(
                        "Unknown markdown option '{other}'"
                    )))
                }
            }
        }
        serializer::serialize_to_markdown(doc, &resolved)
    }
}
