//! Markdown and HTML interoperability for Nakamoto League articles
//!
//!     Articles are written in a rich-text editor that speaks HTML and are stored as Markdown
//!     in a small dialect (ATX headings up to `###`, `**bold**`, `*italic*`, `_underline_`,
//!     `` `code` ``, `- ` and `1. ` lists, one-line `> ` quotes, links and images). This crate
//!     converts between the two.
//!
//!     TLDR:
//!         - Conversions never go straight from one syntax to the other. Every format parses
//!           into the IR (./ir/mod.rs) and renders from it.
//!         - [`to_html`] and [`to_markdown`] never fail: errors are logged and a best-effort
//!           output is returned, so an editing session is never interrupted.
//!         - The [`Format`] trait and [`FormatRegistry`] give the same operations with errors.
//!
//! Architecture
//!
//!     The format agnostic logic lives in the IR representation (./ir/mod.rs) and the common
//!     code in ./common/mod.rs. Formats produce or consume a flat event stream and the common
//!     code rebuilds or flattens the tree, so format modules only deal with their syntax.
//!
//!     This is a pure lib: no code here should suppose a shell environment, be it std print,
//!     env vars etc. Diagnostics go through `tracing`.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── stats.rs                # Word count and reading time
//!     ├── formats
//!     │   ├── <format>
//!     │   │   ├── parser.rs       # Parser implementation
//!     │   │   ├── serializer.rs   # Serializer implementation
//!     │   │   └── mod.rs
//!     ├── lib.rs
//!     ├── ir                      # Intermediate Representation
//!     ├── common                  # Event stream <-> tree algorithms
//!
//! Testing
//!     tests
//!     └── <format>
//!         └── <testname>.rs
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include these
//!     in the mod.
//!
//! Core Algorithms
//!
//!     Markdown is flat (one block per line) while HTML and the IR are nested. Both directions
//!     go through events: see ./common/flat_to_nested.rs and ./common/nested_to_flat.rs.
//!
//! Library Choices
//!
//!     HTML is parsed and serialized with html5ever and its rcdom tree. The Markdown dialect is
//!     not CommonMark (`_x_` is underline, every line is its own block) so it is handled by a
//!     small hand written parser and renderer.

pub mod error;
pub mod format;
pub mod formats;
pub mod registry;
pub mod stats;

pub mod common;
pub mod ir;

pub use error::FormatError;
pub use format::Format;
pub use formats::{HtmlFormat, HtmlOptions, MarkdownFormat, MarkdownOptions};
pub use registry::FormatRegistry;
pub use stats::ArticleStats;

use formats::html::serializer::EMPTY_DOCUMENT;

/// Converts dialect Markdown to an HTML fragment for the editor.
///
/// Empty input yields `<p></p>`. Never fails: if conversion errors, the
/// source is returned as escaped paragraphs.
pub fn to_html(markdown: &str) -> String {
    let converted = formats::markdown::parser::parse_from_markdown(markdown)
        .and_then(|doc| formats::html::serializer::serialize_to_html(&doc, &HtmlOptions::default()));

    match converted {
        Ok(html) => html,
        Err(err) => {
            tracing::warn!(error = %err, "markdown to html conversion failed, falling back");
            escaped_paragraphs(markdown)
        }
    }
}

/// Converts an HTML fragment from the editor to dialect Markdown.
///
/// Empty input yields an empty string. Never fails: if conversion errors,
/// the source is returned unchanged.
pub fn to_markdown(html: &str) -> String {
    let converted = formats::html::parser::parse_from_html(html).and_then(|doc| {
        formats::markdown::serializer::serialize_to_markdown(&doc, &MarkdownOptions::default())
    });

    match converted {
        Ok(markdown) => markdown,
        Err(err) => {
            tracing::warn!(error = %err, "html to markdown conversion failed, falling back");
            html.to_string()
        }
    }
}

fn escaped_paragraphs(source: &str) -> String {
    let paragraphs: Vec<String> = source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let escaped = line
                .replace('&', "&amp;")
                .replace('<', "&lt;")
                .replace('>', "&gt;");
            format!("<p>{escaped}</p>")
        })
        .collect();

    if paragraphs.is_empty() {
        EMPTY_DOCUMENT.to_string()
    } else {
        paragraphs.join("\n")
    }
}
