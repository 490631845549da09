//! HTML format implementation
//!
//! This module implements bidirectional conversion between the IR and the
//! HTML produced and consumed by the article editor.
//!
//! # Library Choice
//!
//! We use the `html5ever` + `markup5ever_rcdom` ecosystem for both directions:
//! - `html5ever`: Browser-grade HTML5 parser from the Servo project. Editor
//!   output is frequently malformed and it recovers the way browsers do.
//! - `markup5ever_rcdom`: Reference-counted DOM tree, used as the parse target
//!   and as the tree we build before serializing.
//!
//! # Element Mapping Table
//!
//! | IR Element       | HTML                                   | Import Notes                           |
//! |------------------|----------------------------------------|----------------------------------------|
//! | Heading          | `<h1>`–`<h6>`                          |                                        |
//! | Paragraph        | `<p>`                                  | Loose inline runs become paragraphs    |
//! | List / ListItem  | `<ul>`/`<ol>` + `<li>`                 | `<li><p>` wrappers are flattened       |
//! | Blockquote       | `<blockquote>`                         | Exported tight when it holds one `<p>` |
//! | CodeBlock        | `<pre><code class="language-x">`       | `lang-x` and `data-language` also read |
//! | Image            | `<img src alt title>`                  | A paragraph holding one image          |
//! | RawHtml          | Emitted verbatim at top level          | Never produced by import               |
//! | InlineContent:   |                                        |                                        |
//! |   Bold           | `<strong>`                             | `<strong>`, `<b>`                      |
//! |   Italic         | `<em>`                                 | `<em>`, `<i>`                          |
//! |   Underline      | `<u>`                                  | `<u>`, `<ins>`                         |
//! |   Code           | `<code>`                               | `<code>`, `<kbd>`, `<samp>`, `<tt>`    |
//! |   Link           | `<a href>`                             | Anchors without href are unwrapped     |
//!
//! Unknown tags are unwrapped and their text kept. `script`, `style`,
//! `template` and the document head are dropped. Whitespace is collapsed the
//! way a browser renders it.
//!
//! # Output Format
//!
//! By default export produces a fragment, one top-level block per line. An
//! empty document yields `<p></p>`. With the `standalone` option the fragment
//! is wrapped in a complete HTML5 page.

pub mod parser;
pub mod serializer;

pub use serializer::HtmlOptions;

use crate::error::FormatError;
use crate::format::{bool_option, Format};
use crate::ir::nodes::Document;
use std::collections::HashMap;

/// Format implementation for HTML
#[derive(Debug, Clone, Default)]
pub struct HtmlFormat {
    options: HtmlOptions,
}

impl HtmlFormat {
    /// Create an HTML format with the given output options
    pub fn new(options: HtmlOptions) -> Self {
        Self { options }
    }

    /// Create an HTML format that emits complete documents
    pub fn standalone() -> Self {
        Self::new(HtmlOptions::standalone())
    }

    pub fn options(&self) -> &HtmlOptions {
        &self.options
    }
}

impl Format for HtmlFormat {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "HTML5 fragment or standalone page"
    }

    fn file_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        parser::parse_from_html(source)
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        serializer::serialize_to_html(doc, &self.options)
    }

    fn serialize_with_options(
        &self,
        doc: &Document,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        let mut resolved = self.options.clone();
        if let Some(standalone) = bool_option(options, "standalone")? {
            resolved.standalone = standalone;
        }
        if let Some(title) = options.get("title") {
            resolved.title = Some(title.clone());
        }
        if let Some(unknown) = options
            .keys()
            .find(|key| !matches!(key.as_str(), "standalone" | "title"))
        {
            return Err(FormatError::NotSupported(format!(
                "Unknown html option '{unknown}'"
            )));
        }
        serializer::serialize_to_html(doc, &resolved)
    }
}
