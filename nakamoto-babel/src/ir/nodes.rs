//! Core data structures for the Intermediate Representation (IR).

/// A block-level node of an article.
#[derive(Debug, Clone, PartialEq)]
pub enum DocNode {
    Heading(Heading),
    Paragraph(Paragraph),
    List(List),
    Blockquote(Blockquote),
    CodeBlock(CodeBlock),
    Image(Image),
    /// HTML that no parser understood, kept verbatim.
    RawHtml(String),
}

/// Represents the root of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub children: Vec<DocNode>,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Represents a heading with a specific level.
#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    pub level: usize,
    pub content: Vec<InlineContent>,
}

/// Represents a paragraph of text.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub content: Vec<InlineContent>,
}

/// Represents a list of items.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub items: Vec<ListItem>,
    pub ordered: bool,
}

/// Represents an item in a list.
///
/// `children` holds nested lists (and any other blocks an HTML source put
/// inside the `<li>`).
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub content: Vec<InlineContent>,
    pub children: Vec<DocNode>,
}

/// Represents a quotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Blockquote {
    pub children: Vec<DocNode>,
}

/// Represents a block of preformatted code.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    pub language: Option<String>,
    pub content: String,
}

/// Represents inline content, such as text, bold, italics, etc.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineContent {
    Text(String),
    Bold(Vec<InlineContent>),
    Italic(Vec<InlineContent>),
    Underline(Vec<InlineContent>),
    Code(String),
    Link(Link),
    Image(Image),
}

/// Represents a hyperlink.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub href: String,
    pub content: Vec<InlineContent>,
}

/// Represents an image.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub src: String,
    pub alt: String,
    pub title: Option<String>,
}

/// Appends text to an inline run, merging with a trailing text node.
pub(crate) fn push_text(content: &mut Vec<InlineContent>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(InlineContent::Text(last)) = content.last_mut() {
        last.push_str(text);
    } else {
        content.push(InlineContent::Text(text.to_string()));
    }
}

/// Concatenates the plain text of an inline run, dropping all markup.
pub fn plain_text(content: &[InlineContent]) -> String {
    let mut out = String::new();
    collect_plain_text(content, &mut out);
    out
}

fn collect_plain_text(content: &[InlineContent], out: &mut String) {
    for inline in content {
        match inline {
            InlineContent::Text(text) | InlineContent::Code(text) => out.push_str(text),
            InlineContent::Bold(children)
            | InlineContent::Italic(children)
            | InlineContent::Underline(children) => collect_plain_text(children, out),
            InlineContent::Link(link) => collect_plain_text(&link.content, out),
            InlineContent::Image(_) => {}
        }
    }
}
