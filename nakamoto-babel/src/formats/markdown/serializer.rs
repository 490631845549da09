//! Markdown serialization (IR → Markdown export)
//!
//! Renders an IR document in the article dialect. Every block is rendered on
//! its own, blocks are separated by one blank line, runs of blank lines are
//! collapsed and the result is trimmed.
//!
//! Text is escaped so that the output parses back to the same structure:
//! `\`, `*`, `` ` ``, `[` and `]` always, `_` where it could open or close an
//! underline span, and block markers at the start of a paragraph line.

use super::parser::MAX_HEADING_LEVEL;
use crate::error::FormatError;
use crate::ir::nodes::{
    Blockquote, CodeBlock, DocNode, Document, Heading, Image, InlineContent, Link, List,
    ListItem, Paragraph,
};

/// Options for Markdown output
#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownOptions {
    /// Headings deeper than this are clamped to it
    pub max_heading_level: usize,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            max_heading_level: MAX_HEADING_LEVEL,
        }
    }
}

/// Serialize an IR document to Markdown
pub fn serialize_to_markdown(
    doc: &Document,
    options: &MarkdownOptions,
) -> Result<String, FormatError> {
    if !(1..=6).contains(&options.max_heading_level) {
        return Err(FormatError::SerializationError(format!(
            "Heading level limit must be between 1 and 6, got {}",
            options.max_heading_level
        )));
    }

    let blocks: Vec<String> = doc
        .children
        .iter()
        .map(|node| render_block(node, options))
        .filter(|block| !block.is_empty())
        .collect();

    Ok(collapse_blank_lines(&blocks.join("\n\n")).trim().to_string())
}

fn render_block(node: &DocNode, options: &MarkdownOptions) -> String {
    match node {
        DocNode::Heading(Heading { level, content }) => {
            let text = render_inlines(content);
            let text = text.trim();
            if text.is_empty() {
                return String::new();
            }
            let level = (*level).clamp(1, options.max_heading_level);
            format!("{} {}", "#".repeat(level), text)
        }
        DocNode::Paragraph(Paragraph { content }) => {
            let text = render_inlines(content);
            escape_line_start(text.trim())
        }
        DocNode::List(list) => render_list(list, 0, options),
        DocNode::Blockquote(Blockquote { children }) => {
            let inner: Vec<String> = children
                .iter()
                .map(|child| render_block(child, options))
                .filter(|block| !block.is_empty())
                .collect();
            if inner.is_empty() {
                return ">".to_string();
            }
            inner
                .join("\n")
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| format!("> {line}"))
                .collect::<Vec<_>>()
                .join("\n")
        }
        DocNode::CodeBlock(CodeBlock { language, content }) => {
            let info = language.as_deref().unwrap_or("");
            let body = content.trim_end_matches('\n');
            let fence = code_fence(body);
            if body.is_empty() {
                format!("{fence}{info}\n{fence}")
            } else {
                format!("{fence}{info}\n{body}\n{fence}")
            }
        }
        DocNode::Image(image) => render_image(image),
        DocNode::RawHtml(html) => html.trim().to_string(),
    }
}

/// A fence longer than any backtick run in the body, so the body cannot close it.
fn code_fence(body: &str) -> String {
    let longest = body
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat((longest + 1).max(3))
}

fn render_list(list: &List, depth: usize, options: &MarkdownOptions) -> String {
    let indent = "  ".repeat(depth);
    let mut lines = Vec::new();

    for (index, item) in list.items.iter().enumerate() {
        let marker = if list.ordered {
            format!("{}. ", index + 1)
        } else {
            "- ".to_string()
        };
        lines.push(format!("{indent}{marker}{}", render_item_content(item)));

        for child in &item.children {
            match child {
                DocNode::List(nested) => lines.push(render_list(nested, depth + 1, options)),
                other => {
                    let nested_indent = "  ".repeat(depth + 1);
                    let block = render_block(other, options);
                    lines.extend(
                        block
                            .lines()
                            .filter(|line| !line.trim().is_empty())
                            .map(|line| format!("{nested_indent}{line}")),
                    );
                }
            }
        }
    }

    lines.join("\n")
}

fn render_item_content(item: &ListItem) -> String {
    render_inlines(&item.content).trim().to_string()
}

fn render_inlines(content: &[InlineContent]) -> String {
    content.iter().map(render_inline).collect()
}

fn render_inline(inline: &InlineContent) -> String {
    match inline {
        InlineContent::Text(text) => escape_text(text),
        InlineContent::Bold(children) => wrap_span("**", &render_inlines(children)),
        InlineContent::Italic(children) => wrap_span("*", &render_inlines(children)),
        InlineContent::Underline(children) => wrap_span("_", &render_inlines(children)),
        InlineContent::Code(code) => {
            if code.is_empty() {
                String::new()
            } else if code.contains('`') {
                escape_text(code)
            } else {
                format!("`{code}`")
            }
        }
        InlineContent::Link(Link { href, content }) => {
            let text = render_inlines(content);
            if href.trim().is_empty() || text.trim().is_empty() {
                text
            } else {
                format!("[{}]({})", text, encode_url(href))
            }
        }
        InlineContent::Image(image) => render_image(image),
    }
}

fn render_image(image: &Image) -> String {
    let src = encode_url(&image.src);
    let alt = escape_text(&image.alt);
    match image.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => {
            format!("![{alt}]({src} \"{}\")", title.replace('"', "'"))
        }
        _ => format!("![{alt}]({src})"),
    }
}

/// Puts delimiters around a span, keeping edge whitespace outside of them.
fn wrap_span(marker: &str, inner: &str) -> String {
    let trimmed = inner.trim();
    if trimmed.is_empty() {
        return inner.to_string();
    }
    let leading = &inner[..inner.len() - inner.trim_start().len()];
    let trailing = &inner[inner.trim_end().len()..];
    format!("{leading}{marker}{trimmed}{marker}{trailing}")
}

fn encode_url(url: &str) -> String {
    url.trim()
        .replace(' ', "%20")
        .replace('(', "%28")
        .replace(')', "%29")
}

/// Escapes inline syntax characters in literal text.
pub fn escape_text(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        let escape = match c {
            '\\' | '*' | '`' | '[' | ']' => true,
            '_' => {
                let before = i.checked_sub(1).map(|p| chars[p]);
                let after = chars.get(i + 1).copied();
                !before.is_some_and(char::is_alphanumeric)
                    || !after.is_some_and(char::is_alphanumeric)
            }
            _ => false,
        };
        if escape {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escapes a leading block marker so a paragraph line stays a paragraph.
fn escape_line_start(line: &str) -> String {
    if line.starts_with('#')
        || line.starts_with('>')
        || line.starts_with('<')
        || line.starts_with("- ")
        || line == "-"
    {
        return format!("\\{line}");
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 && line[digits..].starts_with(". ") {
        return format!("{}\\{}", &line[..digits], &line[digits..]);
    }

    line.to_string()
}

fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newlines = 0;
    for c in text.chars() {
        if c == '\n' {
            newlines += 1;
            if newlines > 2 {
                continue;
            }
        } else {
            newlines = 0;
        }
        out.push(c);
    }
    out
}
