//! Inline span parser for the article Markdown dialect
//!
//! A small recursive-descent scanner over the characters of one line.
//! Recognized spans, in order of precedence at a given position:
//!
//! | Syntax         | IR node                  |
//! |----------------|--------------------------|
//! | `\x`           | literal `x` (ASCII punctuation only) |
//! | `` `code` ``   | `Code` (contents are not parsed)     |
//! | `![alt](url)`  | `Image`                  |
//! | `[text](url)`  | `Link` (text is parsed)  |
//! | `**bold**`     | `Bold`                   |
//! | `*italic*`     | `Italic`                 |
//! | `_underline_`  | `Underline`              |
//!
//! Delimited spans must not start or end with whitespace. `_` only opens
//! after a non-alphanumeric character and only closes before one, so
//! identifiers like `snake_case_name` stay literal. Anything that does not
//! close is kept as literal text.
//!
//! A `***` run opens bold and italic together. The span that closes first is
//! the inner one, so `***a** b*` is italic around bold and `***a* b**` is
//! bold around italic. When both close on the same run (`***x***`) it reads
//! as bold around italic.

use crate::ir::nodes::{push_text, Image, InlineContent, Link};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Delimiter {
    Strong,
    Emphasis,
    Underline,
}

/// Parses one line of dialect Markdown into inline content.
pub fn parse_inlines(source: &str) -> Vec<InlineContent> {
    let chars: Vec<char> = source.chars().collect();
    parse_span(&chars)
}

/// Removes backslash escapes in front of ASCII punctuation.
pub fn unescape(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\\' && i + 1 < chars.len() && chars[i + 1].is_ascii_punctuation() {
            out.push(chars[i + 1]);
            i += 2;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

fn parse_span(chars: &[char]) -> Vec<InlineContent> {
    let mut out = Vec::new();
    let mut text = String::new();
    let mut underline_exhausted = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        match c {
            '\\' if next.is_some_and(|n| n.is_ascii_punctuation()) => {
                text.extend(next);
                i += 2;
                continue;
            }
            '`' => {
                if let Some(end) = find_char(chars, i + 1, '`') {
                    if end > i + 1 {
                        flush(&mut out, &mut text);
                        out.push(InlineContent::Code(chars[i + 1..end].iter().collect()));
                        i = end + 1;
                        continue;
                    }
                }
            }
            '!' if next == Some('[') => {
                if let Some(target) = parse_link_target(chars, i + 1) {
                    flush(&mut out, &mut text);
                    let alt: String = chars[i + 2..target.label_end].iter().collect();
                    out.push(InlineContent::Image(Image {
                        src: target.url,
                        alt: unescape(&alt),
                        title: target.title,
                    }));
                    i = target.end;
                    continue;
                }
            }
            '[' => {
                if let Some(target) = parse_link_target(chars, i) {
                    flush(&mut out, &mut text);
                    out.push(InlineContent::Link(Link {
                        href: target.url,
                        content: parse_span(&chars[i + 1..target.label_end]),
                    }));
                    i = target.end;
                    continue;
                }
            }
            '*' if next == Some('*') => {
                if let Some((span, end)) = parse_double_star(chars, i) {
                    flush(&mut out, &mut text);
                    out.push(span);
                    i = end;
                } else {
                    text.push_str("**");
                    i += 2;
                }
                continue;
            }
            '*' => {
                if let Some(close) = find_closing(chars, i + 1, Delimiter::Emphasis) {
                    flush(&mut out, &mut text);
                    out.push(InlineContent::Italic(parse_span(&chars[i + 1..close])));
                    i = close + 1;
                    continue;
                }
            }
            '_' if !underline_exhausted && opens_underline(chars, i) => {
                match find_closing(chars, i + 1, Delimiter::Underline) {
                    Some(close) => {
                        flush(&mut out, &mut text);
                        out.push(InlineContent::Underline(parse_span(&chars[i + 1..close])));
                        i = close + 1;
                        continue;
                    }
                    // A later `_` has no closer left to find either.
                    None => underline_exhausted = true,
                }
            }
            _ => {}
        }

        text.push(c);
        i += 1;
    }

    flush(&mut out, &mut text);
    out
}

fn flush(out: &mut Vec<InlineContent>, text: &mut String) {
    push_text(out, text);
    text.clear();
}

fn find_char(chars: &[char], from: usize, target: char) -> Option<usize> {
    (from..chars.len()).find(|&j| chars[j] == target)
}

/// Parses a span opened by the `**` at `i`, returning it with the index just past it.
fn parse_double_star(chars: &[char], i: usize) -> Option<(InlineContent, usize)> {
    let bold = || {
        find_closing(chars, i + 2, Delimiter::Strong)
            .map(|close| (InlineContent::Bold(parse_span(&chars[i + 2..close])), close + 2))
    };
    let italic = || {
        find_closing(chars, i + 1, Delimiter::Emphasis)
            .map(|close| (InlineContent::Italic(parse_span(&chars[i + 1..close])), close + 1))
    };

    if chars.get(i + 2) != Some(&'*') {
        return bold();
    }

    let inner_italic = find_closing(chars, i + 3, Delimiter::Emphasis);
    let inner_bold = find_closing(chars, i + 3, Delimiter::Strong);
    let italic_outside = match (inner_italic, inner_bold) {
        (Some(italic_end), Some(bold_end)) if italic_end == bold_end => {
            star_run(chars, bold_end) == 2
        }
        (Some(italic_end), Some(bold_end)) => bold_end < italic_end,
        (None, Some(_)) => true,
        _ => false,
    };

    if italic_outside {
        italic().or_else(bold)
    } else {
        bold().or_else(italic)
    }
}

fn star_run(chars: &[char], from: usize) -> usize {
    chars[from..].iter().take_while(|&&c| c == '*').count()
}

/// Finds the position of the closing delimiter for a span opened just before `start`.
fn find_closing(chars: &[char], start: usize, delimiter: Delimiter) -> Option<usize> {
    if chars.get(start).map_or(true, |c| c.is_whitespace()) {
        return None;
    }

    let mut j = start;
    while j < chars.len() {
        match chars[j] {
            '\\' => {
                j += 2;
                continue;
            }
            '`' => {
                if let Some(end) = find_char(chars, j + 1, '`') {
                    j = end + 1;
                    continue;
                }
            }
            '[' => {
                if let Some(target) = parse_link_target(chars, j) {
                    j = target.end;
                    continue;
                }
            }
            _ => {}
        }

        let next = chars.get(j + 1).copied();
        match delimiter {
            Delimiter::Strong => {
                if chars[j] == '*' && next == Some('*') {
                    if is_valid_span(chars, start, j) {
                        return Some(j);
                    }
                    j += 2;
                    continue;
                }
                if chars[j] == '*' {
                    // A nested italic span is skipped as a whole.
                    if let Some(close) = find_italic_close(chars, j + 1) {
                        j = close + 1;
                        continue;
                    }
                }
            }
            Delimiter::Emphasis => {
                if chars[j] == '*' && next == Some('*') {
                    let closes = is_valid_span(chars, start, j);
                    let opens_bold = chars
                        .get(j + 2)
                        .is_some_and(|&c| c != '*' && !c.is_whitespace());
                    if opens_bold {
                        if let Some(close) = find_closing(chars, j + 2, Delimiter::Strong) {
                            // `*a**b*` is two italic spans side by side unless the
                            // bold closes before the next `*` does.
                            let next_star = find_italic_close(chars, j + 2);
                            if !closes || next_star.map_or(true, |star| close <= star) {
                                j = close + 2;
                                continue;
                            }
                        }
                    }
                    if closes {
                        return Some(j);
                    }
                    j += 2;
                    continue;
                }
                if chars[j] == '*' && is_valid_span(chars, start, j) {
                    return Some(j);
                }
            }
            Delimiter::Underline => {
                if chars[j] == '_' && closes_underline(chars, j) && is_valid_span(chars, start, j)
                {
                    return Some(j);
                }
            }
        }
        j += 1;
    }
    None
}

/// First `*` able to close an italic span opened just before `start`. Does not look for nesting.
fn find_italic_close(chars: &[char], start: usize) -> Option<usize> {
    if chars.get(start).map_or(true, |c| c.is_whitespace()) {
        return None;
    }
    let mut j = start;
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 1,
            '`' => {
                if let Some(end) = find_char(chars, j + 1, '`') {
                    j = end;
                }
            }
            '*' if is_valid_span(chars, start, j) => return Some(j),
            _ => {}
        }
        j += 1;
    }
    None
}

fn is_valid_span(chars: &[char], start: usize, end: usize) -> bool {
    end > start && !chars[start].is_whitespace() && !chars[end - 1].is_whitespace()
}

fn opens_underline(chars: &[char], i: usize) -> bool {
    let before_ok = i == 0 || !chars[i - 1].is_alphanumeric();
    let after_ok = chars.get(i + 1).is_some_and(|c| !c.is_whitespace() && *c != '_');
    before_ok && after_ok
}

fn closes_underline(chars: &[char], i: usize) -> bool {
    chars.get(i + 1).map_or(true, |c| !c.is_alphanumeric())
}

struct LinkTarget {
    /// Index of the closing `]`
    label_end: usize,
    url: String,
    title: Option<String>,
    /// Index just past the closing `)`
    end: usize,
}

/// Parses `[label](url "title")` starting at the `[` at `open`.
fn parse_link_target(chars: &[char], open: usize) -> Option<LinkTarget> {
    let mut depth = 0usize;
    let mut j = open;
    let label_end = loop {
        match *chars.get(j)? {
            '\\' => j += 1,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    break j;
                }
            }
            _ => {}
        }
        j += 1;
    };

    if chars.get(label_end + 1) != Some(&'(') {
        return None;
    }
    let close = find_char(chars, label_end + 2, ')')?;
    let inner: String = chars[label_end + 2..close].iter().collect();
    let inner = inner.trim();
    if inner.is_empty() {
        return None;
    }

    let (url, title) = match inner.split_once(char::is_whitespace) {
        Some((url, rest)) => {
            let title = rest.trim().trim_matches('"').trim_matches('\'');
            (url, (!title.is_empty()).then(|| title.to_string()))
        }
        None => (inner, None),
    };

    Some(LinkTarget {
        label_end,
        url: url.to_string(),
        title,
        end: close + 1,
    })
}
