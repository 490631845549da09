//! Markdown parsing (Markdown → IR import)
//!
//! Pipeline: Markdown string → line scanner → Events → IR
//!
//! The dialect is line oriented. Every non-blank line is classified on its
//! own: fence, list item, heading, quote, standalone image, raw HTML or
//! paragraph. Only list items and fenced code span several lines.

use super::inline::parse_inlines;
use crate::common::flat_to_nested::events_to_tree;
use crate::error::FormatError;
use crate::ir::events::Event;
use crate::ir::nodes::{Document, InlineContent};

/// Deepest heading the dialect recognizes (`###`).
pub const MAX_HEADING_LEVEL: usize = 3;

/// Parse Markdown string to an IR document
pub fn parse_from_markdown(source: &str) -> Result<Document, FormatError> {
    let events = markdown_to_events(source);
    Ok(events_to_tree(&events)?)
}

/// Convert Markdown source into a balanced IR event stream
pub fn markdown_to_events(source: &str) -> Vec<Event> {
    let lines: Vec<&str> = source.lines().collect();
    let mut events = vec![Event::StartDocument];
    BlockScanner::new(&mut events).scan(&lines);
    events.push(Event::EndDocument);
    events
}

#[derive(Debug, Clone, Copy)]
struct OpenList {
    indent: usize,
    ordered: bool,
}

#[derive(Debug, PartialEq)]
struct ListMarker<'a> {
    indent: usize,
    ordered: bool,
    rest: &'a str,
}

/// Walks lines and emits block events. Each open list always has one open item.
struct BlockScanner<'e> {
    events: &'e mut Vec<Event>,
    lists: Vec<OpenList>,
}

impl<'e> BlockScanner<'e> {
    fn new(events: &'e mut Vec<Event>) -> Self {
        Self {
            events,
            lists: Vec::new(),
        }
    }

    fn scan(mut self, lines: &[&str]) {
        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];
            i += 1;

            if line.trim().is_empty() {
                self.close_all_lists();
                continue;
            }

            if let Some(marker) = parse_list_marker(line) {
                self.list_item(marker);
                continue;
            }

            self.close_all_lists();
            let content = line.trim();

            if content.starts_with("```") {
                let fence = content.chars().take_while(|&c| c == '`').count();
                let info = &content[fence..];
                let body_start = i;
                while i < lines.len() && !closes_fence(lines[i], fence) {
                    i += 1;
                }
                let body = lines[body_start..i].join("\n");
                // Skip the closing fence when there is one.
                i = (i + 1).min(lines.len());

                let info = info.trim();
                let language = (!info.is_empty()).then(|| info.to_string());
                self.events.push(Event::StartCodeBlock(language));
                self.events.push(Event::Inline(InlineContent::Text(body)));
                self.events.push(Event::EndCodeBlock);
            } else if let Some((level, rest)) = parse_heading(content) {
                self.events.push(Event::StartHeading(level));
                self.push_inlines(rest);
                self.events.push(Event::EndHeading(level));
            } else if let Some(rest) = parse_quote(content) {
                self.events.push(Event::StartBlockquote);
                if !rest.is_empty() {
                    BlockScanner::new(self.events).scan(&[rest]);
                }
                self.events.push(Event::EndBlockquote);
            } else if let Some(image) = parse_standalone_image(content) {
                self.events.push(image);
            } else if content.starts_with('<') {
                self.events.push(Event::RawHtml(content.to_string()));
            } else {
                self.events.push(Event::StartParagraph);
                self.push_inlines(content);
                self.events.push(Event::EndParagraph);
            }
        }
        self.close_all_lists();
    }

    fn list_item(&mut self, marker: ListMarker<'_>) {
        while matches!(self.lists.last(), Some(top) if top.indent > marker.indent) {
            self.close_innermost_list();
        }

        let continues = match self.lists.last() {
            Some(top) if top.indent == marker.indent && top.ordered == marker.ordered => true,
            Some(top) if top.indent == marker.indent => {
                self.close_innermost_list();
                false
            }
            _ => false,
        };

        if continues {
            self.events.push(Event::EndListItem);
        } else {
            self.events.push(Event::StartList {
                ordered: marker.ordered,
            });
            self.lists.push(OpenList {
                indent: marker.indent,
                ordered: marker.ordered,
            });
        }

        self.events.push(Event::StartListItem);
        self.push_inlines(marker.rest.trim());
    }

    fn close_innermost_list(&mut self) {
        if self.lists.pop().is_some() {
            self.events.push(Event::EndListItem);
            self.events.push(Event::EndList);
        }
    }

    fn close_all_lists(&mut self) {
        while !self.lists.is_empty() {
            self.close_innermost_list();
        }
    }

    fn push_inlines(&mut self, source: &str) {
        self.events
            .extend(parse_inlines(source).into_iter().map(Event::Inline));
    }
}

/// Recognizes `- item` and `12. item`, measuring the indentation (tabs count as 4).
fn parse_list_marker(line: &str) -> Option<ListMarker<'_>> {
    let body = line.trim_start_matches([' ', '\t']);
    let indent: usize = line[..line.len() - body.len()]
        .chars()
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum();

    if let Some(rest) = body.strip_prefix("- ") {
        return Some(ListMarker {
            indent,
            ordered: false,
            rest,
        });
    }

    let digits = body.chars().take_while(|c| c.is_ascii_digit()).count();
    if (1..=9).contains(&digits) {
        if let Some(rest) = body[digits..].strip_prefix(". ") {
            return Some(ListMarker {
                indent,
                ordered: true,
                rest,
            });
        }
    }

    None
}

/// A closing fence is a line of nothing but backticks, at least as many as opened it.
fn closes_fence(line: &str, fence: usize) -> bool {
    let line = line.trim();
    line.len() >= fence && line.chars().all(|c| c == '`')
}

fn parse_heading(content: &str) -> Option<(usize, &str)> {
    let level = content.chars().take_while(|c| *c == '#').count();
    if !(1..=MAX_HEADING_LEVEL).contains(&level) {
        return None;
    }
    content[level..].strip_prefix(' ').map(|rest| (level, rest.trim()))
}

fn parse_quote(content: &str) -> Option<&str> {
    if content == ">" {
        return Some("");
    }
    content.strip_prefix("> ").map(str::trim)
}

fn parse_standalone_image(content: &str) -> Option<Event> {
    if !content.starts_with("![") {
        return None;
    }
    match parse_inlines(content).as_slice() {
        [InlineContent::Image(image)] => Some(Event::Image(image.clone())),
        _ => None,
    }
}
