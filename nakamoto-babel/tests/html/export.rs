//! Export tests for HTML format (IR → HTML)

use nakamoto_babel::format::Format;
use nakamoto_babel::formats::html::{HtmlFormat, HtmlOptions};
use nakamoto_babel::FormatRegistry;
use std::collections::HashMap;

fn markdown_to_html_with(md: &str, options: &[(&str, &str)]) -> String {
    let options: HashMap<String, String> = options
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    FormatRegistry::default()
        .convert(md, "markdown", "html", &options)
        .unwrap()
}

#[test]
fn test_fragment_by_default() {
    let html = markdown_to_html_with("# Quest\n\nBody", &[]);
    assert_eq!(html, "<h1>Quest</h1>\n<p>Body</p>");
    assert!(!html.contains("<!DOCTYPE html>"));
}

#[test]
fn test_standalone_uses_first_heading_as_title() {
    let html = markdown_to_html_with("# Quest <1>\n\nBody", &[("standalone", "yes")]);

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>Quest &lt;1&gt;</title>"));
    assert!(html.contains("<article>\n<h1>Quest &lt;1&gt;</h1>\n<p>Body</p>\n</article>"));
}

#[test]
fn test_standalone_explicit_title() {
    let html = markdown_to_html_with("Body", &[("standalone", "true"), ("title", "Dojo News")]);
    assert!(html.contains("<title>Dojo News</title>"));
}

#[test]
fn test_standalone_empty_article() {
    let format = HtmlFormat::new(HtmlOptions::standalone());
    let html = format.serialize(&Default::default()).unwrap();
    assert!(html.contains("<title>Article</title>"));
    assert!(html.contains("<p></p>"));
}

#[test]
fn test_attributes_escaped() {
    let html = markdown_to_html_with("![a \"quoted\" alt](https://x.io/i.png?a=1&b=2)", &[]);
    assert_eq!(
        html,
        "<img src=\"https://x.io/i.png?a=1&amp;b=2\" alt=\"a &quot;quoted&quot; alt\">"
    );
}
