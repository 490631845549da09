//! Export tests for Markdown format (HTML → IR → Markdown)

use insta::assert_snapshot;
use nakamoto_babel::to_markdown;
use nakamoto_babel::FormatRegistry;
use std::collections::HashMap;

#[test]
fn test_empty_input() {
    assert_eq!(to_markdown(""), "");
    assert_eq!(to_markdown("<p></p>"), "");
}

#[test]
fn test_article_scenario_back_to_markdown() {
    let html = "<h1>Title</h1>\n<p>Some <strong>bold</strong> and <em>italic</em> text.</p>\n<ul><li>item one</li><li>item two</li></ul>";
    let md = to_markdown(html);

    assert!(md.lines().any(|line| line == "# Title"));
    assert!(md.contains("**bold**"));
    assert!(md.contains("*italic*"));
    assert_eq!(md.lines().filter(|line| line.starts_with("- ")).count(), 2);
}

#[test]
fn test_ordered_list_numbered_from_one() {
    assert_eq!(
        to_markdown("<ol><li>first</li><li>second</li><li>third</li></ol>"),
        "1. first\n2. second\n3. third"
    );
}

#[test]
fn test_nested_list_indented() {
    assert_eq!(
        to_markdown("<ul><li>a<ul><li>b</li></ul></li><li>c</li></ul>"),
        "- a\n  - b\n- c"
    );
}

#[test]
fn test_heading_levels_clamped() {
    assert_eq!(to_markdown("<h4>Deep</h4>"), "### Deep");
}

#[test]
fn test_markdown_characters_escaped() {
    assert_eq!(
        to_markdown("<p>2 * 3 = 6 and [not] a link</p>"),
        r"2 \* 3 = 6 and \[not\] a link"
    );
    assert_eq!(to_markdown("<p># not a heading</p>"), r"\# not a heading");
}

#[test]
fn test_span_whitespace_moved_outside() {
    assert_eq!(to_markdown("<p>a<strong> b </strong>c</p>"), "a **b** c");
    assert_eq!(to_markdown("<p><strong></strong>x</p>"), "x");
}

#[test]
fn test_unknown_tags_stripped() {
    assert_eq!(
        to_markdown("<p><span style=\"color:red\">red</span> <mark>marked</mark></p>"),
        "red marked"
    );
}

#[test]
fn test_blank_lines_collapsed() {
    let md = to_markdown("<p>one</p>\n\n\n<p></p>\n\n<p>two</p>");
    assert_eq!(md, "one\n\ntwo");
}

#[test]
fn test_registry_option_heading_limit() {
    let registry = FormatRegistry::default();
    let mut options = HashMap::new();
    options.insert("max-heading-level".to_string(), "6".to_string());

    let md = registry
        .convert("<h5>Deep</h5>", "html", "markdown", &options)
        .unwrap();
    assert_eq!(md, "##### Deep");
}

#[test]
fn test_editor_output() {
    let html = "<h2>Intro</h2><p>Hello <b>warrior</b>,<br>welcome to the <i>dojo</i>.</p><ul><li><p>First</p></li><li><p>Second</p></li></ul><blockquote><p>Quote one</p><p>Quote two</p></blockquote><p><a href=\"https://x.io/a\">link</a></p><pre><code>let a = 1;\nlet b = 2;</code></pre>";

    assert_snapshot!(to_markdown(html), @r###"
    ## Intro

    Hello **warrior**, welcome to the *dojo*.

    - First
    - Second

    > Quote one
    > Quote two

    [link](https://x.io/a)

    ```
    let a = 1;
    let b = 2;
    ```
    "###);
}
