//! Import tests for Markdown format (Markdown → IR → HTML)

use insta::assert_snapshot;
use nakamoto_babel::format::Format;
use nakamoto_babel::formats::markdown::MarkdownFormat;
use nakamoto_babel::ir::nodes::{DocNode, InlineContent};
use nakamoto_babel::to_html;

#[test]
fn test_empty_input_placeholder() {
    assert_eq!(to_html(""), "<p></p>");
    assert_eq!(to_html("\n\n"), "<p></p>");
}

#[test]
fn test_article_scenario() {
    let html = to_html("# Title\n\nSome **bold** and *italic* text.\n\n- item one\n- item two");

    assert_eq!(html.matches("<h1>Title</h1>").count(), 1);
    assert_eq!(html.matches("<p>").count(), 1);
    assert!(html.contains("<strong>bold</strong>"));
    assert!(html.contains("<em>italic</em>"));
    assert_eq!(html.matches("<ul>").count(), 1);
    assert_eq!(html.matches("<li>").count(), 2);
}

#[test]
fn test_ordered_list_renumbered() {
    assert_eq!(to_html("5. a\n7. b"), "<ol><li>a</li><li>b</li></ol>");
}

#[test]
fn test_blank_line_splits_lists() {
    assert_eq!(
        to_html("- a\n\n- b"),
        "<ul><li>a</li></ul>\n<ul><li>b</li></ul>"
    );
}

#[test]
fn test_one_blockquote_per_line() {
    assert_eq!(
        to_html("> one\n> two"),
        "<blockquote>one</blockquote>\n<blockquote>two</blockquote>"
    );
}

#[test]
fn test_formatting_nested_in_quote_and_list() {
    assert_eq!(
        to_html("> - **deep** item"),
        "<blockquote><ul><li><strong>deep</strong> item</li></ul></blockquote>"
    );
}

#[test]
fn test_malformed_link_left_untouched() {
    assert_eq!(to_html("[broken](link"), "<p>[broken](link</p>");
    assert_eq!(to_html("![alt]"), "<p>![alt]</p>");
}

#[test]
fn test_text_is_escaped() {
    assert_eq!(to_html("a < b & c"), "<p>a &lt; b &amp; c</p>");
}

#[test]
fn test_raw_html_line_passes_through() {
    assert_eq!(
        to_html("<iframe src=\"https://youtube.com/embed/x\"></iframe>"),
        "<iframe src=\"https://youtube.com/embed/x\"></iframe>"
    );
}

#[test]
fn test_deep_heading_is_paragraph() {
    assert_eq!(to_html("#### Too deep"), "<p>#### Too deep</p>");
}

#[test]
fn test_underline_dialect() {
    assert_eq!(
        to_html("an _underlined_ word and a snake_case_name"),
        "<p>an <u>underlined</u> word and a snake_case_name</p>"
    );
}

#[test]
fn test_parse_structure() {
    let doc = MarkdownFormat::default()
        .parse("## Dojos\n- [Satoshi](https://nakamoto.gg/dojos/satoshi)")
        .unwrap();

    assert_eq!(doc.children.len(), 2);
    match &doc.children[1] {
        DocNode::List(list) => match &list.items[0].content[..] {
            [InlineContent::Link(link)] => {
                assert_eq!(link.href, "https://nakamoto.gg/dojos/satoshi")
            }
            other => panic!("Expected a single link, got {other:?}"),
        },
        other => panic!("Expected list, got {other:?}"),
    }
}

#[test]
fn test_kitchensink_html() {
    let md = r#"# Weekly Quest Log

Warriors earned **bold** XP and *fast* _ranks_ with `cargo`.

## Dojos

1. Satoshi Dojo
2. Vitalik Dojo
  - sub-team **alpha**

> Stay humble, stack sats.

![Banner](https://cdn.nakamoto.gg/banner.png)

```rust
fn main() {}
```

Read [the rules](https://nakamoto.gg/rules)."#;

    assert_snapshot!(to_html(md), @r###"
    <h1>Weekly Quest Log</h1>
    <p>Warriors earned <strong>bold</strong> XP and <em>fast</em> <u>ranks</u> with <code>cargo</code>.</p>
    <h2>Dojos</h2>
    <ol><li>Satoshi Dojo</li><li>Vitalik Dojo<ul><li>sub-team <strong>alpha</strong></li></ul></li></ol>
    <blockquote>Stay humble, stack sats.</blockquote>
    <img src="https://cdn.nakamoto.gg/banner.png" alt="Banner">
    <pre><code class="language-rust">fn main() {}</code></pre>
    <p>Read <a href="https://nakamoto.gg/rules">the rules</a>.</p>
    "###);
}
