//! Markdown → HTML → Markdown round trips
//!
//! The conversion is lossy in general, but for the supported dialect the
//! Markdown that comes back must parse to the same structure. Span and code
//! shapes coming from HTML must survive the trip through Markdown as well.

use nakamoto_babel::formats::html::parser::parse_from_html;
use nakamoto_babel::formats::markdown::parser::parse_from_markdown;
use nakamoto_babel::{to_html, to_markdown};
use proptest::prelude::*;

const CORPUS: &[&str] = &[
    "# Title\n\nSome **bold** and *italic* text.\n\n- item one\n- item two",
    "## Second level\n\n### Third level",
    "An _underlined_ word, `inline code` and a [link](https://nakamoto.gg/dojos).",
    "5. a\n7. b\n9. c",
    "- outer\n  - inner **bold**\n- back out",
    "> quoted *line*\n> another line",
    "![Banner](https://cdn.nakamoto.gg/banner.png)",
    "```rust\nfn main() {\n    println!(\"gm\");\n}\n```",
    "Price is 5 * 3 = 15 and [brackets] stay literal",
    "**bold with _underline_ inside** then *italic with `code`*",
    "Text with a backslash \\ and snake_case_name",
    "***bold italic*** and ***lead** tail* and ***lead* tail**",
    "*a**b* then **a***b* then *a***b**",
    "***a** b **c*** and ***a* b *c***",
    "````\na\n```\nb\n````\n\nafter",
    "",
];

fn assert_structure_survives(md: &str) {
    let original = parse_from_markdown(md).unwrap();
    let html = to_html(md);
    let back = to_markdown(&html);
    let reparsed = parse_from_markdown(&back).unwrap();
    assert_eq!(
        reparsed, original,
        "structure changed\n--- markdown ---\n{md}\n--- html ---\n{html}\n--- back ---\n{back}"
    );
}

#[test]
fn test_corpus_round_trip() {
    for md in CORPUS {
        assert_structure_survives(md);
    }
}

#[test]
fn test_scenario_round_trip_is_exact() {
    let md = "# Title\n\nSome **bold** and *italic* text.\n\n- item one\n- item two";
    assert_eq!(to_markdown(&to_html(md)), md);
}

#[test]
fn test_markdown_output_is_stable() {
    for md in CORPUS {
        let once = to_markdown(&to_html(md));
        let twice = to_markdown(&to_html(&once));
        assert_eq!(once, twice);
    }
}

#[test]
fn test_html_spans_survive_markdown() {
    let cases = [
        "<p><strong><em>x</em></strong></p>",
        "<p><em><strong>lead</strong> tail</em></p>",
        "<p><strong><em>lead</em> tail</strong></p>",
        "<p><em>a</em><em>b</em></p>",
        "<p><strong>a</strong><em>b</em> <em>c</em><strong>d</strong></p>",
        "<p><em>a <strong>b</strong></em> and <strong>c <em>d</em></strong></p>",
        "<pre><code>a\n```\nb</code></pre><p>after</p>",
    ];
    for html in cases {
        let original = parse_from_html(html).unwrap();
        let md = to_markdown(html);
        let back = parse_from_html(&to_html(&md)).unwrap();
        assert_eq!(back, original, "structure changed\n--- html ---\n{html}\n--- md ---\n{md}");
    }
}

fn word() -> impl Strategy<Value = String> {
    ("[a-z]{1,8}", "[a-z]{1,8}", 0..11usize).prop_map(|(w, v, style)| match style {
        0 => format!("**{w}**"),
        1 => format!("*{w}*"),
        2 => format!("_{w}_"),
        3 => format!("`{w}`"),
        4 => format!("[{w}](https://nakamoto.gg/{w})"),
        5 => format!("***{w}***"),
        6 => format!("***{w}** {v}*"),
        7 => format!("***{w}* {v}**"),
        8 => format!("*{w}**{v}*"),
        9 => format!("**{w}***{v}*"),
        _ => w,
    })
}

fn line() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["", "# ", "## ", "- ", "1. ", "> "]),
        prop::collection::vec(word(), 1..6),
    )
        .prop_map(|(prefix, words)| format!("{prefix}{}", words.join(" ")))
}

proptest! {
    #[test]
    fn prop_dialect_round_trip(lines in prop::collection::vec(line(), 0..8)) {
        let md = lines.join("\n");
        let original = parse_from_markdown(&md).unwrap();
        let back = to_markdown(&to_html(&md));
        prop_assert_eq!(parse_from_markdown(&back).unwrap(), original);
    }

    #[test]
    fn prop_conversions_never_panic(input in "\\PC{0,200}") {
        let _ = to_html(&input);
        let _ = to_markdown(&input);
    }
}
