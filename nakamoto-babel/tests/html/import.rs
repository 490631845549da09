//! Import tests for HTML format (HTML → IR)

use nakamoto_babel::format::Format;
use nakamoto_babel::formats::html::HtmlFormat;
use nakamoto_babel::ir::nodes::*;

fn parse(html: &str) -> Document {
    HtmlFormat::default().parse(html).unwrap()
}

fn text(s: &str) -> InlineContent {
    InlineContent::Text(s.to_string())
}

#[test]
fn test_malformed_html_recovers() {
    let doc = parse("<p>unclosed <strong>bold<p>next");
    assert_eq!(doc.children.len(), 2);
    assert!(matches!(&doc.children[0], DocNode::Paragraph(_)));
}

#[test]
fn test_loose_text_becomes_paragraph() {
    assert_eq!(
        parse("just text <em>and more</em>").children,
        vec![DocNode::Paragraph(Paragraph {
            content: vec![text("just text "), InlineContent::Italic(vec![text("and more")])]
        })]
    );
}

#[test]
fn test_code_language_variants() {
    let doc = parse(
        "<pre class=\"lang-js\"><code>a()</code></pre><pre data-language=\"sh\">ls</pre>",
    );
    assert_eq!(
        doc.children,
        vec![
            DocNode::CodeBlock(CodeBlock {
                language: Some("js".to_string()),
                content: "a()".to_string(),
            }),
            DocNode::CodeBlock(CodeBlock {
                language: Some("sh".to_string()),
                content: "ls".to_string(),
            }),
        ]
    );
}

#[test]
fn test_image_paragraph_becomes_image_block() {
    assert_eq!(
        parse("<p><img src=\"a.png\" alt=\"A\" title=\"T\"></p>").children,
        vec![DocNode::Image(Image {
            src: "a.png".to_string(),
            alt: "A".to_string(),
            title: Some("T".to_string()),
        })]
    );
}

#[test]
fn test_layout_containers_unwrapped() {
    let doc = parse("<section><div><h2>Hi</h2><div>inside</div></div></section><hr><footer>bye</footer>");
    assert_eq!(
        doc.children,
        vec![
            DocNode::Heading(Heading {
                level: 2,
                content: vec![text("Hi")]
            }),
            DocNode::Paragraph(Paragraph {
                content: vec![text("inside")]
            }),
            DocNode::Paragraph(Paragraph {
                content: vec![text("bye")]
            }),
        ]
    );
}

#[test]
fn test_styles_and_scripts_dropped() {
    let doc = parse("<style>p { color: red }</style><p>visible</p><script>alert(1)</script>");
    assert_eq!(
        doc.children,
        vec![DocNode::Paragraph(Paragraph {
            content: vec![text("visible")]
        })]
    );
}
