//! Format registry for format discovery and selection
//!
//! This module provides a centralized registry for all available formats.
//! Formats can be registered and retrieved by name.

use crate::error::FormatError;
use crate::format::Format;
use crate::ir::nodes::Document;
use std::collections::HashMap;

/// Registry of document formats
///
/// # Examples
///
/// ```ignore
/// let registry = FormatRegistry::default();
/// let doc = registry.parse("# Title", "markdown")?;
/// let html = registry.serialize(&doc, "html")?;
/// ```
pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Register a format
    ///
    /// If a format with the same name already exists, it will be replaced.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    /// Get a format by name
    pub fn get(&self, name: &str) -> Result<&dyn Format, FormatError> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| FormatError::FormatNotFound(name.to_string()))
    }

    /// Check if a format exists
    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// List all available format names (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    /// Detect format from filename based on file extension
    ///
    /// Returns the format name if a matching extension is found, or None otherwise.
    pub fn detect_format_from_filename(&self, filename: &str) -> Option<String> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_lowercase();

        self.formats
            .values()
            .find(|format| format.file_extensions().contains(&extension.as_str()))
            .map(|format| format.name().to_string())
    }

    /// Parse source text using the specified format
    pub fn parse(&self, source: &str, format: &str) -> Result<Document, FormatError> {
        let fmt = self.get(format)?;
        if !fmt.supports_parsing() {
            return Err(FormatError::NotSupported(format!(
                "Format '{format}' does not support parsing"
            )));
        }
        fmt.parse(source)
    }

    /// Serialize a document using the specified format
    pub fn serialize(&self, doc: &Document, format: &str) -> Result<String, FormatError> {
        self.serialize_with_options(doc, format, &HashMap::new())
    }

    /// Serialize a document using the specified format and options
    pub fn serialize_with_options(
        &self,
        doc: &Document,
        format: &str,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        let fmt = self.get(format)?;
        if !fmt.supports_serialization() {
            return Err(FormatError::NotSupported(format!(
                "Format '{format}' does not support serialization"
            )));
        }
        fmt.serialize_with_options(doc, options)
    }

    /// Parse with one format and serialize with another
    pub fn convert(
        &self,
        source: &str,
        from: &str,
        to: &str,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        let doc = self.parse(source, from)?;
        self.serialize_with_options(&doc, to, options)
    }

    /// Create a registry with default formats
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(crate::formats::markdown::MarkdownFormat::default());
        registry.register(crate::formats::html::HtmlFormat::default());

        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::nodes::{DocNode, InlineContent, Paragraph};

    struct TestFormat;
    impl Format for TestFormat {
        fn name(&self) -> &str {
            "test"
        }
        fn description(&self) -> &str {
            "Test format"
        }
        fn file_extensions(&self) -> &[&str] {
            &["tst"]
        }
        fn supports_parsing(&self) -> bool {
            true
        }
        fn supports_serialization(&self) -> bool {
            true
        }
        fn parse(&self, _source: &str) -> Result<Document, FormatError> {
            Ok(Document {
                children: vec![DocNode::Paragraph(Paragraph {
                    content: vec![InlineContent::Text("test".to_string())],
                })],
            })
        }
        fn serialize(&self, _doc: &Document) -> Result<String, FormatError> {
            Ok("test output".to_string())
        }
    }

    struct ParseOnlyFormat;
    impl Format for ParseOnlyFormat {
        fn name(&self) -> &str {
            "parse-only"
        }
        fn supports_parsing(&self) -> bool {
            true
        }
        fn parse(&self, _source: &str) -> Result<Document, FormatError> {
            Ok(Document::default())
        }
    }

    #[test]
    fn test_registry_creation() {
        let registry = FormatRegistry::new();
        assert_eq!(registry.formats.len(), 0);
    }

    #[test]
    fn test_registry_register() {
        let mut registry = FormatRegistry::new();
        registry.register(TestFormat);

        assert!(registry.has("test"));
        assert_eq!(registry.list_formats(), vec!["test"]);
    }

    #[test]
    fn test_registry_get_nonexistent() {
        let registry = FormatRegistry::new();
        match registry.get("nonexistent") {
            Err(FormatError::FormatNotFound(name)) => assert_eq!(name, "nonexistent"),
            _ => panic!("Expected FormatNotFound error"),
        }
    }

    #[test]
    fn test_registry_parse_and_serialize() {
        let mut registry = FormatRegistry::new();
        registry.register(TestFormat);

        let doc = registry.parse("input", "test").unwrap();
        assert_eq!(doc.children.len(), 1);
        assert_eq!(registry.serialize(&doc, "test").unwrap(), "test output");
    }

    #[test]
    fn test_registry_serialize_not_supported() {
        let mut registry = FormatRegistry::new();
        registry.register(ParseOnlyFormat);

        let result = registry.serialize(&Document::default(), "parse-only");
        assert!(matches!(result, Err(FormatError::NotSupported(_))));
    }

    #[test]
    fn test_default_options_rejected() {
        let mut registry = FormatRegistry::new();
        registry.register(TestFormat);

        let mut options = HashMap::new();
        options.insert("theme".to_string(), "dark".to_string());
        let result = registry.serialize_with_options(&Document::default(), "test", &options);
        assert!(matches!(result, Err(FormatError::NotSupported(_))));
    }

    #[test]
    fn test_detect_format_from_filename() {
        let registry = FormatRegistry::default();
        assert_eq!(
            registry.detect_format_from_filename("article.md"),
            Some("markdown".to_string())
        );
        assert_eq!(
            registry.detect_format_from_filename("draft.HTML"),
            Some("html".to_string())
        );
        assert_eq!(registry.detect_format_from_filename("notes.txt"), None);
        assert_eq!(registry.detect_format_from_filename("README"), None);
    }

    #[test]
    fn test_default_formats() {
        let registry = FormatRegistry::default();
        assert_eq!(registry.list_formats(), vec!["html", "markdown"]);
    }

    #[test]
    fn test_convert_markdown_to_html() {
        let registry = FormatRegistry::default();
        let html = registry
            .convert("# Title", "markdown", "html", &HashMap::new())
            .unwrap();
        assert_eq!(html, "<h1>Title</h1>");
    }
}
