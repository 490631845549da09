//! Format trait definition
//!
//! This module defines the core Format trait that all format implementations must implement.
//! The trait provides a uniform interface for parsing and serializing article documents.

use crate::error::FormatError;
use crate::ir::nodes::Document;
use std::collections::HashMap;

/// Trait for document formats
///
/// Implementors provide bidirectional conversion between a string representation and the
/// IR [`Document`]. Formats can support parsing, serialization, or both.
///
/// # Examples
///
/// ```ignore
/// struct MyFormat;
///
/// impl Format for MyFormat {
///     fn name(&self) -> &str {
///         "my-format"
///     }
///
///     fn supports_parsing(&self) -> bool {
///         true
///     }
///
///     fn parse(&self, source: &str) -> Result<Document, FormatError> {
///         todo!()
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// The name of this format (e.g., "markdown", "html")
    fn name(&self) -> &str;

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }

    /// File extensions associated with this format (e.g., ["md", "markdown"])
    ///
    /// Returns a slice of file extensions without the leading dot.
    /// Used for automatic format detection from filenames.
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    /// Whether this format supports parsing (source → Document)
    fn supports_parsing(&self) -> bool {
        false
    }

    /// Whether this format supports serialization (Document → source)
    fn supports_serialization(&self) -> bool {
        false
    }

    /// Parse source text into a Document
    ///
    /// Default implementation returns NotSupported error.
    fn parse(&self, _source: &str) -> Result<Document, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support parsing",
            self.name()
        )))
    }

    /// Serialize a Document into source text
    ///
    /// Default implementation returns NotSupported error.
    fn serialize(&self, _doc: &Document) -> Result<String, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support serialization",
            self.name()
        )))
    }

    /// Serialize a Document, optionally using extra parameters.
    ///
    /// Formats without options can rely on the default implementation, which
    /// delegates to [`Format::serialize`] and rejects any non-empty option map.
    fn serialize_with_options(
        &self,
        doc: &Document,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        if options.is_empty() {
            self.serialize(doc)
        } else {
            Err(FormatError::NotSupported(format!(
                "Format '{}' does not support extra parameters",
                self.name()
            )))
        }
    }
}

/// Reads a boolean format option ("true"/"false", "1"/"0", "yes"/"no").
pub(crate) fn bool_option(
    options: &HashMap<String, String>,
    key: &str,
) -> Result<Option<bool>, FormatError> {
    match options.get(key).map(|v| v.to_lowercase()) {
        None => Ok(None),
        Some(v) => match v.as_str() {
            "true" | "1" | "yes" | "y" => Ok(Some(true)),
            "false" | "0" | "no" | "n" => Ok(Some(false)),
            other => Err(FormatError::NotSupported(format!(
                "Invalid boolean value '{other}' for option '{key}'"
            ))),
        },
    }
}
