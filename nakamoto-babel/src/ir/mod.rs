//! Intermediate Representation (IR) for article documents.
//!
//! This module defines a format-agnostic representation of an article,
//! shared by the Markdown and HTML formats. Parsers build it, renderers
//! consume it, so both directions of a conversion agree on one model.

pub mod events;
pub mod nodes;
