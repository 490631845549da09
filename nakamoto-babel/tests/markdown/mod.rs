//! Markdown format tests
//!
//! Tests for Markdown → HTML expansion and HTML → Markdown reduction.

mod export;
mod import;
