//! Format implementations
//!
//! This module contains the format implementations that convert between the
//! IR and text representations.

pub mod html;
pub mod markdown;

pub use html::{HtmlFormat, HtmlOptions};
pub use markdown::{MarkdownFormat, MarkdownOptions};
