//! HTML format tests

mod export;
mod import;
