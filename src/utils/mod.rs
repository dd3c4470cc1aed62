//! Shared utility functions.
//!
//! - `text`: normalisation helpers applied to scraped strings (query
//!   stripping, whitespace collapsing, quote removal)

mod text;

pub use text::{collapse_whitespace, non_empty, strip_query, strip_quote_glyphs};
