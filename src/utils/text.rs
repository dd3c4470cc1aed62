//! Text normalisation for values read out of third-party markup.

/// Quotation glyphs the site wraps taglines in.
const QUOTE_GLYPHS: &[char] = &['«', '»', '“', '”', '„', '"'];

/// Remove the query string (and anything after it) from a URL.
///
/// Stripping is idempotent: `strip_query(&strip_query(s)) == strip_query(s)`.
pub fn strip_query(url: &str) -> String {
    match url.split_once('?') {
        Some((base, _)) => base.to_string(),
        None => url.to_string(),
    }
}

/// Collapse every run of whitespace (including NBSP and newlines) to a single
/// space and trim both ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim whitespace and the quotation glyphs wrapping the text. Quotes
/// inside the text are kept.
pub fn strip_quote_glyphs(s: &str) -> String {
    s.trim_matches(|c: char| c.is_whitespace() || QUOTE_GLYPHS.contains(&c))
        .to_string()
}

/// Trim a scraped value, turning blank strings into `None`.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
