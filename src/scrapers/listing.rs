//! Listing extractor: the paginated list endpoint's HTML fragment into
//! [`ListingRecord`]s.

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::{debug, warn};

use super::selectors;
use crate::error::{ScrapeError, ScrapeResult};
use crate::models::ListingRecord;
use crate::utils::{collapse_whitespace, strip_query};

/// Pull the HTML fragment out of the endpoint's JSON envelope.
///
/// The fragment lives at `result.html`. Any other shape (invalid JSON,
/// missing or non-object `result`, non-string `html`) yields an empty
/// fragment and a warning.
pub fn fragment_from_envelope(body: &str) -> String {
    let envelope: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            warn!("Listing response is not JSON: {}", e);
            return String::new();
        }
    };

    let Some(result) = envelope.get("result").and_then(Value::as_object) else {
        warn!("Listing envelope has no 'result' object");
        return String::new();
    };

    match result.get("html").and_then(Value::as_str) {
        Some(html) => html.to_string(),
        None => {
            warn!("Listing envelope has no 'result.html' string");
            String::new()
        }
    }
}

/// Split "Original Name, 1999" into original title and year.
///
/// Text from the first `(` on is ignored. With several comma-separated
/// segments the first is the original title and the last the year; a lone
/// segment is a year when it looks like one, otherwise an original title.
pub fn split_original_and_year(text: &str) -> (Option<String>, Option<String>) {
    let head = text.split_once('(').map_or(text, |(head, _)| head);
    let segments: Vec<&str> = head
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    match segments.as_slice() {
        [] => (None, None),
        [only] if looks_like_year(only) => (None, Some(only.to_string())),
        [only] => (Some(only.to_string()), None),
        [first, .., last] => (Some(first.to_string()), Some(last.to_string())),
    }
}

fn looks_like_year(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_digit())
        && s.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | '–' | '—' | ' ' | '.'))
}

/// Split "A, B, 45 min" into genre labels and duration.
///
/// The last segment is the duration when it carries a number; otherwise the
/// entry has no running time and every segment is a genre.
pub fn split_genres_and_duration(text: &str) -> (Vec<String>, Option<String>) {
    let mut segments: Vec<String> = text
        .split(',')
        .map(collapse_whitespace)
        .filter(|s| !s.is_empty())
        .collect();

    let duration = match segments.last() {
        Some(last) if last.chars().any(|c| c.is_ascii_digit()) => segments.pop(),
        _ => None,
    };

    (segments, duration)
}

fn parse_selector(css: &str) -> ScrapeResult<Selector> {
    Selector::parse(css).map_err(|_| ScrapeError::InvalidSelector(css.to_string()))
}

/// Parsed selectors for listing entries.
pub struct ListingExtractor {
    entry: Selector,
    title: Selector,
    original: Selector,
    genres: Selector,
    poster: Selector,
}

impl ListingExtractor {
    pub fn new() -> ScrapeResult<Self> {
        Ok(Self {
            entry: parse_selector(selectors::LISTING_ENTRY)?,
            title: parse_selector(selectors::LISTING_TITLE)?,
            original: parse_selector(selectors::LISTING_ORIGINAL)?,
            genres: parse_selector(selectors::LISTING_GENRES)?,
            poster: parse_selector(selectors::LISTING_POSTER)?,
        })
    }

    /// Extract one record per entry node, in document order.
    pub fn extract(&self, fragment: &str) -> Vec<ListingRecord> {
        let doc = Html::parse_fragment(fragment);
        let records: Vec<_> = doc
            .select(&self.entry)
            .enumerate()
            .map(|(i, entry)| self.extract_entry(i, entry))
            .collect();
        debug!("Extracted {} listing entries", records.len());
        records
    }

    /// A missing title becomes `""` rather than dropping the entry, so K
    /// entry nodes always give K records. It is the one field without an
    /// explicit `None`.
    fn extract_entry(&self, index: usize, entry: ElementRef<'_>) -> ListingRecord {
        let title = text_of(entry, &self.title).unwrap_or_else(|| {
            warn!("Listing entry {} has no title", index);
            String::new()
        });
        let mut record = ListingRecord::new(title);

        // a lone segment is a year only when it looks like one
        if let Some(text) = text_of(entry, &self.original) {
            let (original_title, year) = split_original_and_year(&text);
            record.original_title = original_title;
            record.year = year;
        }

        // a last segment without digits is kept as a genre, not a duration
        if let Some(text) = text_of(entry, &self.genres) {
            let (genres, duration) = split_genres_and_duration(&text);
            record.genres = genres;
            record.duration = duration;
        }

        record.poster = entry.select(&self.poster).next().and_then(|img| {
            img.value()
                .attr("src")
                .or_else(|| img.value().attr("data-src"))
                .map(strip_query)
                .filter(|src| !src.is_empty())
        });

        record
    }
}

/// Whitespace-collapsed text of the first match, `None` when absent or blank.
fn text_of(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}
