//! Terse records produced from the paginated listing fragment.

use serde::{Deserialize, Serialize};

/// One entry of a listing page.
///
/// Only `title` is mandatory. Every other field is `None` (or empty) when
/// the corresponding node was missing from the entry. An entry without a
/// title node still yields a record, with an empty `title`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    /// Kept as text: the site renders partial or unknown years verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    /// Genre labels in the order they appear.
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// Poster URL without its query string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

impl ListingRecord {
    /// Create a record with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            original_title: None,
            year: None,
            genres: Vec::new(),
            duration: None,
            poster: None,
        }
    }
}
