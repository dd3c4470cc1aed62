//! Error types shared by the transport, navigation and extraction layers.
//!
//! Field-level extraction gaps are not errors: a locator that matches nothing
//! yields `None` (or an empty list) and extraction carries on. A search with
//! no hits is not an error either; it surfaces as
//! [`DetailOutcome::NotFound`](crate::scrapers::DetailOutcome::NotFound).

use thiserror::Error;

/// Failures that end a scraping call.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A shared transport was used before it was started.
    #[error("Transport unavailable: {0}")]
    TransportUnavailable(String),

    /// The browser or automation engine failed to start.
    #[error("Browser launch failed: {0}")]
    ResourceLaunchFailure(String),

    /// A page or element wait exceeded its bound.
    #[error("Navigation timed out: {0}")]
    NavigationTimeout(String),

    /// Navigation or protocol error other than a timeout.
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// The upstream markup or JSON envelope no longer has the expected shape.
    #[error("Upstream format changed: {0}")]
    UpstreamFormatChange(String),

    /// A CSS selector failed to parse.
    #[error("Invalid selector '{0}'")]
    InvalidSelector(String),

    /// A record could not be constructed from the extracted fields.
    #[error("Invalid record: {0}")]
    Validation(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScrapeError {
    /// Whether this failure came from an exceeded wait bound.
    pub fn is_timeout(&self) -> bool {
        match self {
            ScrapeError::NavigationTimeout(_) => true,
            ScrapeError::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;
