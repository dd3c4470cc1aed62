//! Pooled HTTP client carrying the site's static header and cookie contract.

mod response;
mod user_agent;

pub use response::TextResponse;
pub use user_agent::resolve_user_agent;

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::SiteConfig;
use crate::error::ScrapeError;
use crate::models::ListingQuery;

/// HTTP client shared by every request of the process.
///
/// Cloning is cheap: clones share the underlying connection pool.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    listing_url: String,
    cookie_header: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client for the configured site.
    pub fn new(site: &SiteConfig, timeout: Duration) -> Result<Self, ScrapeError> {
        let user_agent = resolve_user_agent(site.user_agent.as_deref());

        let mut headers = HeaderMap::new();
        for (name, value) in &site.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!("Skipping invalid header {}: {}", name, value),
            }
        }

        let client = Client::builder()
            .user_agent(&user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| {
                ScrapeError::TransportUnavailable(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            listing_url: site.listing_url(),
            cookie_header: site.cookie_header(),
        })
    }

    /// GET a page and read its body as text, whatever the status.
    pub async fn get_text(&self, url: &str) -> Result<TextResponse, ScrapeError> {
        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!(
            "GET {} -> {} ({} bytes, {} ms)",
            url,
            status.as_u16(),
            body.len(),
            start.elapsed().as_millis()
        );

        Ok(TextResponse { status, body })
    }

    /// Fetch one page of the listing endpoint and return the raw JSON body.
    ///
    /// Non-success statuses are reported as [`ScrapeError::UpstreamFormatChange`]:
    /// the endpoint answers 200 with an envelope whenever the cookie contract
    /// is still accepted.
    pub async fn fetch_listing(&self, query: &ListingQuery) -> Result<String, ScrapeError> {
        let mut request = self.client.get(&self.listing_url).query(&query.params());
        if let Some(ref cookies) = self.cookie_header {
            request = request.header(COOKIE, cookies);
        }

        let start = Instant::now();
        let response = request.send().await?;
        let status = response.status();

        debug!(
            "Listing {} page {} -> {} ({} ms)",
            query.genre,
            query.page,
            status.as_u16(),
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            return Err(ScrapeError::UpstreamFormatChange(format!(
                "listing endpoint returned status {}",
                status.as_u16()
            )));
        }

        Ok(response.text().await?)
    }
}
