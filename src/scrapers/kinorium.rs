//! Kinorium service: the entry points the CLI and the web server call.

use std::sync::Arc;

use tracing::{debug, info};

use super::detail::extract_movie;
use super::health::{self, HealthReport};
use super::listing::{fragment_from_envelope, ListingExtractor};
use super::session::{NavigationSession, SessionSettings};
use super::transport::TransportPool;
use crate::error::{ScrapeError, ScrapeResult};
use crate::models::{ListingQuery, ListingRecord, MovieRecord};

/// What a detail request should produce once the detail page is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailMode {
    /// Extract the full record, cast included.
    #[default]
    Scrape,
    /// Stop at the detail page and return its URL.
    LinkOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    Record(MovieRecord),
    Link(String),
    NotFound,
}

pub struct KinoriumService {
    pool: Arc<TransportPool>,
}

impl KinoriumService {
    pub fn new(pool: Arc<TransportPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<TransportPool> {
        &self.pool
    }

    /// One page of the genre listing, via the lightweight HTTP path.
    pub async fn list_movies(&self, query: &ListingQuery) -> ScrapeResult<Vec<ListingRecord>> {
        let http = self.pool.acquire_http()?;
        let body = http.fetch_listing(query).await?;
        let fragment = fragment_from_envelope(&body);
        let records = ListingExtractor::new()?.extract(&fragment);
        info!(
            "Listed {} movies ({} page {})",
            records.len(),
            query.genre,
            query.page
        );
        Ok(records)
    }

    /// Look a movie up by title and walk to its detail page.
    ///
    /// The walk runs on its own task, so dropping the returned future does
    /// not stop it: the browsing context is still released once the walk
    /// ends.
    pub async fn movie_detail(
        &self,
        title: &str,
        mode: DetailMode,
        headless: bool,
    ) -> ScrapeResult<DetailOutcome> {
        let pool = self.pool.clone();
        let title = title.to_string();
        let task = tokio::spawn(async move { detail_session(&pool, &title, mode, headless).await });

        task.await
            .map_err(|e| ScrapeError::Navigation(format!("detail task failed: {}", e)))?
    }

    pub async fn health_check(&self) -> HealthReport {
        match self.pool.acquire_http() {
            Ok(http) => health::check(&http, &self.pool.config().site).await,
            Err(e) => HealthReport::unreachable(e.to_string()),
        }
    }
}

/// Open a session, walk it and close it whatever the walk returned.
async fn detail_session(
    pool: &TransportPool,
    title: &str,
    mode: DetailMode,
    headless: bool,
) -> ScrapeResult<DetailOutcome> {
    let engine = pool.acquire_browser(headless).await?;
    let settings = SessionSettings::from_config(pool.config(), headless);
    let mut session = NavigationSession::open(engine.as_ref(), settings).await?;

    let outcome = walk(&mut session, title, mode).await;
    // close() logs its own failure; the walk's outcome wins
    let _ = session.close().await;
    outcome
}

async fn walk(
    session: &mut NavigationSession,
    title: &str,
    mode: DetailMode,
) -> ScrapeResult<DetailOutcome> {
    if !session.search(title).await? {
        return Ok(DetailOutcome::NotFound);
    }
    session.open_first_result().await?;

    match mode {
        DetailMode::LinkOnly => {
            let url = session.current_url().await?.ok_or_else(|| {
                ScrapeError::Navigation("detail page has no URL".to_string())
            })?;
            debug!("Detail page for {:?} is {}", title, url);
            Ok(DetailOutcome::Link(url))
        }
        DetailMode::Scrape => Ok(DetailOutcome::Record(extract_movie(session).await?)),
    }
}
