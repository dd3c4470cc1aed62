//! Navigation session: one isolated browsing context driving the
//! search → detail → cast walk for a single request.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};
use url::Url;

use super::browser::{BrowserEngine, PageDriver};
use super::selectors;
use crate::config::Config;
use crate::error::{ScrapeError, ScrapeResult};

/// Where a session is in its walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    SearchSubmitted,
    ResultFound,
    ResultNotFound,
    DetailLoaded,
    CrewRequested,
    CrewLoaded,
    Closed,
}

/// Per-session navigation settings.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Search page URL without the query.
    pub search_url: String,
    /// Bound for every navigation and element wait.
    pub wait_timeout: Duration,
    /// Hold time before a visible session closes.
    pub observation_delay: Duration,
    pub headless: bool,
}

impl SessionSettings {
    pub fn from_config(config: &Config, headless: bool) -> Self {
        Self {
            search_url: config.site.search_url(),
            wait_timeout: config.browser.wait_timeout(),
            observation_delay: config.browser.observation_delay(),
            headless,
        }
    }
}

/// A browsing context owned by exactly one request.
///
/// Callers must end every session with [`close`](Self::close), on success
/// and failure alike; nothing else releases the context.
pub struct NavigationSession {
    page: Box<dyn PageDriver>,
    settings: SessionSettings,
    state: SessionState,
}

impl NavigationSession {
    /// Open a fresh context on the given browser.
    pub async fn open(engine: &dyn BrowserEngine, settings: SessionSettings) -> ScrapeResult<Self> {
        let page = engine.open_context().await?;
        debug!("Session opened (headless={})", settings.headless);
        Ok(Self::with_page(page, settings))
    }

    /// Wrap an already opened page.
    pub fn with_page(page: Box<dyn PageDriver>, settings: SessionSettings) -> Self {
        Self {
            page,
            settings,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn page(&self) -> &dyn PageDriver {
        self.page.as_ref()
    }

    fn expect_state(&self, expected: &[SessionState], action: &str) -> ScrapeResult<()> {
        if expected.contains(&self.state) {
            Ok(())
        } else {
            Err(ScrapeError::Navigation(format!(
                "cannot {} in state {:?}",
                action, self.state
            )))
        }
    }

    /// Run one wait under the session's timeout.
    pub(crate) async fn bounded<T>(
        &self,
        what: &str,
        fut: impl Future<Output = ScrapeResult<T>>,
    ) -> ScrapeResult<T> {
        match tokio::time::timeout(self.settings.wait_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(ScrapeError::NavigationTimeout(format!(
                "{} exceeded {:?}",
                what, self.settings.wait_timeout
            ))),
        }
    }

    /// Search for `title` and report whether any result came back.
    ///
    /// `Idle → SearchSubmitted → ResultFound | ResultNotFound`
    pub async fn search(&mut self, title: &str) -> ScrapeResult<bool> {
        self.expect_state(&[SessionState::Idle], "search")?;

        let url = Url::parse_with_params(&self.settings.search_url, &[("q", title)])
            .map_err(|e| ScrapeError::Navigation(format!("bad search URL: {}", e)))?;
        info!("Searching for {:?}", title);
        self.bounded("search page load", self.page.goto(url.as_str()))
            .await?;
        self.state = SessionState::SearchSubmitted;

        let hits = self
            .bounded("search results", self.page.count(&selectors::first_result()))
            .await?;
        if hits == 0 {
            info!("No search results for {:?}", title);
            self.state = SessionState::ResultNotFound;
            return Ok(false);
        }

        self.state = SessionState::ResultFound;
        Ok(true)
    }

    /// Follow the first search result to its detail page.
    ///
    /// `ResultFound → DetailLoaded`
    pub async fn open_first_result(&mut self) -> ScrapeResult<()> {
        self.expect_state(&[SessionState::ResultFound], "open result")?;

        self.bounded(
            "detail page load",
            self.page.click(&selectors::first_result_link()),
        )
        .await?;
        self.state = SessionState::DetailLoaded;
        debug!("Detail page loaded");
        Ok(())
    }

    /// Navigate straight to a known detail page.
    ///
    /// `Idle → DetailLoaded`
    pub async fn open_detail(&mut self, url: &str) -> ScrapeResult<()> {
        self.expect_state(&[SessionState::Idle], "open detail page")?;

        self.bounded("detail page load", self.page.goto(url)).await?;
        self.state = SessionState::DetailLoaded;
        Ok(())
    }

    /// URL of the page currently loaded.
    pub async fn current_url(&self) -> ScrapeResult<Option<String>> {
        self.bounded("current url", self.page.current_url()).await
    }

    /// Follow the cast link and scroll until every entry is rendered.
    ///
    /// `DetailLoaded → CrewRequested → CrewLoaded`. Returns `false`, leaving
    /// the session on the detail page, when the page has no cast link.
    pub async fn open_crew(&mut self) -> ScrapeResult<bool> {
        self.expect_state(&[SessionState::DetailLoaded], "open cast page")?;

        let links = self
            .bounded("cast link", self.page.count(&selectors::crew_link()))
            .await?;
        if links == 0 {
            debug!("Detail page has no cast link");
            return Ok(false);
        }

        self.state = SessionState::CrewRequested;
        self.bounded("cast page load", self.page.click(&selectors::crew_link()))
            .await?;
        self.bounded("cast page scroll", self.page.scroll_to_end())
            .await?;
        self.state = SessionState::CrewLoaded;
        debug!("Cast page loaded");
        Ok(true)
    }

    /// Release the browsing context. Idempotent.
    ///
    /// Visible sessions are held open for the observation delay first.
    pub async fn close(&mut self) -> ScrapeResult<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }

        if !self.settings.headless && !self.settings.observation_delay.is_zero() {
            debug!(
                "Holding visible session for {:?}",
                self.settings.observation_delay
            );
            tokio::time::sleep(self.settings.observation_delay).await;
        }

        let previous = self.state;
        self.state = SessionState::Closed;
        let result = self.page.close().await;
        match result {
            Ok(()) => debug!("Session closed from state {:?}", previous),
            Err(ref e) => warn!("Failed to close browsing context: {}", e),
        }
        result
    }
}
