//! Driver seam between navigation logic and the automation engine.

use std::sync::Arc;

use async_trait::async_trait;

use super::Locator;
use crate::error::ScrapeResult;

/// One isolated browsing context with a single page.
///
/// Queries act on the first element the locator resolves to and report a
/// missing element as `None`, never as an error.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate and wait for the document to load.
    async fn goto(&self, url: &str) -> ScrapeResult<()>;

    /// Wait until the current document is interactive.
    async fn wait_for_load(&self) -> ScrapeResult<()>;

    async fn current_url(&self) -> ScrapeResult<Option<String>>;

    async fn count(&self, locator: &Locator) -> ScrapeResult<usize>;

    /// Full text content of the element.
    async fn text(&self, locator: &Locator) -> ScrapeResult<Option<String>>;

    /// First non-blank text node that is a direct child of the element.
    async fn own_text(&self, locator: &Locator) -> ScrapeResult<Option<String>>;

    async fn attribute(&self, locator: &Locator, name: &str) -> ScrapeResult<Option<String>>;

    /// Activate the element and wait for the next document.
    async fn click(&self, locator: &Locator) -> ScrapeResult<()>;

    /// Scroll to the bottom until the page stops growing.
    async fn scroll_to_end(&self) -> ScrapeResult<()>;

    /// Close the page and dispose its context. Idempotent.
    async fn close(&self) -> ScrapeResult<()>;
}

/// A running browser instance.
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    fn headless(&self) -> bool;

    /// Open a fresh isolated context with one blank page.
    async fn open_context(&self) -> ScrapeResult<Box<dyn PageDriver>>;

    async fn close(&self) -> ScrapeResult<()>;
}

/// Starts browsers and owns the automation engine behind them.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self, headless: bool) -> ScrapeResult<Arc<dyn BrowserEngine>>;

    /// Stop the automation engine. Called once every browser is closed.
    async fn shutdown(&self) -> ScrapeResult<()>;
}
