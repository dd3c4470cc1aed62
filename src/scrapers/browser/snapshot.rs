//! In-memory page driver over saved HTML documents.
//!
//! Used to run the detail extractor against pages saved to disk and to
//! exercise navigation logic without a browser. Clicking a link follows its
//! `href` to another registered document.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use super::{Locator, PageDriver};
use crate::error::{ScrapeError, ScrapeResult};

#[derive(Debug, Default)]
struct SnapshotState {
    current: Option<String>,
    closed: bool,
    scrolls: usize,
}

#[derive(Debug, Default)]
pub struct SnapshotPage {
    pages: Mutex<HashMap<String, String>>,
    state: Mutex<SnapshotState>,
    live: Option<Arc<AtomicUsize>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Canonical form used as the map key, so `http://host` and `http://host/`
/// name the same document.
fn normalize(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

fn parse_selector(css: &str) -> ScrapeResult<Selector> {
    Selector::parse(css).map_err(|_| ScrapeError::InvalidSelector(css.to_string()))
}

/// Resolve a locator against a parsed document, in document order.
pub fn resolve<'a>(doc: &'a Html, locator: &Locator) -> ScrapeResult<Vec<ElementRef<'a>>> {
    let mut scope: Option<Vec<ElementRef<'a>>> = None;

    for step in locator.steps() {
        let selector = parse_selector(&step.selector)?;
        let mut next: Vec<ElementRef<'a>> = match &scope {
            None => doc.select(&selector).collect(),
            Some(nodes) => nodes.iter().flat_map(|n| n.select(&selector)).collect(),
        };
        if let Some(index) = step.index {
            next = next.into_iter().nth(index).into_iter().collect();
        }
        scope = Some(next);
    }

    Ok(scope.unwrap_or_default())
}

/// First direct, non-blank text node of an element.
pub fn own_text_of(el: ElementRef<'_>) -> Option<String> {
    el.children()
        .filter_map(|child| child.value().as_text())
        .map(|text| text.to_string())
        .find(|text| !text.trim().is_empty())
}

impl SnapshotPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, html: impl Into<String>) -> Self {
        self.insert(url, html);
        self
    }

    /// Register (or replace) the document served for `url`.
    pub fn insert(&self, url: &str, html: impl Into<String>) {
        lock(&self.pages).insert(normalize(url), html.into());
    }

    /// Count this page in `live` until it is closed.
    pub(crate) fn tracked(mut self, live: Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        self.live = Some(live);
        self
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }

    pub fn scroll_count(&self) -> usize {
        lock(&self.state).scrolls
    }

    fn ensure_open(&self) -> ScrapeResult<()> {
        if self.is_closed() {
            return Err(ScrapeError::Navigation("page is closed".to_string()));
        }
        Ok(())
    }

    /// Run `f` over the current document.
    fn with_document<T>(&self, f: impl FnOnce(&Html) -> ScrapeResult<T>) -> ScrapeResult<T> {
        self.ensure_open()?;
        let current = lock(&self.state).current.clone();
        let html = match current {
            Some(url) => lock(&self.pages).get(&url).cloned().unwrap_or_default(),
            None => String::new(),
        };
        let doc = Html::parse_document(&html);
        f(&doc)
    }

    fn first<T>(
        &self,
        locator: &Locator,
        f: impl FnOnce(ElementRef<'_>) -> Option<T>,
    ) -> ScrapeResult<Option<T>> {
        self.with_document(|doc| Ok(resolve(doc, locator)?.into_iter().next().and_then(f)))
    }

    fn navigate(&self, url: &str) -> ScrapeResult<()> {
        let key = normalize(url);
        if !lock(&self.pages).contains_key(&key) {
            return Err(ScrapeError::Navigation(format!("no document for {}", url)));
        }
        debug!("Snapshot navigation to {}", key);
        lock(&self.state).current = Some(key);
        Ok(())
    }
}

#[async_trait]
impl PageDriver for SnapshotPage {
    async fn goto(&self, url: &str) -> ScrapeResult<()> {
        self.ensure_open()?;
        self.navigate(url)
    }

    async fn wait_for_load(&self) -> ScrapeResult<()> {
        self.ensure_open()
    }

    async fn current_url(&self) -> ScrapeResult<Option<String>> {
        self.ensure_open()?;
        Ok(lock(&self.state).current.clone())
    }

    async fn count(&self, locator: &Locator) -> ScrapeResult<usize> {
        self.with_document(|doc| Ok(resolve(doc, locator)?.len()))
    }

    async fn text(&self, locator: &Locator) -> ScrapeResult<Option<String>> {
        self.first(locator, |el| Some(el.text().collect::<String>()))
    }

    async fn own_text(&self, locator: &Locator) -> ScrapeResult<Option<String>> {
        self.first(locator, own_text_of)
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> ScrapeResult<Option<String>> {
        self.first(locator, |el| el.value().attr(name).map(str::to_string))
    }

    async fn click(&self, locator: &Locator) -> ScrapeResult<()> {
        let href = self.with_document(|doc| {
            let link = parse_selector("a[href]")?;
            let found = resolve(doc, locator)?.into_iter().next().and_then(|el| {
                el.value()
                    .attr("href")
                    .or_else(|| el.select(&link).next().and_then(|a| a.value().attr("href")))
                    .map(str::to_string)
            });
            Ok(found)
        })?;

        let href = href.ok_or_else(|| {
            ScrapeError::Navigation(format!("nothing clickable at {}", locator))
        })?;

        let current = lock(&self.state).current.clone().unwrap_or_default();
        let target = match Url::parse(&current) {
            Ok(base) => base
                .join(&href)
                .map(|u| u.to_string())
                .map_err(|e| ScrapeError::Navigation(format!("bad link {}: {}", href, e)))?,
            Err(_) => href,
        };
        self.navigate(&target)
    }

    async fn scroll_to_end(&self) -> ScrapeResult<()> {
        self.ensure_open()?;
        lock(&self.state).scrolls += 1;
        Ok(())
    }

    async fn close(&self) -> ScrapeResult<()> {
        let mut state = lock(&self.state);
        if !state.closed {
            state.closed = true;
            if let Some(ref live) = self.live {
                live.fetch_sub(1, Ordering::SeqCst);
            }
        }
        Ok(())
    }
}
