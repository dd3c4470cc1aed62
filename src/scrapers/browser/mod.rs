//! Browser automation for pages that need a real engine.
//!
//! Uses chromiumoxide (CDP). Each navigation session runs in its own
//! browser context so cookies and storage never leak between requests.

mod config;
mod driver;
mod locator;
pub mod snapshot;

pub use config::{BrowserEngineConfig, Viewport};
pub use driver::{BrowserEngine, BrowserLauncher, PageDriver};
pub use locator::{script_for, Locator};
pub use snapshot::SnapshotPage;

#[cfg(feature = "browser")]
use std::sync::Arc;
#[cfg(feature = "browser")]
use std::time::Duration;

#[cfg(feature = "browser")]
use async_trait::async_trait;
#[cfg(feature = "browser")]
use tokio::sync::Mutex;
#[cfg(feature = "browser")]
use tokio::task::JoinHandle;
#[cfg(feature = "browser")]
use tracing::{debug, info, warn};

#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams,
};
#[cfg(feature = "browser")]
use chromiumoxide::error::CdpError;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig, Page};
#[cfg(feature = "browser")]
use futures::StreamExt;
#[cfg(feature = "browser")]
use serde::de::DeserializeOwned;

#[cfg(feature = "browser")]
use crate::error::{ScrapeError, ScrapeResult};

#[cfg(feature = "browser")]
fn cdp_error(e: CdpError) -> ScrapeError {
    match e {
        CdpError::Timeout => ScrapeError::NavigationTimeout("CDP request timed out".to_string()),
        other => ScrapeError::Navigation(other.to_string()),
    }
}

/// Resolves once the document is at least interactive.
#[cfg(feature = "browser")]
const READY_STATE_JS: &str = r#"
    new Promise((resolve) => {
        if (document.readyState === 'complete' || document.readyState === 'interactive') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
        }
    })
"#;

/// Scrolls to the bottom until the document height settles, so lazily
/// rendered lists are complete.
#[cfg(feature = "browser")]
const SCROLL_TO_END_JS: &str = r#"
    new Promise((resolve) => {
        let last = -1;
        let rounds = 0;
        const tick = () => {
            window.scrollTo(0, document.body.scrollHeight);
            const height = document.body.scrollHeight;
            if (height === last || rounds++ >= 20) {
                resolve(height);
                return;
            }
            last = height;
            setTimeout(tick, 250);
        };
        tick();
    })
"#;

/// Launches Chrome/Chromium processes.
#[cfg(feature = "browser")]
pub struct ChromiumLauncher {
    config: BrowserEngineConfig,
    user_agent: String,
    handlers: Mutex<Vec<JoinHandle<()>>>,
}

#[cfg(feature = "browser")]
impl ChromiumLauncher {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
    ];

    pub fn new(config: BrowserEngineConfig, user_agent: String) -> Self {
        Self {
            config,
            user_agent,
            handlers: Mutex::new(Vec::new()),
        }
    }

    /// Find the Chrome executable: configured path, then well-known paths,
    /// then `PATH`.
    fn find_chrome(&self) -> ScrapeResult<std::path::PathBuf> {
        if let Some(ref path) = self.config.chrome_executable {
            if path.exists() {
                return Ok(path.clone());
            }
            warn!("Configured Chrome {} does not exist", path.display());
        }

        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                debug!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in &[
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
                if output.status.success() {
                    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !path.is_empty() {
                        debug!("Found Chrome in PATH: {}", path);
                        return Ok(std::path::PathBuf::from(path));
                    }
                }
            }
        }

        Err(ScrapeError::ResourceLaunchFailure(
            "Chrome/Chromium not found. Install it or set KINOSCRAPE_CHROME".to_string(),
        ))
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self, headless: bool) -> ScrapeResult<Arc<dyn BrowserEngine>> {
        info!("Launching browser (headless={})", headless);

        let chrome_path = self.find_chrome()?;
        let viewport = self.config.viewport;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .window_size(viewport.width, viewport.height);

        // with_head means NOT headless
        if !headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--no-sandbox")
            .arg(format!("--lang={}", self.config.locale));

        for arg in &self.config.chrome_args {
            builder = builder.arg(arg);
        }

        let config = builder.build().map_err(|e| {
            ScrapeError::ResourceLaunchFailure(format!("Failed to build browser config: {}", e))
        })?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            ScrapeError::ResourceLaunchFailure(format!("Failed to launch browser: {}", e))
        })?;

        let task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });
        self.handlers.lock().await.push(task);

        Ok(Arc::new(ChromiumEngine {
            browser: Arc::new(Mutex::new(browser)),
            headless,
            user_agent: self.user_agent.clone(),
            locale: self.config.locale.clone(),
            viewport,
        }))
    }

    async fn shutdown(&self) -> ScrapeResult<()> {
        let handlers: Vec<_> = self.handlers.lock().await.drain(..).collect();
        debug!("Stopping {} CDP handler task(s)", handlers.len());
        for task in handlers {
            task.abort();
        }
        Ok(())
    }
}

/// One running Chrome process.
#[cfg(feature = "browser")]
pub struct ChromiumEngine {
    browser: Arc<Mutex<Browser>>,
    headless: bool,
    user_agent: String,
    locale: String,
    viewport: Viewport,
}

#[cfg(feature = "browser")]
#[async_trait]
impl BrowserEngine for ChromiumEngine {
    fn headless(&self) -> bool {
        self.headless
    }

    async fn open_context(&self) -> ScrapeResult<Box<dyn PageDriver>> {
        let (context_id, page) = {
            let mut browser = self.browser.lock().await;
            let context_id = browser
                .create_browser_context(CreateBrowserContextParams::default())
                .await
                .map_err(cdp_error)?;
            match blank_page(&browser, &context_id).await {
                Ok(page) => (context_id, page),
                Err(e) => {
                    if let Err(dispose) = browser.dispose_browser_context(context_id).await {
                        warn!("Failed to dispose browser context: {}", dispose);
                    }
                    return Err(e);
                }
            }
        };

        let page = ChromiumPage {
            page,
            context_id,
            browser: self.browser.clone(),
            closed: Mutex::new(false),
        };
        if let Err(e) = self.apply_overrides(&page.page).await {
            // close() disposes the context as well
            if let Err(close) = page.close().await {
                warn!("Failed to release half-opened context: {}", close);
            }
            return Err(e);
        }

        debug!("Opened browser context {:?}", page.context_id);
        Ok(Box::new(page))
    }

    async fn close(&self) -> ScrapeResult<()> {
        let mut browser = self.browser.lock().await;
        browser.close().await.map_err(cdp_error)?;
        if let Err(e) = browser.wait().await {
            warn!("Browser process did not exit cleanly: {}", e);
        }
        Ok(())
    }
}

#[cfg(feature = "browser")]
impl ChromiumEngine {
    async fn apply_overrides(&self, page: &Page) -> ScrapeResult<()> {
        let user_agent = SetUserAgentOverrideParams::builder()
            .user_agent(self.user_agent.clone())
            .accept_language(self.locale.clone())
            .build()
            .map_err(ScrapeError::Navigation)?;
        page.execute(user_agent).await.map_err(cdp_error)?;
        page.execute(SetDeviceMetricsOverrideParams::new(
            i64::from(self.viewport.width),
            i64::from(self.viewport.height),
            1.0,
            false,
        ))
        .await
        .map_err(cdp_error)?;
        Ok(())
    }
}

/// A blank page inside the given context.
#[cfg(feature = "browser")]
async fn blank_page(browser: &Browser, context_id: &BrowserContextId) -> ScrapeResult<Page> {
    let target = CreateTargetParams::builder()
        .url("about:blank")
        .browser_context_id(context_id.clone())
        .build()
        .map_err(ScrapeError::Navigation)?;
    browser.new_page(target).await.map_err(cdp_error)
}

/// A page inside its own browser context.
#[cfg(feature = "browser")]
pub struct ChromiumPage {
    page: Page,
    context_id: BrowserContextId,
    browser: Arc<Mutex<Browser>>,
    closed: Mutex<bool>,
}

#[cfg(feature = "browser")]
impl ChromiumPage {
    async fn eval<T: DeserializeOwned>(&self, script: String) -> ScrapeResult<T> {
        let result = self.page.evaluate(script).await.map_err(cdp_error)?;
        Ok(result.into_value()?)
    }

    /// Evaluate a [`script_for`] script and decode its JSON-encoded result.
    async fn query<T: DeserializeOwned>(&self, script: String) -> ScrapeResult<T> {
        let encoded: String = self.eval(script).await?;
        Ok(serde_json::from_str(&encoded)?)
    }

    async fn wait_for_url_change(&self, previous: Option<String>) -> ScrapeResult<()> {
        loop {
            let url = self.page.url().await.map_err(cdp_error)?;
            if url != previous {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl PageDriver for ChromiumPage {
    async fn goto(&self, url: &str) -> ScrapeResult<()> {
        self.page.goto(url).await.map_err(cdp_error)?;
        self.wait_for_load().await
    }

    async fn wait_for_load(&self) -> ScrapeResult<()> {
        let state: String = self.eval(READY_STATE_JS.to_string()).await?;
        debug!("Page ready state: {}", state);
        Ok(())
    }

    async fn current_url(&self) -> ScrapeResult<Option<String>> {
        self.page.url().await.map_err(cdp_error)
    }

    async fn count(&self, locator: &Locator) -> ScrapeResult<usize> {
        self.query(script_for(locator, "return nodes.length;")).await
    }

    async fn text(&self, locator: &Locator) -> ScrapeResult<Option<String>> {
        self.query(script_for(
            locator,
            "return nodes.length ? nodes[0].textContent : null;",
        ))
        .await
    }

    async fn own_text(&self, locator: &Locator) -> ScrapeResult<Option<String>> {
        self.query(script_for(
            locator,
            "if (!nodes.length) return null; \
             const t = Array.from(nodes[0].childNodes) \
                 .find(n => n.nodeType === Node.TEXT_NODE && n.textContent.trim()); \
             return t ? t.textContent : null;",
        ))
        .await
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> ScrapeResult<Option<String>> {
        let name = serde_json::to_string(name)?;
        self.query(script_for(
            locator,
            &format!(
                "return nodes.length ? nodes[0].getAttribute({}) : null;",
                name
            ),
        ))
        .await
    }

    async fn click(&self, locator: &Locator) -> ScrapeResult<()> {
        let previous = self.page.url().await.map_err(cdp_error)?;
        let clicked: bool = self
            .query(script_for(
                locator,
                "if (!nodes.length) return false; nodes[0].click(); return true;",
            ))
            .await?;
        if !clicked {
            return Err(ScrapeError::Navigation(format!(
                "nothing clickable at {}",
                locator
            )));
        }

        self.wait_for_url_change(previous).await?;
        self.page.wait_for_navigation().await.map_err(cdp_error)?;
        self.wait_for_load().await
    }

    async fn scroll_to_end(&self) -> ScrapeResult<()> {
        let height: f64 = self.eval(SCROLL_TO_END_JS.to_string()).await?;
        debug!("Scrolled to document height {}", height);
        Ok(())
    }

    async fn close(&self) -> ScrapeResult<()> {
        let mut closed = self.closed.lock().await;
        if *closed {
            return Ok(());
        }
        *closed = true;

        let page_result = self.page.clone().close().await.map_err(cdp_error);
        let context_result = self
            .browser
            .lock()
            .await
            .dispose_browser_context(self.context_id.clone())
            .await
            .map_err(cdp_error);

        debug!("Disposed browser context {:?}", self.context_id);
        page_result.and(context_result)
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
pub struct ChromiumLauncher;

#[cfg(not(feature = "browser"))]
impl ChromiumLauncher {
    pub fn new(_config: BrowserEngineConfig, _user_agent: String) -> Self {
        Self
    }
}

#[cfg(not(feature = "browser"))]
#[async_trait::async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(
        &self,
        _headless: bool,
    ) -> crate::error::ScrapeResult<std::sync::Arc<dyn BrowserEngine>> {
        Err(crate::error::ScrapeError::ResourceLaunchFailure(
            "Browser support not compiled. Rebuild with: cargo build --features browser"
                .to_string(),
        ))
    }

    async fn shutdown(&self) -> crate::error::ScrapeResult<()> {
        Ok(())
    }
}

#[cfg(all(test, feature = "browser"))]
mod tests {
    use super::*;
    use chromiumoxide::cdp::browser_protocol::target::GetBrowserContextsParams;

    async fn engine_with_viewport(viewport: Viewport) -> (ChromiumEngine, JoinHandle<()>) {
        let launcher = ChromiumLauncher::new(BrowserEngineConfig::default(), "test".to_string());
        let config = BrowserConfig::builder()
            .chrome_executable(launcher.find_chrome().unwrap())
            .arg("--no-sandbox")
            .build()
            .unwrap();
        let (browser, mut handler) = Browser::launch(config).await.unwrap();
        let task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });
        let engine = ChromiumEngine {
            browser: Arc::new(Mutex::new(browser)),
            headless: true,
            user_agent: "test".to_string(),
            locale: "uk-UA".to_string(),
            viewport,
        };
        (engine, task)
    }

    async fn open_contexts(engine: &ChromiumEngine) -> usize {
        engine
            .browser
            .lock()
            .await
            .execute(GetBrowserContextsParams::default())
            .await
            .unwrap()
            .result
            .browser_context_ids
            .len()
    }

    /// Run with: cargo test failed_open_disposes_context -- --ignored
    #[tokio::test]
    #[ignore]
    async fn failed_open_disposes_context() {
        // Chrome rejects device metrics wider than 10_000_000
        let (engine, task) = engine_with_viewport(Viewport {
            width: 20_000_000,
            height: 768,
        })
        .await;

        assert!(engine.open_context().await.is_err());
        assert_eq!(open_contexts(&engine).await, 0);

        engine.close().await.unwrap();
        task.abort();
    }
}
