//! Process-wide transport resources: one HTTP client plus at most one
//! headless and one visible browser, all created lazily and torn down
//! together.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::browser::{BrowserEngine, BrowserLauncher, ChromiumLauncher};
use super::http_client::{resolve_user_agent, HttpClient};
use crate::config::Config;
use crate::error::{ScrapeError, ScrapeResult};

type EngineSlot = RwLock<Option<Arc<dyn BrowserEngine>>>;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

pub struct TransportPool {
    config: Arc<Config>,
    launcher: Arc<dyn BrowserLauncher>,
    http: RwLock<Option<HttpClient>>,
    headless: EngineSlot,
    visible: EngineSlot,
    /// Serializes browser creation so concurrent first use launches once.
    launching: Mutex<()>,
}

impl TransportPool {
    /// Pool backed by real Chrome processes.
    pub fn new(config: Arc<Config>) -> Self {
        let user_agent = resolve_user_agent(config.site.user_agent.as_deref());
        let launcher = Arc::new(ChromiumLauncher::new(config.browser.clone(), user_agent));
        Self::with_launcher(config, launcher)
    }

    pub fn with_launcher(config: Arc<Config>, launcher: Arc<dyn BrowserLauncher>) -> Self {
        Self {
            config,
            launcher,
            http: RwLock::new(None),
            headless: RwLock::new(None),
            visible: RwLock::new(None),
            launching: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create the shared HTTP client. Idempotent.
    pub fn start(&self) -> ScrapeResult<()> {
        let mut slot = write(&self.http);
        if slot.is_none() {
            *slot = Some(HttpClient::new(
                &self.config.site,
                self.config.http.timeout(),
            )?);
            info!("HTTP transport started");
        }
        Ok(())
    }

    /// The shared HTTP client. Fails until [`start`](Self::start) has run.
    pub fn acquire_http(&self) -> ScrapeResult<HttpClient> {
        read(&self.http).clone().ok_or_else(|| {
            ScrapeError::TransportUnavailable("HTTP client not started".to_string())
        })
    }

    fn slot(&self, headless: bool) -> &EngineSlot {
        if headless {
            &self.headless
        } else {
            &self.visible
        }
    }

    /// The browser for the requested mode, launched on first use.
    ///
    /// Later calls for the same mode return the same instance until
    /// [`release_all`](Self::release_all).
    pub async fn acquire_browser(&self, headless: bool) -> ScrapeResult<Arc<dyn BrowserEngine>> {
        let cached = read(self.slot(headless)).clone();
        if let Some(engine) = cached {
            return Ok(engine);
        }

        let _guard = self.launching.lock().await;
        let cached = read(self.slot(headless)).clone();
        if let Some(engine) = cached {
            return Ok(engine);
        }

        let engine = self.launcher.launch(headless).await?;
        *write(self.slot(headless)) = Some(engine.clone());
        debug!("Browser ready (headless={})", headless);
        Ok(engine)
    }

    /// Whether a browser of the given mode is currently held.
    pub fn has_browser(&self, headless: bool) -> bool {
        read(self.slot(headless)).is_some()
    }

    /// Close every browser, stop the automation engine and drop the HTTP
    /// client. Teardown errors are logged and do not stop the rest.
    /// Idempotent.
    pub async fn release_all(&self) {
        let _guard = self.launching.lock().await;

        let engines: Vec<_> = [&self.headless, &self.visible]
            .into_iter()
            .filter_map(|slot| write(slot).take())
            .collect();

        for engine in engines {
            if let Err(e) = engine.close().await {
                warn!(
                    "Failed to close browser (headless={}): {}",
                    engine.headless(),
                    e
                );
            }
        }

        if let Err(e) = self.launcher.shutdown().await {
            warn!("Failed to stop browser automation: {}", e);
        }

        if write(&self.http).take().is_some() {
            info!("Transports released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::browser::snapshot::testing::SnapshotLauncher;
    use std::sync::atomic::Ordering;

    fn pool() -> (TransportPool, Arc<SnapshotLauncher>) {
        let launcher = Arc::new(SnapshotLauncher::default());
        let pool = TransportPool::with_launcher(Arc::new(Config::default()), launcher.clone());
        (pool, launcher)
    }

    #[test]
    fn test_http_requires_start() {
        let (pool, _) = pool();
        let err = pool.acquire_http().err().unwrap();
        assert!(matches!(err, ScrapeError::TransportUnavailable(_)));

        pool.start().unwrap();
        pool.start().unwrap();
        assert!(pool.acquire_http().is_ok());
    }

    #[tokio::test]
    async fn test_browser_is_reused_per_mode() {
        let (pool, launcher) = pool();

        let a = pool.acquire_browser(true).await.unwrap();
        let b = pool.acquire_browser(true).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);

        let visible = pool.acquire_browser(false).await.unwrap();
        assert!(!visible.headless());
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_first_use_launches_once() {
        let (pool, launcher) = pool();
        let pool = Arc::new(pool);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let pool = pool.clone();
                tokio::spawn(async move { pool.acquire_browser(true).await.map(|_| ()) })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_release_all_is_idempotent() {
        let (pool, launcher) = pool();
        pool.start().unwrap();
        pool.acquire_browser(true).await.unwrap();
        pool.acquire_browser(false).await.unwrap();

        pool.release_all().await;
        assert_eq!(launcher.engines_closed.load(Ordering::SeqCst), 2);
        assert!(!pool.has_browser(true));
        assert!(!pool.has_browser(false));
        assert!(pool.acquire_http().is_err());

        pool.release_all().await;
        assert_eq!(launcher.engines_closed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_acquire_after_release_launches_fresh() {
        let (pool, launcher) = pool();
        let first = pool.acquire_browser(true).await.unwrap();
        pool.release_all().await;

        let second = pool.acquire_browser(true).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_launch_failure_leaves_slot_empty() {
        let launcher = Arc::new(SnapshotLauncher {
            fail_launch: true,
            ..Default::default()
        });
        let pool = TransportPool::with_launcher(Arc::new(Config::default()), launcher);

        let err = pool.acquire_browser(true).await.err().unwrap();
        assert!(matches!(err, ScrapeError::ResourceLaunchFailure(_)));
        assert!(!pool.has_browser(true));
    }
}
