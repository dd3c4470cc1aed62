//! Browser engine configuration types.
//!
//! These types live outside `#[cfg(feature = "browser")]` so that config
//! parsing and serialization work without the browser feature.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Browser window size applied to every browsing context.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1366,
            height: 768,
        }
    }
}

/// Browser engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrowserEngineConfig {
    /// Default mode for detail requests that don't choose one (default: true).
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Bound for every navigation and element wait, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// How long a visible session stays open after its work is done, so the
    /// operator can look at the page.
    #[serde(default = "default_observation_delay_ms")]
    pub observation_delay_ms: u64,

    /// Explicit Chrome/Chromium executable. Well-known paths and `PATH` are
    /// probed when unset.
    #[serde(default)]
    pub chrome_executable: Option<PathBuf>,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// Accept-Language sent by every browsing context.
    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default)]
    pub viewport: Viewport,
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            timeout: default_timeout(),
            observation_delay_ms: default_observation_delay_ms(),
            chrome_executable: None,
            chrome_args: Vec::new(),
            locale: default_locale(),
            viewport: Viewport::default(),
        }
    }
}

impl BrowserEngineConfig {
    /// Apply environment variable overrides.
    ///
    /// - `KINOSCRAPE_HEADLESS` - `true`/`false`/`1`/`0`
    /// - `KINOSCRAPE_CHROME` - Chrome executable path
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("KINOSCRAPE_HEADLESS") {
            match val.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => self.headless = true,
                "0" | "false" | "no" => self.headless = false,
                _ => {}
            }
        }

        if let Ok(val) = std::env::var("KINOSCRAPE_CHROME") {
            if !val.is_empty() {
                self.chrome_executable = Some(PathBuf::from(val));
            }
        }

        self
    }

    /// Navigation and element wait bound.
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Hold time for visible sessions.
    pub fn observation_delay(&self) -> Duration {
        Duration::from_millis(self.observation_delay_ms)
    }
}

pub fn default_headless() -> bool {
    true
}

pub fn default_timeout() -> u64 {
    30
}

pub fn default_observation_delay_ms() -> u64 {
    5000
}

pub fn default_locale() -> String {
    "uk-UA".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_engine_config_serde_defaults() {
        let config: BrowserEngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BrowserEngineConfig::default());
        assert!(config.headless);
        assert_eq!(config.timeout, 30);
        assert_eq!(config.observation_delay(), Duration::from_secs(5));
        assert_eq!(config.viewport, Viewport { width: 1366, height: 768 });
    }

    #[test]
    fn test_browser_engine_config_serde_with_values() {
        let json = r#"{
            "headless": false,
            "timeout": 10,
            "observation_delay_ms": 0,
            "chrome_executable": "/usr/bin/chromium",
            "locale": "en-US",
            "viewport": {"width": 800, "height": 600}
        }"#;

        let config: BrowserEngineConfig = serde_json::from_str(json).unwrap();
        assert!(!config.headless);
        assert_eq!(config.wait_timeout(), Duration::from_secs(10));
        assert_eq!(config.observation_delay(), Duration::ZERO);
        assert_eq!(
            config.chrome_executable,
            Some(PathBuf::from("/usr/bin/chromium"))
        );
        assert_eq!(config.locale, "en-US");
        assert_eq!(config.viewport.width, 800);
    }
}
