//! Configuration management for kinoscrape using the prefer crate.
//!
//! The config file is discovered with `prefer` (or given explicitly with
//! `--config`) and parsed with serde according to its extension. Environment
//! variables are applied on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::scrapers::BrowserEngineConfig;

/// Target site endpoints and the static request contract of the listing
/// endpoint.
///
/// The cookie and header values expire upstream. They are refreshed
/// out-of-band by editing the config file or setting `KINOSCRAPE_COOKIES`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Page probed by the health check.
    #[serde(default = "default_health_url")]
    pub health_url: String,

    /// Markup fragment whose presence means the site still looks as expected.
    #[serde(default = "default_health_marker")]
    pub health_marker: String,

    /// Path of the paginated listing endpoint, relative to `base_url`.
    #[serde(default = "default_listing_path")]
    pub listing_path: String,

    #[serde(default = "default_cookies")]
    pub cookies: BTreeMap<String, String>,

    #[serde(default = "default_headers")]
    pub headers: BTreeMap<String, String>,

    /// User agent for HTTP and browser requests.
    /// - None: default kinoscrape user agent
    /// - "impersonate": a real browser user agent
    /// - other: used verbatim
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            health_url: default_health_url(),
            health_marker: default_health_marker(),
            listing_path: default_listing_path(),
            cookies: default_cookies(),
            headers: default_headers(),
            user_agent: None,
        }
    }
}

impl SiteConfig {
    /// Full URL of the listing endpoint.
    pub fn listing_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.listing_path.trim_start_matches('/')
        )
    }

    /// Full URL of the search page, without the query.
    pub fn search_url(&self) -> String {
        format!("{}/search/", self.base_url.trim_end_matches('/'))
    }

    /// Cookie header value built from the static cookie set.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

fn default_base_url() -> String {
    "https://ua.kinorium.com".to_string()
}

fn default_health_url() -> String {
    "https://kinorium.com".to_string()
}

fn default_health_marker() -> String {
    "topMenu__logo".to_string()
}

fn default_listing_path() -> String {
    "/R2D2/".to_string()
}

fn default_cookies() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("lang".to_string(), "ua".to_string()),
        ("list_view".to_string(), "full".to_string()),
    ])
}

fn default_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            "Accept".to_string(),
            "application/json, text/javascript, */*; q=0.01".to_string(),
        ),
        ("X-Requested-With".to_string(), "XMLHttpRequest".to_string()),
        ("Referer".to_string(), "https://ua.kinorium.com/".to_string()),
    ])
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_http_timeout")]
    pub timeout: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_http_timeout(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

fn default_http_timeout() -> u64 {
    30
}

/// Web server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub browser: BrowserEngineConfig,
    #[serde(default)]
    pub server: ServerConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path wins; otherwise the file is discovered with prefer.
    /// A missing or unreadable file falls back to defaults. Environment
    /// overrides are applied last in every case.
    pub async fn load(explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(p) => Some(PathBuf::from(
                shellexpand::tilde(&p.to_string_lossy()).as_ref(),
            )),
            None => match prefer::load("kinoscrape").await {
                Ok(pref_config) => pref_config.source_path().map(|p| p.to_path_buf()),
                Err(_) => None,
            },
        };

        let config = match path {
            Some(path) => match Self::load_from_path(&path).await {
                Ok(config) => config,
                Err(e) => {
                    warn!("{}; using defaults", e);
                    Self::default()
                }
            },
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.with_env_overrides()
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// - `KINOSCRAPE_BASE_URL` - target site base URL
    /// - `KINOSCRAPE_BIND` - server bind address
    /// - `KINOSCRAPE_COOKIES` - `name=value; name2=value2`, replaces the cookie set
    /// - plus the browser overrides of [`BrowserEngineConfig::with_env_overrides`]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("KINOSCRAPE_BASE_URL") {
            if !val.is_empty() {
                self.site.base_url = val;
            }
        }

        if let Ok(val) = std::env::var("KINOSCRAPE_BIND") {
            if !val.is_empty() {
                self.server.bind = val;
            }
        }

        if let Ok(val) = std::env::var("KINOSCRAPE_COOKIES") {
            let cookies = parse_cookie_string(&val);
            if !cookies.is_empty() {
                self.site.cookies = cookies;
            }
        }

        self.browser = self.browser.with_env_overrides();
        self
    }
}

/// Parse `name=value; name2=value2` into a cookie map. Malformed pairs are skipped.
pub fn parse_cookie_string(s: &str) -> BTreeMap<String, String> {
    s.split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            (!name.is_empty()).then(|| (name.to_string(), value.trim().to_string()))
        })
        .collect()
}
