//! Scraping core for the Kinorium catalog.
//!
//! Two paths share one validated record model:
//! - the listing path fetches the paginated list endpoint over HTTP and
//!   parses its HTML fragment (`listing`)
//! - the detail path drives a browser through search, detail and cast
//!   pages (`session`, `detail`)
//!
//! Both draw their transports from one [`TransportPool`].

pub mod browser;
pub mod detail;
pub mod health;
mod http_client;
mod kinorium;
pub mod listing;
pub mod selectors;
pub mod session;
mod transport;

pub use browser::{
    BrowserEngine, BrowserEngineConfig, BrowserLauncher, ChromiumLauncher, Locator, PageDriver,
    SnapshotPage, Viewport,
};
pub use health::{HealthReport, HealthStatus};
pub use http_client::{HttpClient, TextResponse};
pub use kinorium::{DetailMode, DetailOutcome, KinoriumService};
pub use listing::ListingExtractor;
pub use session::{NavigationSession, SessionSettings, SessionState};
pub use transport::TransportPool;
