//! kinoscrape - movie metadata extraction from kinorium.com.
//!
//! Genre listings are read from the site's paginated list endpoint over
//! plain HTTP. Single-movie details are scraped by driving a browser through
//! search, detail and cast pages.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod scrapers;
pub mod server;
pub mod utils;
