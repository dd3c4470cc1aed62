//! Live scraping commands: list, detail, health.

use std::sync::Arc;

use console::style;

use super::helpers::{print_json, start_service};
use crate::config::Config;
use crate::models::{Genre, ListingQuery, PerPageLimit};
use crate::scrapers::{DetailMode, DetailOutcome};

/// Print one page of the genre listing as JSON.
pub async fn cmd_list(
    config: Arc<Config>,
    genre: &str,
    page: u32,
    per_page: u32,
) -> anyhow::Result<()> {
    let genre: Genre = genre.parse()?;
    let query = ListingQuery::new(genre, page, PerPageLimit::try_from(per_page)?)?;

    let service = start_service(config)?;
    let result = service.list_movies(&query).await;
    service.pool().release_all().await;

    print_json(&result?)
}

/// Search a title and print its record (or just its URL) as JSON.
pub async fn cmd_detail(
    config: Arc<Config>,
    title: &str,
    visible: bool,
    link_only: bool,
) -> anyhow::Result<()> {
    let headless = !visible && config.browser.headless;
    let mode = if link_only {
        DetailMode::LinkOnly
    } else {
        DetailMode::Scrape
    };

    let service = start_service(config)?;
    let result = service.movie_detail(title, mode, headless).await;
    service.pool().release_all().await;

    match result? {
        DetailOutcome::Record(record) => print_json(&record),
        DetailOutcome::Link(url) => print_json(&serde_json::json!({ "url": url })),
        DetailOutcome::NotFound => {
            eprintln!("{} No movie found for '{}'", style("✗").red(), title);
            std::process::exit(1);
        }
    }
}

/// Probe the site. Exits with status 1 when it is not healthy.
pub async fn cmd_health(config: Arc<Config>) -> anyhow::Result<()> {
    let service = start_service(config)?;
    let report = service.health_check().await;
    service.pool().release_all().await;

    if report.is_ok() {
        println!("{} OK: {}", style("✓").green(), report.message);
        Ok(())
    } else {
        println!("{} BAD: {}", style("✗").red(), report.message);
        std::process::exit(1);
    }
}
