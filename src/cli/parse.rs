//! Offline commands that run the extractors over saved pages.

use std::path::Path;

use anyhow::Context;

use super::helpers::print_json;
use crate::config::Config;
use crate::scrapers::detail::extract_saved;
use crate::scrapers::listing::fragment_from_envelope;
use crate::scrapers::{ListingExtractor, SessionSettings};

async fn read(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// A saved listing body is either the JSON envelope or the bare fragment.
fn listing_fragment(body: &str) -> String {
    if body.trim_start().starts_with('{') {
        fragment_from_envelope(body)
    } else {
        body.to_string()
    }
}

pub async fn cmd_parse_listing(file: &Path) -> anyhow::Result<()> {
    let body = read(file).await?;
    let records = ListingExtractor::new()?.extract(&listing_fragment(&body));
    print_json(&records)
}

pub async fn cmd_parse_detail(
    config: &Config,
    file: &Path,
    crew: Option<&Path>,
    url: Option<&str>,
) -> anyhow::Result<()> {
    let detail_html = read(file).await?;
    let crew_html = match crew {
        Some(path) => Some(read(path).await?),
        None => None,
    };
    let url = url.unwrap_or(&config.site.base_url);

    let settings = SessionSettings::from_config(config, true);
    let record = extract_saved(settings, url, &detail_html, crew_html.as_deref())
        .await
        .with_context(|| format!("Failed to extract {}", file.display()))?;
    print_json(&record)
}
