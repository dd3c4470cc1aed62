//! Shared helper functions for CLI commands.

use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;

use crate::config::Config;
use crate::scrapers::{KinoriumService, TransportPool};

/// Pretty-print a value as JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// A service over a freshly started pool. Callers must release the pool.
pub fn start_service(config: Arc<Config>) -> anyhow::Result<KinoriumService> {
    let pool = Arc::new(TransportPool::new(config));
    pool.start().context("Failed to start HTTP transport")?;
    Ok(KinoriumService::new(pool))
}
