//! Web server command.

use std::sync::Arc;

use console::style;

use crate::config::Config;

/// Start the web server.
pub async fn cmd_serve(config: Arc<Config>, bind: Option<&str>) -> anyhow::Result<()> {
    let bind = bind.unwrap_or(&config.server.bind).to_string();

    println!(
        "{} Starting kinoscrape server at http://{}/v1/kinorium",
        style("→").cyan(),
        bind
    );
    println!("  Press Ctrl+C to stop");

    crate::server::serve(config, &bind).await
}
