//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod helpers;
mod parse;
mod scrape;
mod serve;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "kinoscrape")]
#[command(about = "Movie metadata extraction from kinorium.com")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the JSON API server
    Serve {
        /// Address to bind to (default: server.bind from config)
        #[arg(long)]
        bind: Option<String>,
    },

    /// List one page of movies for a genre
    List {
        /// Genre name, e.g. "Drama" or "sci-fi"
        #[arg(short, long)]
        genre: String,
        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: u32,
        /// Page size: 50, 100 or 200
        #[arg(long, default_value = "50")]
        per_page: u32,
    },

    /// Search a movie by title and scrape its detail page
    Detail {
        /// Title to search for
        title: String,
        /// Show the browser window (held open briefly before closing)
        #[arg(long)]
        visible: bool,
        /// Only print the detail page URL
        #[arg(long)]
        link_only: bool,
    },

    /// Check that the site is up and still looks as expected
    Health,

    /// Parse a saved listing response (JSON envelope or raw HTML fragment)
    ParseListing {
        /// File to parse
        file: PathBuf,
    },

    /// Run the detail extractor over saved pages
    ParseDetail {
        /// Saved detail page
        file: PathBuf,
        /// Saved cast page
        #[arg(long)]
        crew: Option<PathBuf>,
        /// URL the detail page was saved from (default: site.base_url)
        #[arg(long)]
        url: Option<String>,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Arc::new(Config::load(cli.config.as_deref()).await);

    match cli.command {
        Commands::Serve { bind } => serve::cmd_serve(config, bind.as_deref()).await,
        Commands::List {
            genre,
            page,
            per_page,
        } => scrape::cmd_list(config, &genre, page, per_page).await,
        Commands::Detail {
            title,
            visible,
            link_only,
        } => scrape::cmd_detail(config, &title, visible, link_only).await,
        Commands::Health => scrape::cmd_health(config).await,
        Commands::ParseListing { file } => parse::cmd_parse_listing(&file).await,
        Commands::ParseDetail { file, crew, url } => {
            parse::cmd_parse_detail(&config, &file, crew.as_deref(), url.as_deref()).await
        }
    }
}
