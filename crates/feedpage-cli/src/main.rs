use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feedpage_core::{AppConfig, ResolverStrategy};

mod commands;

#[derive(Parser)]
#[command(name = "feedpage")]
#[command(author, version, about = "Paginated read API over feed items stored in Redis")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the config file (defaults to ~/.config/feedpage/config.toml)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// Redis connection URL (overrides config and REDIS_URL)
    #[arg(long = "redis-url", global = true)]
    redis_url: Option<String>,

    /// Identifier index layout: set, sorted_set or pattern_scan
    #[arg(long = "strategy", global = true)]
    strategy: Option<ResolverStrategy>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API (default)
    Serve {
        /// Address to bind, e.g. 0.0.0.0:8080
        #[arg(short = 'b', long)]
        bind: Option<String>,
        /// Serve a seeded in-memory store instead of Redis
        #[arg(long)]
        memory: bool,
    },
    /// Print one page of feed items as JSON
    Page {
        /// Page number (>= 1)
        #[arg(short = 'p', long, default_value_t = 1)]
        page: i64,
        /// Items per page (1-100)
        #[arg(short = 's', long = "page-size", default_value_t = 10)]
        page_size: i64,
    },
    /// Check that the store is reachable
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(url) = cli.redis_url {
        config.store.redis_url = url;
    }
    if let Some(strategy) = cli.strategy {
        config.store.strategy = strategy;
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Handle commands
    match cli.command {
        Some(Commands::Serve { bind, memory }) => {
            if let Some(bind) = bind {
                config.server.bind_addr = bind;
            }
            commands::serve::run(Arc::new(config), memory).await
        }
        None => commands::serve::run(Arc::new(config), false).await,
        Some(Commands::Page { page, page_size }) => {
            commands::page::run(&config, page, page_size).await
        }
        Some(Commands::Check) => commands::check::run(&config).await,
    }
}
