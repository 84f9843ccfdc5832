use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tracing::{info, warn};

use feedpage_core::storage::{FeedStore, MemoryStore};
use feedpage_core::{AppConfig, FeedPager, HttpServer};

/// Start the HTTP server
pub async fn run(config: Arc<AppConfig>, memory: bool) -> Result<()> {
    let store: Arc<dyn FeedStore> = if memory {
        info!("Serving seeded in-memory store");
        Arc::new(demo_store(&config))
    } else {
        super::open_store(&config).await?
    };

    // Fail fast when the store is unreachable at startup
    store.ping().await?;

    let pager = Arc::new(FeedPager::from_config(&config.store, store));
    let server = HttpServer::new(pager, &config.server);

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Setup signal handlers for graceful shutdown
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    println!(
        "feedpage listening on {} (strategy: {}). Press Ctrl+C to stop.",
        config.server.bind_addr, config.store.strategy
    );

    server.run(shutdown_rx).await?;

    println!("Server stopped.");
    Ok(())
}

async fn wait_for_signal() {
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        () = terminate => {},
    }
}

/// A small feed indexed every supported way, for trying the API without Redis
fn demo_store(config: &AppConfig) -> MemoryStore {
    const ENTRIES: [(&str, &str, &str); 5] = [
        ("Release notes", "https://example.com/releases", "2024-05-01T09:00:00Z"),
        ("Security advisory", "https://example.com/advisory", "Thu, 02 May 2024 14:30:00 +0000"),
        ("Community roundup", "https://example.com/roundup", "2024-05-03 18:00:00"),
        ("Conference recap", "https://example.com/recap", "2024-05-04T11:15:00Z"),
        ("Draft without date", "https://example.com/draft", ""),
    ];

    let store = MemoryStore::new();
    for (i, &(title, link, published)) in ENTRIES.iter().enumerate() {
        let id = format!("{}", i + 1);
        let key = format!("{}{}", config.store.item_key_prefix, id);
        store.put_hash(
            &key,
            &[
                ("title", title),
                ("link", link),
                ("published", published),
                ("summary", "Demo entry"),
            ],
        );
        store.add_to_set(&config.store.index_key, &id);
        store.add_scored(&config.store.index_key, &id, (i + 1) as f64);
    }
    store
}
