use anyhow::Result;

use feedpage_core::{AppConfig, FeedPager, PageRequest};

pub async fn run(config: &AppConfig) -> Result<()> {
    println!("Checking store ({} strategy)...\n", config.store.strategy);

    let store = super::open_store(config).await?;
    let pager = FeedPager::from_config(&config.store, store);

    pager.ping().await?;
    println!("  Connection: OK");

    let first = pager.list_page(&PageRequest::default()).await?;
    println!("  Items: {} ({} pages of {})", first.total_items, first.total_pages, first.page_size);

    Ok(())
}
