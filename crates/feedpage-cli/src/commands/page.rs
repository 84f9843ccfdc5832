use anyhow::Result;

use feedpage_core::{AppConfig, FeedPager, PageRequest};

pub async fn run(config: &AppConfig, page: i64, page_size: i64) -> Result<()> {
    // Validate before touching the store
    let request = PageRequest::new(page, page_size)?;

    let store = super::open_store(config).await?;
    let pager = FeedPager::from_config(&config.store, store);

    let result = pager.list_page(&request).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
