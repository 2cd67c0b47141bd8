// src/ingest/types.rs
use anyhow::Result;

use crate::story::NewsItem;

/// A news source that yields normalized, dated items.
#[async_trait::async_trait]
pub trait FeedProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<NewsItem>>;
    fn name(&self) -> &str;
}
