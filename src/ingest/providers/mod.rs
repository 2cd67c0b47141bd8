// src/ingest/providers/mod.rs
pub mod rss;

use crate::config::Settings;
use crate::ingest::types::FeedProvider;

/// One HTTP RSS provider per configured feed.
pub fn from_settings(settings: &Settings) -> Vec<Box<dyn FeedProvider>> {
    settings
        .feeds
        .iter()
        .map(|f| {
            Box::new(rss::RssFeedProvider::from_url(f.name.as_str(), f.url.as_str()))
                as Box<dyn FeedProvider>
        })
        .collect()
}
