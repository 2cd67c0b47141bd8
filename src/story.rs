// src/story.rs
use chrono::{DateTime, Utc};

/// One fetched, normalized feed entry.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct NewsItem {
    pub id: String,          // guid, unique within one fetch
    pub title: String,       // decoded text
    pub description: String, // decoded text, "" when the feed has none
    pub link: String,
    pub published_at: DateTime<Utc>,
}

impl NewsItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        link: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            link: link.into(),
            published_at,
        }
    }
}
