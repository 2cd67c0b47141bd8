// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::ingest::types::FeedProvider;
use crate::ingest::{decode_text, parse_pub_date};
use crate::story::NewsItem;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    guid: Option<Guid>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    published: Option<String>,
    description: Option<String>,
}

// <guid isPermaLink="false">...</guid>
#[derive(Debug, Deserialize)]
struct Guid {
    #[serde(rename = "$text", default)]
    value: String,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

/// RSS 2.0 feed, read from an in-memory document or over HTTP.
pub struct RssFeedProvider {
    name: String,
    mode: Mode,
}

impl RssFeedProvider {
    pub fn from_fixture(name: impl Into<String>, xml: &str) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn from_url(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Http {
                url: url.into(),
                client: reqwest::Client::new(),
            },
        }
    }

    fn parse_items_from_str(&self, s: &str) -> Result<Vec<NewsItem>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean)
            .with_context(|| format!("parsing {} rss xml", self.name))?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        let mut undated = 0u64;
        for it in rss.channel.item {
            let Some(published_at) = it
                .pub_date
                .as_deref()
                .or(it.published.as_deref())
                .and_then(parse_pub_date)
            else {
                undated += 1;
                continue;
            };

            let title = decode_text(it.title.as_deref().unwrap_or_default());
            let description = decode_text(it.description.as_deref().unwrap_or_default());
            let link = it.link.map(|l| l.trim().to_string()).unwrap_or_default();
            let id = it
                .guid
                .map(|g| g.value.trim().to_string())
                .filter(|g| !g.is_empty())
                .or_else(|| Some(link.clone()).filter(|l| !l.is_empty()))
                .unwrap_or_else(|| title.clone());
            if id.is_empty() {
                continue;
            }

            out.push(NewsItem {
                id,
                title,
                description,
                link,
                published_at,
            });
        }

        if undated > 0 {
            tracing::debug!(target: "ingest", provider = %self.name, undated, "dropped undated items");
            counter!("ingest_undated_total").increment(undated);
        }
        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        counter!("ingest_items_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl FeedProvider for RssFeedProvider {
    async fn fetch_latest(&self) -> Result<Vec<NewsItem>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s),
            Mode::Http { url, client } => {
                let body = client
                    .get(url.as_str())
                    .send()
                    .await
                    .and_then(|resp| resp.error_for_status())
                    .with_context(|| format!("{} http get {url}", self.name))?
                    .text()
                    .await
                    .with_context(|| format!("{} http body", self.name))?;
                self.parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// HTML-only entities are not valid XML; map the common ones before parsing.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test feed</title>
    <link>https://example.test/</link>
    <item>
      <title>Storm &amp; flood warning</title>
      <link>https://example.test/a</link>
      <guid isPermaLink="false">tag:example.test,2016:a</guid>
      <pubDate>Wed, 12 Oct 2016 23:59:59 GMT</pubDate>
      <description>&lt;p&gt;Coastal areas&nbsp;affected&lt;/p&gt;</description>
    </item>
    <item>
      <title>No date here</title>
      <link>https://example.test/b</link>
    </item>
    <item>
      <title>Link as id</title>
      <link>https://example.test/c</link>
      <pubDate>2016-10-13T08:00:00Z</pubDate>
    </item>
  </channel>
</rss>"#;

    #[tokio::test]
    async fn fixture_parses_dated_items() {
        let p = RssFeedProvider::from_fixture("Test", FEED);
        let items = p.fetch_latest().await.expect("parse ok");
        assert_eq!(items.len(), 2, "undated item is dropped");

        assert_eq!(items[0].id, "tag:example.test,2016:a");
        assert_eq!(items[0].title, "Storm & flood warning");
        assert_eq!(items[0].description, "Coastal areas affected");
        assert_eq!(
            items[0].published_at,
            Utc.with_ymd_and_hms(2016, 10, 12, 23, 59, 59).unwrap()
        );

        assert_eq!(items[1].id, "https://example.test/c");
        assert_eq!(items[1].description, "");
        assert_eq!(p.name(), "Test");
    }

    #[tokio::test]
    async fn empty_channel_yields_nothing() {
        let xml = r#"<rss version="2.0"><channel><title>t</title></channel></rss>"#;
        let p = RssFeedProvider::from_fixture("Empty", xml);
        assert!(p.fetch_latest().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn broken_xml_is_an_error() {
        let p = RssFeedProvider::from_fixture("Broken", "<rss><channel><item>");
        assert!(p.fetch_latest().await.is_err());
    }
}
