// tests/ingest_pipeline.rs
use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use rss_trigger_filter::config::triggers::load_trigger_config;
use rss_trigger_filter::display::StoryPrinter;
use rss_trigger_filter::ingest::providers::rss::RssFeedProvider;
use rss_trigger_filter::ingest::run_once;
use rss_trigger_filter::ingest::types::FeedProvider;
use rss_trigger_filter::poll::poll_once;
use rss_trigger_filter::{filter_stories, ActivationList, NewsItem};

const GOOGLE: &str = include_str!("fixtures/google_news.xml");
const YAHOO: &str = include_str!("fixtures/yahoo_news.xml");

fn fixture_providers() -> Vec<Box<dyn FeedProvider>> {
    vec![
        Box::new(RssFeedProvider::from_fixture("Google News", GOOGLE)),
        Box::new(RssFeedProvider::from_fixture("Yahoo News", YAHOO)),
    ]
}

fn sample_config() -> ActivationList {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/triggers.txt");
    let report = load_trigger_config(&path).expect("sample config compiles");
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    report.activations
}

fn ids(items: &[NewsItem]) -> Vec<&str> {
    items.iter().map(|i| i.id.as_str()).collect()
}

struct Unreachable;

#[async_trait]
impl FeedProvider for Unreachable {
    async fn fetch_latest(&self) -> Result<Vec<NewsItem>> {
        anyhow::bail!("connection refused")
    }
    fn name(&self) -> &str {
        "Unreachable"
    }
}

#[tokio::test]
async fn fixtures_parse_in_feed_order() {
    let items = run_once(&fixture_providers()).await;
    assert_eq!(
        ids(&items),
        vec![
            "g-001",
            "g-002",
            "g-003",
            "g-004",
            "https://news.example.com/markets-rally",
            "https://news.example.com/town-hall",
        ],
        "the undated google item is dropped"
    );
    assert_eq!(items[0].description, "Polls close across the East Coast tonight.");
    assert_eq!(
        items[5].description,
        "Aides for Trump and Clinton's campaign traded statements."
    );
}

#[tokio::test]
async fn sample_config_selects_expected_stories() {
    let items = run_once(&fixture_providers()).await;
    let kept = filter_stories(items, &sample_config());
    assert_eq!(
        ids(&kept),
        vec!["g-001", "g-002", "https://news.example.com/town-hall"]
    );
}

#[tokio::test]
async fn failing_provider_does_not_stop_the_cycle() {
    let mut providers = fixture_providers();
    providers.insert(0, Box::new(Unreachable));
    let items = run_once(&providers).await;
    assert_eq!(items.len(), 6);
}

#[tokio::test]
async fn poll_prints_each_story_once() {
    let providers = fixture_providers();
    let list = sample_config();
    let mut printer = StoryPrinter::new(Vec::new());

    let first = poll_once(&providers, &list, &mut printer).await.unwrap();
    assert_eq!((first.fetched, first.kept, first.shown), (6, 3, 3));

    let second = poll_once(&providers, &list, &mut printer).await.unwrap();
    assert_eq!(second.shown, 0, "already shown");
    assert_eq!(printer.shown_count(), 3);

    let text = String::from_utf8(printer.into_inner()).unwrap();
    assert!(text.contains("Election night: what to watch, state by state"));
    assert!(text.contains("https://news.example.com/debate-recap"));
    assert!(!text.contains("Hurricane Matthew"));
    assert!(!text.contains("Local election board"));
}

#[tokio::test]
async fn keywords_match_title_or_description() {
    let items = run_once(&fixture_providers()).await;
    let kept = filter_stories(items, &ActivationList::from_keywords(&["oil prices", "flooding"]));
    assert_eq!(
        ids(&kept),
        vec!["g-004", "https://news.example.com/markets-rally"]
    );
}
