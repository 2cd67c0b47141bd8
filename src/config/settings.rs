// src/config/settings.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_SETTINGS_PATH: &str = "RSS_FILTER_SETTINGS_PATH";
pub const ENV_INTERVAL_SECS: &str = "RSS_FILTER_INTERVAL_SECS";
pub const DEFAULT_INTERVAL_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub feeds: Vec<FeedSource>,
    /// Seconds between two polls.
    pub interval_secs: u64,
    /// Trigger rule file; see `config::triggers` for the fallback chain.
    pub trigger_config: Option<PathBuf>,
    /// Each keyword becomes `Or(Title(kw), Description(kw))`.
    pub keywords: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            feeds: vec![
                FeedSource {
                    name: "Google News".into(),
                    url: "http://news.google.com/news?output=rss".into(),
                },
                FeedSource {
                    name: "Yahoo News".into(),
                    url: "http://news.yahoo.com/rss/topstories".into(),
                },
            ],
            interval_secs: DEFAULT_INTERVAL_SECS,
            trigger_config: None,
            keywords: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let mut settings = parse_settings(&content, ext.as_str())?;
        settings.apply_env_overrides(std::env::var(ENV_INTERVAL_SECS).ok());
        Ok(settings)
    }

    /// Load settings using env var + fallbacks:
    /// 1) $RSS_FILTER_SETTINGS_PATH
    /// 2) config/settings.toml
    /// 3) config/settings.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_SETTINGS_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            } else {
                return Err(anyhow!("{ENV_SETTINGS_PATH} points to non-existent path"));
            }
        }
        let toml_p = PathBuf::from("config/settings.toml");
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from("config/settings.json");
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        let mut settings = Self::default();
        settings.apply_env_overrides(std::env::var(ENV_INTERVAL_SECS).ok());
        Ok(settings)
    }

    fn apply_env_overrides(&mut self, interval: Option<String>) {
        if let Some(secs) = interval.and_then(|s| s.trim().parse::<u64>().ok()) {
            self.interval_secs = secs;
        }
        self.interval_secs = self.interval_secs.max(1);
    }
}

fn parse_settings(s: &str, hint_ext: &str) -> Result<Settings> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || !s.trim_start().starts_with('{');
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported settings format"))
}

fn parse_toml(s: &str) -> Result<Settings> {
    let v: Settings = toml::from_str(s)?;
    Ok(clean(v))
}

fn parse_json(s: &str) -> Result<Settings> {
    let v: Settings = serde_json::from_str(s)?;
    Ok(clean(v))
}

fn clean(mut s: Settings) -> Settings {
    s.keywords = clean_keywords(s.keywords);
    s.feeds.retain(|f| !f.url.trim().is_empty());
    s
}

fn clean_keywords<I: IntoIterator<Item = S>, S: AsRef<str>>(items: I) -> Vec<String> {
    items
        .into_iter()
        .map(|k| k.as_ref().trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}

/// Split a comma-separated keyword list; entries are trimmed, empties dropped.
pub fn parse_keywords(input: &str) -> Vec<String> {
    clean_keywords(input.split(','))
}
