// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod display;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod metrics;
pub mod phrase;
pub mod poll;
pub mod story;
pub mod trigger;

// ---- Re-exports for stable public API ----
pub use crate::config::triggers::{compile, compile_report, CompileReport, Diagnostic};
pub use crate::error::{ConfigError, LineFault, TimestampError};
pub use crate::filter::{filter_stories, filter_story_refs};
pub use crate::phrase::{contains_phrase, Phrase};
pub use crate::story::NewsItem;
pub use crate::trigger::{parse_cutoff, ActivationList, Trigger, TriggerArena, TriggerId};
