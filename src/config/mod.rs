// src/config/mod.rs
//! Configuration: the trigger rule language and the application settings.

pub mod settings;
pub mod triggers;

pub use settings::{FeedSource, Settings};
pub use triggers::{
    compile, compile_report, compile_str, load_trigger_config, CompileReport, Diagnostic,
};
