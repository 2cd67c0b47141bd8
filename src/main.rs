//! RSS trigger filter binary entrypoint.
//! Loads settings and trigger rules, then polls the configured feeds and
//! prints the stories that match.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rss_trigger_filter::config::settings::parse_keywords;
use rss_trigger_filter::config::triggers::{
    load_trigger_config, resolve_trigger_config_path, CompileReport,
};
use rss_trigger_filter::config::Settings;
use rss_trigger_filter::display::StoryPrinter;
use rss_trigger_filter::ingest::providers;
use rss_trigger_filter::poll::{poll_once, spawn_poller, PollerCfg};
use rss_trigger_filter::ActivationList;

/// Poll news feeds and show the stories matching your triggers
#[derive(Parser, Debug)]
#[command(name = "rss-trigger-filter", author, version)]
struct Args {
    /// Trigger rule file (falls back to settings, $TRIGGER_CONFIG_PATH, config/triggers.txt)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated keywords, each matched against title or description
    #[arg(short, long)]
    keywords: Option<String>,

    /// Settings file (TOML or JSON)
    #[arg(short, long, env = "RSS_FILTER_SETTINGS_PATH")]
    settings: Option<PathBuf>,

    /// Seconds between polls (overrides settings)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Poll once and exit
    #[arg(long)]
    once: bool,

    /// Compile the trigger rules, print the activation list and exit
    #[arg(long)]
    check: bool,

    /// Serve Prometheus metrics on this address, e.g. 127.0.0.1:9000
    #[arg(long)]
    metrics_addr: Option<SocketAddr>,
}

/// Compact logs by default; RSS_FILTER_LOG_JSON=1 switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rss_trigger_filter=info,triggers=info,poll=info,warn"));

    let json = std::env::var("RSS_FILTER_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

fn print_report(activations: &ActivationList, report: Option<&CompileReport>) {
    if report.is_none() {
        println!("no trigger config found");
    }
    if activations.is_empty() {
        println!("no triggers activated: nothing will be shown");
    }
    for (i, expr) in activations.describe().iter().enumerate() {
        println!("{:>3}. {expr}", i + 1);
    }
    for d in report.into_iter().flat_map(|r| r.diagnostics.iter()) {
        println!("warning: {d}");
    }
}

/// Config-file activations first, then one OR(TITLE, DESCRIPTION) per keyword.
/// The returned report keeps its diagnostics; its activations are moved out.
fn build_activations(
    args: &Args,
    settings: &Settings,
) -> anyhow::Result<(ActivationList, Option<CompileReport>)> {
    let mut activations = ActivationList::new();
    let mut report = None;

    let path = resolve_trigger_config_path(args.config.clone().or(settings.trigger_config.clone()));
    if let Some(path) = path {
        let mut compiled = load_trigger_config(&path)
            .with_context(|| format!("loading trigger config {}", path.display()))?;
        activations.extend_from(std::mem::take(&mut compiled.activations));
        report = Some(compiled);
    }

    let mut keywords = settings.keywords.clone();
    if let Some(raw) = &args.keywords {
        keywords.extend(parse_keywords(raw));
    }
    activations.extend_from(ActivationList::from_keywords(&keywords));

    Ok((activations, report))
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut settings = match &args.settings {
        Some(p) => Settings::load_from(p)?,
        None => Settings::load_default()?,
    };
    if let Some(secs) = args.interval {
        settings.interval_secs = secs.max(1);
    }

    let (activations, report) = build_activations(&args, &settings)?;

    if args.check {
        print_report(&activations, report.as_ref());
        return Ok(());
    }

    if activations.is_empty() {
        tracing::warn!("no triggers configured: every story will be filtered out");
    }
    for expr in activations.describe() {
        tracing::info!(target: "triggers", %expr, "activated");
    }

    if let Some(addr) = args.metrics_addr {
        rss_trigger_filter::metrics::install_prometheus(addr)?;
    }

    let feeds = providers::from_settings(&settings);
    if args.once {
        let mut printer = StoryPrinter::stdout();
        let outcome = poll_once(&feeds, &activations, &mut printer).await?;
        tracing::info!(
            target: "poll",
            fetched = outcome.fetched,
            kept = outcome.kept,
            shown = outcome.shown,
            "single poll done"
        );
        return Ok(());
    }

    let handle = spawn_poller(
        PollerCfg {
            interval_secs: settings.interval_secs,
        },
        feeds,
        Arc::new(activations),
        StoryPrinter::stdout(),
    );

    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
    tracing::info!("shutting down");
    handle.abort();
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "rss-trigger-filter failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
