// src/poll.rs
use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use metrics::counter;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::display::StoryPrinter;
use crate::filter::filter_stories;
use crate::ingest::{self, types::FeedProvider};
use crate::trigger::ActivationList;

#[derive(Clone, Copy, Debug)]
pub struct PollerCfg {
    pub interval_secs: u64,
}

/// Counts from one fetch → filter → show cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PollOutcome {
    pub fetched: usize,
    pub kept: usize,
    pub shown: usize,
}

pub async fn poll_once<W: Write>(
    providers: &[Box<dyn FeedProvider>],
    activations: &ActivationList,
    printer: &mut StoryPrinter<W>,
) -> Result<PollOutcome> {
    let items = ingest::run_once(providers).await;
    let fetched = items.len();
    let kept = filter_stories(items, activations);

    counter!("filter_kept_total").increment(kept.len() as u64);
    counter!("filter_dropped_total").increment((fetched - kept.len()) as u64);

    let shown = printer.show(&kept).context("writing stories")?;
    Ok(PollOutcome {
        fetched,
        kept: kept.len(),
        shown,
    })
}

/// Poll every `interval_secs` until the returned task is aborted.
///
/// A cycle that overruns the interval pushes the next one back instead of
/// firing the missed ticks in a burst. Printing is a blocking write on the
/// worker thread; stories are short, so it is not moved off the runtime.
pub fn spawn_poller<W: Write + Send + 'static>(
    cfg: PollerCfg,
    providers: Vec<Box<dyn FeedProvider>>,
    activations: Arc<ActivationList>,
    mut printer: StoryPrinter<W>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(cfg.interval_secs.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            tracing::info!(target: "poll", "polling");
            match poll_once(&providers, &activations, &mut printer).await {
                Ok(o) => tracing::info!(
                    target: "poll",
                    fetched = o.fetched,
                    kept = o.kept,
                    shown = o.shown,
                    "poll tick"
                ),
                Err(e) => tracing::warn!(target: "poll", error = ?e, "poll tick failed"),
            }
        }
    })
}
