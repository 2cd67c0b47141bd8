// src/metrics.rs
use std::net::SocketAddr;

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
/// Must be called from inside a tokio runtime.
pub fn install_prometheus(addr: SocketAddr) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .with_context(|| format!("prometheus: install exporter on {addr}"))?;
    crate::ingest::ensure_metrics_described();
    tracing::info!(%addr, "metrics exporter listening");
    Ok(())
}
