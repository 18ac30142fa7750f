//! Entrypoint: set up tracing, resolve settings, bind the HTTP server and
//! serve scrapes of the Spring Actuator until a fatal error.
//!
//! Settings come from `config.rs` (defaults → `Config.toml` → `APP__…` env
//! vars → command-line flags):
//!  - `listen_address` – where `/metrics` and the landing page are served
//!  - `telemetry_path` – path of the metrics endpoint
//!  - `scrape_uri`     – actuator JSON metrics endpoint
//!  - `timeout`        – upper bound for each upstream fetch

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use spring_actuator_exporter::collector::Exporter;
use spring_actuator_exporter::config::{Cli, Settings};
use spring_actuator_exporter::server::MetricsServer;

/// **Workflow**:
/// 1. Initialise tracing/logging from `RUST_LOG` (or default to `info`).
/// 2. Parse flags and resolve the layered settings.
/// 3. Build the exporter and bind the listen address; failure here is fatal.
/// 4. Serve until the listener dies or a scrape returns malformed JSON.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let settings = Settings::new(&cli).context("invalid configuration")?;
    info!(?settings, "Loaded configuration");

    let exporter = Exporter::new(settings.scrape_uri.clone(), settings.timeout)
        .context("failed to build exporter")?;

    let addr = settings.listen_addr()?;
    let server = MetricsServer::bind(&addr, &settings.telemetry_path, Arc::new(exporter))
        .with_context(|| format!("failed to listen on {}", settings.listen_address))?;

    server.run().await.context("exporter stopped")?;
    Ok(())
}
