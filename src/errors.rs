//! Centralised error type for the exporter.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExporterError {
    #[error("HTTP error fetching {0}: {1}")]
    Fetch(String, #[source] reqwest::Error),

    #[error("Unexpected status from {0}: StatusCode: {1}")]
    Status(String, StatusCode),

    #[error("Reading response body from {0} failed: {1}")]
    Body(String, #[source] reqwest::Error),

    #[error("JSON unmarshaling failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid listen address {0}: {1}")]
    ListenAddress(String, #[source] std::io::Error),

    #[error("Invalid scrape URI {0}: {1}")]
    ScrapeUri(String, String),

    #[error("Metrics registry error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("HTTP server error: {0}")]
    Server(#[from] hyper::Error),
}

impl ExporterError {
    /// Errors that must stop the exporter rather than fail a single scrape.
    ///
    /// Only an unparseable top-level payload qualifies: it means the upstream
    /// is not speaking the actuator contract at all.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExporterError::Json(_))
    }
}
