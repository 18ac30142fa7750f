//! fetcher.rs
//!
//! Single-attempt HTTP GET against the actuator, bounded by one timeout.

use std::time::Duration;

use reqwest::{Client, Response};
use tracing::debug;

use crate::errors::ExporterError;

const USER_AGENT: &str = concat!("spring-actuator-exporter/", env!("CARGO_PKG_VERSION"));

/// Upstream scrape target and the client used to reach it.
#[derive(Debug, Clone)]
pub struct Fetcher {
    url: String,
    client: Client,
}

impl Fetcher {
    /// Build a client whose dial and whole request are each capped at `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ExporterError> {
        let url = url.into();
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| ExporterError::Fetch(url.clone(), e))?;
        debug!(%url, ?timeout, "Built actuator client");
        Ok(Fetcher { url, client })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send the request and check the status line. The body is left unread.
    ///
    /// # Errors
    ///
    /// * [`ExporterError::Fetch`] on DNS, connect or timeout failure.
    /// * [`ExporterError::Status`] when the status is outside 2xx.
    pub async fn send(&self) -> Result<Response, ExporterError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ExporterError::Fetch(self.url.clone(), e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ExporterError::Status(self.url.clone(), status));
        }
        Ok(resp)
    }

    /// Read the whole body of a response returned by [`Fetcher::send`].
    pub async fn read_body(&self, resp: Response) -> Result<Vec<u8>, ExporterError> {
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ExporterError::Body(self.url.clone(), e))?;
        Ok(bytes.to_vec())
    }
}
