//! collector.rs
//!
//! One scrape cycle per inbound request: reset, fetch, map, encode.
//!
//! The gauges are shared by every request, so the whole cycle runs under a
//! single lock. Otherwise one request's reset could erase values another
//! request is about to encode.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::errors::ExporterError;
use crate::fetcher::Fetcher;
use crate::mapper;
use crate::metrics::ActuatorGauges;

pub struct Exporter {
    fetcher: Fetcher,
    gauges: Mutex<ActuatorGauges>,
}

impl Exporter {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ExporterError> {
        Ok(Exporter {
            fetcher: Fetcher::new(url, timeout)?,
            gauges: Mutex::new(ActuatorGauges::new()?),
        })
    }

    pub fn url(&self) -> &str {
        self.fetcher.url()
    }

    /// Run a full cycle and return the text exposition of every gauge.
    ///
    /// Transport, status and body failures are logged and folded into the
    /// output (`up` reflects them). Only a fatal error is returned.
    pub async fn collect(&self) -> Result<Vec<u8>, ExporterError> {
        let gauges = self.gauges.lock().await;
        let started = Instant::now();

        gauges.reset();
        match self.scrape(&gauges).await {
            Ok(mapped) => debug!(
                url = %self.url(),
                mapped,
                elapsed_s = started.elapsed().as_secs_f64(),
                "Scrape cycle complete"
            ),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => error!(url = %self.url(), error = %e, "Can't scrape Spring Actuator"),
        }

        gauges.encode()
    }

    async fn scrape(&self, gauges: &ActuatorGauges) -> Result<usize, ExporterError> {
        let resp = match self.fetcher.send().await {
            Ok(resp) => resp,
            Err(e) => {
                gauges.set_up(false);
                return Err(e);
            }
        };
        // `up` stays at 1 even if reading the body fails below.
        gauges.set_up(true);

        let body = self.fetcher.read_body(resp).await?;

        mapper::apply(&body, gauges)
    }
}
