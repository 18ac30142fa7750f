//! Type-safe configuration: built-in defaults, an optional `Config.toml`,
//! `APP__…` environment overrides, then command-line flags.

use std::{
    env, io,
    net::{SocketAddr, ToSocketAddrs},
    time::Duration,
};

use clap::Parser;
use config::{Config, ConfigError, File, Source};
use serde::Deserialize;
use url::Url;

use crate::errors::ExporterError;

pub const DEFAULT_LISTEN_ADDRESS: &str = ":9101";
pub const DEFAULT_TELEMETRY_PATH: &str = "/metrics";
pub const DEFAULT_SCRAPE_URI: &str = "http://localhost/metrics";
pub const DEFAULT_TIMEOUT: &str = "5s";

/// Command-line flags. Anything left unset falls through to the lower layers.
#[derive(Debug, Default, Parser)]
#[command(name = "spring_actuator_exporter", about = "Prometheus exporter for Spring Boot Actuator metrics")]
pub struct Cli {
    /// Address to listen on for web interface and telemetry.
    #[arg(long = "web.listen-address")]
    pub listen_address: Option<String>,

    /// Path under which to expose metrics.
    #[arg(long = "web.telemetry-path")]
    pub telemetry_path: Option<String>,

    /// URI on which to scrape Spring Actuator.
    #[arg(long = "actuator.scrape-uri")]
    pub scrape_uri: Option<String>,

    /// Timeout for trying to get stats from Spring Actuator (e.g. "5s", "500ms").
    #[arg(long = "actuator.timeout", value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Configuration file, without extension.
    #[arg(long = "config.file", default_value = "Config")]
    pub config_file: String,
}

/// Resolved exporter settings.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// `host:port`, or `:port` for every IPv4 interface
    pub listen_address: String,

    /// Path serving the text exposition
    pub telemetry_path: String,

    /// Actuator metrics endpoint
    pub scrape_uri: String,

    /// Upper bound on connecting to and reading from the actuator (e.g. "5s")
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Settings {
    /// Load settings for the running process.
    ///
    /// Environment variables consulted:
    ///
    /// - `APP__LISTEN_ADDRESS`
    /// - `APP__TELEMETRY_PATH`
    /// - `APP__SCRAPE_URI`
    /// - `APP__TIMEOUT`
    pub fn new(cli: &Cli) -> Result<Self, ExporterError> {
        let file = File::with_name(&cli.config_file).required(false);
        let settings = Self::layered(file, |key| env::var(key).ok(), cli)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Merge defaults, `file`, environment (via `lookup`) and `cli`, in that order.
    pub fn layered<S, F>(file: S, lookup: F, cli: &Cli) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
        F: Fn(&str) -> Option<String>,
    {
        let cfg = Config::builder()
            .set_default("listen_address", DEFAULT_LISTEN_ADDRESS)?
            .set_default("telemetry_path", DEFAULT_TELEMETRY_PATH)?
            .set_default("scrape_uri", DEFAULT_SCRAPE_URI)?
            .set_default("timeout", DEFAULT_TIMEOUT)?
            .add_source(file)
            .build()?;

        let mut settings: Settings = cfg.try_deserialize()?;

        if let Some(val) = lookup("APP__LISTEN_ADDRESS") {
            settings.listen_address = val;
        }
        if let Some(val) = lookup("APP__TELEMETRY_PATH") {
            settings.telemetry_path = val;
        }
        if let Some(val) = lookup("APP__SCRAPE_URI") {
            settings.scrape_uri = val;
        }
        if let Some(val) = lookup("APP__TIMEOUT") {
            settings.timeout =
                humantime::parse_duration(&val).map_err(|e| ConfigError::Foreign(Box::new(e)))?;
        }

        if let Some(val) = &cli.listen_address {
            settings.listen_address = val.clone();
        }
        if let Some(val) = &cli.telemetry_path {
            settings.telemetry_path = val.clone();
        }
        if let Some(val) = &cli.scrape_uri {
            settings.scrape_uri = val.clone();
        }
        if let Some(val) = cli.timeout {
            settings.timeout = val;
        }

        Ok(settings)
    }

    /// Reject settings the exporter cannot start with.
    pub fn validate(&self) -> Result<(), ExporterError> {
        self.listen_addr()?;

        let uri = Url::parse(&self.scrape_uri)
            .map_err(|e| ExporterError::ScrapeUri(self.scrape_uri.clone(), e.to_string()))?;
        if !matches!(uri.scheme(), "http" | "https") {
            return Err(ExporterError::ScrapeUri(
                self.scrape_uri.clone(),
                format!("unsupported scheme {:?}", uri.scheme()),
            ));
        }

        if !self.telemetry_path.starts_with('/') {
            return Err(ConfigError::Message(format!(
                "telemetry path {:?} must start with '/'",
                self.telemetry_path
            ))
            .into());
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Message("timeout must be greater than zero".into()).into());
        }
        Ok(())
    }

    /// Resolve the listen address, expanding the `:port` shorthand.
    ///
    /// Host names are looked up; the first resolved address is used.
    pub fn listen_addr(&self) -> Result<SocketAddr, ExporterError> {
        let raw = &self.listen_address;
        let full = if raw.starts_with(':') {
            format!("0.0.0.0{raw}")
        } else {
            raw.clone()
        };
        full.to_socket_addrs()
            .and_then(|mut addrs| {
                addrs.next().ok_or_else(|| {
                    io::Error::new(io::ErrorKind::AddrNotAvailable, "no address resolved")
                })
            })
            .map_err(|e| ExporterError::ListenAddress(raw.clone(), e))
    }
}
