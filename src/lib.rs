//! Library entrypoint: re‑export modules

pub mod catalog;
pub mod collector;
pub mod config;
pub mod errors;
pub mod fetcher;
pub mod mapper;
pub mod metrics;
pub mod server;
