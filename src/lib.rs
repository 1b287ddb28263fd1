//! Library entrypoint for the SOL price alert monitor.
//!
//! The binary in `main.rs` only wires things together; everything it uses
//! lives here so integration tests under `tests/` can reach it.

pub mod config;
pub mod logging;
pub mod models;
pub mod services;

pub use services::alert_monitor::{PriceMonitor, TickOutcome};
