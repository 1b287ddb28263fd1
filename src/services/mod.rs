pub mod alert_monitor;
pub mod coingecko;
pub mod detector;
pub mod notifier;
