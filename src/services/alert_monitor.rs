use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{
    models::{PriceAlert, Thresholds},
    services::{coingecko::PriceSource, detector::detect_crossing, notifier::Notifier},
};

/// What a single fetch/evaluate/notify cycle did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Fetch failed; state untouched.
    Skipped,
    /// First successful sample, recorded as the baseline.
    Baseline(f64),
    /// Sample evaluated, no crossing.
    Quiet(f64),
    /// Crossing detected and the notifier accepted it.
    Alerted(PriceAlert),
    /// Crossing detected but the notifier failed.
    NotifyFailed(PriceAlert),
}

pub struct PriceMonitor<S, N> {
    source: S,
    notifier: N,
    thresholds: Thresholds,
    poll_interval: Duration,
    last_price: Option<f64>,
}

impl<S, N> PriceMonitor<S, N>
where
    S: PriceSource,
    N: Notifier,
{
    pub fn new(source: S, notifier: N, thresholds: Thresholds, poll_interval: Duration) -> Self {
        Self {
            source,
            notifier,
            thresholds,
            poll_interval,
            last_price: None,
        }
    }

    pub fn last_price(&self) -> Option<f64> {
        self.last_price
    }

    /// Poll until `cancel` fires.
    ///
    /// The first cycle runs immediately. After each cycle the loop sleeps for
    /// the full poll interval, so the real period is the interval plus however
    /// long the cycle took.
    pub async fn run(&mut self, cancel: CancellationToken) {
        tracing::info!(
            low = self.thresholds.low(),
            high = self.thresholds.high(),
            interval_secs = self.poll_interval.as_secs(),
            "Price monitor started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = self.tick() => {}
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        tracing::info!("Price monitor stopping");
    }

    /// Run one cycle: fetch, compare against the last good price, notify on a
    /// crossing, then remember the new price.
    pub async fn tick(&mut self) -> TickOutcome {
        let sample = match self.source.fetch_price().await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch price");
                return TickOutcome::Skipped;
            }
        };

        let price = sample.price;
        tracing::info!(price, fetched_at = %sample.fetched_at.to_rfc3339(), "Current price");

        let previous = self.last_price.replace(price);
        if previous.is_none() {
            return TickOutcome::Baseline(price);
        }

        let Some(alert) = detect_crossing(previous, price, &self.thresholds) else {
            return TickOutcome::Quiet(price);
        };

        tracing::info!(
            direction = %alert.direction,
            threshold = alert.threshold,
            price,
            "Threshold crossed"
        );

        match self.notifier.notify(&alert).await {
            Ok(()) => TickOutcome::Alerted(alert),
            Err(e) => {
                tracing::error!(error = %e, direction = %alert.direction, "Failed to send alert");
                TickOutcome::NotifyFailed(alert)
            }
        }
    }
}
