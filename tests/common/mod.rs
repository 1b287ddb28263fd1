//! Scripted stand-ins for the price API and the mailer.

#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use reqwest::StatusCode;
use sol_price_alert::{
    models::{PriceAlert, PriceSample, Thresholds},
    services::{
        coingecko::{FetchError, PriceSource},
        notifier::{Notifier, NotifyError},
    },
};

pub fn thresholds() -> Thresholds {
    Thresholds::new(20.0, 30.0).unwrap()
}

/// Replays a fixed list of readings. `None` simulates a 503 from the API;
/// once the script runs out every fetch fails.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    script: Arc<Mutex<VecDeque<Option<f64>>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(script: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn prices(prices: &[f64]) -> Self {
        Self::new(prices.iter().copied().map(Some))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for ScriptedSource {
    async fn fetch_price(&self) -> Result<PriceSample, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.script.lock().unwrap().pop_front().flatten() {
            Some(price) => Ok(PriceSample::now(price)),
            None => Err(FetchError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "try again later".to_string(),
            }),
        }
    }
}

/// Records every alert it is asked to send. Can be switched to fail.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<PriceAlert>>>,
    attempts: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        let n = Self::default();
        n.set_failing(true);
        n
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<PriceAlert> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, alert: &PriceAlert) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            let err = "nobody".parse::<lettre::Address>().unwrap_err();
            return Err(NotifyError::Address(err));
        }

        self.sent.lock().unwrap().push(*alert);
        Ok(())
    }
}
