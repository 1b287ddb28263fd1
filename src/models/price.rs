use chrono::{DateTime, Utc};

/// One price reading taken from the price API.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSample {
    pub price: f64,
    pub fetched_at: DateTime<Utc>,
}

impl PriceSample {
    pub fn now(price: f64) -> Self {
        Self {
            price,
            fetched_at: Utc::now(),
        }
    }
}
