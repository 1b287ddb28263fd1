use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::{config::PriceApiSettings, models::PriceSample};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("price request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("price API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("no {currency} price for {asset} in response")]
    MissingPrice { asset: String, currency: String },

    #[error("price API returned unusable price {0}")]
    InvalidPrice(f64),
}

/// Anything that can report the current price of the tracked asset.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_price(&self) -> Result<PriceSample, FetchError>;
}

// { "<asset_id>": { "<currency>": <number> } }
type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

#[derive(Clone)]
pub struct CoinGeckoClient {
    http: Client,
    url: String,
    asset_id: String,
    vs_currency: String,
}

impl CoinGeckoClient {
    pub fn new(settings: &PriceApiSettings) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(settings.timeout).build()?;

        Ok(Self {
            http,
            url: settings.url.clone(),
            asset_id: settings.asset_id.clone(),
            vs_currency: settings.vs_currency.clone(),
        })
    }

    pub async fn simple_price(&self) -> Result<f64, FetchError> {
        let res = self
            .http
            .get(&self.url)
            .query(&[
                ("ids", self.asset_id.as_str()),
                ("vs_currencies", self.vs_currency.as_str()),
            ])
            .send()
            .await?;

        if res.status() != StatusCode::OK {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let body = res.json::<SimplePriceResponse>().await?;
        extract_price(&body, &self.asset_id, &self.vs_currency)
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn fetch_price(&self) -> Result<PriceSample, FetchError> {
        let price = self.simple_price().await?;
        Ok(PriceSample::now(price))
    }
}

fn extract_price(
    body: &SimplePriceResponse,
    asset_id: &str,
    vs_currency: &str,
) -> Result<f64, FetchError> {
    let price = body
        .get(asset_id)
        .and_then(|quotes| quotes.get(vs_currency))
        .copied()
        .ok_or_else(|| FetchError::MissingPrice {
            asset: asset_id.to_string(),
            currency: vs_currency.to_string(),
        })?;

    if !price.is_finite() || price <= 0.0 {
        return Err(FetchError::InvalidPrice(price));
    }

    Ok(price)
}
