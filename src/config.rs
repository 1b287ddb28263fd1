use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use serde::Deserialize;

use crate::models::Thresholds;

const DEFAULT_CONFIG_PATH: &str = "config.json";
const DEFAULT_PRICE_API_URL: &str = "https://api.coingecko.com/api/v3/simple/price";
const DEFAULT_ASSET_ID: &str = "solana";
const DEFAULT_ASSET_LABEL: &str = "SOL";
const DEFAULT_VS_CURRENCY: &str = "usd";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_LOG_FILE: &str = "price_alert_bot.log";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid thresholds: low={low}, high={high} (need finite values with low < high)")]
    InvalidThresholds { low: f64, high: f64 },

    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Shape of the JSON config file.
#[derive(Debug, Deserialize)]
struct FileConfig {
    threshold_high: f64,
    threshold_low: f64,
    sender_email: String,
    sender_password: String,
    recipient_email: String,
}

#[derive(Clone)]
pub struct EmailSettings {
    pub sender_email: String,
    pub sender_password: String,
    pub recipient_email: String,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl fmt::Debug for EmailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailSettings")
            .field("sender_email", &self.sender_email)
            .field("sender_password", &"<redacted>")
            .field("recipient_email", &self.recipient_email)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct PriceApiSettings {
    pub url: String,
    pub asset_id: String,
    // shown in subjects and log lines, e.g. "SOL"
    pub asset_label: String,
    pub vs_currency: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub thresholds: Thresholds,
    pub email: EmailSettings,
    pub price_api: PriceApiSettings,
    pub poll_interval: Duration,
}

/// Load settings from the process environment and the JSON config file.
///
/// Call `dotenvy::dotenv()` first if `.env` should be honoured.
pub fn load() -> Result<Settings, ConfigError> {
    load_with(|key| env::var(key).ok())
}

/// Log file location from the process environment.
pub fn log_file() -> PathBuf {
    log_file_with(&|key: &str| env::var(key).ok())
}

/// Same as [`load`] but reads variables through `lookup` instead of the
/// process environment.
pub fn load_with<F>(lookup: F) -> Result<Settings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let path = lookup("PRICE_ALERT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let file = read_file_config(&path)?;

    let thresholds = Thresholds::new(file.threshold_low, file.threshold_high).ok_or(
        ConfigError::InvalidThresholds {
            low: file.threshold_low,
            high: file.threshold_high,
        },
    )?;

    let sender_password = lookup("SENDER_PASSWORD")
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(file.sender_password);

    let email = EmailSettings {
        sender_email: file.sender_email,
        sender_password,
        recipient_email: file.recipient_email,
        smtp_host: lookup("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
        smtp_port: parse_var(&lookup, "SMTP_PORT", DEFAULT_SMTP_PORT)?,
    };

    let price_api = PriceApiSettings {
        url: lookup("PRICE_API_URL").unwrap_or_else(|| DEFAULT_PRICE_API_URL.to_string()),
        asset_id: lookup("PRICE_ASSET_ID").unwrap_or_else(|| DEFAULT_ASSET_ID.to_string()),
        asset_label: lookup("PRICE_ASSET_LABEL")
            .unwrap_or_else(|| DEFAULT_ASSET_LABEL.to_string()),
        vs_currency: lookup("PRICE_VS_CURRENCY")
            .unwrap_or_else(|| DEFAULT_VS_CURRENCY.to_string()),
        timeout: Duration::from_secs(parse_var(
            &lookup,
            "HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?),
    };

    let poll_interval = Duration::from_secs(parse_var(
        &lookup,
        "POLL_INTERVAL_SECS",
        DEFAULT_POLL_INTERVAL_SECS,
    )?);

    Ok(Settings {
        thresholds,
        email,
        price_api,
        poll_interval,
    })
}

/// Log file location. Kept apart from [`Settings`] so logging can start
/// before the config file is read.
pub fn log_file_with<F>(lookup: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    lookup("LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
    }
}
