//! Tracing subscriber setup: stdout plus an append-only log file.

use std::{
    fs::{File, OpenOptions},
    io,
    path::Path,
    sync::Mutex,
};

use tracing::Subscriber;
use tracing_subscriber::{
    EnvFilter, fmt, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
};

const DEFAULT_FILTER: &str = "sol_price_alert=info";

pub type FileLayer<S> =
    fmt::Layer<S, fmt::format::DefaultFields, fmt::format::Format, Mutex<File>>;

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the default filter.
pub fn init(log_file: &Path) -> io::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(fmt::layer())
        .with(file_layer(log_file)?)
        .init();

    Ok(())
}

/// Formatting layer that appends plain (no ANSI) timestamped lines to `path`,
/// creating the file if needed.
pub fn file_layer<S>(path: &Path) -> io::Result<FileLayer<S>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    Ok(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
}
