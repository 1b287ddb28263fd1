//! `sol-price-alert` -- emails you when SOL crosses a price threshold.
//!
//! Polls the CoinGecko simple-price endpoint, compares each reading with the
//! previous one and sends a single email per crossing of the configured high
//! or low bound. Thresholds and mail credentials come from `config.json`; see
//! [`sol_price_alert::config`] for the environment overrides.

use sol_price_alert::{
    PriceMonitor, config, logging,
    services::{coingecko::CoinGeckoClient, notifier::EmailNotifier},
};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let log_file = config::log_file();
    if let Err(e) = logging::init(&log_file) {
        eprintln!("failed to open log file {}: {e}", log_file.display());
        std::process::exit(1);
    }

    let settings = config::load().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        std::process::exit(1);
    });

    tracing::info!(
        asset = %settings.price_api.asset_id,
        currency = %settings.price_api.vs_currency,
        recipient = %settings.email.recipient_email,
        "Starting price alert monitor"
    );

    let source = CoinGeckoClient::new(&settings.price_api).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build HTTP client");
        std::process::exit(1);
    });

    let notifier = EmailNotifier::new(
        settings.email.clone(),
        settings.price_api.asset_label.clone(),
        settings.price_api.vs_currency.clone(),
    );

    let mut monitor = PriceMonitor::new(
        source,
        notifier,
        settings.thresholds,
        settings.poll_interval,
    );

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.cancel();
    });

    monitor.run(cancel).await;

    tracing::info!("Shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
