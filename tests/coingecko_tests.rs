//! [`CoinGeckoClient`] against a throwaway local HTTP server.

use std::time::Duration;

use sol_price_alert::{
    config::PriceApiSettings,
    services::coingecko::{CoinGeckoClient, FetchError, PriceSource},
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::oneshot,
};

/// Serve exactly one request with the given status line and JSON body.
/// Resolves to the raw request head that was received.
async fn serve_once(
    status: &'static str,
    body: &'static str,
) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut buf = vec![0u8; 4096];
        let mut head = Vec::new();
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
            if head.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        let _ = tx.send(String::from_utf8_lossy(&head).to_string());
    });

    (format!("http://{addr}/api/v3/simple/price"), rx)
}

fn settings(url: String) -> PriceApiSettings {
    settings_with_timeout(url, Duration::from_secs(5))
}

fn settings_with_timeout(url: String, timeout: Duration) -> PriceApiSettings {
    PriceApiSettings {
        url,
        asset_id: "solana".to_string(),
        asset_label: "SOL".to_string(),
        vs_currency: "usd".to_string(),
        timeout,
    }
}

#[tokio::test]
async fn fetches_price_and_sends_query() {
    let (url, request) = serve_once("200 OK", r#"{"solana":{"usd":142.5}}"#).await;
    let client = CoinGeckoClient::new(&settings(url)).unwrap();

    let sample = client.fetch_price().await.unwrap();
    assert_eq!(sample.price, 142.5);

    let head = request.await.unwrap();
    assert!(head.starts_with("GET /api/v3/simple/price?"));
    assert!(head.contains("ids=solana"));
    assert!(head.contains("vs_currencies=usd"));
}

#[tokio::test]
async fn non_success_status_is_a_fetch_error() {
    let (url, _request) =
        serve_once("429 Too Many Requests", r#"{"status":{"error_code":429}}"#).await;
    let client = CoinGeckoClient::new(&settings(url)).unwrap();

    let err = client.fetch_price().await.unwrap_err();
    match err {
        FetchError::Status { status, body } => {
            assert_eq!(status.as_u16(), 429);
            assert!(body.contains("error_code"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_asset_is_a_fetch_error() {
    let (url, _request) = serve_once("200 OK", r#"{"bitcoin":{"usd":60000}}"#).await;
    let client = CoinGeckoClient::new(&settings(url)).unwrap();

    let err = client.fetch_price().await.unwrap_err();
    assert!(matches!(err, FetchError::MissingPrice { .. }));
}

#[tokio::test]
async fn connection_refused_is_a_fetch_error() {
    // bind then drop so the port is very likely closed
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = CoinGeckoClient::new(&settings(format!("http://{addr}/"))).unwrap();

    let err = client.fetch_price().await.unwrap_err();
    assert!(matches!(err, FetchError::Http(_)));
}

#[tokio::test]
async fn other_success_codes_are_rejected() {
    let (url, _request) =
        serve_once("203 Non-Authoritative Information", r#"{"solana":{"usd":142.5}}"#).await;
    let client = CoinGeckoClient::new(&settings(url)).unwrap();

    let err = client.fetch_price().await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status, .. } if status.as_u16() == 203));
}

#[tokio::test]
async fn times_out_on_hung_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // accept and hold the connection without ever answering
    tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let timeout = Duration::from_millis(300);
    let client =
        CoinGeckoClient::new(&settings_with_timeout(format!("http://{addr}/"), timeout)).unwrap();

    let started = std::time::Instant::now();
    let err = client.fetch_price().await.unwrap_err();

    assert!(matches!(&err, FetchError::Http(e) if e.is_timeout()), "got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(5));
}
