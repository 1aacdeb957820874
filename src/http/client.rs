//! HTTP transport for load testing
//!
//! Performs single timed GET requests and turns every result, including
//! failures, into an `Outcome`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::models::{Outcome, TransportError};

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Capability to perform one request against a target.
///
/// Implementations must report failures as error outcomes instead of
/// returning early, and should bound every call with their own timeout.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, target: &str) -> Outcome;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create client with custom timeout
    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn classify(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else if error.is_connect() {
            TransportError::Connection(error.to_string())
        } else {
            TransportError::Request(error.to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn get(&self, target: &str) -> Outcome {
        let start = Instant::now();

        let response = match self.client.get(target).send().await {
            Ok(response) => response,
            Err(e) => {
                let elapsed = start.elapsed();
                debug!("GET {} failed after {}ms: {}", target, elapsed.as_millis(), e);
                return Outcome::error(self.classify(e), elapsed);
            }
        };

        let status = response.status().as_u16();

        // Drain the body so the connection can return to the pool
        if let Err(e) = response.bytes().await {
            let elapsed = start.elapsed();
            debug!("Reading body from {} failed: {}", target, e);
            return Outcome::error(self.classify(e), elapsed);
        }

        let elapsed = start.elapsed();
        debug!("GET {} -> {} in {}ms", target, status, elapsed.as_millis());

        Outcome::status(status, elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_timeout() {
        let client = HttpClient::with_timeout(5).unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_connection_refused_is_an_outcome() {
        // Bind and drop to get a port with nothing listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = HttpClient::with_timeout(2).unwrap();
        let outcome = client.get(&format!("http://127.0.0.1:{port}/")).await;

        assert!(outcome.is_error());
        assert_eq!(outcome.status_code(), None);
    }

    #[tokio::test]
    async fn test_invalid_url_is_an_outcome() {
        let client = HttpClient::with_timeout(DEFAULT_TIMEOUT_SECS).unwrap();
        let outcome = client.get("not a url").await;

        assert!(matches!(
            outcome.transport_error(),
            Some(TransportError::Request(_))
        ));
    }
}
