//! Synthetic target HTTP server
//!
//! Provides endpoints for:
//! - `GET /` - Delayed response with a weighted-random status code
//! - `GET /health` - Health check

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, info};

use super::watchdog::IdleWatchdog;
use super::weights::StatusWeights;
use crate::config::TargetConfig;

/// How often the server checks the idle watchdog
const WATCHDOG_POLL: Duration = Duration::from_millis(250);

/// Body returned by `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetResponse {
    pub status: u16,
    pub delay_ms: u64,
    pub request_number: u64,
}

/// Shared state of the target server
pub struct TargetState {
    weights: StatusWeights,
    min_delay: Duration,
    max_delay: Duration,
    watchdog: IdleWatchdog,
}

impl TargetState {
    pub fn new(config: &TargetConfig) -> Self {
        Self::with_watchdog(
            config,
            IdleWatchdog::new(
                config.shutdown_after_requests,
                Duration::from_secs(config.idle_timeout_secs),
            ),
        )
    }

    pub fn with_watchdog(config: &TargetConfig, watchdog: IdleWatchdog) -> Self {
        Self {
            weights: config.status_weights.clone(),
            min_delay: Duration::from_millis(config.min_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            watchdog,
        }
    }

    pub fn watchdog(&self) -> &IdleWatchdog {
        &self.watchdog
    }

    /// Draw a delay in `[min_delay, max_delay)`
    fn draw_delay<R: Rng>(&self, rng: &mut R) -> Duration {
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        Duration::from_millis(rng.random_range(min..max))
    }
}

/// Build the router for the target endpoints
pub fn router(state: Arc<TargetState>) -> Router {
    Router::new()
        .route("/", get(handle_request))
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn handle_request(State(state): State<Arc<TargetState>>) -> impl IntoResponse {
    let (delay, code) = {
        let mut rng = rand::rng();
        (state.draw_delay(&mut rng), state.weights.select(&mut rng))
    };

    tokio::time::sleep(delay).await;

    let request_number = state.watchdog.record_request();
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::OK);

    let mut headers = HeaderMap::new();
    set_header(&mut headers, "x-response-delay", format!("{}ms", delay.as_millis()));
    set_header(&mut headers, "x-response-time", Utc::now().to_rfc3339());
    set_header(&mut headers, "x-request-number", request_number.to_string());

    debug!(
        "Request #{}: Status {}, Delay {}ms",
        request_number,
        code,
        delay.as_millis()
    );

    (
        status,
        headers,
        Json(TargetResponse {
            status: code,
            delay_ms: delay.as_millis() as u64,
            request_number,
        }),
    )
}

fn set_header(headers: &mut HeaderMap, name: &'static str, value: String) {
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(HeaderName::from_static(name), value);
    }
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "healthy" })))
}

/// A bound, not yet running target server
pub struct TargetServer {
    listener: TcpListener,
    state: Arc<TargetState>,
}

impl TargetServer {
    /// Bind the listener for the given configuration
    pub async fn bind(config: &TargetConfig, addr: SocketAddr) -> Result<Self> {
        Self::bind_with_state(Arc::new(TargetState::new(config)), addr).await
    }

    pub async fn bind_with_state(state: Arc<TargetState>, addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind target server to {addr}"))?;
        Ok(Self { listener, state })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read target server address")
    }

    /// Serve until `shutdown` resolves or the idle watchdog expires
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr()?;
        let state = self.state.clone();
        let app = router(self.state);

        info!("Target server listening on http://{}", addr);

        let signal = async move {
            tokio::select! {
                _ = shutdown => {
                    let watchdog = state.watchdog();
                    info!(
                        "Target server received shutdown signal after {} requests (watchdog armed: {})",
                        watchdog.request_count(),
                        watchdog.is_armed()
                    );
                    // Draining requests must not re-arm an idle shutdown
                    watchdog.cancel();
                }
                _ = state.watchdog().wait_expired(WATCHDOG_POLL) => {}
            }
        };

        axum::serve(self.listener, app)
            .with_graceful_shutdown(signal)
            .await
            .context("Target server failed")?;

        info!("Target server stopped");
        Ok(())
    }
}
