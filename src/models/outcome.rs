//! Per-request outcome
//!
//! One immutable record per completed request.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Transport-level failure of a single request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request failed: {0}")]
    Request(String),
}

/// Result of one request: a status code or a transport error, never both
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    elapsed: Duration,
    result: Result<u16, TransportError>,
}

impl Outcome {
    /// Outcome carrying an HTTP status code
    pub fn status(code: u16, elapsed: Duration) -> Self {
        Self {
            elapsed,
            result: Ok(code),
        }
    }

    /// Outcome carrying a transport error
    pub fn error(error: TransportError, elapsed: Duration) -> Self {
        Self {
            elapsed,
            result: Err(error),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Status code, present only when no transport error occurred
    pub fn status_code(&self) -> Option<u16> {
        self.result.as_ref().ok().copied()
    }

    pub fn transport_error(&self) -> Option<&TransportError> {
        self.result.as_ref().err()
    }

    pub fn is_error(&self) -> bool {
        self.result.is_err()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(code) => write!(f, "HTTP {} [{}ms]", code, self.elapsed.as_millis()),
            Err(e) => write!(f, "ERROR {} [{}ms]", e, self.elapsed.as_millis()),
        }
    }
}
