//! HTTP transport module
//!
//! Provides the `Transport` capability and its reqwest implementation.

mod client;
#[cfg(test)]
mod mock;

pub use client::{HttpClient, Transport, DEFAULT_TIMEOUT_SECS};
#[cfg(test)]
pub use mock::MockTransport;
