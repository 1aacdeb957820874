//! Data models for load testing
//!
//! This module contains all data structures shared by the engine, the
//! transport and the presentation layer.

mod outcome;
mod report;
mod test_config;

pub use outcome::{Outcome, TransportError};
pub use report::TestReport;
pub use test_config::{ConfigError, TestConfig};
