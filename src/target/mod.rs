//! Synthetic load test target
//!
//! A small HTTP server with configurable latency and status mix, used to
//! exercise the engine end to end. It shuts itself down once it has been
//! idle for a while after enough traffic.

mod server;
mod watchdog;
mod weights;

pub use server::TargetServer;
pub use weights::StatusWeights;
