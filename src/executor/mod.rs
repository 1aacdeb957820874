//! Load test execution engine
//!
//! Partitions requests across a fixed worker pool, collects outcomes and
//! reduces them into a report.

mod aggregate;
mod partition;
mod runner;
mod worker;

pub use partition::{partition, PartitionStrategy};
pub use runner::{LoadTester, DEFAULT_GRACE_PERIOD};
