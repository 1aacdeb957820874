//! Report aggregation
//!
//! Reduces a collection of outcomes into a `TestReport`.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::models::{Outcome, TestReport};

/// The only status counted as a success
pub const SUCCESS_STATUS: u16 = 200;

/// Build a report from outcomes in a single pass.
///
/// Order-independent. Outcomes with a transport error count only towards
/// `error_count`; all others land in the status distribution.
pub fn aggregate(outcomes: &[Outcome], total_duration: Duration) -> TestReport {
    let mut status_distribution = BTreeMap::new();
    let mut success_requests = 0;
    let mut error_count = 0;
    let mut request_time = Duration::ZERO;

    for outcome in outcomes {
        request_time += outcome.elapsed();

        if outcome.is_error() {
            error_count += 1;
        } else if let Some(code) = outcome.status_code() {
            *status_distribution.entry(code).or_insert(0) += 1;
            if code == SUCCESS_STATUS {
                success_requests += 1;
            }
        }
    }

    let total_requests = outcomes.len();
    let average_duration = if total_requests > 0 {
        average(request_time, total_requests)
    } else {
        Duration::ZERO
    };

    TestReport {
        total_duration,
        total_requests,
        success_requests,
        status_distribution,
        error_count,
        average_duration,
    }
}

fn average(total: Duration, count: usize) -> Duration {
    match u32::try_from(count) {
        Ok(n) => total / n,
        Err(_) => Duration::from_nanos((total.as_nanos() / count as u128) as u64),
    }
}
