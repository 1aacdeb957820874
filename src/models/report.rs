//! Load test report model

use std::collections::BTreeMap;
use std::time::Duration;

/// Statistical summary of one completed run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TestReport {
    /// Wall-clock duration of the whole run
    pub total_duration: Duration,
    /// Number of collected outcomes
    pub total_requests: usize,
    /// Outcomes with status exactly 200
    pub success_requests: usize,
    /// Status code -> occurrences, for outcomes without a transport error
    pub status_distribution: BTreeMap<u16, usize>,
    /// Outcomes carrying a transport error
    pub error_count: usize,
    /// Mean per-request duration, zero for an empty run
    pub average_duration: Duration,
}

impl TestReport {
    pub fn success_rate(&self) -> f64 {
        self.rate_of(self.success_requests)
    }

    pub fn error_rate(&self) -> f64 {
        self.rate_of(self.error_count)
    }

    /// Percentage of all requests that produced the given status
    pub fn status_rate(&self, code: u16) -> f64 {
        self.rate_of(self.status_distribution.get(&code).copied().unwrap_or(0))
    }

    /// Requests per second over the whole run
    pub fn throughput(&self) -> f64 {
        let secs = self.total_duration.as_secs_f64();
        if secs > 0.0 {
            self.total_requests as f64 / secs
        } else {
            0.0
        }
    }

    /// Total of all status-distribution counts
    pub fn responded(&self) -> usize {
        self.status_distribution.values().sum()
    }

    fn rate_of(&self, count: usize) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            (count as f64 / self.total_requests as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates() {
        let report = TestReport {
            total_duration: Duration::from_secs(2),
            total_requests: 10,
            success_requests: 7,
            status_distribution: BTreeMap::from([(200, 7), (500, 2)]),
            error_count: 1,
            average_duration: Duration::from_millis(100),
        };

        assert_eq!(report.success_rate(), 70.0);
        assert_eq!(report.error_rate(), 10.0);
        assert_eq!(report.status_rate(500), 20.0);
        assert_eq!(report.status_rate(404), 0.0);
        assert_eq!(report.throughput(), 5.0);
        assert_eq!(report.responded() + report.error_count, report.total_requests);
    }

    #[test]
    fn test_empty_report_rates() {
        let report = TestReport::default();
        assert_eq!(report.success_rate(), 0.0);
        assert_eq!(report.error_rate(), 0.0);
        assert_eq!(report.throughput(), 0.0);
    }
}
