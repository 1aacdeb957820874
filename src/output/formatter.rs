//! Output formatters for load test reports
//!
//! Provides JSON, Table, and summary output formats.

use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

use crate::models::TestReport;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const PURPLE: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const GRAY: &str = "\x1b[37m";

/// Width of the longest bar in the status chart
const BAR_WIDTH: usize = 40;

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Serialized form of a report, durations in milliseconds
#[derive(Serialize)]
struct ReportJson<'a> {
    total_duration_ms: u128,
    total_requests: usize,
    success_requests: usize,
    success_rate: f64,
    error_count: usize,
    error_rate: f64,
    average_duration_ms: u128,
    throughput_rps: f64,
    status_distribution: &'a BTreeMap<u16, usize>,
}

impl<'a> From<&'a TestReport> for ReportJson<'a> {
    fn from(report: &'a TestReport) -> Self {
        Self {
            total_duration_ms: report.total_duration.as_millis(),
            total_requests: report.total_requests,
            success_requests: report.success_requests,
            success_rate: report.success_rate(),
            error_count: report.error_count,
            error_rate: report.error_rate(),
            average_duration_ms: report.average_duration.as_millis(),
            throughput_rps: report.throughput(),
            status_distribution: &report.status_distribution,
        }
    }
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Format a finished load test report
    pub fn format_report(&self, report: &TestReport) -> String {
        match self.format {
            OutputFormat::Table => self.format_report_table(report),
            OutputFormat::Json => {
                serde_json::to_string(&ReportJson::from(report)).unwrap_or_default()
            }
            OutputFormat::JsonPretty => {
                serde_json::to_string_pretty(&ReportJson::from(report)).unwrap_or_default()
            }
            OutputFormat::Summary => self.format_report_summary(report),
        }
    }

    fn paint(&self, color: &str, text: impl std::fmt::Display) -> String {
        if self.colorize {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn format_report_table(&self, report: &TestReport) -> String {
        let mut output = String::new();

        // Banner
        output.push_str(&self.paint(
            CYAN,
            "\n╔══════════════════════════════════════════════════════════════╗\n\
             ║                     STRESS TEST REPORT                       ║\n\
             ╚══════════════════════════════════════════════════════════════╝",
        ));
        output.push('\n');

        output.push_str(&format!("\n{}\n", self.paint(PURPLE, "▶ General Metrics")));
        output.push_str(&format!(
            "  • Total Duration:   {}\n",
            self.paint(GREEN, format!("{}ms", report.total_duration.as_millis()))
        ));
        output.push_str(&format!(
            "  • Total Requests:   {}\n",
            self.paint(GREEN, report.total_requests)
        ));
        output.push_str(&format!(
            "  • HTTP Responses:   {}\n",
            self.paint(GREEN, report.responded())
        ));
        output.push_str(&format!(
            "  • Avg per Request:  {}\n",
            self.paint(GREEN, format!("{}ms", report.average_duration.as_millis()))
        ));
        output.push_str(&format!(
            "  • Throughput:       {}\n",
            self.paint(GREEN, format!("{:.1} req/s", report.throughput()))
        ));

        output.push_str(&format!("\n{}\n", self.paint(PURPLE, "▶ Success Rate")));
        output.push_str(&format!(
            "  • OK (HTTP 200):    {}\n",
            self.paint(
                GREEN,
                format!("{} ({:.1}%)", report.success_requests, report.success_rate())
            )
        ));
        if report.error_count > 0 {
            output.push_str(&format!(
                "  • Errors:           {}\n",
                self.paint(
                    RED,
                    format!("{} ({:.1}%)", report.error_count, report.error_rate())
                )
            ));
        }

        output.push_str(&self.format_status_chart(report));
        output.push_str(&format!("\n{}\n", self.paint(BOLD, "[VERDICT]")));
        output.push_str(&self.format_verdict(report));
        output.push('\n');

        output
    }

    fn format_status_chart(&self, report: &TestReport) -> String {
        let mut output = format!("\n{}\n", self.paint(PURPLE, "▶ HTTP Status Distribution"));

        let max_count = report
            .status_distribution
            .values()
            .copied()
            .max()
            .unwrap_or(0);
        if max_count == 0 {
            output.push_str("  (no responses)\n");
            return output;
        }

        // BTreeMap iterates in code order
        for (code, count) in &report.status_distribution {
            let bar_len = count * BAR_WIDTH / max_count;
            let bar = self.paint(status_color(*code), "█".repeat(bar_len));
            let empty = "░".repeat(BAR_WIDTH - bar_len);

            output.push_str(&format!(
                "  HTTP {} [{}{}] {} ({:.1}%)\n",
                code,
                bar,
                self.paint(GRAY, empty),
                count,
                report.status_rate(*code)
            ));
        }

        output
    }

    fn format_verdict(&self, report: &TestReport) -> String {
        let rate = report.success_rate();
        if rate >= 95.0 {
            self.paint(GREEN, "✓ The target handled the load well")
        } else if rate >= 80.0 {
            self.paint(YELLOW, "⚠ The target showed some instability")
        } else {
            self.paint(RED, "✗ The target showed significant problems")
        }
    }

    fn format_report_summary(&self, report: &TestReport) -> String {
        format!(
            "{}/{} OK ({:.1}%), {} errors, avg {}ms, total {}ms",
            report.success_requests,
            report.total_requests,
            report.success_rate(),
            report.error_count,
            report.average_duration.as_millis(),
            report.total_duration.as_millis()
        )
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}

fn status_color(code: u16) -> &'static str {
    match code {
        500..=u16::MAX => RED,
        400..=499 => YELLOW,
        300..=399 => BLUE,
        200..=299 => GREEN,
        _ => GRAY,
    }
}

/// Write a report to a file, without colors
pub fn write_report_to_file(
    path: &str,
    report: &TestReport,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let formatter = ResultFormatter::new(format).no_color();
    let content = formatter.format_report(report);

    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample_report() -> TestReport {
        TestReport {
            total_duration: Duration::from_millis(2000),
            total_requests: 10,
            success_requests: 6,
            status_distribution: BTreeMap::from([(200, 6), (500, 2), (404, 1)]),
            error_count: 1,
            average_duration: Duration::from_millis(120),
        }
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("TABLE"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::from_str("csv"), None);
    }

    #[test]
    fn test_formatter_creation() {
        let formatter = ResultFormatter::new(OutputFormat::Json).no_color();
        assert_eq!(formatter.format, OutputFormat::Json);
        assert!(!formatter.colorize);
    }

    #[test]
    fn test_table_sorted_by_code() {
        let output = ResultFormatter::default()
            .no_color()
            .format_report(&sample_report());

        let p200 = output.find("HTTP 200").unwrap();
        let p404 = output.find("HTTP 404").unwrap();
        let p500 = output.find("HTTP 500").unwrap();
        assert!(p200 < p404 && p404 < p500);
        assert!(output.contains("6 (60.0%)"));
        assert!(output.contains("HTTP Responses:   9"));
        assert!(output.contains("Errors:"));
        assert!(output.contains("significant problems"));
        assert!(!output.contains("\x1b["));
    }

    #[test]
    fn test_table_colorized() {
        let output = ResultFormatter::default().format_report(&sample_report());
        assert!(output.contains(GREEN));
        assert!(output.contains(RED));
    }

    #[test]
    fn test_verdict_thresholds() {
        let formatter = ResultFormatter::default().no_color();
        let mut report = TestReport {
            total_requests: 100,
            success_requests: 95,
            ..TestReport::default()
        };
        assert!(formatter.format_verdict(&report).contains("handled the load well"));

        report.success_requests = 80;
        assert!(formatter.format_verdict(&report).contains("instability"));

        report.success_requests = 79;
        assert!(formatter.format_verdict(&report).contains("significant problems"));
    }

    #[test]
    fn test_empty_report_table() {
        let output = ResultFormatter::default()
            .no_color()
            .format_report(&TestReport::default());
        assert!(output.contains("(no responses)"));
        assert!(!output.contains("Errors:"));
    }

    #[test]
    fn test_json_output() {
        let output = ResultFormatter::new(OutputFormat::Json).format_report(&sample_report());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["total_requests"], 10);
        assert_eq!(value["average_duration_ms"], 120);
        assert_eq!(value["status_distribution"]["500"], 2);
    }

    #[test]
    fn test_summary_output() {
        let output = ResultFormatter::new(OutputFormat::Summary).format_report(&sample_report());
        assert_eq!(output, "6/10 OK (60.0%), 1 errors, avg 120ms, total 2000ms");
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        let path = path.to_str().unwrap();

        write_report_to_file(path, &sample_report(), OutputFormat::Table).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("STRESS TEST REPORT"));
        assert!(!content.contains("\x1b["));
    }
}
