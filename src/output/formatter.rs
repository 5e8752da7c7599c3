//! Output formatters for scenario results
//!
//! Provides table, JSON, CSV, and summary output formats.

#![allow(dead_code)]

use std::io::Write;

use crate::models::{RunSummary, ScenarioReport, ScenarioStatus};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Csv,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
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

    /// Format a single scenario report
    pub fn format_report(&self, report: &ScenarioReport) -> String {
        match self.format {
            OutputFormat::Table => self.format_report_table(report),
            OutputFormat::Json => serde_json::to_string(report).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Csv => self.format_csv(std::slice::from_ref(report), false),
            OutputFormat::Summary => self.format_report_brief(report),
        }
    }

    fn format_report_table(&self, report: &ScenarioReport) -> String {
        let status_str = if self.colorize {
            match report.status {
                ScenarioStatus::Pass => "\x1b[32m✓ PASS\x1b[0m",
                ScenarioStatus::Fail => "\x1b[31m✗ FAIL\x1b[0m",
                ScenarioStatus::Skip => "\x1b[33m○ SKIP\x1b[0m",
                ScenarioStatus::Error => "\x1b[31m! ERROR\x1b[0m",
            }
        } else {
            match report.status {
                ScenarioStatus::Pass => "✓ PASS",
                ScenarioStatus::Fail => "✗ FAIL",
                ScenarioStatus::Skip => "○ SKIP",
                ScenarioStatus::Error => "! ERROR",
            }
        };

        format!(
            "{:2}. {:22} {} [{:>7}ms]",
            report.scenario.number(),
            report.scenario.name(),
            status_str,
            report.duration_ms
        )
    }

    fn format_report_brief(&self, report: &ScenarioReport) -> String {
        format!(
            "{} {} ({}ms)",
            report.status.symbol(),
            report.scenario.name(),
            report.duration_ms
        )
    }

    /// Format a run summary
    pub fn format_summary(&self, summary: &RunSummary) -> String {
        match self.format {
            OutputFormat::Table => self.format_summary_table(summary),
            OutputFormat::Json => serde_json::to_string(summary).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(summary).unwrap_or_default(),
            OutputFormat::Csv => self.format_csv(&summary.reports, true),
            OutputFormat::Summary => self.format_summary_brief(summary),
        }
    }

    fn format_summary_table(&self, summary: &RunSummary) -> String {
        let mut output = String::new();

        output.push_str("\n╔══════════════════════════════════════════════════════════════╗\n");
        output.push_str("║  Networking Integration Scenarios                            ║\n");
        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");

        for report in &summary.reports {
            output.push_str(&format!("║  {}  ║\n", self.format_report_table(report)));
        }

        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");

        let pass_str = if self.colorize {
            format!("\x1b[32m{}\x1b[0m", summary.passed)
        } else {
            summary.passed.to_string()
        };
        let fail_str = if self.colorize && summary.failed > 0 {
            format!("\x1b[31m{}\x1b[0m", summary.failed)
        } else {
            summary.failed.to_string()
        };

        output.push_str(&format!(
            "║  Total: {:2} | Pass: {} | Fail: {} | Skip: {:2} | Error: {:2}     ║\n",
            summary.total, pass_str, fail_str, summary.skipped, summary.errors
        ));
        output.push_str(&format!(
            "║  Pass Rate: {:5.1}% | Duration: {:6}ms                      ║\n",
            summary.pass_rate(),
            summary.total_duration_ms
        ));
        output.push_str("╚══════════════════════════════════════════════════════════════╝\n");

        output
    }

    fn format_csv(&self, reports: &[ScenarioReport], header: bool) -> String {
        let mut writer = csv::Writer::from_writer(Vec::new());

        if header {
            let _ = writer.write_record([
                "scenario_num",
                "scenario_name",
                "status",
                "duration_ms",
                "message",
            ]);
        }

        for report in reports {
            let _ = writer.write_record([
                report.scenario.number().to_string(),
                report.scenario.name().to_string(),
                report.status.to_string(),
                report.duration_ms.to_string(),
                report.message.clone().unwrap_or_default(),
            ]);
        }

        writer
            .into_inner()
            .map(|bytes| String::from_utf8_lossy(&bytes).to_string())
            .unwrap_or_default()
    }

    fn format_summary_brief(&self, summary: &RunSummary) -> String {
        format!(
            "{}/{} passed ({:.1}%) in {}ms",
            summary.passed,
            summary.total,
            summary.pass_rate(),
            summary.total_duration_ms
        )
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}

/// Write a run summary to a file
pub fn write_summary_to_file(
    path: &str,
    summary: &RunSummary,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let formatter = ResultFormatter::new(format).no_color();
    let content = formatter.format_summary(summary);

    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScenarioCase;

    fn sample_summary() -> RunSummary {
        RunSummary::new(vec![
            ScenarioReport::pass(ScenarioCase::NamespaceLifecycle, 1000),
            ScenarioReport::fail(ScenarioCase::PodIsolation, 500, "marker leaked"),
        ])
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("TABLE"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::from_str("unknown"), None);
    }

    #[test]
    fn test_format_report_brief() {
        let report = ScenarioReport::pass(ScenarioCase::NamespaceLifecycle, 100);
        let formatter = ResultFormatter::new(OutputFormat::Summary);
        let output = formatter.format_report(&report);
        assert!(output.contains("Namespace Lifecycle"));
    }

    #[test]
    fn test_format_summary_csv_has_header_and_rows() {
        let formatter = ResultFormatter::new(OutputFormat::Csv).no_color();
        let output = formatter.format_summary(&sample_summary());

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("scenario_num,"));
        assert!(lines[2].contains("marker leaked"));
    }

    #[test]
    fn test_format_summary_json_roundtrips() {
        let formatter = ResultFormatter::new(OutputFormat::Json);
        let output = formatter.format_summary(&sample_summary());
        let parsed: RunSummary = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.total, 2);
        assert_eq!(parsed.failed, 1);
    }
}
