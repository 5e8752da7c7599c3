//! Scenario and result models
//!
//! Defines the scenario catalogue, per-scenario reports, and run summaries.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The networking integration scenarios
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioCase {
    /// Namespace creation provisions a subnet, network CRD, and reachable
    /// LoadBalancer service; deletion removes all of them.
    NamespaceLifecycle,
    /// Pods in distinct namespaces are isolated from each other but
    /// reachable from the default namespace.
    PodIsolation,
    /// The same isolation policy holds through ClusterIP services.
    ServiceIsolation,
}

impl ScenarioCase {
    pub fn number(&self) -> u8 {
        match self {
            ScenarioCase::NamespaceLifecycle => 1,
            ScenarioCase::PodIsolation => 2,
            ScenarioCase::ServiceIsolation => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScenarioCase::NamespaceLifecycle => "Namespace Lifecycle",
            ScenarioCase::PodIsolation => "Pod Isolation",
            ScenarioCase::ServiceIsolation => "Service Isolation",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ScenarioCase::NamespaceLifecycle => {
                "Namespace creation derives a subnet and network CRD; teardown removes them"
            }
            ScenarioCase::PodIsolation => {
                "Cross-namespace pod traffic is blocked; default-namespace traffic passes"
            }
            ScenarioCase::ServiceIsolation => {
                "Cross-namespace service traffic is blocked; default-namespace traffic passes"
            }
        }
    }

    pub fn all() -> Vec<ScenarioCase> {
        vec![
            ScenarioCase::NamespaceLifecycle,
            ScenarioCase::PodIsolation,
            ScenarioCase::ServiceIsolation,
        ]
    }

    pub fn from_number(n: u8) -> Option<ScenarioCase> {
        match n {
            1 => Some(ScenarioCase::NamespaceLifecycle),
            2 => Some(ScenarioCase::PodIsolation),
            3 => Some(ScenarioCase::ServiceIsolation),
            _ => None,
        }
    }

    /// Parse a scenario selector: a number or a name fragment
    /// (`namespace`, `pod`, `service`).
    pub fn from_selector(s: &str) -> Option<ScenarioCase> {
        if let Ok(n) = s.parse::<u8>() {
            return ScenarioCase::from_number(n);
        }
        match s.to_lowercase().replace(['-', '_'], " ").as_str() {
            "namespace" | "namespace lifecycle" => Some(ScenarioCase::NamespaceLifecycle),
            "pod" | "pod isolation" => Some(ScenarioCase::PodIsolation),
            "service" | "service isolation" => Some(ScenarioCase::ServiceIsolation),
            _ => None,
        }
    }
}

impl fmt::Display for ScenarioCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scenario {}: {}", self.number(), self.name())
    }
}

/// Scenario execution status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Pass,
    Fail,
    Skip,
    Error,
}

impl ScenarioStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            ScenarioStatus::Pass => "✓",
            ScenarioStatus::Fail => "✗",
            ScenarioStatus::Skip => "○",
            ScenarioStatus::Error => "!",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ScenarioStatus::Pass)
    }
}

impl fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioStatus::Pass => write!(f, "PASS"),
            ScenarioStatus::Fail => write!(f, "FAIL"),
            ScenarioStatus::Skip => write!(f, "SKIP"),
            ScenarioStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// Result of a single scenario execution
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub scenario: ScenarioCase,
    pub status: ScenarioStatus,
    pub duration_ms: u64,
    pub message: Option<String>,
}

impl ScenarioReport {
    pub fn pass(scenario: ScenarioCase, duration_ms: u64) -> Self {
        Self {
            scenario,
            status: ScenarioStatus::Pass,
            duration_ms,
            message: None,
        }
    }

    pub fn fail(scenario: ScenarioCase, duration_ms: u64, message: impl Into<String>) -> Self {
        Self {
            scenario,
            status: ScenarioStatus::Fail,
            duration_ms,
            message: Some(message.into()),
        }
    }

    pub fn skip(scenario: ScenarioCase, reason: impl Into<String>) -> Self {
        Self {
            scenario,
            status: ScenarioStatus::Skip,
            duration_ms: 0,
            message: Some(reason.into()),
        }
    }

    pub fn error(scenario: ScenarioCase, duration_ms: u64, error: impl Into<String>) -> Self {
        Self {
            scenario,
            status: ScenarioStatus::Error,
            duration_ms,
            message: Some(error.into()),
        }
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}ms]",
            self.status.symbol(),
            self.scenario,
            self.duration_ms
        )?;
        if let Some(msg) = &self.message {
            write!(f, " - {msg}")?;
        }
        Ok(())
    }
}

/// Summary of a scenario run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub total_duration_ms: u64,
    pub reports: Vec<ScenarioReport>,
}

impl RunSummary {
    pub fn new(reports: Vec<ScenarioReport>) -> Self {
        let total = reports.len();
        let passed = reports
            .iter()
            .filter(|r| r.status == ScenarioStatus::Pass)
            .count();
        let failed = reports
            .iter()
            .filter(|r| r.status == ScenarioStatus::Fail)
            .count();
        let skipped = reports
            .iter()
            .filter(|r| r.status == ScenarioStatus::Skip)
            .count();
        let errors = reports
            .iter()
            .filter(|r| r.status == ScenarioStatus::Error)
            .count();
        let total_duration_ms = reports.iter().map(|r| r.duration_ms).sum();

        Self {
            started_at: Utc::now(),
            total,
            passed,
            failed,
            skipped,
            errors,
            total_duration_ms,
            reports,
        }
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }

    /// True when no scenario failed or errored (skips are acceptable).
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Networking integration scenarios")?;
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        for report in &self.reports {
            writeln!(f, "  {report}")?;
        }
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            f,
            "Total: {} | Pass: {} | Fail: {} | Skip: {} | Error: {}",
            self.total, self.passed, self.failed, self.skipped, self.errors
        )?;
        writeln!(
            f,
            "Pass Rate: {:.1}% | Duration: {}ms",
            self.pass_rate(),
            self.total_duration_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_numbers() {
        assert_eq!(ScenarioCase::NamespaceLifecycle.number(), 1);
        assert_eq!(ScenarioCase::ServiceIsolation.number(), 3);
        assert_eq!(
            ScenarioCase::from_number(2),
            Some(ScenarioCase::PodIsolation)
        );
        assert_eq!(ScenarioCase::from_number(4), None);
    }

    #[test]
    fn test_case_from_selector() {
        assert_eq!(
            ScenarioCase::from_selector("1"),
            Some(ScenarioCase::NamespaceLifecycle)
        );
        assert_eq!(
            ScenarioCase::from_selector("pod-isolation"),
            Some(ScenarioCase::PodIsolation)
        );
        assert_eq!(
            ScenarioCase::from_selector("Service"),
            Some(ScenarioCase::ServiceIsolation)
        );
        assert_eq!(ScenarioCase::from_selector("bogus"), None);
    }

    #[test]
    fn test_report_creation() {
        let report = ScenarioReport::pass(ScenarioCase::NamespaceLifecycle, 1200);
        assert!(report.status.is_success());
        assert_eq!(report.duration_ms, 1200);
    }

    #[test]
    fn test_run_summary_counts() {
        let reports = vec![
            ScenarioReport::pass(ScenarioCase::NamespaceLifecycle, 100),
            ScenarioReport::fail(ScenarioCase::PodIsolation, 50, "marker leaked"),
            ScenarioReport::skip(ScenarioCase::ServiceIsolation, "isolation disabled"),
        ];

        let summary = RunSummary::new(reports);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert!(!summary.is_clean());
    }
}
