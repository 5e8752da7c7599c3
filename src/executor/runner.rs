//! Scenario execution runner
//!
//! Applies skip checks, times each scenario, guarantees teardown, and maps
//! errors onto report outcomes.

use anyhow::Result;
use std::time::Instant;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::error::CheckError;
use crate::models::{RunSummary, ScenarioCase, ScenarioReport};
use crate::scenario::{
    NamespaceLifecycleScenario, PodIsolationScenario, ScenarioContext, ServiceIsolationScenario,
};

/// Runner for the integration scenarios
pub struct ScenarioRunner {
    config: AppConfig,
}

impl ScenarioRunner {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Reason to skip every scenario, or None when the environment is ready
    pub fn skip_reason(&self) -> Option<String> {
        if !self.config.service_available {
            return Some("networking integration support is not enabled".to_string());
        }
        if !self.config.namespace_isolation {
            return Some("namespace driver and handler must be enabled".to_string());
        }
        None
    }

    /// Run a single scenario case
    pub async fn run_case(&self, case: ScenarioCase) -> ScenarioReport {
        if let Some(reason) = self.skip_reason() {
            info!("Skipping {case}: {reason}");
            return ScenarioReport::skip(case, reason);
        }

        info!("Running {case}");
        let start = Instant::now();

        let mut ctx = match ScenarioContext::connect(self.config.clone()).await {
            Ok(ctx) => ctx,
            Err(e) => {
                error!("Could not connect to the target environment: {e:#}");
                return ScenarioReport::error(
                    case,
                    start.elapsed().as_millis() as u64,
                    format!("connection failed: {e:#}"),
                );
            }
        };

        let result = match case {
            ScenarioCase::NamespaceLifecycle => NamespaceLifecycleScenario::run(&mut ctx).await,
            ScenarioCase::PodIsolation => PodIsolationScenario::run(&mut ctx).await,
            ScenarioCase::ServiceIsolation => ServiceIsolationScenario::run(&mut ctx).await,
        };

        // Registered resources go away regardless of the outcome.
        ctx.teardown().await;

        let report = classify_result(case, start.elapsed().as_millis() as u64, result);
        info!("  {report}");
        report
    }

    /// Run all scenario cases sequentially
    pub async fn run_all(&self) -> Result<RunSummary> {
        self.run_cases(&ScenarioCase::all()).await
    }

    /// Run the given scenario cases sequentially
    pub async fn run_cases(&self, cases: &[ScenarioCase]) -> Result<RunSummary> {
        let start = Instant::now();
        let mut reports = Vec::new();

        for &case in cases {
            reports.push(self.run_case(case).await);
        }

        let summary = RunSummary::new(reports);
        info!(
            "Scenario run completed in {}ms - Pass: {}/{} ({:.1}%)",
            start.elapsed().as_millis(),
            summary.passed,
            summary.total,
            summary.pass_rate()
        );

        Ok(summary)
    }
}

/// Map a scenario result onto a report outcome: typed skip and assertion
/// errors become Skip/Fail, anything else is an environment Error.
fn classify_result(
    case: ScenarioCase,
    duration_ms: u64,
    result: Result<()>,
) -> ScenarioReport {
    match result {
        Ok(()) => ScenarioReport::pass(case, duration_ms),
        Err(e) => match e.downcast_ref::<CheckError>() {
            Some(CheckError::Skip(reason)) => ScenarioReport::skip(case, reason.clone()),
            Some(err) if err.is_assertion() => {
                ScenarioReport::fail(case, duration_ms, err.to_string())
            }
            _ => ScenarioReport::error(case, duration_ms, format!("{e:#}")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScenarioStatus;

    #[test]
    fn test_classify_pass() {
        let report = classify_result(ScenarioCase::NamespaceLifecycle, 10, Ok(()));
        assert_eq!(report.status, ScenarioStatus::Pass);
    }

    #[test]
    fn test_classify_assertion_as_fail() {
        let err = CheckError::assertion("subnet missing");
        let report = classify_result(ScenarioCase::PodIsolation, 10, Err(err.into()));
        assert_eq!(report.status, ScenarioStatus::Fail);
        assert!(report.message.unwrap().contains("subnet missing"));
    }

    #[test]
    fn test_classify_skip() {
        let err = CheckError::skip("isolation disabled");
        let report = classify_result(ScenarioCase::PodIsolation, 10, Err(err.into()));
        assert_eq!(report.status, ScenarioStatus::Skip);
    }

    #[test]
    fn test_classify_server_fault_as_error() {
        let err = CheckError::ServerFault(60);
        let report = classify_result(ScenarioCase::ServiceIsolation, 10, Err(err.into()));
        assert_eq!(report.status, ScenarioStatus::Error);
    }

    #[test]
    fn test_classify_timeout_as_error() {
        let err = CheckError::timeout("pod to reach Running", 300);
        let report = classify_result(ScenarioCase::NamespaceLifecycle, 10, Err(err.into()));
        assert_eq!(report.status, ScenarioStatus::Error);
    }

    #[test]
    fn test_runner_skip_reasons() {
        let mut config = AppConfig::default();
        config.service_available = false;
        let runner = ScenarioRunner::new(config.clone());
        assert!(runner.skip_reason().unwrap().contains("integration"));

        config.service_available = true;
        config.namespace_isolation = false;
        let runner = ScenarioRunner::new(config.clone());
        assert!(runner.skip_reason().unwrap().contains("namespace"));

        config.namespace_isolation = true;
        let runner = ScenarioRunner::new(config);
        assert!(runner.skip_reason().is_none());
    }
}
