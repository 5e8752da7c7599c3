//! Environment preflight checks
//!
//! Verifies the target environment before scenarios run: the Kubernetes API
//! answers, OpenStack authentication works, Neutron listings respond, and
//! the configured public network exists.

use crate::config::AppConfig;
use crate::k8s::K8sClient;
use crate::openstack::OpenStackClient;

/// A single named check outcome
#[derive(Clone, Debug)]
pub struct HealthCheck {
    pub name: String,
    pub passed: bool,
    pub message: String,
}

impl HealthCheck {
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: message.into(),
        }
    }

    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: message.into(),
        }
    }
}

/// Aggregated preflight outcome
#[derive(Clone, Debug)]
pub struct PreFlightResult {
    pub passed: bool,
    pub checks: Vec<HealthCheck>,
}

impl PreFlightResult {
    pub fn new(checks: Vec<HealthCheck>) -> Self {
        let passed = checks.iter().all(|c| c.passed);
        Self { passed, checks }
    }

    pub fn format_table(&self) -> String {
        let mut output = String::new();
        output.push_str("\n┌──────────────────────────────────────────────────────────────┐\n");
        output.push_str("│ Preflight Checks                                             │\n");
        output.push_str("├──────────────────────────────────────────────────────────────┤\n");

        for check in &self.checks {
            let icon = if check.passed { "✓" } else { "✗" };
            output.push_str(&format!(
                "│ {} {:22} {:35} │\n",
                icon,
                check.name,
                truncate(&check.message, 35)
            ));
        }

        output.push_str("├──────────────────────────────────────────────────────────────┤\n");
        let verdict = if self.passed {
            "Environment is ready"
        } else {
            "Environment is NOT ready"
        };
        output.push_str(&format!("│ {verdict:60} │\n"));
        output.push_str("└──────────────────────────────────────────────────────────────┘\n");
        output
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

/// Preflight checker for the `check` subcommand
pub struct PreFlightChecker {
    config: AppConfig,
}

impl PreFlightChecker {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self) -> PreFlightResult {
        let mut checks = Vec::new();

        checks.push(self.check_kubernetes().await);

        match OpenStackClient::connect(&self.config.openstack).await {
            Ok(client) => {
                checks.push(HealthCheck::pass("OpenStack auth", "token issued"));
                checks.push(self.check_neutron(&client).await);
                if let Some(network_id) = &self.config.public_network_id {
                    checks.push(self.check_public_network(&client, network_id).await);
                }
            }
            Err(e) => {
                checks.push(HealthCheck::fail("OpenStack auth", format!("{e:#}")));
                checks.push(HealthCheck::fail(
                    "Neutron listings",
                    "skipped: authentication failed",
                ));
            }
        }

        PreFlightResult::new(checks)
    }

    async fn check_kubernetes(&self) -> HealthCheck {
        let name = "Kubernetes API";
        match K8sClient::new().await {
            Ok(client) => match client.list_namespaces().await {
                Ok(namespaces) => {
                    HealthCheck::pass(name, format!("{} namespaces visible", namespaces.len()))
                }
                Err(e) => HealthCheck::fail(name, format!("{e:#}")),
            },
            Err(e) => HealthCheck::fail(name, format!("{e:#}")),
        }
    }

    async fn check_neutron(&self, client: &OpenStackClient) -> HealthCheck {
        let name = "Neutron listings";
        match client.list_subnets().await {
            Ok(subnets) => HealthCheck::pass(name, format!("{} subnets listed", subnets.len())),
            Err(e) => HealthCheck::fail(name, format!("{e:#}")),
        }
    }

    async fn check_public_network(&self, client: &OpenStackClient, network_id: &str) -> HealthCheck {
        let name = "Public network";
        match client.list_networks().await {
            Ok(networks) => {
                if networks.iter().any(|n| n.id == network_id) {
                    HealthCheck::pass(name, format!("network {network_id} found"))
                } else {
                    HealthCheck::fail(name, format!("network {network_id} not listed"))
                }
            }
            Err(e) => HealthCheck::fail(name, format!("{e:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_passes_only_when_all_pass() {
        let all_good = PreFlightResult::new(vec![
            HealthCheck::pass("a", "ok"),
            HealthCheck::pass("b", "ok"),
        ]);
        assert!(all_good.passed);

        let one_bad = PreFlightResult::new(vec![
            HealthCheck::pass("a", "ok"),
            HealthCheck::fail("b", "broken"),
        ]);
        assert!(!one_bad.passed);
    }

    #[test]
    fn test_format_table_lists_checks() {
        let result = PreFlightResult::new(vec![HealthCheck::fail("Neutron listings", "timeout")]);
        let table = result.format_table();
        assert!(table.contains("Neutron listings"));
        assert!(table.contains("NOT ready"));
    }

    #[test]
    fn test_truncate_long_messages() {
        assert_eq!(truncate("short", 10), "short");
        let long = truncate(&"x".repeat(50), 10);
        assert_eq!(long.chars().count(), 10);
        assert!(long.ends_with("..."));
    }
}
