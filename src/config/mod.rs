//! Configuration module
//!
//! Handles loading and managing configuration: the feature flags and
//! timeouts the scenarios consume, plus OpenStack credentials/endpoints.

#![allow(dead_code)]

pub mod env;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./osnetcheck.yaml",
    "./osnetcheck.yml",
    "./.osnetcheck.yaml",
    "./.osnetcheck/config.yaml",
    "~/.config/osnetcheck/config.yaml",
    "~/.osnetcheck.yaml",
];

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// The networking integration layer is deployed in the target cluster
    #[serde(default = "default_true")]
    pub service_available: bool,

    /// Namespace isolation driver and handler are enabled
    #[serde(default = "default_true")]
    pub namespace_isolation: bool,

    /// Image for scenario pods; must answer HTTP on port 8080
    #[serde(default = "default_pod_image")]
    pub pod_image: String,

    /// OpenStack project the cluster's ports are owned by
    #[serde(default = "default_project_name")]
    pub project_name: String,

    /// External network id for floating IP allocation
    #[serde(default)]
    pub public_network_id: Option<String>,

    /// Probe the lifecycle scenario's pod through a freshly assigned
    /// floating IP instead of the load-balancer ingress
    #[serde(default)]
    pub probe_via_floating_ip: bool,

    /// Wait deadlines and intervals
    #[serde(default)]
    pub timeouts: Timeouts,

    /// OpenStack credentials and endpoints
    #[serde(default)]
    pub openstack: OpenStackConfig,
}

fn default_true() -> bool {
    true
}

fn default_pod_image() -> String {
    "kuryr/demo".to_string()
}

fn default_project_name() -> String {
    "k8s".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_available: true,
            namespace_isolation: true,
            pod_image: default_pod_image(),
            project_name: default_project_name(),
            public_network_id: None,
            probe_via_floating_ip: false,
            timeouts: Timeouts::default(),
            openstack: OpenStackConfig::default(),
        }
    }
}

/// Deadlines and polling intervals in seconds
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Timeouts {
    /// Pod create until phase Running
    pub pod_ready_secs: u64,

    /// Load balancer build (ingress assignment and first traffic)
    pub lb_build_secs: u64,

    /// Interval between LoadBalancer ingress re-reads
    pub service_ip_interval_secs: u64,

    /// Namespace teardown until derived resources disappear
    pub resource_delete_secs: u64,

    /// Single readiness probe request
    pub probe_request_secs: u64,

    /// Interval between readiness probe attempts
    pub probe_retry_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            pod_ready_secs: 300,
            lb_build_secs: 600,
            service_ip_interval_secs: 5,
            resource_delete_secs: 300,
            probe_request_secs: 2,
            probe_retry_secs: 1,
        }
    }
}

/// OpenStack credentials and endpoints
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OpenStackConfig {
    /// Keystone v3 endpoint, e.g. `http://controller:5000/v3`
    pub auth_url: String,

    pub username: String,
    pub password: String,

    /// Project to scope the token to (admin access is required for the
    /// port/security-group listings)
    pub auth_project: String,

    pub user_domain: String,
    pub project_domain: String,

    /// Neutron endpoint override; discovered from the catalog when unset
    #[serde(default)]
    pub network_url: Option<String>,

    /// Keystone service endpoint override; discovered from the catalog
    /// when unset
    #[serde(default)]
    pub identity_url: Option<String>,
}

impl Default for OpenStackConfig {
    fn default() -> Self {
        Self {
            auth_url: "http://127.0.0.1:5000/v3".to_string(),
            username: "admin".to_string(),
            password: String::new(),
            auth_project: "admin".to_string(),
            user_domain: "Default".to_string(),
            project_domain: "Default".to_string(),
            network_url: None,
            identity_url: None,
        }
    }
}

/// Full configuration file structure
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Version of config file format
    #[serde(default = "default_version")]
    pub version: String,

    /// Application settings
    #[serde(default)]
    pub app: AppConfig,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigFile {
    pub fn new() -> Self {
        Self {
            version: default_version(),
            app: AppConfig::default(),
        }
    }

    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        for location in CONFIG_LOCATIONS {
            let path = expand_path(location);
            if path.exists() {
                return Some(path);
            }
        }
        None
    }

    /// Load configuration from default location
    pub fn load_default() -> Result<Self> {
        if let Some(path) = Self::find() {
            Self::load(&path)
        } else {
            Ok(Self::new())
        }
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !["1.0"].contains(&self.version.as_str()) {
            anyhow::bail!("Unsupported config version: {}", self.version);
        }

        if self.app.openstack.auth_url.is_empty() {
            anyhow::bail!("openstack.auth_url must be set");
        }

        let t = &self.app.timeouts;
        for (name, value) in [
            ("pod_ready_secs", t.pod_ready_secs),
            ("lb_build_secs", t.lb_build_secs),
            ("service_ip_interval_secs", t.service_ip_interval_secs),
            ("resource_delete_secs", t.resource_delete_secs),
            ("probe_request_secs", t.probe_request_secs),
            ("probe_retry_secs", t.probe_retry_secs),
        ] {
            if value == 0 {
                anyhow::bail!("timeouts.{name} must be greater than zero");
            }
        }

        if self.app.probe_via_floating_ip && self.app.public_network_id.is_none() {
            anyhow::bail!("probe_via_floating_ip requires public_network_id");
        }

        Ok(())
    }

    /// Generate example configuration
    pub fn example() -> Self {
        Self {
            version: default_version(),
            app: AppConfig {
                public_network_id: Some("5f6e0ce5-1525-4533-a36d-dba2ce71a4f6".to_string()),
                openstack: OpenStackConfig {
                    auth_url: "http://controller:5000/v3".to_string(),
                    username: "admin".to_string(),
                    password: "secret".to_string(),
                    ..Default::default()
                },
                ..Default::default()
            },
        }
    }
}

fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(true)
}

fn expand_path(location: &str) -> PathBuf {
    if let Some(rest) = location.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(location)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.service_available);
        assert!(config.namespace_isolation);
        assert_eq!(config.project_name, "k8s");
        assert_eq!(config.timeouts.service_ip_interval_secs, 5);
        assert_eq!(config.timeouts.probe_request_secs, 2);
    }

    #[test]
    fn test_config_roundtrip_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("osnetcheck.yaml");

        let config = ConfigFile::example();
        config.save(&path).unwrap();

        let loaded = ConfigFile::load(&path).unwrap();
        assert_eq!(loaded.app.openstack.auth_url, "http://controller:5000/v3");
        assert_eq!(
            loaded.app.public_network_id.as_deref(),
            Some("5f6e0ce5-1525-4533-a36d-dba2ce71a4f6")
        );
    }

    #[test]
    fn test_config_roundtrip_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        ConfigFile::example().save(&path).unwrap();
        let loaded = ConfigFile::load(&path).unwrap();
        assert_eq!(loaded.version, "1.0");
    }

    #[test]
    fn test_validate_rejects_bad_version() {
        let config = ConfigFile {
            version: "9.9".to_string(),
            app: AppConfig::default(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = ConfigFile::new();
        config.app.timeouts.probe_retry_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_fip_probe_needs_network() {
        let mut config = ConfigFile::new();
        config.app.probe_via_floating_ip = true;
        assert!(config.validate().is_err());

        config.app.public_network_id = Some("net".to_string());
        assert!(config.validate().is_ok());
    }
}
