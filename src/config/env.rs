//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

use super::AppConfig;

/// Environment variable prefix
const ENV_PREFIX: &str = "OSNETCHECK";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Keystone endpoint from OSNETCHECK_AUTH_URL
    pub auth_url: Option<String>,
    /// User from OSNETCHECK_USERNAME
    pub username: Option<String>,
    /// Password from OSNETCHECK_PASSWORD
    pub password: Option<String>,
    /// Scoped project from OSNETCHECK_AUTH_PROJECT
    pub auth_project: Option<String>,
    /// Neutron endpoint from OSNETCHECK_NETWORK_URL
    pub network_url: Option<String>,
    /// External network id from OSNETCHECK_PUBLIC_NETWORK
    pub public_network_id: Option<String>,
    /// Pod image from OSNETCHECK_POD_IMAGE
    pub pod_image: Option<String>,
    /// Integration deployed flag from OSNETCHECK_SERVICE_AVAILABLE
    pub service_available: Option<bool>,
    /// Isolation handler flag from OSNETCHECK_NAMESPACE_ISOLATION
    pub namespace_isolation: Option<bool>,
    /// LB build timeout from OSNETCHECK_LB_BUILD_TIMEOUT
    pub lb_build_secs: Option<u64>,
    /// Config file from OSNETCHECK_CONFIG
    pub config_file: Option<String>,
    /// Verbose from OSNETCHECK_VERBOSE
    pub verbose: Option<bool>,
    /// Output format from OSNETCHECK_FORMAT
    pub format: Option<String>,
    /// Kubeconfig from KUBECONFIG
    pub kubeconfig: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            auth_url: get_env("AUTH_URL"),
            username: get_env("USERNAME"),
            password: get_env("PASSWORD"),
            auth_project: get_env("AUTH_PROJECT"),
            network_url: get_env("NETWORK_URL"),
            public_network_id: get_env("PUBLIC_NETWORK"),
            pod_image: get_env("POD_IMAGE"),
            service_available: get_env_bool("SERVICE_AVAILABLE"),
            namespace_isolation: get_env_bool("NAMESPACE_ISOLATION"),
            lb_build_secs: get_env_parse("LB_BUILD_TIMEOUT"),
            config_file: get_env("CONFIG"),
            verbose: get_env_bool("VERBOSE"),
            format: get_env("FORMAT"),
            kubeconfig: env::var("KUBECONFIG").ok(),
        }
    }

    /// Overlay the environment values onto a loaded configuration.
    /// Environment takes precedence over the file.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(v) = &self.auth_url {
            config.openstack.auth_url = v.clone();
        }
        if let Some(v) = &self.username {
            config.openstack.username = v.clone();
        }
        if let Some(v) = &self.password {
            config.openstack.password = v.clone();
        }
        if let Some(v) = &self.auth_project {
            config.openstack.auth_project = v.clone();
        }
        if let Some(v) = &self.network_url {
            config.openstack.network_url = Some(v.clone());
        }
        if let Some(v) = &self.public_network_id {
            config.public_network_id = Some(v.clone());
        }
        if let Some(v) = &self.pod_image {
            config.pod_image = v.clone();
        }
        if let Some(v) = self.service_available {
            config.service_available = v;
        }
        if let Some(v) = self.namespace_isolation {
            config.namespace_isolation = v;
        }
        if let Some(v) = self.lb_build_secs {
            config.timeouts.lb_build_secs = v;
        }
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_AUTH_URL:            {:?}", ENV_PREFIX, self.auth_url);
        println!("  {}_USERNAME:            {:?}", ENV_PREFIX, self.username);
        println!(
            "  {}_PASSWORD:            {}",
            ENV_PREFIX,
            if self.password.is_some() { "<set>" } else { "None" }
        );
        println!("  {}_AUTH_PROJECT:        {:?}", ENV_PREFIX, self.auth_project);
        println!("  {}_NETWORK_URL:         {:?}", ENV_PREFIX, self.network_url);
        println!("  {}_PUBLIC_NETWORK:      {:?}", ENV_PREFIX, self.public_network_id);
        println!("  {}_POD_IMAGE:           {:?}", ENV_PREFIX, self.pod_image);
        println!("  {}_SERVICE_AVAILABLE:   {:?}", ENV_PREFIX, self.service_available);
        println!("  {}_NAMESPACE_ISOLATION: {:?}", ENV_PREFIX, self.namespace_isolation);
        println!("  {}_LB_BUILD_TIMEOUT:    {:?}", ENV_PREFIX, self.lb_build_secs);
        println!("  {}_CONFIG:              {:?}", ENV_PREFIX, self.config_file);
        println!("  KUBECONFIG:                    {:?}", self.kubeconfig);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Print all OSNETCHECK environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_AUTH_URL             Keystone v3 endpoint");
    println!("  {ENV_PREFIX}_USERNAME             OpenStack user");
    println!("  {ENV_PREFIX}_PASSWORD             OpenStack password");
    println!("  {ENV_PREFIX}_AUTH_PROJECT         Project to scope the token to");
    println!("  {ENV_PREFIX}_NETWORK_URL          Neutron endpoint override");
    println!("  {ENV_PREFIX}_PUBLIC_NETWORK       External network id for floating IPs");
    println!("  {ENV_PREFIX}_POD_IMAGE            Image for scenario pods");
    println!("  {ENV_PREFIX}_SERVICE_AVAILABLE    Integration deployed (true/false)");
    println!("  {ENV_PREFIX}_NAMESPACE_ISOLATION  Isolation handler enabled (true/false)");
    println!("  {ENV_PREFIX}_LB_BUILD_TIMEOUT     Load balancer build timeout in seconds");
    println!("  {ENV_PREFIX}_CONFIG               Path to configuration file");
    println!("  {ENV_PREFIX}_VERBOSE              Enable verbose output (true/false)");
    println!("  {ENV_PREFIX}_FORMAT               Output format (table, json, csv)");
    println!("  KUBECONFIG                 Path to kubeconfig file");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_AUTH_URL=http://controller:5000/v3");
    println!("  export {ENV_PREFIX}_PASSWORD=secret");
    println!("  osnetcheck run");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(config.auth_url.is_none());
        assert!(config.namespace_isolation.is_none());
    }

    #[test]
    fn test_apply_overrides_file_values() {
        let env = EnvConfig {
            auth_url: Some("http://env:5000/v3".to_string()),
            namespace_isolation: Some(false),
            lb_build_secs: Some(120),
            ..Default::default()
        };

        let mut config = AppConfig::default();
        env.apply(&mut config);

        assert_eq!(config.openstack.auth_url, "http://env:5000/v3");
        assert!(!config.namespace_isolation);
        assert_eq!(config.timeouts.lb_build_secs, 120);
        // Untouched values keep their defaults.
        assert_eq!(config.project_name, "k8s");
    }

    #[test]
    fn test_apply_empty_env_is_noop() {
        let mut config = AppConfig::default();
        let before = format!("{config:?}");
        EnvConfig::default().apply(&mut config);
        assert_eq!(before, format!("{config:?}"));
    }
}
