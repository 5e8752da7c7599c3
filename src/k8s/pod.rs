//! Pod management for scenario execution
//!
//! Creates scenario pods, waits for them to run within a deadline, and
//! executes probe commands inside them.

#![allow(dead_code)]

use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::{Container, Pod, PodSpec};
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use kube::runtime::wait::{await_condition, conditions::is_pod_running};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::K8sClient;
use crate::error::CheckError;

/// Pod manager for scenario operations
pub struct PodManager {
    client: K8sClient,
}

impl PodManager {
    pub fn new(client: K8sClient) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.client().clone(), namespace)
    }

    /// Create a scenario pod and wait for it to reach phase Running.
    ///
    /// The wait is bounded by `ready_timeout_secs`; a pod that never starts
    /// fails the scenario with a timeout instead of hanging it.
    pub async fn create_pod(&self, config: &PodConfig, ready_timeout_secs: u64) -> Result<Pod> {
        let pod = Pod {
            metadata: kube::core::ObjectMeta {
                name: Some(config.name.clone()),
                namespace: Some(config.namespace.clone()),
                labels: Some(config.labels.clone()),
                ..Default::default()
            },
            spec: Some(PodSpec {
                containers: vec![Container {
                    name: config.name.clone(),
                    image: Some(config.image.clone()),
                    args: Some(config.args.clone()),
                    ..Default::default()
                }],
                ..Default::default()
            }),
            ..Default::default()
        };

        let api = self.api(&config.namespace);
        let created = api
            .create(&PostParams::default(), &pod)
            .await
            .with_context(|| format!("Failed to create pod {}", config.name))?;

        self.wait_running(&config.name, &config.namespace, ready_timeout_secs)
            .await?;

        info!("Pod {}/{} is running", config.namespace, config.name);
        Ok(created)
    }

    /// Wait for pod to be running, bounded by a deadline
    pub async fn wait_running(&self, name: &str, namespace: &str, timeout_secs: u64) -> Result<()> {
        let api = self.api(namespace);

        let cond = await_condition(api, name, is_pod_running());
        tokio::time::timeout(Duration::from_secs(timeout_secs), cond)
            .await
            .map_err(|_| {
                CheckError::timeout(format!("pod {namespace}/{name} to reach Running"), timeout_secs)
            })?
            .context("Error waiting for pod")?;

        Ok(())
    }

    /// Delete pod
    pub async fn delete_pod(&self, name: &str, namespace: &str) -> Result<()> {
        self.api(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .with_context(|| format!("Failed to delete pod {namespace}/{name}"))?;
        Ok(())
    }

    /// Current IP of a pod, re-read from the API
    pub async fn get_pod_ip(&self, name: &str, namespace: &str) -> Result<Option<String>> {
        Ok(self
            .find_pod(name, namespace)
            .await?
            .and_then(|pod| pod.status.and_then(|s| s.pod_ip)))
    }

    /// Current phase of a pod, re-read from the API
    pub async fn get_pod_status(&self, name: &str, namespace: &str) -> Result<Option<String>> {
        Ok(self
            .find_pod(name, namespace)
            .await?
            .and_then(|pod| pod.status.and_then(|s| s.phase)))
    }

    async fn find_pod(&self, name: &str, namespace: &str) -> Result<Option<Pod>> {
        let list = self
            .api(namespace)
            .list(&ListParams::default())
            .await
            .context("Failed to list pods")?;

        Ok(list
            .items
            .into_iter()
            .find(|pod| pod.metadata.name.as_deref() == Some(name)))
    }

    /// Execute a command in a pod with stdout captured and stderr discarded.
    ///
    /// A non-zero exit still returns the captured stdout: the negative
    /// reachability checks distinguish "curl printed nothing" from "curl
    /// printed the marker", and a refused connection is an expected outcome
    /// there, not an execution error.
    pub async fn exec(
        &self,
        name: &str,
        namespace: &str,
        command: &[String],
    ) -> Result<ExecOutput> {
        let mut kubectl_args = vec![
            "exec".to_string(),
            "-n".to_string(),
            namespace.to_string(),
            name.to_string(),
            "--".to_string(),
        ];
        kubectl_args.extend(command.iter().cloned());

        debug!("Executing in pod {namespace}/{name}: {command:?}");

        let output = tokio::process::Command::new("kubectl")
            .args(&kubectl_args)
            .output()
            .await
            .context("Failed to execute kubectl")?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if !output.status.success() {
            warn!(
                "Command in pod {namespace}/{name} exited with {:?}",
                output.status.code()
            );
        }

        Ok(ExecOutput {
            stdout,
            success: output.status.success(),
        })
    }
}

/// Captured result of an in-pod command
#[derive(Clone, Debug)]
pub struct ExecOutput {
    pub stdout: String,
    pub success: bool,
}

/// Scenario pod configuration
#[derive(Clone, Debug)]
pub struct PodConfig {
    pub name: String,
    pub namespace: String,
    pub image: String,
    pub labels: BTreeMap<String, String>,
    pub args: Vec<String>,
}

impl PodConfig {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            image: "kuryr/demo".to_string(),
            labels: BTreeMap::new(),
            // Keep the container alive for the scenario's lifetime.
            args: vec!["sleep".to_string(), "3600".to_string()],
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pod_config_builder() {
        let config = PodConfig::new("probe-pod", "default")
            .with_image("alpine:latest")
            .with_label("app", "pod-label");

        assert_eq!(config.name, "probe-pod");
        assert_eq!(config.image, "alpine:latest");
        assert_eq!(config.labels.get("app").map(|s| s.as_str()), Some("pod-label"));
        assert_eq!(config.args, vec!["sleep", "3600"]);
    }

    #[test]
    fn test_exec_output_carries_failure() {
        let out = ExecOutput {
            stdout: String::new(),
            success: false,
        };
        assert!(!out.success);
        assert!(out.stdout.is_empty());
    }
}
