//! Scenario context and cleanup registry
//!
//! Everything a scenario touches goes through one context: the API clients,
//! the configured timeouts, and a registry of created resources that is
//! released in reverse order when the scenario ends, pass or fail.

#![allow(dead_code)]

use anyhow::Result;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::CheckError;
use crate::k8s::{
    is_not_found, K8sClient, NetCrdReader, PodConfig, PodManager, ServiceConfig, ServiceManager,
};
use crate::openstack::{FloatingIp, OpenStackClient};
use crate::probe::ReadinessProbe;
use crate::utils::names::rand_name;

/// A resource to delete at scenario end
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CleanupTask {
    Pod { name: String, namespace: String },
    Service { name: String, namespace: String },
    Namespace { name: String },
    FloatingIp { id: String },
}

/// Deletion registry, released in reverse registration order
#[derive(Default)]
pub struct CleanupRegistry {
    tasks: Vec<CleanupTask>,
}

impl CleanupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, task: CleanupTask) {
        debug!("Registered cleanup: {task:?}");
        self.tasks.push(task);
    }

    /// Take all tasks, most recently registered first
    pub fn drain(&mut self) -> Vec<CleanupTask> {
        let mut tasks = std::mem::take(&mut self.tasks);
        tasks.reverse();
        tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Label set shared by all scenario pods and service selectors
pub fn pod_labels() -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert("app".to_string(), "pod-label".to_string());
    labels
}

/// Clients, configuration, and cleanup for one scenario run
pub struct ScenarioContext {
    pub k8s: K8sClient,
    pub pods: PodManager,
    pub services: ServiceManager,
    pub net_crds: NetCrdReader,
    pub openstack: OpenStackClient,
    pub probe: ReadinessProbe,
    pub config: AppConfig,
    cleanup: CleanupRegistry,
}

impl ScenarioContext {
    /// Connect to both APIs and build the helpers
    pub async fn connect(config: AppConfig) -> Result<Self> {
        let k8s = K8sClient::new().await?;
        let openstack = OpenStackClient::connect(&config.openstack).await?;
        let probe = ReadinessProbe::new(
            std::time::Duration::from_secs(config.timeouts.probe_request_secs),
            std::time::Duration::from_secs(config.timeouts.probe_retry_secs),
        )?;

        Ok(Self {
            pods: PodManager::new(k8s.clone()),
            services: ServiceManager::new(k8s.clone()),
            net_crds: NetCrdReader::new(k8s.clone()),
            k8s,
            openstack,
            probe,
            config,
            cleanup: CleanupRegistry::new(),
        })
    }

    pub fn register_cleanup(&mut self, task: CleanupTask) {
        self.cleanup.register(task);
    }

    /// Create a uniquely named namespace and register its deletion
    pub async fn create_namespace(&mut self) -> Result<String> {
        let name = self.k8s.create_namespace("netcheck-ns").await?;
        self.cleanup.register(CleanupTask::Namespace { name: name.clone() });
        Ok(name)
    }

    /// Create a labeled scenario pod and wait for it to run.
    ///
    /// Pods in scenario-created namespaces vanish with the namespace;
    /// `register` is for pods placed in namespaces the scenario does not
    /// own (e.g. `default`).
    pub async fn create_scenario_pod(&mut self, namespace: &str, register: bool) -> Result<String> {
        let name = rand_name("netcheck-pod");
        let mut config =
            PodConfig::new(name.as_str(), namespace).with_image(self.config.pod_image.as_str());
        for (key, value) in pod_labels() {
            config = config.with_label(key, value);
        }

        self.pods
            .create_pod(&config, self.config.timeouts.pod_ready_secs)
            .await?;

        if register {
            self.cleanup.register(CleanupTask::Pod {
                name: name.clone(),
                namespace: namespace.to_string(),
            });
        }
        Ok(name)
    }

    /// Create a service selecting the scenario pod labels; deletion is
    /// always registered.
    pub async fn create_scenario_service(
        &mut self,
        namespace: &str,
        load_balancer: bool,
    ) -> Result<String> {
        let name = rand_name("netcheck-svc");
        let mut config = ServiceConfig::new(name.as_str(), namespace, pod_labels());
        if load_balancer {
            config = config.load_balancer();
        }

        self.services.create_service(&config).await?;
        self.cleanup.register(CleanupTask::Service {
            name: name.clone(),
            namespace: namespace.to_string(),
        });
        Ok(name)
    }

    /// Resolve a service address with the configured intervals
    pub async fn service_address(
        &self,
        name: &str,
        spec_type: &str,
        namespace: &str,
    ) -> Result<String> {
        self.services
            .get_service_ip(
                name,
                spec_type,
                namespace,
                self.config.timeouts.service_ip_interval_secs,
                self.config.timeouts.lb_build_secs,
            )
            .await
    }

    /// Allocate a floating IP for a pod's port on the configured public
    /// network and register its release.
    pub async fn assign_fip_to_pod(&mut self, pod_name: &str, namespace: &str) -> Result<FloatingIp> {
        let network_id = self
            .config
            .public_network_id
            .clone()
            .ok_or_else(|| CheckError::assertion("public_network_id is not configured"))?;

        let port = self
            .openstack
            .find_pod_port(pod_name, namespace)
            .await?
            .ok_or_else(|| {
                CheckError::assertion(format!("no Neutron port found for pod {namespace}/{pod_name}"))
            })?;

        let project_id = self
            .openstack
            .find_project_id(&self.config.project_name)
            .await?;

        let fip = self
            .openstack
            .create_floating_ip(&network_id, &port.id, project_id.as_deref())
            .await?;

        self.cleanup.register(CleanupTask::FloatingIp {
            id: fip.id.clone(),
        });
        Ok(fip)
    }

    /// Release everything the scenario registered, most recent first.
    /// Individual failures are logged and do not stop the sweep; resources
    /// already gone (namespace deletion cascades) are fine.
    pub async fn teardown(&mut self) {
        let tasks = self.cleanup.drain();
        if tasks.is_empty() {
            return;
        }

        info!("Releasing {} scenario resources", tasks.len());
        for task in tasks {
            let result = match &task {
                CleanupTask::Pod { name, namespace } => {
                    self.pods.delete_pod(name, namespace).await
                }
                CleanupTask::Service { name, namespace } => {
                    self.services.delete_service(name, namespace).await
                }
                CleanupTask::Namespace { name } => self.k8s.delete_namespace(name).await,
                CleanupTask::FloatingIp { id } => self.openstack.delete_floating_ip(id).await,
            };

            if let Err(e) = result {
                if is_not_found(&e) {
                    debug!("Cleanup target already gone: {task:?}");
                } else {
                    warn!("Cleanup of {task:?} failed: {e:#}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_drains_in_reverse_order() {
        let mut registry = CleanupRegistry::new();
        registry.register(CleanupTask::Namespace {
            name: "ns-1".to_string(),
        });
        registry.register(CleanupTask::Pod {
            name: "pod-1".to_string(),
            namespace: "ns-1".to_string(),
        });
        registry.register(CleanupTask::FloatingIp {
            id: "fip-1".to_string(),
        });

        let tasks = registry.drain();
        assert_eq!(tasks.len(), 3);
        assert_eq!(
            tasks[0],
            CleanupTask::FloatingIp {
                id: "fip-1".to_string()
            }
        );
        assert_eq!(
            tasks[2],
            CleanupTask::Namespace {
                name: "ns-1".to_string()
            }
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_drain_is_single_shot() {
        let mut registry = CleanupRegistry::new();
        registry.register(CleanupTask::FloatingIp {
            id: "fip-1".to_string(),
        });
        assert_eq!(registry.drain().len(), 1);
        assert!(registry.drain().is_empty());
    }

    #[test]
    fn test_pod_labels_match_service_selector() {
        let labels = pod_labels();
        assert_eq!(labels.get("app").map(|s| s.as_str()), Some("pod-label"));
    }
}
