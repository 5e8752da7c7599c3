//! Service management for scenario execution
//!
//! Creates ClusterIP and LoadBalancer services in front of scenario pods and
//! resolves the address a probe should target.

use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::api::{Api, DeleteParams, PostParams};
use std::collections::BTreeMap;
use tracing::info;

use super::K8sClient;
use crate::error::CheckError;
use crate::utils::wait::{poll_until, PollOptions};

pub const CLUSTER_IP: &str = "ClusterIP";
pub const LOAD_BALANCER: &str = "LoadBalancer";

/// Service manager for scenario operations
pub struct ServiceManager {
    client: K8sClient,
}

impl ServiceManager {
    pub fn new(client: K8sClient) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<Service> {
        Api::namespaced(self.client.client().clone(), namespace)
    }

    /// Create a service selecting the given pod labels
    pub async fn create_service(&self, config: &ServiceConfig) -> Result<Service> {
        let service = Service {
            metadata: kube::core::ObjectMeta {
                name: Some(config.name.clone()),
                namespace: Some(config.namespace.clone()),
                ..Default::default()
            },
            spec: Some(ServiceSpec {
                type_: Some(config.spec_type.clone()),
                selector: Some(config.selector.clone()),
                ports: Some(vec![ServicePort {
                    protocol: Some(config.protocol.clone()),
                    port: config.port,
                    target_port: Some(IntOrString::Int(config.target_port)),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        };

        let created = self
            .api(&config.namespace)
            .create(&PostParams::default(), &service)
            .await
            .with_context(|| format!("Failed to create service {}", config.name))?;

        info!(
            "Created {} service {}/{}",
            config.spec_type, config.namespace, config.name
        );
        Ok(created)
    }

    /// Delete service
    pub async fn delete_service(&self, name: &str, namespace: &str) -> Result<()> {
        self.api(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .with_context(|| format!("Failed to delete service {namespace}/{name}"))?;
        Ok(())
    }

    /// Resolve the address a probe should target for a service.
    ///
    /// ClusterIP services answer immediately from `spec.clusterIP`.
    /// LoadBalancer services are re-read on `interval_secs` until an ingress
    /// IP is assigned, bounded by `timeout_secs`. Any other type is not
    /// supported.
    pub async fn get_service_ip(
        &self,
        name: &str,
        spec_type: &str,
        namespace: &str,
        interval_secs: u64,
        timeout_secs: u64,
    ) -> Result<String> {
        let api = self.api(namespace);

        match spec_type {
            CLUSTER_IP => {
                let service = api
                    .get(name)
                    .await
                    .with_context(|| format!("Failed to read service {namespace}/{name}"))?;
                extract_service_address(&service, spec_type)?.ok_or_else(|| {
                    CheckError::assertion(format!("service {namespace}/{name} has no cluster IP"))
                        .into()
                })
            }
            LOAD_BALANCER => {
                let what = format!("service {namespace}/{name} load balancer ingress");
                poll_until(&what, PollOptions::new(interval_secs, timeout_secs), || {
                    let api = api.clone();
                    async move {
                        let service = api.get(name).await.context("Failed to read service")?;
                        extract_service_address(&service, LOAD_BALANCER)
                    }
                })
                .await
            }
            other => Err(CheckError::NotImplemented(format!(
                "service type {other} is not supported"
            ))
            .into()),
        }
    }
}

/// Pull the probe address out of a service object for the given type.
///
/// `Ok(None)` means "not assigned yet" and only occurs for LoadBalancer
/// services still waiting on an ingress entry.
pub fn extract_service_address(service: &Service, spec_type: &str) -> Result<Option<String>> {
    match spec_type {
        CLUSTER_IP => Ok(service
            .spec
            .as_ref()
            .and_then(|spec| spec.cluster_ip.clone())),
        LOAD_BALANCER => Ok(service
            .status
            .as_ref()
            .and_then(|status| status.load_balancer.as_ref())
            .and_then(|lb| lb.ingress.as_ref())
            .and_then(|ingress| ingress.first())
            .and_then(|entry| entry.ip.clone())),
        other => Err(CheckError::NotImplemented(format!(
            "service type {other} is not supported"
        ))
        .into()),
    }
}

/// Scenario service configuration
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub name: String,
    pub namespace: String,
    pub selector: BTreeMap<String, String>,
    pub spec_type: String,
    pub protocol: String,
    pub port: i32,
    pub target_port: i32,
}

impl ServiceConfig {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        selector: BTreeMap<String, String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            selector,
            spec_type: CLUSTER_IP.to_string(),
            protocol: "TCP".to_string(),
            port: 80,
            target_port: 8080,
        }
    }

    pub fn load_balancer(mut self) -> Self {
        self.spec_type = LOAD_BALANCER.to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{
        LoadBalancerIngress, LoadBalancerStatus, ServiceStatus,
    };

    fn cluster_ip_service(ip: Option<&str>) -> Service {
        Service {
            spec: Some(ServiceSpec {
                cluster_ip: ip.map(|s| s.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn lb_service(ingress_ip: Option<&str>) -> Service {
        let ingress = ingress_ip.map(|ip| {
            vec![LoadBalancerIngress {
                ip: Some(ip.to_string()),
                ..Default::default()
            }]
        });
        Service {
            status: Some(ServiceStatus {
                load_balancer: Some(LoadBalancerStatus { ingress }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_cluster_ip_is_immediate() {
        let service = cluster_ip_service(Some("10.0.0.5"));
        let addr = extract_service_address(&service, CLUSTER_IP).unwrap();
        assert_eq!(addr.as_deref(), Some("10.0.0.5"));
    }

    #[test]
    fn test_load_balancer_waits_for_ingress() {
        let pending = lb_service(None);
        assert_eq!(extract_service_address(&pending, LOAD_BALANCER).unwrap(), None);

        let ready = lb_service(Some("172.24.4.10"));
        assert_eq!(
            extract_service_address(&ready, LOAD_BALANCER).unwrap().as_deref(),
            Some("172.24.4.10")
        );
    }

    #[test]
    fn test_unknown_type_is_not_implemented() {
        let service = cluster_ip_service(Some("10.0.0.5"));
        let err = extract_service_address(&service, "NodePort").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CheckError>(),
            Some(CheckError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_service_config_defaults() {
        let mut selector = BTreeMap::new();
        selector.insert("app".to_string(), "pod-label".to_string());

        let config = ServiceConfig::new("svc", "default", selector.clone());
        assert_eq!(config.spec_type, CLUSTER_IP);
        assert_eq!(config.port, 80);
        assert_eq!(config.target_port, 8080);

        let lb = ServiceConfig::new("svc", "default", selector).load_balancer();
        assert_eq!(lb.spec_type, LOAD_BALANCER);
    }
}
