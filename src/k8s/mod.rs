//! Kubernetes API client module
//!
//! Provides the Kubernetes resource helpers the scenarios drive: namespaces,
//! pods, services, and the network CRD written by the integration layer.

mod client;
mod netcrd;
mod pod;
mod service;

pub use client::K8sClient;
pub use netcrd::{NamespaceNet, NamespaceNetSpec, NetCrdReader};
pub use pod::{ExecOutput, PodConfig, PodManager};
pub use service::{extract_service_address, ServiceConfig, ServiceManager, CLUSTER_IP, LOAD_BALANCER};

/// True when the error chain bottoms out in a Kubernetes 404.
pub fn is_not_found(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<kube::Error>(),
        Some(kube::Error::Api(e)) if e.code == 404
    )
}
