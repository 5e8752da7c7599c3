//! Network CRD read access
//!
//! The integration layer records the OpenStack resources it derives for a
//! namespace in a cluster-scoped `NamespaceNet` custom resource named
//! `ns-<namespace>`. This module only reads it; the resource is owned by the
//! system under test.

use anyhow::{Context, Result};
use kube::api::Api;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::K8sClient;

/// OpenStack resource ids derived for a namespace
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(group = "openstack.org", version = "v1", kind = "NamespaceNet")]
#[serde(rename_all = "camelCase")]
pub struct NamespaceNetSpec {
    pub subnet_id: String,
    pub net_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sg_id: Option<String>,
}

/// Read-only access to `NamespaceNet` resources
pub struct NetCrdReader {
    client: K8sClient,
}

impl NetCrdReader {
    pub fn new(client: K8sClient) -> Self {
        Self { client }
    }

    fn api(&self) -> Api<NamespaceNet> {
        Api::all(self.client.client().clone())
    }

    /// Fetch the CRD; a 404 stays distinguishable in the error chain so
    /// deletion polls can tell "gone" from "broken".
    pub async fn get(&self, name: &str) -> Result<NamespaceNet> {
        self.api()
            .get(name)
            .await
            .with_context(|| format!("Failed to read NamespaceNet {name}"))
    }

    /// True once the CRD no longer exists
    pub async fn is_gone(&self, name: &str) -> Result<bool> {
        match self.api().get(name).await {
            Ok(_) => Ok(false),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(true),
            Err(e) => Err(e).context("Failed to check NamespaceNet existence"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_deserializes_camel_case() {
        let raw = r#"{"subnetId": "sub-1", "netId": "net-1", "sgId": "sg-1"}"#;
        let spec: NamespaceNetSpec = serde_json::from_str(raw).unwrap();
        assert_eq!(spec.subnet_id, "sub-1");
        assert_eq!(spec.net_id, "net-1");
        assert_eq!(spec.sg_id.as_deref(), Some("sg-1"));
    }

    #[test]
    fn test_sg_id_is_optional() {
        let raw = r#"{"subnetId": "sub-1", "netId": "net-1"}"#;
        let spec: NamespaceNetSpec = serde_json::from_str(raw).unwrap();
        assert!(spec.sg_id.is_none());
    }
}
