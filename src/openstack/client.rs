//! OpenStack REST client
//!
//! Authenticates against Keystone v3 with password credentials, discovers
//! the networking and identity endpoints from the service catalog, and
//! exposes the listings and floating-IP operations the scenarios need.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use super::types::{
    FloatingIp, FloatingIpEnvelope, Network, NetworkList, Port, PortList, Project, ProjectList,
    SecurityGroup, SecurityGroupList, Subnet, SubnetList,
};
use crate::config::OpenStackConfig;

const TOKEN_HEADER: &str = "X-Subject-Token";
const AUTH_HEADER: &str = "X-Auth-Token";

/// Authenticated OpenStack API client
#[derive(Clone)]
pub struct OpenStackClient {
    http: Client,
    token: String,
    network_url: String,
    identity_url: String,
}

impl OpenStackClient {
    /// Authenticate and resolve service endpoints
    pub async fn connect(config: &OpenStackConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let auth_url = config.auth_url.trim_end_matches('/');
        let payload = json!({
            "auth": {
                "identity": {
                    "methods": ["password"],
                    "password": {
                        "user": {
                            "name": config.username,
                            "domain": {"name": config.user_domain},
                            "password": config.password,
                        }
                    }
                },
                "scope": {
                    "project": {
                        "name": config.auth_project,
                        "domain": {"name": config.project_domain},
                    }
                }
            }
        });

        let response = http
            .post(format!("{auth_url}/auth/tokens"))
            .json(&payload)
            .send()
            .await
            .context("Keystone authentication request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Keystone authentication failed: {status}");
        }

        let token = response
            .headers()
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .context("Keystone response carried no subject token")?;

        let body: TokenResponse = response
            .json()
            .await
            .context("Failed to parse Keystone token response")?;

        let network_url = match &config.network_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => catalog_endpoint(&body.token.catalog, "network")
                .context("No public network endpoint in the service catalog")?,
        };

        let identity_url = match &config.identity_url {
            Some(url) => normalize_identity_url(url),
            None => catalog_endpoint(&body.token.catalog, "identity")
                .map(|url| normalize_identity_url(&url))
                .unwrap_or_else(|| normalize_identity_url(auth_url)),
        };

        info!("Authenticated against {auth_url}, network endpoint {network_url}");

        Ok(Self {
            http,
            token,
            network_url,
            identity_url,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        debug!("GET {url}");
        let response = self
            .http
            .get(&url)
            .header(AUTH_HEADER, &self.token)
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("GET {url} returned {status}");
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {url}"))
    }

    /// List all Neutron ports visible to the scoped project
    pub async fn list_ports(&self) -> Result<Vec<Port>> {
        let list: PortList = self
            .get_json(format!("{}/v2.0/ports", self.network_url))
            .await?;
        Ok(list.ports)
    }

    /// List all Neutron subnets
    pub async fn list_subnets(&self) -> Result<Vec<Subnet>> {
        let list: SubnetList = self
            .get_json(format!("{}/v2.0/subnets", self.network_url))
            .await?;
        Ok(list.subnets)
    }

    /// List all Neutron security groups
    pub async fn list_security_groups(&self) -> Result<Vec<SecurityGroup>> {
        let list: SecurityGroupList = self
            .get_json(format!("{}/v2.0/security-groups", self.network_url))
            .await?;
        Ok(list.security_groups)
    }

    /// List all Neutron networks
    pub async fn list_networks(&self) -> Result<Vec<Network>> {
        let list: NetworkList = self
            .get_json(format!("{}/v2.0/networks", self.network_url))
            .await?;
        Ok(list.networks)
    }

    /// List Keystone projects (requires admin credentials)
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let list: ProjectList = self
            .get_json(format!("{}/v3/projects", self.identity_url))
            .await?;
        Ok(list.projects)
    }

    /// Find the port backing a pod, preferring the namespaced port name
    pub async fn find_pod_port(&self, pod_name: &str, namespace: &str) -> Result<Option<Port>> {
        let ports = self.list_ports().await?;
        Ok(super::match_pod_port(&ports, pod_name, namespace).cloned())
    }

    /// Find a project id by exact name
    pub async fn find_project_id(&self, name: &str) -> Result<Option<String>> {
        let projects = self.list_projects().await?;
        Ok(projects.into_iter().find(|p| p.name == name).map(|p| p.id))
    }

    /// Allocate a floating IP on `floating_network_id`, bound to `port_id`
    pub async fn create_floating_ip(
        &self,
        floating_network_id: &str,
        port_id: &str,
        project_id: Option<&str>,
    ) -> Result<FloatingIp> {
        let mut body = json!({
            "floatingip": {
                "floating_network_id": floating_network_id,
                "port_id": port_id,
            }
        });
        if let Some(project) = project_id {
            body["floatingip"]["tenant_id"] = json!(project);
        }

        let url = format!("{}/v2.0/floatingips", self.network_url);
        let response = self
            .http
            .post(&url)
            .header(AUTH_HEADER, &self.token)
            .json(&body)
            .send()
            .await
            .context("Floating IP create request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("POST {url} returned {status}");
        }

        let envelope: FloatingIpEnvelope = response
            .json()
            .await
            .context("Failed to parse floating IP response")?;

        info!(
            "Created floating IP {} on port {port_id}",
            envelope.floatingip.id
        );
        Ok(envelope.floatingip)
    }

    /// Release a floating IP
    pub async fn delete_floating_ip(&self, id: &str) -> Result<()> {
        let url = format!("{}/v2.0/floatingips/{id}", self.network_url);
        let response = self
            .http
            .delete(&url)
            .header(AUTH_HEADER, &self.token)
            .send()
            .await
            .context("Floating IP delete request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("DELETE {url} returned {status}");
        }

        info!("Deleted floating IP {id}");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: TokenBody,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    #[serde(default)]
    catalog: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    #[serde(rename = "type")]
    service_type: String,
    #[serde(default)]
    endpoints: Vec<CatalogEndpoint>,
}

#[derive(Debug, Deserialize)]
struct CatalogEndpoint {
    #[serde(default)]
    interface: String,
    url: String,
}

/// Public endpoint for a service type from the token's catalog
fn catalog_endpoint(catalog: &[CatalogEntry], service_type: &str) -> Option<String> {
    catalog
        .iter()
        .filter(|entry| entry.service_type == service_type)
        .flat_map(|entry| entry.endpoints.iter())
        .find(|endpoint| endpoint.interface == "public")
        .map(|endpoint| endpoint.url.trim_end_matches('/').to_string())
}

/// Identity endpoints are stored without the version segment; project
/// listings append `/v3` themselves.
fn normalize_identity_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    trimmed.trim_end_matches("/v3").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(service_type: &str, interface: &str, url: &str) -> CatalogEntry {
        CatalogEntry {
            service_type: service_type.to_string(),
            endpoints: vec![CatalogEndpoint {
                interface: interface.to_string(),
                url: url.to_string(),
            }],
        }
    }

    #[test]
    fn test_catalog_prefers_public_interface() {
        let catalog = vec![
            entry("network", "internal", "http://internal:9696"),
            entry("network", "public", "http://controller:9696/"),
        ];
        assert_eq!(
            catalog_endpoint(&catalog, "network").as_deref(),
            Some("http://controller:9696")
        );
    }

    #[test]
    fn test_catalog_misses_yield_none() {
        let catalog = vec![entry("identity", "public", "http://controller:5000")];
        assert!(catalog_endpoint(&catalog, "network").is_none());
    }

    #[test]
    fn test_identity_url_normalization() {
        assert_eq!(
            normalize_identity_url("http://controller:5000/v3/"),
            "http://controller:5000"
        );
        assert_eq!(
            normalize_identity_url("http://controller:5000"),
            "http://controller:5000"
        );
    }

    #[test]
    fn test_token_response_parses_catalog() {
        let raw = r#"{
            "token": {
                "catalog": [
                    {"type": "network", "endpoints": [
                        {"interface": "public", "url": "http://controller:9696"}
                    ]},
                    {"type": "identity", "endpoints": [
                        {"interface": "public", "url": "http://controller:5000/v3"}
                    ]}
                ]
            }
        }"#;
        let parsed: TokenResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.token.catalog.len(), 2);
        assert_eq!(
            catalog_endpoint(&parsed.token.catalog, "identity").as_deref(),
            Some("http://controller:5000/v3")
        );
    }
}
