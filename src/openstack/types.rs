//! Neutron and Keystone resource types
//!
//! Only the fields the scenarios read are modeled; everything else in the
//! API responses is ignored.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Neutron port
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub network_id: String,
}

/// Neutron subnet
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Subnet {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub network_id: String,
    #[serde(default)]
    pub cidr: Option<String>,
}

/// Neutron security group
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SecurityGroup {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Neutron network
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Network {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Keystone project
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

/// Neutron floating IP
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FloatingIp {
    pub id: String,
    #[serde(default)]
    pub floating_ip_address: Option<String>,
    #[serde(default)]
    pub port_id: Option<String>,
}

// List envelopes as the APIs return them.

#[derive(Debug, Deserialize)]
pub(crate) struct PortList {
    pub ports: Vec<Port>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubnetList {
    pub subnets: Vec<Subnet>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SecurityGroupList {
    pub security_groups: Vec<SecurityGroup>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NetworkList {
    pub networks: Vec<Network>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectList {
    pub projects: Vec<Project>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FloatingIpEnvelope {
    pub floatingip: FloatingIp,
}

/// Match a pod to its Neutron port by name.
///
/// Ports are named `<namespace>/<pod>`; older deployments used the bare pod
/// name. The qualified form wins outright. Bare names cannot be told apart
/// when the same pod name exists in several namespaces, so the legacy match
/// is only trusted when exactly one candidate exists.
pub fn match_pod_port<'a>(ports: &'a [Port], pod_name: &str, namespace: &str) -> Option<&'a Port> {
    let qualified = format!("{namespace}/{pod_name}");
    let mut legacy = Vec::new();

    for port in ports {
        if port.name == qualified {
            return Some(port);
        }
        if port.name == pod_name {
            legacy.push(port);
        }
    }

    match legacy.len() {
        1 => Some(legacy[0]),
        0 => None,
        n => {
            debug!("{n} ports named {pod_name}; cannot pick one without a namespace");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(id: &str, name: &str) -> Port {
        Port {
            id: id.to_string(),
            name: name.to_string(),
            network_id: "net".to_string(),
        }
    }

    #[test]
    fn test_qualified_name_wins_over_legacy() {
        let ports = vec![port("p1", "demo"), port("p2", "ns-a/demo")];
        let found = match_pod_port(&ports, "demo", "ns-a").unwrap();
        assert_eq!(found.id, "p2");
    }

    #[test]
    fn test_single_legacy_candidate_is_accepted() {
        let ports = vec![port("p1", "demo"), port("p2", "other")];
        let found = match_pod_port(&ports, "demo", "ns-a").unwrap();
        assert_eq!(found.id, "p1");
    }

    #[test]
    fn test_ambiguous_legacy_candidates_yield_none() {
        let ports = vec![port("p1", "demo"), port("p2", "demo")];
        assert!(match_pod_port(&ports, "demo", "ns-a").is_none());
    }

    #[test]
    fn test_no_candidates_yield_none() {
        let ports = vec![port("p1", "other")];
        assert!(match_pod_port(&ports, "demo", "ns-a").is_none());
    }

    #[test]
    fn test_port_list_deserializes() {
        let raw = r#"{"ports": [{"id": "p1", "name": "ns-a/demo", "network_id": "n1",
                       "admin_state_up": true}]}"#;
        let list: PortList = serde_json::from_str(raw).unwrap();
        assert_eq!(list.ports.len(), 1);
        assert_eq!(list.ports[0].name, "ns-a/demo");
    }

    #[test]
    fn test_subnet_list_tolerates_missing_fields() {
        let raw = r#"{"subnets": [{"id": "s1"}]}"#;
        let list: SubnetList = serde_json::from_str(raw).unwrap();
        assert_eq!(list.subnets[0].name, "");
        assert!(list.subnets[0].cidr.is_none());
    }

    #[test]
    fn test_floating_ip_envelope_deserializes() {
        let raw = r#"{"floatingip": {"id": "f1", "floating_ip_address": "172.24.4.9",
                       "port_id": null}}"#;
        let env: FloatingIpEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(env.floatingip.id, "f1");
        assert_eq!(env.floatingip.floating_ip_address.as_deref(), Some("172.24.4.9"));
        assert!(env.floatingip.port_id.is_none());
    }
}
