//! OpenStack API access
//!
//! Read-mostly lookups against the networking and identity services, plus
//! the floating-IP lifecycle. The scenarios treat these listings as the
//! source of truth for what the integration layer provisioned.

mod client;
mod types;

pub use client::OpenStackClient;
pub use types::{
    match_pod_port, FloatingIp, Network, Port, Project, SecurityGroup, Subnet,
};
