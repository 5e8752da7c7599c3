//! Namespace lifecycle scenario
//!
//! A new namespace must provision a Neutron subnet and a network CRD whose
//! ids agree, carry live traffic through a LoadBalancer service, and take
//! all of it away again on deletion.

use anyhow::Result;
use std::time::Duration;
use tracing::info;

use super::context::ScenarioContext;
use super::{assert_contains, assert_in, assert_not_in};
use crate::error::CheckError;
use crate::k8s::{NamespaceNet, LOAD_BALANCER};
use crate::probe;
use crate::utils::names::{namespace_net_name, namespace_subnet_name};
use crate::utils::wait::{poll_until, PollOptions};

pub struct NamespaceLifecycleScenario;

impl NamespaceLifecycleScenario {
    pub async fn run(ctx: &mut ScenarioContext) -> Result<()> {
        // Resources are created
        let namespace = ctx.create_namespace().await?;

        let existing = ctx.k8s.list_namespaces().await?;
        assert_in(&existing, &namespace, "cluster namespaces")?;

        let subnet_name = namespace_subnet_name(&namespace);
        let crd_name = namespace_net_name(&namespace);

        let subnets = ctx.openstack.list_subnets().await?;
        let seen_names: Vec<String> = subnets.iter().map(|s| s.name.clone()).collect();
        assert_in(&seen_names, &subnet_name, "Neutron subnet names")?;

        let subnet_ids: Vec<String> = subnets
            .iter()
            .filter(|s| s.name == subnet_name)
            .map(|s| s.id.clone())
            .collect();
        let net_ids: Vec<String> = subnets
            .iter()
            .filter(|s| s.name == subnet_name)
            .map(|s| s.network_id.clone())
            .collect();

        let net_crd = ctx.net_crds.get(&crd_name).await?;
        let crd_meta_name = net_crd.metadata.name.clone().unwrap_or_default();
        assert_contains(&crd_meta_name, &crd_name, "network CRD name")?;
        assert_in(&subnet_ids, &net_crd.spec.subnet_id, "listed subnet ids")?;
        assert_in(&net_ids, &net_crd.spec.net_id, "listed network ids")?;

        // Namespace pod connectivity
        let pod_name = ctx.create_scenario_pod(&namespace, false).await?;
        let svc_name = ctx.create_scenario_service(&namespace, true).await?;
        let svc_ip = ctx
            .service_address(&svc_name, LOAD_BALANCER, &namespace)
            .await?;

        let lb_timeout = Duration::from_secs(ctx.config.timeouts.lb_build_secs);
        ctx.probe.wait_service_status(&svc_ip, lb_timeout).await?;

        let probe_addr = if ctx.config.probe_via_floating_ip {
            let fip = ctx.assign_fip_to_pod(&pod_name, &namespace).await?;
            let addr = fip.floating_ip_address.ok_or_else(|| {
                CheckError::assertion(format!("floating IP {} has no address", fip.id))
            })?;
            // The floating IP maps straight to the pod port.
            format!("{addr}:8080")
        } else {
            svc_ip.clone()
        };

        probe::curl_from_host(&probe_addr).await?;
        info!("Traffic passed through {probe_addr}");

        // Resources are deleted
        delete_namespace_resources(ctx, &namespace, &net_crd, &subnet_name).await
    }
}

/// Delete a namespace and verify everything derived from it disappears:
/// the network CRD (polled until not-found), the namespace itself, the
/// subnet name, and the recorded security group.
pub(crate) async fn delete_namespace_resources(
    ctx: &ScenarioContext,
    namespace: &str,
    net_crd: &NamespaceNet,
    subnet_name: &str,
) -> Result<()> {
    ctx.k8s.delete_namespace(namespace).await?;

    let crd_name = net_crd
        .metadata
        .name
        .clone()
        .unwrap_or_else(|| namespace_net_name(namespace));

    let what = format!("network CRD {crd_name} to disappear");
    let opts = PollOptions::new(1, ctx.config.timeouts.resource_delete_secs);
    poll_until(&what, opts, || {
        let reader = &ctx.net_crds;
        let name = crd_name.clone();
        async move { Ok(reader.is_gone(&name).await?.then_some(())) }
    })
    .await?;

    let existing = ctx.k8s.list_namespaces().await?;
    assert_not_in(&existing, &namespace.to_string(), "cluster namespaces")?;

    let subnets = ctx.openstack.list_subnets().await?;
    let seen_names: Vec<String> = subnets.iter().map(|s| s.name.clone()).collect();
    assert_not_in(&seen_names, &subnet_name.to_string(), "Neutron subnet names")?;

    if let Some(sg_id) = &net_crd.spec.sg_id {
        let groups = ctx.openstack.list_security_groups().await?;
        let seen_ids: Vec<String> = groups.iter().map(|g| g.id.clone()).collect();
        assert_not_in(&seen_ids, sg_id, "security group ids")?;
    }

    info!("Namespace {namespace} and its derived resources are gone");
    Ok(())
}
