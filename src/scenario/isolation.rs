//! Namespace isolation scenarios
//!
//! Two fresh namespaces get their own security groups; traffic between them
//! must be blocked while traffic involving the default namespace passes.
//! One scenario probes pods directly, the other goes through ClusterIP
//! services.

use anyhow::Result;
use futures::future::try_join;
use std::time::Duration;
use tracing::info;

use super::context::ScenarioContext;
use super::namespace::delete_namespace_resources;
use super::{assert_contains, assert_in, assert_not_contains};
use crate::error::CheckError;
use crate::k8s::{NamespaceNet, CLUSTER_IP};
use crate::probe::{self, LIVENESS_MARKER};
use crate::utils::names::{namespace_net_name, namespace_subnet_name};

/// Two namespaces with their derived resources verified
struct IsolatedPair {
    ns1: String,
    ns2: String,
    subnet_ns1: String,
    subnet_ns2: String,
    crd_ns1: NamespaceNet,
    crd_ns2: NamespaceNet,
}

/// Create two namespaces and assert their network CRDs and security groups
/// were provisioned.
async fn setup_isolated_namespaces(ctx: &mut ScenarioContext) -> Result<IsolatedPair> {
    let ns1 = ctx.create_namespace().await?;
    let ns2 = ctx.create_namespace().await?;

    let existing = ctx.k8s.list_namespaces().await?;
    assert_in(&existing, &ns1, "cluster namespaces")?;
    assert_in(&existing, &ns2, "cluster namespaces")?;
    assert_in(&existing, &"default".to_string(), "cluster namespaces")?;

    let crd_ns1_name = namespace_net_name(&ns1);
    let crd_ns2_name = namespace_net_name(&ns2);

    let crd_ns1 = ctx.net_crds.get(&crd_ns1_name).await?;
    let crd_ns2 = ctx.net_crds.get(&crd_ns2_name).await?;

    let crd_ns1_meta = crd_ns1.metadata.name.clone().unwrap_or_default();
    let crd_ns2_meta = crd_ns2.metadata.name.clone().unwrap_or_default();
    assert_contains(&crd_ns1_meta, &crd_ns1_name, "network CRD name")?;
    assert_contains(&crd_ns2_meta, &crd_ns2_name, "network CRD name")?;

    let groups = ctx.openstack.list_security_groups().await?;
    let seen_ids: Vec<String> = groups.iter().map(|g| g.id.clone()).collect();

    for (crd, name) in [(&crd_ns1, &crd_ns1_name), (&crd_ns2, &crd_ns2_name)] {
        let sg_id = crd.spec.sg_id.as_ref().ok_or_else(|| {
            CheckError::assertion(format!("network CRD {name} records no security group"))
        })?;
        assert_in(&seen_ids, sg_id, "security group ids")?;
    }

    Ok(IsolatedPair {
        subnet_ns1: namespace_subnet_name(&ns1),
        subnet_ns2: namespace_subnet_name(&ns2),
        ns1,
        ns2,
        crd_ns1,
        crd_ns2,
    })
}

/// Run the asymmetric reachability checks. The ns1 pod must reach
/// `reachable`, must not reach `blocked` in ns2, and the default-namespace
/// pod must reach `blocked`.
async fn check_isolation(
    ctx: &ScenarioContext,
    pod_ns1: &str,
    ns1: &str,
    pod_default: &str,
    reachable: (&str, &str),
    blocked: (&str, &str),
) -> Result<()> {
    let out = ctx
        .pods
        .exec(pod_ns1, ns1, &probe::pod_curl_command(reachable.0))
        .await?;
    assert_contains(&out.stdout, LIVENESS_MARKER, reachable.1)?;

    let out = ctx
        .pods
        .exec(pod_ns1, ns1, &probe::pod_curl_command(blocked.0))
        .await?;
    assert_not_contains(&out.stdout, LIVENESS_MARKER, blocked.1)?;

    let out = ctx
        .pods
        .exec(pod_default, "default", &probe::pod_curl_command(blocked.0))
        .await?;
    assert_contains(
        &out.stdout,
        LIVENESS_MARKER,
        "traffic from the default namespace",
    )?;

    Ok(())
}

pub struct PodIsolationScenario;

impl PodIsolationScenario {
    pub async fn run(ctx: &mut ScenarioContext) -> Result<()> {
        let pair = setup_isolated_namespaces(ctx).await?;

        // Pods in different namespaces
        let pod_ns1 = ctx.create_scenario_pod(&pair.ns1, false).await?;
        let pod_ns2 = ctx.create_scenario_pod(&pair.ns2, false).await?;
        let pod_default = ctx.create_scenario_pod("default", true).await?;

        let pod_ns2_ip = ctx.pods.get_pod_ip(&pod_ns2, &pair.ns2).await?.ok_or_else(|| {
            CheckError::assertion(format!("pod {}/{pod_ns2} has no IP", pair.ns2))
        })?;
        let pod_default_ip = ctx
            .pods
            .get_pod_ip(&pod_default, "default")
            .await?
            .ok_or_else(|| {
                CheckError::assertion(format!("pod default/{pod_default} has no IP"))
            })?;

        check_isolation(
            ctx,
            &pod_ns1,
            &pair.ns1,
            &pod_default,
            (
                &format!("{pod_default_ip}:8080"),
                "traffic from ns1 to the default-namespace pod",
            ),
            (
                &format!("{pod_ns2_ip}:8080"),
                "traffic from ns1 to the ns2 pod",
            ),
        )
        .await?;
        info!("Pod-level isolation policy holds");

        delete_namespace_resources(ctx, &pair.ns1, &pair.crd_ns1, &pair.subnet_ns1).await?;
        delete_namespace_resources(ctx, &pair.ns2, &pair.crd_ns2, &pair.subnet_ns2).await?;
        Ok(())
    }
}

pub struct ServiceIsolationScenario;

impl ServiceIsolationScenario {
    pub async fn run(ctx: &mut ScenarioContext) -> Result<()> {
        let pair = setup_isolated_namespaces(ctx).await?;

        // Pods and services in different namespaces
        let pod_ns1 = ctx.create_scenario_pod(&pair.ns1, false).await?;
        let svc_ns1 = ctx.create_scenario_service(&pair.ns1, false).await?;
        let svc_ns1_ip = ctx.service_address(&svc_ns1, CLUSTER_IP, &pair.ns1).await?;

        let _pod_ns2 = ctx.create_scenario_pod(&pair.ns2, false).await?;
        let svc_ns2 = ctx.create_scenario_service(&pair.ns2, false).await?;
        let svc_ns2_ip = ctx.service_address(&svc_ns2, CLUSTER_IP, &pair.ns2).await?;

        // Both services warm up together.
        let build_timeout = Duration::from_secs(ctx.config.timeouts.lb_build_secs);
        try_join(
            ctx.probe.wait_service_status(&svc_ns1_ip, build_timeout),
            ctx.probe.wait_service_status(&svc_ns2_ip, build_timeout),
        )
        .await?;

        let pod_default = ctx.create_scenario_pod("default", true).await?;

        check_isolation(
            ctx,
            &pod_ns1,
            &pair.ns1,
            &pod_default,
            (&svc_ns1_ip, "traffic from ns1 to its own service"),
            (&svc_ns2_ip, "traffic from ns1 to the ns2 service"),
        )
        .await?;
        info!("Service-level isolation policy holds");

        delete_namespace_resources(ctx, &pair.ns1, &pair.crd_ns1, &pair.subnet_ns1).await?;
        delete_namespace_resources(ctx, &pair.ns2, &pair.crd_ns2, &pair.subnet_ns2).await?;
        Ok(())
    }
}
