//! Kubernetes client wrapper
//!
//! Provides a high-level interface to the Kubernetes API.

#![allow(dead_code)]

use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    api::{Api, DeleteParams, ListParams, ObjectMeta, PostParams},
    Client, Config,
};
use tracing::info;

use crate::utils::names::rand_name;

/// Kubernetes client wrapper
#[derive(Clone)]
pub struct K8sClient {
    client: Client,
}

impl K8sClient {
    /// Create a new Kubernetes client from the ambient kubeconfig
    pub async fn new() -> Result<Self> {
        let client = Client::try_default()
            .await
            .context("Failed to create Kubernetes client")?;

        Ok(Self { client })
    }

    /// Create client with custom config
    pub async fn with_config(config: Config) -> Result<Self> {
        let client =
            Client::try_from(config).context("Failed to create Kubernetes client from config")?;

        Ok(Self { client })
    }

    /// Get the underlying kube client
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn namespaces(&self) -> Api<Namespace> {
        Api::all(self.client.clone())
    }

    /// List namespace names
    pub async fn list_namespaces(&self) -> Result<Vec<String>> {
        let ns_list = self
            .namespaces()
            .list(&ListParams::default())
            .await
            .context("Failed to list namespaces")?;

        Ok(ns_list
            .items
            .iter()
            .filter_map(|ns| ns.metadata.name.clone())
            .collect())
    }

    /// Check if namespace exists
    pub async fn namespace_exists(&self, name: &str) -> Result<bool> {
        match self.namespaces().get(name).await {
            Ok(_) => Ok(true),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(false),
            Err(e) => Err(e).context("Failed to check namespace existence"),
        }
    }

    /// Create a namespace with a unique generated name and return the name
    pub async fn create_namespace(&self, prefix: &str) -> Result<String> {
        let name = rand_name(prefix);
        let namespace = Namespace {
            metadata: ObjectMeta {
                name: Some(name.clone()),
                ..Default::default()
            },
            ..Default::default()
        };

        self.namespaces()
            .create(&PostParams::default(), &namespace)
            .await
            .with_context(|| format!("Failed to create namespace {name}"))?;

        info!("Created namespace {name}");
        Ok(name)
    }

    /// Delete a namespace
    pub async fn delete_namespace(&self, name: &str) -> Result<()> {
        self.namespaces()
            .delete(name, &DeleteParams::default())
            .await
            .with_context(|| format!("Failed to delete namespace {name}"))?;

        info!("Deleted namespace {name}");
        Ok(())
    }
}
