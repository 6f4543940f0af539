//! Submitting a built topology to the cluster
//!
//! Builders never talk to the API server. Callers that want the workloads
//! created hand a [`RestoreTopology`] to [`submit_topology`] together with a
//! [`WorkloadApplier`]; [`KubeApplier`] is the server-side-apply implementation.

use std::fmt::Debug;

use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{Pod, Service};
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, Patch, PatchParams};
use kube::{Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

#[cfg(test)]
use mockall::automock;

use pxc_common::config::RestoreSettings;

use crate::error::RestoreError;
use crate::topology::RestoreTopology;

/// Creates or updates restore workloads
///
/// Kept behind a trait so submission order can be tested without a cluster.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WorkloadApplier: Send + Sync {
    /// Apply the source service
    async fn apply_service(&self, service: &Service) -> Result<(), RestoreError>;

    /// Apply the source pod
    async fn apply_pod(&self, pod: &Pod) -> Result<(), RestoreError>;

    /// Apply the restore job
    async fn apply_job(&self, job: &Job) -> Result<(), RestoreError>;
}

/// [`WorkloadApplier`] backed by server-side apply
pub struct KubeApplier {
    client: Client,
    field_manager: String,
}

impl KubeApplier {
    /// Create an applier that owns its fields as `field_manager`
    pub fn new(client: Client, field_manager: impl Into<String>) -> Self {
        Self {
            client,
            field_manager: field_manager.into(),
        }
    }

    /// Create an applier using the configured field manager
    pub fn from_settings(client: Client, settings: &RestoreSettings) -> Self {
        Self::new(client, settings.field_manager.clone())
    }

    async fn apply<K>(&self, kind: &'static str, obj: &K) -> Result<(), RestoreError>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
            + Clone
            + Debug
            + Serialize
            + DeserializeOwned,
    {
        let name = obj.name_any();
        let namespace = obj
            .namespace()
            .ok_or_else(|| RestoreError::MissingNamespace {
                kind,
                name: name.clone(),
            })?;

        let api: Api<K> = Api::namespaced(self.client.clone(), &namespace);
        let params = PatchParams::apply(&self.field_manager).force();
        api.patch(&name, &params, &Patch::Apply(obj)).await?;

        debug!(kind, name = %name, namespace = %namespace, "applied restore workload");
        Ok(())
    }
}

#[async_trait]
impl WorkloadApplier for KubeApplier {
    async fn apply_service(&self, service: &Service) -> Result<(), RestoreError> {
        self.apply("Service", service).await
    }

    async fn apply_pod(&self, pod: &Pod) -> Result<(), RestoreError> {
        self.apply("Pod", pod).await
    }

    async fn apply_job(&self, job: &Job) -> Result<(), RestoreError> {
        self.apply("Job", job).await
    }
}

/// Apply every workload of `topology` in dependency order
///
/// The source service and pod go first so the job's stream target exists.
/// Submission stops at the first failure; already-applied workloads are left
/// in place.
pub async fn submit_topology(
    applier: &dyn WorkloadApplier,
    topology: &RestoreTopology,
) -> Result<(), RestoreError> {
    if let RestoreTopology::VolumeToVolume { service, pod, .. } = topology {
        applier.apply_service(service).await?;
        applier.apply_pod(pod).await?;
    }
    applier.apply_job(topology.job()).await?;

    info!(
        strategy = topology.strategy(),
        resources = ?topology.resource_names(),
        "submitted restore topology"
    );
    Ok(())
}
