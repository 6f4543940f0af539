//! PerconaXtraDBCluster Custom Resource Definition
//!
//! Only the parts of the cluster spec that a restore reads are modelled:
//! node resources, TLS secret names and the backup tooling image.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// CPU and memory quantities as written by the user (e.g. `1Gi`, `500m`)
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct ResourceList {
    /// Memory quantity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,

    /// CPU quantity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
}

/// Per-node resource requests and limits
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct PodResources {
    /// Resource requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<ResourceList>,

    /// Resource limits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<ResourceList>,
}

impl PodResources {
    /// Memory limit, ignoring empty strings
    pub fn memory_limit(&self) -> Option<&str> {
        non_empty_memory(self.limits.as_ref())
    }

    /// Memory request, ignoring empty strings
    pub fn memory_request(&self) -> Option<&str> {
        non_empty_memory(self.requests.as_ref())
    }
}

fn non_empty_memory(list: Option<&ResourceList>) -> Option<&str> {
    list.and_then(|l| l.memory.as_deref())
        .filter(|m| !m.is_empty())
}

/// Database node configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PxcSpec {
    /// Number of database nodes
    #[serde(default)]
    pub size: i32,

    /// Database node image
    #[serde(default)]
    pub image: String,

    /// Per-node resources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<PodResources>,

    /// Secret with client-facing TLS material
    #[serde(default)]
    pub ssl_secret_name: String,

    /// Secret with TLS material for replication traffic
    #[serde(default)]
    pub ssl_internal_secret_name: String,

    /// Tolerate configurations without TLS secrets
    #[serde(default)]
    pub allow_unsafe_configurations: bool,
}

/// Backup tooling configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackupToolingSpec {
    /// Image carrying xtrabackup, xbstream, ncat and mc
    pub image: String,
}

/// Specification for a PerconaXtraDBCluster
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "pxc.percona.com",
    version = "v1alpha1",
    kind = "PerconaXtraDBCluster",
    plural = "perconaxtradbclusters",
    shortname = "pxc",
    namespaced,
    printcolumn = r#"{"name":"Size","type":"integer","jsonPath":".spec.pxc.size"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct PerconaXtraDBClusterSpec {
    /// Database node configuration
    #[serde(default)]
    pub pxc: PxcSpec,

    /// Backup tooling configuration
    #[serde(default)]
    pub backup: BackupToolingSpec,
}

impl PerconaXtraDBClusterSpec {
    /// Memory declaration that bounds a restore: the limit when set,
    /// otherwise the request
    pub fn authoritative_memory(&self) -> Option<&str> {
        let resources = self.pxc.resources.as_ref()?;
        resources
            .memory_limit()
            .or_else(|| resources.memory_request())
    }
}
