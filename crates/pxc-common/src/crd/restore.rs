//! PerconaXtraDBBackupRestore Custom Resource Definition
//!
//! A restore request names the backup to restore and the cluster it targets.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Specification for a PerconaXtraDBBackupRestore
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "pxc.percona.com",
    version = "v1alpha1",
    kind = "PerconaXtraDBBackupRestore",
    plural = "perconaxtradbbackuprestores",
    shortname = "pxc-restore",
    namespaced,
    printcolumn = r#"{"name":"Cluster","type":"string","jsonPath":".spec.pxcCluster"}"#,
    printcolumn = r#"{"name":"Backup","type":"string","jsonPath":".spec.backupName"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct PerconaXtraDBBackupRestoreSpec {
    /// Name of the cluster being restored
    pub pxc_cluster: String,

    /// Name of the PerconaXtraDBBackup to restore from
    pub backup_name: String,
}
