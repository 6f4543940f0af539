//! PerconaXtraDBBackup Custom Resource Definition
//!
//! A backup record says which cluster the backup was taken from. Backups
//! shipped to an S3-compatible store also carry the storage metadata in their
//! status, which the object-store restore job needs.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a backup
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum BackupState {
    /// Backup has not started yet
    #[default]
    Starting,
    /// Backup job is running
    Running,
    /// Backup finished and can be restored
    Succeeded,
    /// Backup failed
    Failed,
}

impl std::fmt::Display for BackupState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Starting => write!(f, "Starting"),
            Self::Running => write!(f, "Running"),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Object-store location and credentials reference for a backup
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackupStorageS3Status {
    /// Bucket holding the backup stream
    #[serde(default)]
    pub bucket: String,

    /// Name of the Secret holding `AWS_ACCESS_KEY_ID` and `AWS_SECRET_ACCESS_KEY`
    #[serde(default)]
    pub credentials_secret: String,

    /// Region of the bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Endpoint URL for S3-compatible stores (empty means AWS)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
}

/// Status of a PerconaXtraDBBackup
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerconaXtraDBBackupStatus {
    /// Current state
    #[serde(default)]
    pub state: BackupState,

    /// Where the backup was written (`pvc/<name>` or `<bucket>/<key>`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// Storage the backup was written to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_name: Option<String>,

    /// Object-store metadata, present only for S3 backups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3: Option<BackupStorageS3Status>,
}

/// Specification for a PerconaXtraDBBackup
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "pxc.percona.com",
    version = "v1alpha1",
    kind = "PerconaXtraDBBackup",
    plural = "perconaxtradbbackups",
    shortname = "pxc-backup",
    namespaced,
    status = "PerconaXtraDBBackupStatus",
    printcolumn = r#"{"name":"Cluster","type":"string","jsonPath":".spec.pxcCluster"}"#,
    printcolumn = r#"{"name":"Destination","type":"string","jsonPath":".status.destination"}"#,
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.state"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct PerconaXtraDBBackupSpec {
    /// Cluster the backup was taken from
    pub pxc_cluster: String,

    /// Storage definition in the cluster spec the backup targets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_name: Option<String>,
}

impl PerconaXtraDBBackup {
    /// Cluster the backup was taken from
    pub fn source_cluster(&self) -> &str {
        &self.spec.pxc_cluster
    }

    /// Object-store metadata recorded when the backup was uploaded
    pub fn object_store(&self) -> Option<&BackupStorageS3Status> {
        self.status.as_ref().and_then(|s| s.s3.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_status(yaml: &str) -> PerconaXtraDBBackupStatus {
        serde_yaml::from_str(yaml).expect("parse status")
    }

    #[test]
    fn s3_status_roundtrip() {
        let status = parse_status(
            r#"
state: Succeeded
destination: my-bucket/cluster1-2024-01-01
s3:
  bucket: my-bucket
  credentialsSecret: s3-creds
  endpointUrl: https://minio.local
"#,
        );

        assert_eq!(status.state, BackupState::Succeeded);
        let s3 = status.s3.expect("s3 status");
        assert_eq!(s3.bucket, "my-bucket");
        assert_eq!(s3.credentials_secret, "s3-creds");
        assert_eq!(s3.endpoint_url.as_deref(), Some("https://minio.local"));
        assert!(s3.region.is_none());

        let json = serde_json::to_value(&s3).unwrap();
        assert_eq!(json["endpointUrl"], "https://minio.local");
        assert_eq!(json["credentialsSecret"], "s3-creds");
    }

    #[test]
    fn pvc_backup_has_no_object_store() {
        let mut backup = PerconaXtraDBBackup::new(
            "backup1",
            PerconaXtraDBBackupSpec {
                pxc_cluster: "cluster1".to_string(),
                storage_name: Some("fs-pvc".to_string()),
            },
        );
        backup.status = Some(parse_status("state: Succeeded\ndestination: pvc/xb-backup1\n"));

        assert_eq!(backup.source_cluster(), "cluster1");
        assert!(backup.object_store().is_none());
    }

    #[test]
    fn missing_status_has_no_object_store() {
        let backup = PerconaXtraDBBackup::new("backup1", PerconaXtraDBBackupSpec::default());
        assert!(backup.object_store().is_none());
    }

    #[test]
    fn state_display() {
        assert_eq!(BackupState::Starting.to_string(), "Starting");
        assert_eq!(BackupState::Running.to_string(), "Running");
        assert_eq!(BackupState::Succeeded.to_string(), "Succeeded");
        assert_eq!(BackupState::Failed.to_string(), "Failed");
    }
}
