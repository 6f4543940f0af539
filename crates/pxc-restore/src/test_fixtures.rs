//! Shared builders for restore tests

use pxc_common::crd::{
    BackupState, BackupStorageS3Status, PerconaXtraDBBackup, PerconaXtraDBBackupRestore,
    PerconaXtraDBBackupRestoreSpec, PerconaXtraDBBackupSpec, PerconaXtraDBBackupStatus,
    PerconaXtraDBClusterSpec, PodResources, PxcSpec, ResourceList,
};

pub(crate) const NAMESPACE: &str = "db";
pub(crate) const TOOLING_IMAGE: &str = "percona/percona-xtradb-cluster-operator:0.3.0-backup";

pub(crate) fn restore(name: &str, cluster: &str) -> PerconaXtraDBBackupRestore {
    let mut restore = PerconaXtraDBBackupRestore::new(
        name,
        PerconaXtraDBBackupRestoreSpec {
            pxc_cluster: cluster.to_string(),
            backup_name: "backup1".to_string(),
        },
    );
    restore.metadata.namespace = Some(NAMESPACE.to_string());
    restore
}

pub(crate) fn pvc_backup(cluster: &str) -> PerconaXtraDBBackup {
    let mut backup = PerconaXtraDBBackup::new(
        "backup1",
        PerconaXtraDBBackupSpec {
            pxc_cluster: cluster.to_string(),
            storage_name: Some("fs-pvc".to_string()),
        },
    );
    backup.metadata.namespace = Some(NAMESPACE.to_string());
    backup.status = Some(PerconaXtraDBBackupStatus {
        state: BackupState::Succeeded,
        destination: Some("pvc/xb-backup1".to_string()),
        ..Default::default()
    });
    backup
}

pub(crate) fn s3_backup(cluster: &str) -> PerconaXtraDBBackup {
    let mut backup = pvc_backup(cluster);
    backup.status = Some(PerconaXtraDBBackupStatus {
        state: BackupState::Succeeded,
        destination: Some("bucket/path/backup.stream".to_string()),
        storage_name: Some("s3-us-west".to_string()),
        s3: Some(BackupStorageS3Status {
            bucket: "bucket".to_string(),
            credentials_secret: "s3-creds".to_string(),
            region: Some("us-west-2".to_string()),
            endpoint_url: Some("https://minio.local:9000".to_string()),
        }),
    });
    backup
}

pub(crate) fn cluster_spec(memory_limit: Option<&str>) -> PerconaXtraDBClusterSpec {
    let mut spec = PerconaXtraDBClusterSpec {
        pxc: PxcSpec {
            size: 3,
            ssl_secret_name: "cluster-a-ssl".to_string(),
            ssl_internal_secret_name: "cluster-a-ssl-internal".to_string(),
            ..Default::default()
        },
        ..Default::default()
    };
    spec.backup.image = TOOLING_IMAGE.to_string();
    spec.pxc.resources = memory_limit.map(|m| PodResources {
        requests: None,
        limits: Some(ResourceList {
            memory: Some(m.to_string()),
            cpu: None,
        }),
    });
    spec
}
