//! Source workloads for volume-to-volume restores
//!
//! A pod mounts the backup claim and serves the backup stream with
//! `ncat --send-only` on [`SOURCE_PORT`]; a ClusterIP service gives it the
//! stable DNS name the restore job connects to. The pod restarts forever so
//! the stream is available however long the job takes to attach.

use k8s_openapi::api::core::v1::{Container, Pod, PodSpec, Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;
use tracing::debug;

use pxc_common::crd::{PerconaXtraDBBackup, PerconaXtraDBBackupRestore, PerconaXtraDBClusterSpec};

use crate::error::RestoreError;
use crate::naming;
use crate::volumes::{self, BACKUP_MOUNT_PATH, BACKUP_VOLUME};
use crate::SOURCE_PORT;

/// File the backup job writes inside the backup volume
pub const BACKUP_STREAM_FILE: &str = "xtrabackup.stream";

/// Name of the source container and of the service port
pub const SOURCE_CONTAINER: &str = "ncat";

/// Shell command that serves the backup stream to a single reader
pub fn source_command() -> String {
    format!(
        "cat {}/{} | ncat -l --send-only {}",
        BACKUP_MOUNT_PATH, BACKUP_STREAM_FILE, SOURCE_PORT
    )
}

/// Build the ClusterIP service that exposes the source pod on port 3307
pub fn build_source_service(
    restore: &PerconaXtraDBBackupRestore,
    backup: &PerconaXtraDBBackup,
) -> Result<Service, RestoreError> {
    let namespace = naming::backup_namespace(backup)?;
    let name = naming::source_name(&restore.name_any(), backup.source_cluster());

    debug!(service = %name, namespace = %namespace, "building restore source service");

    Ok(Service {
        metadata: ObjectMeta {
            name: Some(name.clone()),
            namespace: Some(namespace),
            labels: Some(naming::managed_labels()),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            type_: Some("ClusterIP".to_string()),
            selector: Some(naming::source_selector(&name)),
            ports: Some(vec![ServicePort {
                name: Some(SOURCE_CONTAINER.to_string()),
                port: i32::from(SOURCE_PORT),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// Build the pod that mounts `backup_claim` and streams it on port 3307
pub fn build_source_pod(
    restore: &PerconaXtraDBBackupRestore,
    backup: &PerconaXtraDBBackup,
    backup_claim: &str,
    cluster: &PerconaXtraDBClusterSpec,
) -> Result<Pod, RestoreError> {
    let namespace = naming::backup_namespace(backup)?;
    let name = naming::source_name(&restore.name_any(), backup.source_cluster());

    debug!(pod = %name, claim = %backup_claim, "building restore source pod");

    let mut volume_mounts = vec![volumes::mount(BACKUP_VOLUME, BACKUP_MOUNT_PATH)];
    volume_mounts.extend(volumes::tls_mounts());

    let mut pod_volumes = vec![volumes::claim_volume(BACKUP_VOLUME, backup_claim)];
    pod_volumes.extend(volumes::tls_volumes(cluster));

    let container = Container {
        name: SOURCE_CONTAINER.to_string(),
        image: Some(cluster.backup.image.clone()),
        image_pull_policy: Some("Always".to_string()),
        command: Some(vec![
            "bash".to_string(),
            "-exc".to_string(),
            source_command(),
        ]),
        volume_mounts: Some(volume_mounts),
        ..Default::default()
    };

    Ok(Pod {
        metadata: ObjectMeta {
            name: Some(name.clone()),
            namespace: Some(namespace),
            labels: Some(naming::source_labels(&name)),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![container],
            restart_policy: Some("Always".to_string()),
            volumes: Some(pod_volumes),
            ..Default::default()
        }),
        ..Default::default()
    })
}
