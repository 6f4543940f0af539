//! Restore Job construction
//!
//! Both variants run one `xtrabackup` container against the first member's
//! data claim: clear `/datadir`, unpack the backup stream into it with
//! `xbstream`, then `xtrabackup --prepare`. They differ only in where the
//! stream comes from:
//!
//! - volume-to-volume: `ncat` to the source service on port 3307
//! - object-store: `mc cat` from an S3-compatible bucket, with credentials
//!   taken from a Secret
//!
//! Pods never restart in place; the Job controller creates replacements up
//! to [`RESTORE_BACKOFF_LIMIT`] times.

use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{
    Container, EnvVar, EnvVarSource, PodSpec, PodTemplateSpec, ResourceRequirements,
    SecretKeySelector, Volume,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use pxc_common::crd::{PerconaXtraDBBackup, PerconaXtraDBBackupRestore, PerconaXtraDBClusterSpec};

use crate::error::RestoreError;
use crate::memory::{xtrabackup_memory_quota, MemoryQuota};
use crate::naming;
use crate::volumes::{self, DATADIR_MOUNT_PATH, DATADIR_VOLUME};
use crate::{RESTORE_BACKOFF_LIMIT, SOURCE_PORT, XB_USE_MEMORY_ENV};

/// Name of the restore container
pub const RESTORE_CONTAINER: &str = "xtrabackup";

/// Endpoint used by `mc` when the backup records none
pub const DEFAULT_S3_ENDPOINT: &str = "https://s3.amazonaws.com";

/// Secret key holding the access key id
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";

/// Secret key holding the secret access key
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";

/// Env var carrying the object-store endpoint
pub const AWS_ENDPOINT_URL: &str = "AWS_ENDPOINT_URL";

/// Commands that unpack a stream into the data dir and prepare it
fn unpack_and_prepare(stream_source: &str) -> [String; 3] {
    [
        format!("rm -rf {}/*", DATADIR_MOUNT_PATH),
        format!("{} | xbstream -x -C {}", stream_source, DATADIR_MOUNT_PATH),
        format!("xtrabackup --prepare --target-dir={}", DATADIR_MOUNT_PATH),
    ]
}

/// Script for the volume-to-volume variant
///
/// The `ping` only warms up DNS for the source service; its failure is
/// ignored so a slow-to-resolve name does not abort the attempt.
pub fn pvc_restore_script(source_host: &str) -> String {
    let mut lines = vec![format!("ping -c1 {} || :", source_host)];
    lines.extend(unpack_and_prepare(&format!(
        "ncat {} {}",
        source_host, SOURCE_PORT
    )));
    lines.join("\n")
}

/// Script for the object-store variant; `destination` is `<bucket>/<key>`
pub fn s3_restore_script(destination: &str) -> String {
    let mut lines = vec![
        format!(
            "mc -C /tmp/mc config host add dest \"${{{}:-{}}}\" \"${}\" \"${}\"",
            AWS_ENDPOINT_URL, DEFAULT_S3_ENDPOINT, AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY
        ),
        format!("mc -C /tmp/mc ls dest/{}", destination),
    ];
    lines.extend(unpack_and_prepare(&format!(
        "mc -C /tmp/mc cat dest/{}",
        destination
    )));
    lines.join("\n")
}

/// Build the Job that pulls the backup from the source service
pub fn build_pvc_restore_job(
    restore: &PerconaXtraDBBackupRestore,
    backup: &PerconaXtraDBBackup,
    cluster: &PerconaXtraDBClusterSpec,
) -> Result<Job, RestoreError> {
    let namespace = naming::backup_namespace(backup)?;
    let restore_name = restore.name_any();
    let source_cluster = backup.source_cluster();
    let source_host = naming::source_name(&restore_name, source_cluster);

    let mut volume_mounts = vec![volumes::mount(DATADIR_VOLUME, DATADIR_MOUNT_PATH)];
    volume_mounts.extend(volumes::tls_mounts());

    let mut job_volumes = vec![datadir_volume(source_cluster)];
    job_volumes.extend(volumes::tls_volumes(cluster));

    let container = Container {
        name: RESTORE_CONTAINER.to_string(),
        image: Some(cluster.backup.image.clone()),
        image_pull_policy: Some("Always".to_string()),
        command: Some(bash(pvc_restore_script(&source_host))),
        volume_mounts: Some(volume_mounts),
        ..Default::default()
    };

    Ok(restore_job(
        naming::job_name(&restore_name, source_cluster),
        namespace,
        with_memory_quota(container, cluster, &restore_name),
        job_volumes,
    ))
}

/// Build the Job that pulls the backup from object storage
///
/// Fails without building anything when the backup carries no object-store
/// status or no credentials secret.
pub fn build_s3_restore_job(
    restore: &PerconaXtraDBBackupRestore,
    backup: &PerconaXtraDBBackup,
    destination: &str,
    cluster: &PerconaXtraDBClusterSpec,
) -> Result<Job, RestoreError> {
    let s3 = backup
        .object_store()
        .ok_or_else(|| RestoreError::MissingObjectStoreStatus {
            backup: backup.name_any(),
        })?;
    if s3.credentials_secret.is_empty() {
        return Err(RestoreError::IncompleteObjectStoreStatus {
            backup: backup.name_any(),
            field: "credentialsSecret",
        });
    }

    let namespace = naming::backup_namespace(backup)?;
    let restore_name = restore.name_any();
    let source_cluster = backup.source_cluster();

    let env = vec![
        EnvVar {
            name: AWS_ENDPOINT_URL.to_string(),
            value: Some(s3.endpoint_url.clone().unwrap_or_default()),
            ..Default::default()
        },
        secret_env(AWS_ACCESS_KEY_ID, &s3.credentials_secret),
        secret_env(AWS_SECRET_ACCESS_KEY, &s3.credentials_secret),
    ];

    let container = Container {
        name: RESTORE_CONTAINER.to_string(),
        image: Some(cluster.backup.image.clone()),
        image_pull_policy: Some("Always".to_string()),
        command: Some(bash(s3_restore_script(destination))),
        env: Some(env),
        volume_mounts: Some(vec![volumes::mount(DATADIR_VOLUME, DATADIR_MOUNT_PATH)]),
        ..Default::default()
    };

    Ok(restore_job(
        naming::job_name(&restore_name, source_cluster),
        namespace,
        with_memory_quota(container, cluster, &restore_name),
        vec![datadir_volume(source_cluster)],
    ))
}

fn bash(script: String) -> Vec<String> {
    vec!["bash".to_string(), "-exc".to_string(), script]
}

fn datadir_volume(cluster: &str) -> Volume {
    volumes::claim_volume(DATADIR_VOLUME, &naming::datadir_claim_name(cluster))
}

/// Env var whose value is read from `key` in `secret`; the key name doubles
/// as the variable name
fn secret_env(key: &str, secret: &str) -> EnvVar {
    EnvVar {
        name: key.to_string(),
        value_from: Some(EnvVarSource {
            secret_key_ref: Some(SecretKeySelector {
                name: secret.to_string(),
                key: key.to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Add `XB_USE_MEMORY` and a memory request when the cluster declares memory
///
/// An unparsable declaration is logged and leaves the container unchanged.
fn with_memory_quota(
    container: Container,
    cluster: &PerconaXtraDBClusterSpec,
    restore_name: &str,
) -> Container {
    match xtrabackup_memory_quota(cluster) {
        Ok(Some(quota)) => apply_memory_quota(container, quota),
        Ok(None) => container,
        Err(e) => {
            warn!(restore = %restore_name, error = %e, "skipping restore memory settings");
            container
        }
    }
}

fn apply_memory_quota(mut container: Container, quota: MemoryQuota) -> Container {
    debug!(memory = %quota.env_value, "reserving memory for prepare step");

    container
        .env
        .get_or_insert_with(Vec::new)
        .push(EnvVar {
            name: XB_USE_MEMORY_ENV.to_string(),
            value: Some(quota.env_value),
            ..Default::default()
        });
    container.resources = Some(ResourceRequirements {
        requests: Some(BTreeMap::from([("memory".to_string(), quota.request)])),
        ..Default::default()
    });
    container
}

fn restore_job(name: String, namespace: String, container: Container, volumes: Vec<Volume>) -> Job {
    debug!(job = %name, namespace = %namespace, "building restore job");

    Job {
        metadata: ObjectMeta {
            name: Some(name),
            namespace: Some(namespace),
            labels: Some(naming::managed_labels()),
            ..Default::default()
        },
        spec: Some(JobSpec {
            backoff_limit: Some(RESTORE_BACKOFF_LIMIT),
            template: PodTemplateSpec {
                metadata: None,
                spec: Some(PodSpec {
                    containers: vec![container],
                    restart_policy: Some("Never".to_string()),
                    volumes: Some(volumes),
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}
