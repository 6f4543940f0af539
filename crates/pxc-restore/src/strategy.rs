//! Restore strategy selection
//!
//! The caller decides the transport: passing an object-store destination
//! selects the S3 job, otherwise the backup claim is streamed through a
//! source pod. Nothing is inferred from the backup record itself.

use kube::ResourceExt;
use tracing::info;

use pxc_common::crd::{PerconaXtraDBBackup, PerconaXtraDBBackupRestore, PerconaXtraDBClusterSpec};

use crate::error::RestoreError;
use crate::job::{build_pvc_restore_job, build_s3_restore_job};
use crate::source::{build_source_pod, build_source_service};
use crate::topology::RestoreTopology;

/// How the backup bytes reach the restore job
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RestoreStrategy<'a> {
    /// Stream the backup claim through a source pod on port 3307
    VolumeToVolume {
        /// Claim holding the backup stream
        backup_claim: &'a str,
    },
    /// Download the backup from an S3-compatible store
    ObjectStore {
        /// `<bucket>/<key>` of the backup stream
        destination: &'a str,
    },
}

impl<'a> RestoreStrategy<'a> {
    /// Pick the strategy from the caller's inputs
    pub fn select(s3_destination: Option<&'a str>, backup_claim: &'a str) -> Self {
        match s3_destination {
            Some(destination) => Self::ObjectStore { destination },
            None => Self::VolumeToVolume { backup_claim },
        }
    }
}

/// Build every workload needed to restore `backup` into `cluster`
///
/// With `s3_destination` set the backup must carry object-store status and
/// only a Job is produced; otherwise the Service, source Pod and Job for a
/// volume-to-volume restore of `backup_claim` are produced.
pub fn build_restore_topology(
    restore: &PerconaXtraDBBackupRestore,
    backup: &PerconaXtraDBBackup,
    s3_destination: Option<&str>,
    backup_claim: &str,
    cluster: &PerconaXtraDBClusterSpec,
) -> Result<RestoreTopology, RestoreError> {
    let strategy = RestoreStrategy::select(s3_destination, backup_claim);

    let topology = match strategy {
        RestoreStrategy::ObjectStore { destination } => RestoreTopology::ObjectStore {
            job: build_s3_restore_job(restore, backup, destination, cluster)?,
        },
        RestoreStrategy::VolumeToVolume { backup_claim } => RestoreTopology::VolumeToVolume {
            service: build_source_service(restore, backup)?,
            pod: build_source_pod(restore, backup, backup_claim, cluster)?,
            job: build_pvc_restore_job(restore, backup, cluster)?,
        },
    };

    info!(
        restore = %restore.name_any(),
        cluster = %backup.source_cluster(),
        strategy = topology.strategy(),
        "built restore topology"
    );

    Ok(topology)
}
