//! Custom Resource Definitions consumed by the restore crates
//!
//! Only the fields the restore topology reads are modelled; unknown fields
//! are ignored on deserialization.

mod backup;
mod cluster;
mod restore;

pub use backup::{
    BackupState, BackupStorageS3Status, PerconaXtraDBBackup, PerconaXtraDBBackupSpec,
    PerconaXtraDBBackupStatus,
};
pub use cluster::{
    BackupToolingSpec, PerconaXtraDBCluster, PerconaXtraDBClusterSpec, PodResources, PxcSpec,
    ResourceList,
};
pub use restore::{PerconaXtraDBBackupRestore, PerconaXtraDBBackupRestoreSpec};

#[cfg(test)]
mod tests {
    use super::*;
    use kube::Resource;

    const API_GROUP: &str = "pxc.percona.com";

    #[test]
    fn all_resources_share_the_api_group() {
        assert_eq!(PerconaXtraDBBackupRestore::group(&()), API_GROUP);
        assert_eq!(PerconaXtraDBBackup::group(&()), API_GROUP);
        assert_eq!(PerconaXtraDBCluster::group(&()), API_GROUP);
        assert_eq!(PerconaXtraDBCluster::version(&()), "v1alpha1");
    }
}
