//! Names shared by the source workloads and the restore job
//!
//! The source Pod and Service share one name; the job reaches the source by
//! that name through cluster DNS, so every builder derives names here.

use std::collections::BTreeMap;

use kube::ResourceExt;
use pxc_common::crd::PerconaXtraDBBackup;

use crate::error::RestoreError;

/// Label key the source Service selects on
pub const SOURCE_SELECTOR_KEY: &str = "name";

/// Label marking workloads created by this crate
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";

/// Value of [`MANAGED_BY_LABEL`]
pub const MANAGED_BY_VALUE: &str = "pxc-restore";

/// Name of the source Pod and Service: `restore-src-<restore>-<cluster>`
pub fn source_name(restore_name: &str, cluster: &str) -> String {
    format!("restore-src-{}-{}", restore_name, cluster)
}

/// Name of the restore Job: `restore-job-<restore>-<cluster>`
pub fn job_name(restore_name: &str, cluster: &str) -> String {
    format!("restore-job-{}-{}", restore_name, cluster)
}

/// Data volume claim of the first cluster member
///
/// Restores always land on node 0; the other members resync from it.
pub fn datadir_claim_name(cluster: &str) -> String {
    format!("datadir-{}-pxc-0", cluster)
}

/// Namespace every restore workload is created in: the backup's own
pub fn backup_namespace(backup: &PerconaXtraDBBackup) -> Result<String, RestoreError> {
    backup
        .namespace()
        .ok_or_else(|| RestoreError::MissingNamespace {
            kind: "PerconaXtraDBBackup",
            name: backup.name_any(),
        })
}

/// Selector matching the source pod
pub fn source_selector(source_name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(SOURCE_SELECTOR_KEY.to_string(), source_name.to_string())])
}

/// Labels for the source pod: its selector plus the managed-by marker
pub fn source_labels(source_name: &str) -> BTreeMap<String, String> {
    let mut labels = source_selector(source_name);
    labels.extend(managed_labels());
    labels
}

/// Labels applied to every restore workload
pub fn managed_labels() -> BTreeMap<String, String> {
    BTreeMap::from([(MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string())])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_fixed_prefixes() {
        assert_eq!(source_name("r1", "cluster-a"), "restore-src-r1-cluster-a");
        assert_eq!(job_name("r1", "cluster-a"), "restore-job-r1-cluster-a");
        assert_eq!(datadir_claim_name("cluster-a"), "datadir-cluster-a-pxc-0");
    }

    #[test]
    fn names_are_deterministic() {
        assert_eq!(source_name("r1", "c1"), source_name("r1", "c1"));
        assert_eq!(job_name("r1", "c1"), job_name("r1", "c1"));
    }

    #[test]
    fn different_inputs_do_not_collide() {
        let names = [
            source_name("r1", "c1"),
            source_name("r2", "c1"),
            source_name("r1", "c2"),
            job_name("r1", "c1"),
        ];
        for (i, a) in names.iter().enumerate() {
            for b in &names[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn source_and_job_never_share_a_name() {
        assert_ne!(source_name("r1", "c1"), job_name("r1", "c1"));
    }

    #[test]
    fn selector_is_subset_of_labels() {
        let name = source_name("r1", "c1");
        let selector = source_selector(&name);
        let labels = source_labels(&name);

        assert_eq!(selector.len(), 1);
        for (k, v) in &selector {
            assert_eq!(labels.get(k), Some(v));
        }
        assert_eq!(
            labels.get(MANAGED_BY_LABEL).map(String::as_str),
            Some(MANAGED_BY_VALUE)
        );
    }

    #[test]
    fn namespace_comes_from_backup() {
        use pxc_common::crd::PerconaXtraDBBackupSpec;

        let mut backup = PerconaXtraDBBackup::new("b1", PerconaXtraDBBackupSpec::default());
        assert!(matches!(
            backup_namespace(&backup),
            Err(RestoreError::MissingNamespace { ref name, .. }) if name == "b1"
        ));

        backup.metadata.namespace = Some("db".to_string());
        assert_eq!(backup_namespace(&backup).unwrap(), "db");
    }

    #[test]
    fn label_maps_are_fresh_per_call() {
        let mut first = managed_labels();
        first.insert("extra".to_string(), "x".to_string());
        assert!(!managed_labels().contains_key("extra"));
    }
}
