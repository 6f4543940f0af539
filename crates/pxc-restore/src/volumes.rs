//! Volumes and mounts shared by the source pod and the restore job

use k8s_openapi::api::core::v1::{
    PersistentVolumeClaimVolumeSource, SecretVolumeSource, Volume, VolumeMount,
};
use pxc_common::crd::PerconaXtraDBClusterSpec;

/// Mount path of the backup volume in the source pod
pub(crate) const BACKUP_MOUNT_PATH: &str = "/backup";

/// Mount path of the target data volume in the restore job
pub(crate) const DATADIR_MOUNT_PATH: &str = "/datadir";

/// Mount path of the client TLS secret
pub(crate) const SSL_MOUNT_PATH: &str = "/etc/mysql/ssl";

/// Mount path of the internal TLS secret
pub(crate) const SSL_INTERNAL_MOUNT_PATH: &str = "/etc/mysql/ssl-internal";

pub(crate) const BACKUP_VOLUME: &str = "backup";
pub(crate) const DATADIR_VOLUME: &str = "datadir";
pub(crate) const SSL_VOLUME: &str = "ssl";
pub(crate) const SSL_INTERNAL_VOLUME: &str = "ssl-internal";

/// Volume backed by an existing claim
pub(crate) fn claim_volume(name: &str, claim_name: &str) -> Volume {
    Volume {
        name: name.to_string(),
        persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
            claim_name: claim_name.to_string(),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Volume backed by a secret; `optional` lets the pod start without it
pub(crate) fn secret_volume(name: &str, secret_name: &str, optional: bool) -> Volume {
    Volume {
        name: name.to_string(),
        secret: Some(SecretVolumeSource {
            secret_name: Some(secret_name.to_string()),
            optional: Some(optional),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Internal and client TLS volumes, in that order
///
/// The internal secret is always optional. The client secret is optional only
/// when the cluster allows unsafe configurations.
pub(crate) fn tls_volumes(cluster: &PerconaXtraDBClusterSpec) -> [Volume; 2] {
    [
        secret_volume(
            SSL_INTERNAL_VOLUME,
            &cluster.pxc.ssl_internal_secret_name,
            true,
        ),
        secret_volume(
            SSL_VOLUME,
            &cluster.pxc.ssl_secret_name,
            cluster.pxc.allow_unsafe_configurations,
        ),
    ]
}

pub(crate) fn mount(volume: &str, path: &str) -> VolumeMount {
    VolumeMount {
        name: volume.to_string(),
        mount_path: path.to_string(),
        ..Default::default()
    }
}

/// Mounts for the volumes returned by [`tls_volumes`]
pub(crate) fn tls_mounts() -> [VolumeMount; 2] {
    [
        mount(SSL_VOLUME, SSL_MOUNT_PATH),
        mount(SSL_INTERNAL_VOLUME, SSL_INTERNAL_MOUNT_PATH),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pxc_common::crd::PxcSpec;

    fn cluster(allow_unsafe: bool) -> PerconaXtraDBClusterSpec {
        PerconaXtraDBClusterSpec {
            pxc: PxcSpec {
                ssl_secret_name: "c1-ssl".to_string(),
                ssl_internal_secret_name: "c1-ssl-internal".to_string(),
                allow_unsafe_configurations: allow_unsafe,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn secret(v: &Volume) -> &SecretVolumeSource {
        v.secret.as_ref().unwrap()
    }

    #[test]
    fn internal_tls_is_always_optional() {
        for allow in [true, false] {
            let [internal, _] = tls_volumes(&cluster(allow));
            assert_eq!(internal.name, SSL_INTERNAL_VOLUME);
            assert_eq!(secret(&internal).secret_name.as_deref(), Some("c1-ssl-internal"));
            assert_eq!(secret(&internal).optional, Some(true));
        }
    }

    #[test]
    fn client_tls_optional_follows_unsafe_flag() {
        let [_, strict] = tls_volumes(&cluster(false));
        assert_eq!(strict.name, SSL_VOLUME);
        assert_eq!(secret(&strict).secret_name.as_deref(), Some("c1-ssl"));
        assert_eq!(secret(&strict).optional, Some(false));

        let [_, relaxed] = tls_volumes(&cluster(true));
        assert_eq!(secret(&relaxed).optional, Some(true));
    }

    #[test]
    fn tls_mounts_match_volume_names() {
        let mounts = tls_mounts();
        assert_eq!(mounts[0].name, SSL_VOLUME);
        assert_eq!(mounts[0].mount_path, "/etc/mysql/ssl");
        assert_eq!(mounts[1].name, SSL_INTERNAL_VOLUME);
        assert_eq!(mounts[1].mount_path, "/etc/mysql/ssl-internal");
    }

    #[test]
    fn claim_volume_references_claim() {
        let v = claim_volume(DATADIR_VOLUME, "datadir-c1-pxc-0");
        assert_eq!(v.name, "datadir");
        assert_eq!(
            v.persistent_volume_claim.unwrap().claim_name,
            "datadir-c1-pxc-0"
        );
    }
}
