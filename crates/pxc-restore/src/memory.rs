//! Memory budget for the xtrabackup prepare step
//!
//! The prepare step gets 90% of the cluster's authoritative memory
//! declaration (the limit when set, otherwise the request). The value is
//! passed twice: as `XB_USE_MEMORY` for xtrabackup, which does not understand
//! binary suffixes, and as the job container's memory request.

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use pxc_common::crd::PerconaXtraDBClusterSpec;
use pxc_common::ParsedQuantity;

use crate::error::RestoreError;

/// Memory reserved for a restore
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryQuota {
    /// Value for `XB_USE_MEMORY`, binary suffixes reduced to decimal ones
    pub env_value: String,
    /// Container memory request in canonical quantity form
    pub request: Quantity,
}

/// Compute the memory quota for a restore into `cluster`
///
/// Returns `Ok(None)` when the cluster declares no memory. A declaration that
/// is not a valid quantity is an error; job builders log it and build the job
/// without memory settings.
pub fn xtrabackup_memory_quota(
    cluster: &PerconaXtraDBClusterSpec,
) -> Result<Option<MemoryQuota>, RestoreError> {
    let Some(raw) = cluster.authoritative_memory() else {
        return Ok(None);
    };

    let declared = raw
        .parse::<ParsedQuantity>()
        .map_err(|source| RestoreError::InvalidMemory {
            value: raw.to_string(),
            source,
        })?;

    // integer division: 10000 -> 9000, 0 -> 0
    let tenth = ParsedQuantity::from_value(declared.value() / 10, declared.format());
    let reserved = declared.sub(&tenth);
    Ok(Some(MemoryQuota {
        env_value: strip_binary_units(&reserved.to_string()),
        request: reserved.to_k8s(),
    }))
}

/// Turn `Gi`/`Mi`/... into `G`/`M`/... by deleting every `i`
///
/// This is a literal byte removal, not a suffix parser. Canonical quantity
/// strings only contain `i` inside binary suffixes.
pub(crate) fn strip_binary_units(rendered: &str) -> String {
    if rendered.contains('i') {
        rendered.replace('i', "")
    } else {
        rendered.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pxc_common::crd::{PodResources, PxcSpec, ResourceList};
    use pxc_common::QuantityError;

    fn memory(value: Option<&str>) -> Option<ResourceList> {
        value.map(|m| ResourceList {
            memory: Some(m.to_string()),
            cpu: None,
        })
    }

    fn cluster(request: Option<&str>, limit: Option<&str>) -> PerconaXtraDBClusterSpec {
        PerconaXtraDBClusterSpec {
            pxc: PxcSpec {
                resources: Some(PodResources {
                    requests: memory(request),
                    limits: memory(limit),
                }),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn quota(request: Option<&str>, limit: Option<&str>) -> Option<MemoryQuota> {
        xtrabackup_memory_quota(&cluster(request, limit)).unwrap()
    }

    #[test]
    fn limit_only_reserves_ninety_percent() {
        let q = quota(None, Some("1000")).unwrap();
        assert_eq!(q.env_value, "900");
        assert_eq!(q.request, Quantity("900".to_string()));
    }

    #[test]
    fn integer_division_discards_remainder() {
        assert_eq!(quota(None, Some("10000")).unwrap().env_value, "9k");
        assert_eq!(quota(None, Some("1005")).unwrap().env_value, "905");
        assert_eq!(quota(None, Some("9")).unwrap().env_value, "9");
    }

    #[test]
    fn zero_stays_zero() {
        let q = quota(None, Some("0")).unwrap();
        assert_eq!(q.env_value, "0");
        assert_eq!(q.request, Quantity("0".to_string()));
    }

    #[test]
    fn request_only_is_used() {
        assert_eq!(quota(Some("2000"), None).unwrap().env_value, "1800");
    }

    #[test]
    fn limit_is_authoritative_when_smaller() {
        assert_eq!(quota(Some("4000"), Some("2000")).unwrap().env_value, "1800");
    }

    #[test]
    fn limit_is_authoritative_when_larger() {
        assert_eq!(quota(Some("1000"), Some("2000")).unwrap().env_value, "1800");
    }

    #[test]
    fn empty_limit_falls_back_to_request() {
        assert_eq!(quota(Some("1000"), Some("")).unwrap().env_value, "900");
    }

    #[test]
    fn nothing_declared_yields_no_quota() {
        assert!(quota(None, None).is_none());
        assert!(quota(Some(""), Some("")).is_none());

        let bare = PerconaXtraDBClusterSpec::default();
        assert!(xtrabackup_memory_quota(&bare).unwrap().is_none());
    }

    #[test]
    fn binary_units_are_stripped_for_env_only() {
        let q = quota(None, Some("1000Mi")).unwrap();
        assert_eq!(q.env_value, "900M");
        assert_eq!(q.request, Quantity("900Mi".to_string()));
    }

    #[test]
    fn binary_remainder_renders_plain_bytes() {
        let q = quota(None, Some("1Gi")).unwrap();
        assert_eq!(q.env_value, "966367642");
        assert_eq!(q.request, Quantity("966367642".to_string()));
    }

    #[test]
    fn decimal_units_are_kept() {
        let q = quota(None, Some("2G")).unwrap();
        assert_eq!(q.env_value, "1800M");
        assert_eq!(q.request, Quantity("1800M".to_string()));
    }

    #[test]
    fn overflowing_exponent_is_an_error() {
        let err = xtrabackup_memory_quota(&cluster(None, Some("1e2147483647"))).unwrap_err();
        assert!(matches!(
            err,
            RestoreError::InvalidMemory {
                source: QuantityError::OutOfRange(_),
                ..
            }
        ));
    }

    #[test]
    fn strip_is_literal() {
        assert_eq!(strip_binary_units("900Mi"), "900M");
        assert_eq!(strip_binary_units("900M"), "900M");
        assert_eq!(strip_binary_units("1Gi"), "1G");
    }

    #[test]
    fn invalid_quantity_is_an_error() {
        let err = xtrabackup_memory_quota(&cluster(None, Some("lots"))).unwrap_err();
        assert!(matches!(err, RestoreError::InvalidMemory { ref value, .. } if value == "lots"));
    }
}
