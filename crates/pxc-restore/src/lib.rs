//! Restore topology for Percona XtraDB clusters
//!
//! Builds the Kubernetes workloads that stream a backup into a fresh data
//! directory and prepare it for startup:
//!
//! - **strategy**: picks volume-to-volume streaming or object-store retrieval
//!   and assembles the matching [`RestoreTopology`]
//! - **source**: the Pod + Service that expose a backup volume on port 3307
//! - **job**: the Job that pulls the stream into the data volume and runs the
//!   prepare step
//! - **memory**: derives the prepare step's memory reservation
//! - **naming**: shared names so the source and the job can find each other
//! - **apply**: optional server-side apply of a built topology
//!
//! Builders are pure: they read the request, backup and cluster spec and
//! return descriptors without touching a cluster.

pub mod apply;
pub mod error;
pub mod job;
pub mod memory;
pub mod naming;
pub mod source;
pub mod strategy;
pub mod topology;
mod volumes;

pub use apply::{submit_topology, KubeApplier, WorkloadApplier};
pub use error::RestoreError;
pub use memory::{xtrabackup_memory_quota, MemoryQuota};
pub use strategy::{build_restore_topology, RestoreStrategy};
pub use topology::RestoreTopology;

/// Port the source pod streams the backup on
pub const SOURCE_PORT: u16 = 3307;

/// Retry ceiling for restore job pods
pub const RESTORE_BACKOFF_LIMIT: i32 = 4;

/// Environment variable carrying the prepare step's memory budget
pub const XB_USE_MEMORY_ENV: &str = "XB_USE_MEMORY";

#[cfg(test)]
pub(crate) mod test_fixtures;
