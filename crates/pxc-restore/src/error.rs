//! Restore-specific error types

use pxc_common::QuantityError;

/// Errors returned while building or submitting a restore topology
#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    #[error("backup '{backup}' has no object-store status")]
    MissingObjectStoreStatus { backup: String },

    #[error("backup '{backup}' object-store status has no {field}")]
    IncompleteObjectStoreStatus { backup: String, field: &'static str },

    #[error("missing namespace on {kind} '{name}'")]
    MissingNamespace { kind: &'static str, name: String },

    #[error("invalid memory quantity '{value}': {source}")]
    InvalidMemory {
        value: String,
        source: QuantityError,
    },

    #[error("kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
