//! Common types for the PXC restore crates: CRDs, quantities, configuration and logging

#![deny(missing_docs)]

pub mod config;
pub mod crd;
pub mod quantity;
pub mod telemetry;

pub use quantity::{ParsedQuantity, QuantityError, QuantityFormat};

/// Default field manager for server-side apply of restore workloads
pub const DEFAULT_FIELD_MANAGER: &str = "pxc-restore";
