//! Logging initialization
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and either
//! JSON or human-readable output, driven by [`RestoreSettings`].

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, RestoreSettings};

/// Filter used when no directive is configured
pub const DEFAULT_LOG_FILTER: &str = "info,pxc_restore=debug,kube=info,tower=warn,hyper=warn";

/// Errors that can occur during logging initialization
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured filter directive is invalid
    #[error("invalid log filter '{filter}': {message}")]
    InvalidFilter {
        /// The rejected directive
        filter: String,
        /// Parser message
        message: String,
    },

    /// Failed to install the global subscriber
    #[error("failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Build the filter for the given settings
pub fn build_filter(settings: &RestoreSettings) -> Result<EnvFilter, TelemetryError> {
    let directive = settings.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER);
    EnvFilter::try_new(directive).map_err(|e| TelemetryError::InvalidFilter {
        filter: directive.to_string(),
        message: e.to_string(),
    })
}

/// Install the global tracing subscriber
///
/// Fails if a subscriber is already installed.
pub fn init_tracing(settings: &RestoreSettings) -> Result<(), TelemetryError> {
    let filter = build_filter(settings)?;

    let result = match settings.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init(),
    };

    result.map_err(|e| TelemetryError::SubscriberInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_is_valid() {
        assert!(build_filter(&RestoreSettings::default()).is_ok());
    }

    #[test]
    fn custom_filter_is_used() {
        let settings = RestoreSettings {
            log_filter: Some("pxc_restore=trace".to_string()),
            ..Default::default()
        };
        let filter = build_filter(&settings).unwrap();
        assert!(filter.to_string().contains("pxc_restore=trace"));
    }

    #[test]
    fn invalid_filter_is_rejected() {
        let settings = RestoreSettings {
            log_filter: Some("pxc_restore=notalevel".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            build_filter(&settings),
            Err(TelemetryError::InvalidFilter { .. })
        ));
    }
}
