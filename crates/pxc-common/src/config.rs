//! Environment configuration for the restore crates
//!
//! Provides trait-based access to environment configuration so callers and
//! tests can inject values without touching process-global state.

use crate::DEFAULT_FIELD_MANAGER;

/// Environment variable holding the log filter directive
pub const LOG_FILTER_ENV: &str = "PXC_RESTORE_LOG";

/// Environment variable selecting the log output format (`json` or `text`)
pub const LOG_FORMAT_ENV: &str = "PXC_RESTORE_LOG_FORMAT";

/// Environment variable overriding the server-side apply field manager
pub const FIELD_MANAGER_ENV: &str = "PXC_RESTORE_FIELD_MANAGER";

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event
    #[default]
    Json,
    /// Human-readable lines
    Text,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "plain" => Ok(Self::Text),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

/// Trait for reading restore configuration from the environment
#[cfg_attr(test, mockall::automock)]
pub trait EnvConfig: Send + Sync {
    /// Log filter directive, if set
    fn log_filter(&self) -> Option<String>;

    /// Raw log format value, if set
    fn log_format(&self) -> Option<String>;

    /// Field manager override, if set
    fn field_manager(&self) -> Option<String>;
}

/// Default implementation that reads from environment variables
#[derive(Clone, Default)]
pub struct OsEnvConfig;

impl EnvConfig for OsEnvConfig {
    fn log_filter(&self) -> Option<String> {
        std::env::var(LOG_FILTER_ENV).ok()
    }

    fn log_format(&self) -> Option<String> {
        std::env::var(LOG_FORMAT_ENV).ok()
    }

    fn field_manager(&self) -> Option<String> {
        std::env::var(FIELD_MANAGER_ENV).ok()
    }
}

/// Resolved settings for rendering and submitting restore workloads
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestoreSettings {
    /// Log filter directive (falls back to the built-in default when `None`)
    pub log_filter: Option<String>,
    /// Log output format
    pub log_format: LogFormat,
    /// Field manager used for server-side apply
    pub field_manager: String,
}

impl Default for RestoreSettings {
    fn default() -> Self {
        Self {
            log_filter: None,
            log_format: LogFormat::default(),
            field_manager: DEFAULT_FIELD_MANAGER.to_string(),
        }
    }
}

impl RestoreSettings {
    /// Resolve settings from the given environment
    ///
    /// Unknown log formats fall back to JSON; empty values count as unset.
    pub fn from_env(env: &dyn EnvConfig) -> Self {
        let log_format = env
            .log_format()
            .and_then(|raw| match raw.parse::<LogFormat>() {
                Ok(format) => Some(format),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring {}", LOG_FORMAT_ENV);
                    None
                }
            })
            .unwrap_or_default();

        Self {
            log_filter: env.log_filter().filter(|f| !f.is_empty()),
            log_format,
            field_manager: env
                .field_manager()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_FIELD_MANAGER.to_string()),
        }
    }
}
