//! Operator runtime configuration read from the environment

use std::time::Duration;

use crate::{Error, Result};

/// Default metrics port
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Default server-side field manager name
pub const DEFAULT_FIELD_MANAGER: &str = "cache-storage-operator";

/// Default requeue interval while a cluster is still becoming ready
pub const DEFAULT_REQUEUE_INTERVAL_SECS: u64 = 30;

/// Runtime configuration for the operator process
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperatorConfig {
    /// Port for the metrics and health server (`METRICS_PORT`)
    pub metrics_port: u16,
    /// Restrict the watch to one namespace (`WATCH_NAMESPACE`); all namespaces if unset
    pub watch_namespace: Option<String>,
    /// Field manager recorded on created objects (`FIELD_MANAGER`)
    pub field_manager: String,
    /// Requeue interval for clusters that are not yet ready (`REQUEUE_INTERVAL_SECS`)
    pub requeue_interval: Duration,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            metrics_port: DEFAULT_METRICS_PORT,
            watch_namespace: None,
            field_manager: DEFAULT_FIELD_MANAGER.to_string(),
            requeue_interval: Duration::from_secs(DEFAULT_REQUEUE_INTERVAL_SECS),
        }
    }
}

impl OperatorConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = non_empty(lookup("METRICS_PORT")) {
            config.metrics_port = port.parse().map_err(|e| {
                Error::ConfigError(format!("METRICS_PORT '{}' is not a valid port: {}", port, e))
            })?;
        }

        config.watch_namespace = non_empty(lookup("WATCH_NAMESPACE"));

        if let Some(manager) = non_empty(lookup("FIELD_MANAGER")) {
            config.field_manager = manager;
        }

        if let Some(secs) = non_empty(lookup("REQUEUE_INTERVAL_SECS")) {
            let secs: u64 = secs.parse().map_err(|e| {
                Error::ConfigError(format!(
                    "REQUEUE_INTERVAL_SECS '{}' is not a valid number: {}",
                    secs, e
                ))
            })?;
            if secs == 0 {
                return Err(Error::ConfigError(
                    "REQUEUE_INTERVAL_SECS must be >= 1".to_string(),
                ));
            }
            config.requeue_interval = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
