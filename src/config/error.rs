//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// A single rule broken by a configuration value.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigViolation {
    #[error("'{field}' must be finite and non-negative (got {value})")]
    Negative { field: &'static str, value: f32 },

    #[error("'{field}' must be finite and positive (got {value})")]
    NotPositive { field: &'static str, value: f32 },

    #[error("'{field}' must lie within [0, 1] (got {value})")]
    OutsideUnitRange { field: &'static str, value: f32 },

    #[error("'{field}' must be at least {min} (got {value})")]
    TooSmall {
        field: &'static str,
        value: u64,
        min: u64,
    },
}

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Every violation found, not just the first
    #[error("Invalid configuration: {}", describe(.violations))]
    Invalid { violations: Vec<ConfigViolation> },
}

fn describe(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
