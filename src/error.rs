//! Error types for fence authoring and configuration loading.

use std::path::PathBuf;

use thiserror::Error;

use crate::crossing::{FenceId, MAX_FENCES};

/// Rejected fence definitions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FenceError {
    #[error("at most {max} fences are supported, got {count}")]
    TooMany { count: usize, max: usize },

    #[error("fence {id} has a non-finite endpoint")]
    NonFinite { id: FenceId },
}

impl FenceError {
    pub(crate) fn too_many(count: usize) -> Self {
        Self::TooMany {
            count,
            max: MAX_FENCES,
        }
    }
}

/// Failure to load or validate a counter configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error(transparent)]
    Fence(#[from] FenceError),
}
