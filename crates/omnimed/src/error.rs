use std::path::PathBuf;
use thiserror::Error;

use crate::pipeline::PipelineError;
use crate::session::SessionError;

#[derive(Error, Debug)]
pub enum OmnimedError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Failed to parse config YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Unsupported config file extension: '{0}'")]
    UnsupportedFormat(String),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

/// Failure reported by (or on behalf of) an external model capability.
///
/// These never leave an adapter: the adapter turns them into sentinel
/// field values on the pipeline state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("{capability} failed: {message}")]
    Failed {
        capability: &'static str,
        message: String,
    },

    #[error("{0} is unavailable")]
    Unavailable(&'static str),

    #[error("{capability} returned an unrecognised record (keys: {keys})")]
    Malformed {
        capability: &'static str,
        keys: String,
    },

    #[error("{capability} panicked: {message}")]
    Panicked {
        capability: &'static str,
        message: String,
    },
}

impl CapabilityError {
    pub fn failed(capability: &'static str, message: impl Into<String>) -> Self {
        Self::Failed {
            capability,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OmnimedError>;
