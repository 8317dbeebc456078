//! Session correlation and the paused-run store.

pub mod store;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use store::{SessionSnapshot, SessionStore};

/// Opaque correlation id of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Fresh random id (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No paused session with id '{0}'")]
    NotFound(String),

    #[error("Session '{0}' expired before it was resumed")]
    Expired(String),

    #[error("Session id '{0}' is already in use")]
    AlreadyExists(String),
}
