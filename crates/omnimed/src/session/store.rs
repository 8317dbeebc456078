//! In-memory store of paused pipeline runs, keyed by session id.
//!
//! Entries expire after the configured TTL. A paused run that is evicted
//! for capacity or expiry can no longer be resumed; the caller gets a
//! lookup error and must start a new run.

use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::sync::Cache;
use serde::{Deserialize, Serialize};

use super::{SessionError, SessionId};
use crate::config::SessionConfig;
use crate::pipeline::PipelineState;

/// A run suspended at the synthesis boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub state: PipelineState,
    pub paused_at: DateTime<Utc>,
}

impl SessionSnapshot {
    pub fn new(state: PipelineState) -> Self {
        Self {
            session_id: state.session_id().clone(),
            state,
            paused_at: Utc::now(),
        }
    }
}

pub struct SessionStore {
    cache: Cache<SessionId, SessionSnapshot>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration, max_sessions: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_sessions)
            .time_to_live(ttl)
            .build();
        Self { cache, ttl }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(Duration::from_secs(config.ttl_secs), config.max_sessions)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Stores a paused run. Fails if the id already holds a live session,
    /// so one id can never mix two different runs.
    pub fn insert(&self, snapshot: SessionSnapshot) -> Result<(), SessionError> {
        let id = snapshot.session_id.clone();
        let entry = self.cache.entry(id.clone()).or_insert_with(|| snapshot);
        if !entry.is_fresh() {
            log::warn!("Refusing to overwrite live session {}", id);
            return Err(SessionError::AlreadyExists(id.to_string()));
        }
        log::debug!("Stored paused session {}", id);
        Ok(())
    }

    /// Overwrites the snapshot for an id the caller has already claimed
    /// with [`SessionStore::insert`].
    pub fn replace(&self, snapshot: SessionSnapshot) {
        log::debug!("Updated session {}", snapshot.session_id);
        self.cache.insert(snapshot.session_id.clone(), snapshot);
    }

    /// Removes and returns a paused run. A session can be taken once.
    pub fn take(&self, id: &SessionId) -> Result<SessionSnapshot, SessionError> {
        let snapshot = self
            .cache
            .remove(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;

        if let Ok(elapsed) = (Utc::now() - snapshot.paused_at).to_std() {
            if elapsed >= self.ttl {
                log::info!("Session {} expired after {:?}", id, elapsed);
                return Err(SessionError::Expired(id.to_string()));
            }
        }

        log::debug!("Resuming session {}", id);
        Ok(snapshot)
    }

    /// Read-only peek at a paused run.
    pub fn get(&self, id: &SessionId) -> Option<SessionSnapshot> {
        self.cache.get(id)
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.cache.contains_key(id)
    }

    /// Drops a paused run without resuming it.
    pub fn discard(&self, id: &SessionId) {
        self.cache.invalidate(id);
    }

    /// Number of live sessions (runs pending maintenance first).
    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}
