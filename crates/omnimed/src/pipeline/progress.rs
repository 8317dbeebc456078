use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use super::state::Stage;
use crate::session::SessionId;

/// Events emitted by the pipeline while a run advances.
/// Field values (document text, report) are never part of an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    StageStarted {
        session_id: SessionId,
        stage: Stage,
        message: String,
        timestamp: DateTime<Utc>,
    },
    Paused {
        session_id: SessionId,
        timestamp: DateTime<Utc>,
    },
    Completed {
        session_id: SessionId,
        failed: bool,
        has_audio: bool,
        timestamp: DateTime<Utc>,
    },
}

impl ProgressEvent {
    pub fn session_id(&self) -> &SessionId {
        match self {
            ProgressEvent::StageStarted { session_id, .. }
            | ProgressEvent::Paused { session_id, .. }
            | ProgressEvent::Completed { session_id, .. } => session_id,
        }
    }

    pub(crate) fn stage_started(session_id: &SessionId, stage: Stage) -> Self {
        let message = match stage {
            Stage::Extraction => "Reading the uploaded document...",
            Stage::Sanitization => "Masking personal identifiers...",
            Stage::Retrieval => "Searching clinical records...",
            Stage::Reasoning => "Preparing the clinical report...",
            Stage::Synthesis => "Recording the voice alert...",
            Stage::Done => "Done",
        };
        ProgressEvent::StageStarted {
            session_id: session_id.clone(),
            stage,
            message: message.to_string(),
            timestamp: Utc::now(),
        }
    }
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests and batch callers.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Fans progress events out to any number of subscribers (e.g. a UI stream).
#[derive(Clone)]
pub struct BroadcastProgress {
    sender: broadcast::Sender<ProgressEvent>,
}

impl BroadcastProgress {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastProgress {
    fn default() -> Self {
        Self::new(256)
    }
}

impl ProgressReporter for BroadcastProgress {
    fn report(&self, event: ProgressEvent) {
        // No active receivers is fine
        let _ = self.sender.send(event);
    }
}
