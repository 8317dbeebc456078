use std::sync::Arc;

use tracing::{debug, info, info_span, warn};

use crate::capability::Capabilities;
use crate::config::Config;
use crate::sanitize;
use crate::session::{SessionError, SessionId, SessionSnapshot, SessionStore};

use super::adapters;
use super::config::PipelineConfig;
use super::error::PipelineError;
use super::progress::{ProgressEvent, ProgressReporter};
use super::state::{PipelineState, Stage, StepOutput};

pub struct Pipeline {
    config: Arc<PipelineConfig>,
    capabilities: Capabilities,
    sessions: SessionStore,
}

impl Pipeline {
    pub fn new(config: Arc<PipelineConfig>, capabilities: Capabilities) -> Self {
        let sessions = SessionStore::new(config.session_ttl, config.max_sessions);
        Self::with_session_store(config, capabilities, sessions)
    }

    pub fn from_config(config: &Config, capabilities: Capabilities) -> Self {
        Self::new(Arc::new(PipelineConfig::from_config(config)), capabilities)
    }

    pub fn with_session_store(
        config: Arc<PipelineConfig>,
        capabilities: Capabilities,
        sessions: SessionStore,
    ) -> Self {
        Self {
            config,
            capabilities,
            sessions,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Runs every step synchronously and returns the terminal state.
    ///
    /// Capability failures are recorded on the state; only malformed input
    /// is an `Err`.
    pub fn run(
        &self,
        state: PipelineState,
        progress: &dyn ProgressReporter,
    ) -> Result<PipelineState, PipelineError> {
        self.validate(&state)?;
        let state = self.execute(state, Stage::Done, progress);
        Self::report_completed(&state, progress);
        Ok(state)
    }

    /// Runs up to (not including) synthesis and parks the state under its
    /// session id. With pausing disabled this is the same as [`Pipeline::run`].
    pub fn run_until_pause(
        &self,
        state: PipelineState,
        progress: &dyn ProgressReporter,
    ) -> Result<PipelineState, PipelineError> {
        if !self.config.pause_before_synthesis {
            return self.run(state, progress);
        }

        self.validate(&state)?;
        // Claim the id before any step runs. Until the run pauses the claim
        // holds the fresh state, which `resume` refuses.
        self.sessions.insert(SessionSnapshot::new(state.clone()))?;

        let state = self.execute(state, Stage::Synthesis, progress);
        self.sessions.replace(SessionSnapshot::new(state.clone()));

        info!(session_id = %state.session_id(), "Paused before synthesis");
        progress.report(ProgressEvent::Paused {
            session_id: state.session_id().clone(),
            timestamp: chrono::Utc::now(),
        });
        Ok(state)
    }

    /// Finishes a paused run. The session is consumed only when it is
    /// actually waiting for synthesis.
    pub fn resume(
        &self,
        session_id: &SessionId,
        progress: &dyn ProgressReporter,
    ) -> Result<PipelineState, PipelineError> {
        let pending = self
            .sessions
            .get(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        Self::check_paused(session_id, &pending.state)?;

        let snapshot = self.sessions.take(session_id)?;
        if let Err(e) = Self::check_paused(session_id, &snapshot.state) {
            // Replaced between the check and the take
            self.sessions.replace(snapshot);
            return Err(e);
        }

        let state = self.execute(snapshot.state, Stage::Done, progress);
        Self::report_completed(&state, progress);
        Ok(state)
    }

    fn check_paused(session_id: &SessionId, state: &PipelineState) -> Result<(), PipelineError> {
        if state.next_stage() != Stage::Synthesis {
            return Err(PipelineError::InvalidInput(format!(
                "session {} is at stage '{}', expected '{}'",
                session_id,
                state.next_stage(),
                Stage::Synthesis
            )));
        }
        Ok(())
    }

    fn validate(&self, state: &PipelineState) -> Result<(), PipelineError> {
        if state.next_stage() != Stage::Extraction {
            return Err(PipelineError::InvalidInput(format!(
                "run must start from a fresh state, found stage '{}'",
                state.next_stage()
            )));
        }

        let input = state.input();
        if input.query.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "query must not be empty".to_string(),
            ));
        }

        if self.config.require_document {
            match input.document() {
                None => {
                    return Err(PipelineError::MissingDocument(
                        "no document was uploaded".to_string(),
                    ))
                }
                Some(path) if !path.is_file() => {
                    return Err(PipelineError::MissingDocument(format!(
                        "'{}' does not exist",
                        sanitize::redact_path(path)
                    )))
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    /// Runs steps from the state's next stage until `stop` (exclusive).
    fn execute(
        &self,
        mut state: PipelineState,
        stop: Stage,
        progress: &dyn ProgressReporter,
    ) -> PipelineState {
        let input = state.input();
        let _pipeline_span = info_span!("pipeline",
            session_id = %state.session_id(),
            patient = %sanitize::hash_identifier(&input.patient_id),
            document = %sanitize::redact_optional_path(input.document()),
        )
        .entered();

        while state.next_stage() != stop && state.next_stage() != Stage::Done {
            let stage = state.next_stage();
            progress.report(ProgressEvent::stage_started(state.session_id(), stage));
            let output = self.run_step(stage, &state);
            state.apply(output);
        }

        if let Some(error) = state.error() {
            warn!("Run recorded a reasoning failure: {}", error);
        }
        state
    }

    fn run_step(&self, stage: Stage, state: &PipelineState) -> StepOutput {
        let caps = &self.capabilities;
        match stage {
            Stage::Extraction => {
                let _step = info_span!("extraction").entered();
                adapters::extract(caps.extractor.as_ref(), state)
            }
            Stage::Sanitization => {
                let _step = info_span!("sanitization").entered();
                adapters::sanitize(state)
            }
            Stage::Retrieval => {
                let _step = info_span!("retrieval").entered();
                adapters::retrieve(caps.retriever.as_ref(), state)
            }
            Stage::Reasoning => {
                let _step = info_span!("reasoning").entered();
                adapters::reason(caps.reasoner.as_ref(), state, &self.config)
            }
            Stage::Synthesis | Stage::Done => {
                let _step = info_span!("synthesis").entered();
                adapters::synthesize(caps.synthesizer.as_ref(), state, &self.config)
            }
        }
    }

    fn report_completed(state: &PipelineState, progress: &dyn ProgressReporter) {
        debug!(
            session_id = %state.session_id(),
            failed = state.is_failed(),
            has_audio = state.audio_alert().is_some(),
            "Pipeline completed"
        );
        progress.report(ProgressEvent::Completed {
            session_id: state.session_id().clone(),
            failed: state.is_failed(),
            has_audio: state.audio_alert().is_some(),
            timestamp: chrono::Utc::now(),
        });
    }
}
