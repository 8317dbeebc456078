use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::capability::VoiceReference;
use crate::session::SessionId;

/// Pipeline steps in execution order. `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extraction,
    Sanitization,
    Retrieval,
    Reasoning,
    Synthesis,
    Done,
}

impl Stage {
    pub fn next(self) -> Stage {
        match self {
            Stage::Extraction => Stage::Sanitization,
            Stage::Sanitization => Stage::Retrieval,
            Stage::Retrieval => Stage::Reasoning,
            Stage::Reasoning => Stage::Synthesis,
            Stage::Synthesis | Stage::Done => Stage::Done,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Extraction => "extraction",
            Stage::Sanitization => "sanitization",
            Stage::Retrieval => "retrieval",
            Stage::Reasoning => "reasoning",
            Stage::Synthesis => "synthesis",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Caller-supplied inputs. Fixed for the lifetime of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineInput {
    pub query: String,
    pub patient_id: String,
    pub document_path: Option<PathBuf>,
    pub reference_audio_path: Option<PathBuf>,
    pub reference_transcript: Option<String>,
    /// Reasoning engine selector; the configured default is used when `None`.
    pub llm_model_id: Option<String>,
}

impl PipelineInput {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_patient(mut self, patient_id: impl Into<String>) -> Self {
        self.patient_id = patient_id.into();
        self
    }

    pub fn with_document(mut self, path: impl Into<PathBuf>) -> Self {
        self.document_path = Some(path.into());
        self
    }

    pub fn with_voice_reference(
        mut self,
        audio_path: impl Into<PathBuf>,
        transcript: impl Into<String>,
    ) -> Self {
        self.reference_audio_path = Some(audio_path.into());
        self.reference_transcript = Some(transcript.into());
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.llm_model_id = Some(model_id.into());
        self
    }

    /// Document path, treating an empty path as absent.
    pub fn document(&self) -> Option<&Path> {
        self.document_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Cloning reference, only when both audio and transcript are given.
    pub fn voice_reference(&self) -> Option<VoiceReference<'_>> {
        let audio_path = self
            .reference_audio_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())?;
        let transcript = self
            .reference_transcript
            .as_deref()
            .filter(|t| !t.trim().is_empty())?;
        Some(VoiceReference {
            audio_path,
            transcript,
        })
    }
}

/// Fields owned by one step, returned by that step and merged by the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutput {
    Extraction {
        extracted_text: String,
    },
    Sanitization {
        sanitized_text: String,
    },
    Retrieval {
        retrieved_context: String,
    },
    Reasoning {
        report: String,
        voice_summary: String,
        error: Option<String>,
    },
    Synthesis {
        audio_alert_path: Option<PathBuf>,
    },
}

impl StepOutput {
    pub fn stage(&self) -> Stage {
        match self {
            StepOutput::Extraction { .. } => Stage::Extraction,
            StepOutput::Sanitization { .. } => Stage::Sanitization,
            StepOutput::Retrieval { .. } => Stage::Retrieval,
            StepOutput::Reasoning { .. } => Stage::Reasoning,
            StepOutput::Synthesis { .. } => Stage::Synthesis,
        }
    }
}

/// The record threaded through every step of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineState {
    session_id: SessionId,
    input: PipelineInput,
    next_stage: Stage,

    // Extraction
    extracted_text: Option<String>,
    // Sanitization
    sanitized_text: Option<String>,
    // Retrieval
    retrieved_context: Option<String>,
    // Reasoning
    report: Option<String>,
    voice_summary: Option<String>,
    // Synthesis; stays None unless synthesis succeeded
    audio_alert_path: Option<PathBuf>,

    // Set by reasoning failure only; never cleared
    error: Option<String>,
}

impl PipelineState {
    /// Fresh state with a generated session id.
    pub fn new(input: PipelineInput) -> Self {
        Self::with_session(input, SessionId::generate())
    }

    pub fn with_session(input: PipelineInput, session_id: SessionId) -> Self {
        Self {
            session_id,
            input,
            next_stage: Stage::Extraction,
            extracted_text: None,
            sanitized_text: None,
            retrieved_context: None,
            report: None,
            voice_summary: None,
            audio_alert_path: None,
            error: None,
        }
    }

    /// Merges the fields a step owns. Only the runner calls this.
    pub(crate) fn apply(&mut self, output: StepOutput) {
        self.next_stage = output.stage().next();
        match output {
            StepOutput::Extraction { extracted_text } => {
                self.extracted_text = Some(extracted_text);
            }
            StepOutput::Sanitization { sanitized_text } => {
                self.sanitized_text = Some(sanitized_text);
            }
            StepOutput::Retrieval { retrieved_context } => {
                self.retrieved_context = Some(retrieved_context);
            }
            StepOutput::Reasoning {
                report,
                voice_summary,
                error,
            } => {
                self.report = Some(report);
                self.voice_summary = Some(voice_summary);
                if self.error.is_none() {
                    self.error = error;
                }
            }
            StepOutput::Synthesis { audio_alert_path } => {
                self.audio_alert_path = audio_alert_path;
            }
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn input(&self) -> &PipelineInput {
        &self.input
    }

    /// The next step to run; `Stage::Done` once the run is complete.
    pub fn next_stage(&self) -> Stage {
        self.next_stage
    }

    pub fn is_complete(&self) -> bool {
        self.next_stage == Stage::Done
    }

    pub fn extracted_text(&self) -> Option<&str> {
        self.extracted_text.as_deref()
    }

    pub fn sanitized_text(&self) -> Option<&str> {
        self.sanitized_text.as_deref()
    }

    pub fn retrieved_context(&self) -> Option<&str> {
        self.retrieved_context.as_deref()
    }

    pub fn report(&self) -> Option<&str> {
        self.report.as_deref()
    }

    pub fn voice_summary(&self) -> Option<&str> {
        self.voice_summary.as_deref()
    }

    pub fn audio_alert(&self) -> Option<&Path> {
        self.audio_alert_path.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True when reasoning failed; partial results remain readable.
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        let mut stage = Stage::Extraction;
        let mut seen = vec![stage];
        while stage != Stage::Done {
            stage = stage.next();
            seen.push(stage);
        }
        assert_eq!(
            seen,
            vec![
                Stage::Extraction,
                Stage::Sanitization,
                Stage::Retrieval,
                Stage::Reasoning,
                Stage::Synthesis,
                Stage::Done,
            ]
        );
        assert_eq!(Stage::Done.next(), Stage::Done);
    }

    #[test]
    fn test_voice_reference_requires_both_parts() {
        let only_audio = PipelineInput {
            reference_audio_path: Some(PathBuf::from("ref.wav")),
            ..PipelineInput::new("q")
        };
        assert!(only_audio.voice_reference().is_none());

        let only_text = PipelineInput {
            reference_transcript: Some("xin chào".to_string()),
            ..PipelineInput::new("q")
        };
        assert!(only_text.voice_reference().is_none());

        let blank_text = PipelineInput::new("q").with_voice_reference("ref.wav", "  ");
        assert!(blank_text.voice_reference().is_none());

        let both = PipelineInput::new("q").with_voice_reference("ref.wav", "xin chào");
        let reference = both.voice_reference().unwrap();
        assert_eq!(reference.audio_path, Path::new("ref.wav"));
        assert_eq!(reference.transcript, "xin chào");
    }

    #[test]
    fn test_empty_document_path_is_absent() {
        let input = PipelineInput::new("q").with_document("");
        assert!(input.document().is_none());
    }

    #[test]
    fn test_apply_writes_owned_fields_and_advances() {
        let mut state = PipelineState::new(PipelineInput::new("q"));
        state.apply(StepOutput::Extraction {
            extracted_text: "text".to_string(),
        });
        assert_eq!(state.extracted_text(), Some("text"));
        assert_eq!(state.next_stage(), Stage::Sanitization);
        assert!(state.sanitized_text().is_none());
    }

    #[test]
    fn test_error_is_never_cleared() {
        let mut state = PipelineState::new(PipelineInput::new("q"));
        state.apply(StepOutput::Reasoning {
            report: "r".to_string(),
            voice_summary: "s".to_string(),
            error: Some("boom".to_string()),
        });
        state.apply(StepOutput::Synthesis {
            audio_alert_path: None,
        });
        assert_eq!(state.error(), Some("boom"));
        assert!(state.is_failed());
        assert!(state.is_complete());
    }
}
