//! Orchestration core of a multimodal clinical assistant.
//!
//! A run executes five steps in a fixed order: document extraction, PHI
//! redaction, clinical context retrieval, reasoning and voice synthesis.
//! Model capabilities are injected through the traits in [`capability`];
//! runs can pause before synthesis and be resumed later by session id.

pub mod capability;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod redaction;
pub mod sanitize;
pub mod session;

pub use capability::{
    Capabilities, CapabilityOutput, Extractor, Reasoner, ReasoningRequest, Retriever,
    SynthesisRequest, Synthesizer, VoiceReference,
};
pub use config::{load_config, load_config_from_env, Config};
pub use error::{CapabilityError, ConfigError, OmnimedError, Result};
pub use logging::init_tracing;
pub use pipeline::{
    BroadcastProgress, NoopProgress, Pipeline, PipelineConfig, PipelineError, PipelineInput,
    PipelineState, ProgressEvent, ProgressReporter, Stage,
};
pub use redaction::{redact, redact_with_summary, RedactionSummary};
pub use session::{SessionError, SessionId, SessionSnapshot, SessionStore};
