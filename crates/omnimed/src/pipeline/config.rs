use std::time::Duration;

use crate::config::{Config, PROMPT_CLINICAL_REASONING, PROMPT_VOICE_SUMMARY};

/// Settings the runner and its adapters need, flattened from [`Config`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub default_reasoning_engine: String,
    pub synthesis_engine: String,
    pub reasoning_prompt: String,
    pub summary_prompt: String,
    pub require_document: bool,
    pub pause_before_synthesis: bool,
    pub synthesize_on_reasoning_failure: bool,
    pub max_summary_chars: usize,
    pub session_ttl: Duration,
    pub max_sessions: u64,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_reasoning_engine: config.models.default_reasoning_engine.clone(),
            synthesis_engine: config.models.synthesis_engine.clone(),
            reasoning_prompt: config.prompt(PROMPT_CLINICAL_REASONING).to_string(),
            summary_prompt: config.prompt(PROMPT_VOICE_SUMMARY).to_string(),
            require_document: config.pipeline.require_document,
            pause_before_synthesis: config.pipeline.pause_before_synthesis,
            synthesize_on_reasoning_failure: config.pipeline.synthesize_on_reasoning_failure,
            max_summary_chars: config.pipeline.max_summary_chars,
            session_ttl: Duration::from_secs(config.session.ttl_secs),
            max_sessions: config.session.max_sessions,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
