use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const CONFIG_VERSION: &str = "1.0";
pub const DEFAULT_REASONING_ENGINE: &str = "medgemma-4b-it";
pub const DEFAULT_SYNTHESIS_ENGINE: &str = "voxcpm-0.5b";

/// Prompt name for the clinical report instructions.
pub const PROMPT_CLINICAL_REASONING: &str = "clinical_reasoning";
/// Prompt name for the spoken summary instructions.
pub const PROMPT_VOICE_SUMMARY: &str = "voice_summary";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default = "default_prompts")]
    pub prompts: HashMap<String, String>,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Returns the named prompt, or an empty string when it is not configured.
    pub fn prompt(&self, name: &str) -> &str {
        self.prompts.get(name).map(String::as_str).unwrap_or("")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            models: ModelsConfig::default(),
            prompts: default_prompts(),
            pipeline: PipelineSettings::default(),
            session: SessionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_version() -> String {
    CONFIG_VERSION.to_string()
}

fn default_prompts() -> HashMap<String, String> {
    HashMap::from([
        (
            PROMPT_CLINICAL_REASONING.to_string(),
            "You are a clinical assistant. Answer the doctor's request using only the \
             document text and the retrieved clinical context. Identifiers have been \
             masked; never try to restore them."
                .to_string(),
        ),
        (
            PROMPT_VOICE_SUMMARY.to_string(),
            "Summarize the key finding in one short spoken sentence.".to_string(),
        ),
    ])
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Used when the caller does not pick a reasoning engine.
    #[serde(default = "default_reasoning_engine")]
    pub default_reasoning_engine: String,
    #[serde(default = "default_synthesis_engine")]
    pub synthesis_engine: String,
}

fn default_reasoning_engine() -> String {
    DEFAULT_REASONING_ENGINE.to_string()
}

fn default_synthesis_engine() -> String {
    DEFAULT_SYNTHESIS_ENGINE.to_string()
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            default_reasoning_engine: default_reasoning_engine(),
            synthesis_engine: default_synthesis_engine(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Reject runs without an existing document before any step executes.
    #[serde(default)]
    pub require_document: bool,
    /// Stop before synthesis in `run_until_pause` and wait for `resume`.
    #[serde(default = "default_true")]
    pub pause_before_synthesis: bool,
    /// Synthesize the fallback text when reasoning failed.
    #[serde(default)]
    pub synthesize_on_reasoning_failure: bool,
    /// Upper bound for a summary derived from a plain-text report.
    #[serde(default = "default_max_summary_chars")]
    pub max_summary_chars: usize,
}

fn default_true() -> bool {
    true
}

fn default_max_summary_chars() -> usize {
    280
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            require_document: false,
            pause_before_synthesis: true,
            synthesize_on_reasoning_failure: false,
            max_summary_chars: default_max_summary_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: u64,
}

fn default_ttl_secs() -> u64 {
    900
}

fn default_max_sessions() -> u64 {
    1024
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_sessions: default_max_sessions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}
