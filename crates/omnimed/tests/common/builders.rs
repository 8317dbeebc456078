//! Builders for pipeline settings and config files.

#![allow(dead_code)]

use std::time::Duration;

use omnimed::config::{Config, PROMPT_CLINICAL_REASONING};
use omnimed::PipelineConfig;

/// Builder for `PipelineConfig` instances.
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    pub fn require_document(mut self, value: bool) -> Self {
        self.config.require_document = value;
        self
    }

    pub fn pause_before_synthesis(mut self, value: bool) -> Self {
        self.config.pause_before_synthesis = value;
        self
    }

    pub fn synthesize_on_reasoning_failure(mut self, value: bool) -> Self {
        self.config.synthesize_on_reasoning_failure = value;
        self
    }

    pub fn session_ttl(mut self, ttl: Duration) -> Self {
        self.config.session_ttl = ttl;
        self
    }

    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `Config` values that tests serialize to disk.
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn reasoning_engine(mut self, engine: &str) -> Self {
        self.config.models.default_reasoning_engine = engine.to_string();
        self
    }

    pub fn reasoning_prompt(mut self, prompt: &str) -> Self {
        self.config
            .prompts
            .insert(PROMPT_CLINICAL_REASONING.to_string(), prompt.to_string());
        self
    }

    pub fn require_document(mut self, value: bool) -> Self {
        self.config.pipeline.require_document = value;
        self
    }

    pub fn ttl_secs(mut self, secs: u64) -> Self {
        self.config.session.ttl_secs = secs;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }

    pub fn to_yaml(&self) -> String {
        serde_yaml::to_string(&self.config).expect("Failed to serialize config")
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.config).expect("Failed to serialize config")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
