//! Interfaces to the external model capabilities.
//!
//! The OCR engine, retrieval index, reasoning model and speech synthesizer
//! live outside this crate. Each is consumed through one narrow trait and
//! may answer with either plain text or a small keyed record; adapters in
//! [`crate::pipeline::adapters`] normalize both shapes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CapabilityError;

/// Raw answer of a capability, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapabilityOutput {
    Text(String),
    Record(Map<String, Value>),
}

impl CapabilityOutput {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Builds a record from string pairs, e.g. `[("output", "...")]`.
    pub fn record<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::Record(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect(),
        )
    }

    /// First non-empty string value found under one of `keys`, or the text
    /// itself for the `Text` shape.
    pub fn string_field(&self, keys: &[&str]) -> Option<String> {
        match self {
            CapabilityOutput::Text(text) => Some(text.clone()),
            CapabilityOutput::Record(map) => keys.iter().find_map(|key| match map.get(*key) {
                Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
                _ => None,
            }),
        }
    }

    /// Comma-separated record keys, for error messages.
    pub fn describe_keys(&self) -> String {
        match self {
            CapabilityOutput::Text(_) => "<text>".to_string(),
            CapabilityOutput::Record(map) => map.keys().cloned().collect::<Vec<_>>().join(", "),
        }
    }
}

impl From<String> for CapabilityOutput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for CapabilityOutput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Arguments passed to the reasoning engine.
#[derive(Debug, Clone, Copy)]
pub struct ReasoningRequest<'a> {
    pub query: &'a str,
    pub document_text: &'a str,
    pub context: &'a str,
    pub model_id: &'a str,
    /// Configured system instructions for the clinical report.
    pub instructions: &'a str,
    /// Configured instructions for the spoken summary.
    pub summary_instructions: &'a str,
}

/// Voice-cloning reference; only built when both parts are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceReference<'a> {
    pub audio_path: &'a Path,
    pub transcript: &'a str,
}

/// Arguments passed to the speech synthesizer.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisRequest<'a> {
    pub text: &'a str,
    pub engine_id: &'a str,
    pub reference: Option<VoiceReference<'a>>,
}

/// Optical extraction: document path -> text.
pub trait Extractor: Send + Sync {
    fn extract(&self, document: &Path) -> Result<CapabilityOutput, CapabilityError>;
}

/// Context retrieval: query -> clinical context.
pub trait Retriever: Send + Sync {
    fn retrieve(&self, query: &str) -> Result<CapabilityOutput, CapabilityError>;
}

/// Clinical reasoning: query, document text and context -> report and summary.
pub trait Reasoner: Send + Sync {
    fn reason(&self, request: &ReasoningRequest<'_>) -> Result<CapabilityOutput, CapabilityError>;
}

/// Speech synthesis: text -> audio file path.
pub trait Synthesizer: Send + Sync {
    fn synthesize(&self, request: &SynthesisRequest<'_>)
        -> Result<CapabilityOutput, CapabilityError>;
}

/// The four capabilities a pipeline is built from.
pub struct Capabilities {
    pub extractor: Box<dyn Extractor>,
    pub retriever: Box<dyn Retriever>,
    pub reasoner: Box<dyn Reasoner>,
    pub synthesizer: Box<dyn Synthesizer>,
}
