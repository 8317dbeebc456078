//! Step adapters: one per pipeline stage.
//!
//! Each adapter reads the state it needs, calls at most one capability and
//! returns only the fields its stage owns. Capability errors and panics are
//! turned into sentinel values here and never reach the runner.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use tracing::{debug, warn};

use super::config::PipelineConfig;
use super::sentinel;
use super::state::{PipelineState, StepOutput};
use crate::capability::{
    CapabilityOutput, Extractor, Reasoner, ReasoningRequest, Retriever, SynthesisRequest,
    Synthesizer,
};
use crate::error::CapabilityError;
use crate::redaction;
use crate::sanitize;

const TEXT_KEYS: &[&str] = &["output", "text", "result"];
const REPORT_KEYS: &[&str] = &["final_diagnosis", "report"];
const SUMMARY_KEYS: &[&str] = &["voice_summary", "summary"];
const AUDIO_KEYS: &[&str] = &["output", "audio_path", "path"];

/// Calls a capability, converting a panic into a `CapabilityError`.
fn contain<F>(capability: &'static str, call: F) -> Result<CapabilityOutput, CapabilityError>
where
    F: FnOnce() -> Result<CapabilityOutput, CapabilityError>,
{
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(CapabilityError::Panicked {
                capability,
                message,
            })
        }
    }
}

fn text_field(
    capability: &'static str,
    output: &CapabilityOutput,
    keys: &[&str],
) -> Result<String, CapabilityError> {
    output
        .string_field(keys)
        .ok_or_else(|| CapabilityError::Malformed {
            capability,
            keys: output.describe_keys(),
        })
}

pub fn extract(extractor: &dyn Extractor, state: &PipelineState) -> StepOutput {
    let Some(document) = state.input().document() else {
        debug!("No document attached, skipping extraction");
        return StepOutput::Extraction {
            extracted_text: sentinel::NO_DOCUMENT.to_string(),
        };
    };

    if !document.is_file() {
        warn!(
            "Document {} does not exist, treating as no document",
            sanitize::redact_path(document)
        );
        return StepOutput::Extraction {
            extracted_text: sentinel::NO_DOCUMENT.to_string(),
        };
    }

    let result = contain("extraction", || extractor.extract(document))
        .and_then(|output| text_field("extraction", &output, TEXT_KEYS));

    let extracted_text = match result {
        Ok(text) => {
            debug!("Extracted {} chars", text.chars().count());
            text
        }
        Err(e) => {
            warn!("Extraction failed: {}", e);
            sentinel::failure("Document extraction", e)
        }
    };

    StepOutput::Extraction { extracted_text }
}

pub fn sanitize(state: &PipelineState) -> StepOutput {
    // Sentinels are redacted too: failure text can quote the document.
    // Placeholders never touch the sentinel prefixes.
    let extracted = state.extracted_text().unwrap_or(sentinel::NO_DOCUMENT);
    let summary = redaction::redact_with_summary(extracted);
    debug!(
        phones = summary.phones,
        emails = summary.emails,
        national_ids = summary.national_ids,
        dates = summary.dates,
        preview = %sanitize::preview(&summary.text, 60),
        "Redacted extracted text"
    );

    StepOutput::Sanitization {
        sanitized_text: summary.text,
    }
}

pub fn retrieve(retriever: &dyn Retriever, state: &PipelineState) -> StepOutput {
    let query = state.input().query.trim();
    if query.is_empty() || sentinel::is_sentinel(query) {
        return StepOutput::Retrieval {
            retrieved_context: sentinel::CONTEXT_UNAVAILABLE.to_string(),
        };
    }

    let result = contain("retrieval", || retriever.retrieve(query))
        .and_then(|output| text_field("retrieval", &output, TEXT_KEYS));

    let retrieved_context = match result {
        Ok(context) => context,
        Err(e) => {
            warn!("Retrieval failed: {}", e);
            sentinel::CONTEXT_UNAVAILABLE.to_string()
        }
    };

    StepOutput::Retrieval { retrieved_context }
}

pub fn reason(reasoner: &dyn Reasoner, state: &PipelineState, config: &PipelineConfig) -> StepOutput {
    let input = state.input();
    let model_id = input
        .llm_model_id
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(config.default_reasoning_engine.as_str());

    let request = ReasoningRequest {
        query: &input.query,
        document_text: state.sanitized_text().unwrap_or(sentinel::NO_DOCUMENT),
        context: state
            .retrieved_context()
            .unwrap_or(sentinel::CONTEXT_UNAVAILABLE),
        model_id,
        instructions: &config.reasoning_prompt,
        summary_instructions: &config.summary_prompt,
    };

    let result = contain("reasoning", || reasoner.reason(&request))
        .and_then(|output| normalize_report(&output, config.max_summary_chars));

    match result {
        Ok((report, voice_summary)) => StepOutput::Reasoning {
            report,
            voice_summary,
            error: None,
        },
        Err(e) => {
            warn!(model = model_id, "Reasoning failed: {}", e);
            let fallback = sentinel::failure("Clinical reasoning", &e);
            StepOutput::Reasoning {
                report: fallback.clone(),
                voice_summary: fallback,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Splits a reasoning answer into report and spoken summary.
fn normalize_report(
    output: &CapabilityOutput,
    max_summary_chars: usize,
) -> Result<(String, String), CapabilityError> {
    match output {
        CapabilityOutput::Text(text) => {
            if text.trim().is_empty() {
                return Err(CapabilityError::failed("reasoning", "empty response"));
            }
            Ok((text.clone(), first_sentence(text, max_summary_chars)))
        }
        CapabilityOutput::Record(_) => {
            let report = text_field("reasoning", output, REPORT_KEYS)?;
            let summary = output
                .string_field(SUMMARY_KEYS)
                .unwrap_or_else(|| first_sentence(&report, max_summary_chars));
            Ok((report, summary))
        }
    }
}

/// First sentence of `text`, cut to at most `max_chars` characters.
fn first_sentence(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    let end = text
        .char_indices()
        .find(|(_, c)| matches!(c, '.' | '!' | '?' | '\n'))
        .map(|(i, c)| if c == '\n' { i } else { i + c.len_utf8() })
        .unwrap_or(text.len());
    text[..end].trim().chars().take(max_chars).collect()
}

pub fn synthesize(
    synthesizer: &dyn Synthesizer,
    state: &PipelineState,
    config: &PipelineConfig,
) -> StepOutput {
    let skipped = StepOutput::Synthesis {
        audio_alert_path: None,
    };

    let Some(summary) = state.voice_summary().filter(|s| !s.trim().is_empty()) else {
        debug!("No voice summary, skipping synthesis");
        return skipped;
    };

    if state.is_failed() && !config.synthesize_on_reasoning_failure {
        debug!("Reasoning failed, skipping synthesis");
        return skipped;
    }

    if sentinel::is_failure(summary) && !state.is_failed() {
        return skipped;
    }

    let reference = state.input().voice_reference();
    if reference.is_none() && state.input().reference_audio_path.is_some() {
        debug!("Reference audio without transcript, voice cloning disabled");
    }

    let request = SynthesisRequest {
        text: summary,
        engine_id: &config.synthesis_engine,
        reference,
    };

    let result = contain("synthesis", || synthesizer.synthesize(&request))
        .and_then(|output| text_field("synthesis", &output, AUDIO_KEYS));

    match result {
        Ok(path) if !path.trim().is_empty() => StepOutput::Synthesis {
            audio_alert_path: Some(PathBuf::from(path.trim())),
        },
        Ok(_) => {
            warn!("Synthesis returned an empty audio path");
            skipped
        }
        Err(e) => {
            warn!("Synthesis failed: {}", e);
            skipped
        }
    }
}
