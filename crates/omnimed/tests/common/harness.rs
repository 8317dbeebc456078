//! Test harness for isolated pipeline runs.
//!
//! `TestHarness` owns a temp directory for uploaded documents and a shared
//! `CallLog` that the scripted capabilities write to, so tests can assert
//! exactly which capabilities ran and what they received.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use omnimed::{
    Capabilities, CapabilityError, CapabilityOutput, Extractor, Pipeline, PipelineConfig,
    Reasoner, ReasoningRequest, Retriever, SynthesisRequest, Synthesizer,
};

/// Canned replies for each capability.
#[derive(Debug, Clone)]
pub struct Script {
    pub extraction: Result<CapabilityOutput, CapabilityError>,
    pub retrieval: Result<CapabilityOutput, CapabilityError>,
    pub reasoning: Result<CapabilityOutput, CapabilityError>,
    pub synthesis: Result<CapabilityOutput, CapabilityError>,
    /// Reasoner answers with the query and document text it was given.
    pub echo_reasoning: bool,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            extraction: Ok(CapabilityOutput::record([("output", "Extracted text")])),
            retrieval: Ok(CapabilityOutput::record([("output", "Clinical context")])),
            reasoning: Ok(CapabilityOutput::record([
                ("final_diagnosis", "Patient has a cold."),
                ("voice_summary", "Bệnh nhân bị cảm lạnh."),
            ])),
            synthesis: Ok(CapabilityOutput::record([("output", "fake_audio.wav")])),
            echo_reasoning: false,
        }
    }
}

impl Script {
    pub fn extraction(mut self, reply: impl Into<CapabilityOutput>) -> Self {
        self.extraction = Ok(reply.into());
        self
    }

    pub fn failing_reasoning(mut self, message: &str) -> Self {
        self.reasoning = Err(CapabilityError::failed("reasoning", message));
        self
    }

    pub fn failing_synthesis(mut self) -> Self {
        self.synthesis = Err(CapabilityError::Unavailable("synthesis"));
        self
    }

    pub fn echo_reasoning(mut self) -> Self {
        self.echo_reasoning = true;
        self
    }
}

/// Every capability call, in the order it happened per capability.
#[derive(Debug, Default)]
pub struct CallLog {
    pub extracted: Mutex<Vec<PathBuf>>,
    pub retrieved: Mutex<Vec<String>>,
    /// Document text the reasoner received.
    pub reasoned: Mutex<Vec<String>>,
    /// Engine id the reasoner was asked to use.
    pub models: Mutex<Vec<String>>,
    pub synthesized: Mutex<Vec<String>>,
    total: AtomicUsize,
}

impl CallLog {
    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn extract_calls(&self) -> usize {
        self.extracted.lock().unwrap().len()
    }

    pub fn retrieve_calls(&self) -> usize {
        self.retrieved.lock().unwrap().len()
    }

    pub fn reason_calls(&self) -> usize {
        self.reasoned.lock().unwrap().len()
    }

    pub fn synthesize_calls(&self) -> usize {
        self.synthesized.lock().unwrap().len()
    }

    fn bump(&self) {
        self.total.fetch_add(1, Ordering::SeqCst);
    }
}

struct ScriptedExtractor {
    reply: Result<CapabilityOutput, CapabilityError>,
    log: Arc<CallLog>,
}

impl Extractor for ScriptedExtractor {
    fn extract(&self, document: &Path) -> Result<CapabilityOutput, CapabilityError> {
        self.log.bump();
        self.log.extracted.lock().unwrap().push(document.to_path_buf());
        self.reply.clone()
    }
}

struct ScriptedRetriever {
    reply: Result<CapabilityOutput, CapabilityError>,
    log: Arc<CallLog>,
}

impl Retriever for ScriptedRetriever {
    fn retrieve(&self, query: &str) -> Result<CapabilityOutput, CapabilityError> {
        self.log.bump();
        self.log.retrieved.lock().unwrap().push(query.to_string());
        self.reply.clone()
    }
}

struct ScriptedReasoner {
    reply: Result<CapabilityOutput, CapabilityError>,
    echo: bool,
    log: Arc<CallLog>,
}

impl Reasoner for ScriptedReasoner {
    fn reason(&self, request: &ReasoningRequest<'_>) -> Result<CapabilityOutput, CapabilityError> {
        self.log.bump();
        self.log
            .reasoned
            .lock()
            .unwrap()
            .push(request.document_text.to_string());
        self.log
            .models
            .lock()
            .unwrap()
            .push(request.model_id.to_string());
        if self.echo {
            let report = format!("{} | {}", request.query, request.document_text);
            return Ok(CapabilityOutput::record([
                ("final_diagnosis", report.as_str()),
                ("voice_summary", request.query),
            ]));
        }
        self.reply.clone()
    }
}

struct ScriptedSynthesizer {
    reply: Result<CapabilityOutput, CapabilityError>,
    log: Arc<CallLog>,
}

impl Synthesizer for ScriptedSynthesizer {
    fn synthesize(
        &self,
        request: &SynthesisRequest<'_>,
    ) -> Result<CapabilityOutput, CapabilityError> {
        self.log.bump();
        self.log
            .synthesized
            .lock()
            .unwrap()
            .push(request.text.to_string());
        self.reply.clone()
    }
}

/// Isolated environment for one integration test.
pub struct TestHarness {
    temp_dir: TempDir,
    pub log: Arc<CallLog>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
            log: Arc::new(CallLog::default()),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes an uploaded document into the temp directory.
    pub fn document(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, contents).expect("Failed to write document");
        path
    }

    pub fn capabilities(&self, script: Script) -> Capabilities {
        Capabilities {
            extractor: Box::new(ScriptedExtractor {
                reply: script.extraction,
                log: Arc::clone(&self.log),
            }),
            retriever: Box::new(ScriptedRetriever {
                reply: script.retrieval,
                log: Arc::clone(&self.log),
            }),
            reasoner: Box::new(ScriptedReasoner {
                reply: script.reasoning,
                echo: script.echo_reasoning,
                log: Arc::clone(&self.log),
            }),
            synthesizer: Box::new(ScriptedSynthesizer {
                reply: script.synthesis,
                log: Arc::clone(&self.log),
            }),
        }
    }

    pub fn pipeline(&self, config: PipelineConfig, script: Script) -> Pipeline {
        Pipeline::new(Arc::new(config), self.capabilities(script))
    }

    pub fn default_pipeline(&self) -> Pipeline {
        self.pipeline(PipelineConfig::default(), Script::default())
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
