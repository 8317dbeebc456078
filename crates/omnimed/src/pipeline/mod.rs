pub mod adapters;
pub mod config;
pub mod error;
pub mod progress;
pub mod runner;
pub mod sentinel;
pub mod state;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use progress::{BroadcastProgress, NoopProgress, ProgressEvent, ProgressReporter};
pub use runner::Pipeline;
pub use state::{PipelineInput, PipelineState, Stage, StepOutput};
