// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

mod analyzer;
mod orchestrator;
mod processor;
mod progress;

pub use analyzer::{AnalysisReport, Collaborators, DocumentAnalyzer};
pub use orchestrator::{PipelineOrchestrator, PipelineRun};
pub use processor::{
    AnalysisRun, FileOutcome, FileProcessor, FileReport, parse_metadata_date, with_timeout,
};
pub use progress::{PipelineStats, ProgressTracker};
