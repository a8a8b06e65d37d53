// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod database;
pub mod error;
pub mod exporter;
pub mod extractor;
pub mod intake;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod tagging;
pub mod utils;

pub use config::{Config, ExtractionConfig, PipelineConfig, TaggingConfig};
pub use database::{
    ConfigRuleSource, DocumentStore, GraphStore, InMemoryDocumentStore, InMemoryGraphStore,
    InMemoryTagStore, RewriteRuleSource, TagStore, ViewHandle,
};
pub use error::{PipelineError, Result, StoreError};
pub use exporter::{ExportManifest, JsonExporter};
pub use extractor::{ExtractorSet, ObservableAggregator, TldSet, normalize_url};
pub use intake::{FileClassifier, FileScanner, ScannedFile};
pub use models::{
    Document, DocumentFile, DocumentMetadata, DocumentStatus, Observable, ObservableType, Source,
    Tag, TagFacet,
};
pub use parser::{ContentExtractor, PlainTextExtractor};
pub use pipeline::{
    AnalysisReport, Collaborators, DocumentAnalyzer, FileProcessor, PipelineOrchestrator,
    PipelineStats, ProgressTracker,
};
pub use tagging::{ResolutionCache, TagResolver};
