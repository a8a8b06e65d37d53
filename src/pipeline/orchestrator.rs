// file: src/pipeline/orchestrator.rs
// description: coordinates concurrent analysis of many documents
// reference: one worker per document, bounded by the configured worker count

use crate::config::Config;
use crate::models::DocumentStatus;
use crate::pipeline::analyzer::{AnalysisReport, DocumentAnalyzer};
use crate::pipeline::progress::{PipelineStats, ProgressTracker};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

pub struct PipelineOrchestrator {
    analyzer: Arc<DocumentAnalyzer>,
    max_concurrent_tasks: usize,
    show_progress: bool,
    colored: bool,
}

pub struct PipelineRun {
    pub stats: PipelineStats,
    pub reports: Vec<AnalysisReport>,
}

impl PipelineOrchestrator {
    pub fn new(config: &Config, analyzer: DocumentAnalyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            max_concurrent_tasks: config.pipeline.parallel_workers.max(1),
            show_progress: false,
            colored: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool, colored: bool) -> Self {
        self.show_progress = show_progress;
        self.colored = colored;
        self
    }

    /// Analyzes every document. Each analysis loads its own rewrite rules
    /// and resolution cache; no ordering holds between documents.
    pub async fn run(&self, document_ids: Vec<Uuid>) -> PipelineRun {
        if document_ids.is_empty() {
            warn!("No documents to analyze");
            return PipelineRun {
                stats: PipelineStats::new(),
                reports: Vec::new(),
            };
        }

        info!(
            "Analyzing {} documents with {} concurrent tasks",
            document_ids.len(),
            self.max_concurrent_tasks
        );

        let progress = Arc::new(if self.show_progress {
            ProgressTracker::with_color(document_ids.len(), self.colored)
        } else {
            ProgressTracker::hidden(document_ids.len())
        });
        // At most max_concurrent_tasks analyses in flight.
        let tasks = document_ids.into_iter().map(|document_id| {
            let analyzer = self.analyzer.clone();
            let progress = progress.clone();

            async move {
                progress.set_message(format!("Analyzing {}", document_id));
                let result = analyzer.analyze(document_id).await;

                match result {
                    Ok(report) => {
                        record(&progress, &report);
                        Some(report)
                    }
                    Err(e) => {
                        progress.inc_documents_failed();
                        error!(document_id = %document_id, "Document analysis failed: {}", e);
                        None
                    }
                }
            }
        });

        let reports: Vec<AnalysisReport> = stream::iter(tasks)
            .buffer_unordered(self.max_concurrent_tasks)
            .filter_map(|report| async move { report })
            .collect()
            .await;

        let stats = progress.get_stats();
        progress.finish();
        log_final_stats(&stats);

        PipelineRun { stats, reports }
    }
}

fn record(progress: &ProgressTracker, report: &AnalysisReport) {
    if report.was_skipped() {
        progress.inc_documents_skipped();
        return;
    }

    progress.add_files(report.files_processed(), report.files_failed());
    progress.add_observables(report.observables.len());
    progress.add_tags(report.tags_attached);

    if report.status == DocumentStatus::Registered {
        progress.inc_documents_registered();
    } else {
        progress.inc_documents_analyzed();
    }
}

fn log_final_stats(stats: &PipelineStats) {
    info!("=== Analysis Summary ===");
    info!("Duration: {} seconds", stats.duration_secs);
    info!("Documents analyzed: {}", stats.documents_analyzed);
    info!("Documents registered: {}", stats.documents_registered);
    info!("Documents skipped: {}", stats.documents_skipped);
    info!("Documents failed: {}", stats.documents_failed);
    info!("Files processed: {}", stats.files_processed);
    info!("Files failed: {}", stats.files_failed);
    info!("File success rate: {:.2}%", stats.success_rate());
    info!("Observables extracted: {}", stats.observables_extracted);
    info!("Tags attached: {}", stats.tags_attached);
    info!("========================");
}
