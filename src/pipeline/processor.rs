// file: src/pipeline/processor.rs
// description: per-file analysis step: content extraction, auto-tagging and observable extraction
// reference: one eligible document file in, tags attached and observables forwarded out

use crate::config::Config;
use crate::database::{GraphStore, TagStore, ViewHandle};
use crate::error::{PipelineError, Result};
use crate::extractor::{
    Annotator, ExtractorSet, ObservableAggregator, PrivateNetworkAnnotator, TldSet,
    WhitelistAnnotator,
};
use crate::models::{Document, DocumentFile};
use crate::parser::ContentExtractor;
use crate::tagging::{ResolutionCache, TagResolver, detect_labels};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Mutable state shared by every file of one document analysis. Built
/// fresh per document and dropped when the analysis ends.
pub struct AnalysisRun {
    pub document: Document,
    pub resolver: TagResolver,
    pub cache: ResolutionCache,
    pub view: Option<ViewHandle>,
    pub observables: ObservableAggregator,
    pub tags_attached: usize,
}

impl AnalysisRun {
    pub fn new(document: Document, resolver: TagResolver) -> Self {
        Self {
            document,
            resolver,
            cache: ResolutionCache::new(),
            view: None,
            observables: ObservableAggregator::new(),
            tags_attached: 0,
        }
    }

    async fn attach_labels(&mut self, labels: &[String], store: &dyn TagStore) -> usize {
        if labels.is_empty() {
            return 0;
        }
        let tags = self
            .resolver
            .resolve_labels(labels, &mut self.cache, store)
            .await;
        let attached = tags
            .into_iter()
            .filter(|tag| self.document.attach_tag(tag.clone()))
            .count();
        self.tags_attached += attached;
        attached
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOutcome {
    Processed,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file_id: Uuid,
    pub name: String,
    pub outcome: FileOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub observables: usize,
    pub tags_attached: usize,
    #[serde(skip)]
    pub title: Option<String>,
    #[serde(skip)]
    pub date: Option<DateTime<Utc>>,
}

impl FileReport {
    fn new(file: &DocumentFile, outcome: FileOutcome) -> Self {
        Self {
            file_id: file.id,
            name: file.name.clone(),
            outcome,
            error: None,
            observables: 0,
            tags_attached: 0,
            title: None,
            date: None,
        }
    }

    pub fn failed(file: &DocumentFile, error: &PipelineError) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::new(file, FileOutcome::Failed)
        }
    }
}

/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates.
pub fn parse_metadata_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Runs `future` under `limit`; expiry becomes [`PipelineError::Timeout`].
pub async fn with_timeout<T, F>(operation: &str, limit: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(PipelineError::Timeout {
            operation: operation.to_string(),
            secs: limit.as_secs(),
        }),
    }
}

pub struct FileProcessor {
    config: Config,
    content: Arc<dyn ContentExtractor>,
    extractors: ExtractorSet,
    annotators: Vec<Box<dyn Annotator>>,
    tags: Arc<dyn TagStore>,
    graph: Arc<dyn GraphStore>,
}

impl FileProcessor {
    pub fn new(
        config: Config,
        content: Arc<dyn ContentExtractor>,
        tags: Arc<dyn TagStore>,
        graph: Arc<dyn GraphStore>,
    ) -> Result<Self> {
        let tlds = match &config.extraction.tld_path {
            Some(path) => TldSet::from_file(path)?,
            None => TldSet::bundled(),
        };
        let annotators: Vec<Box<dyn Annotator>> = vec![
            Box::new(PrivateNetworkAnnotator::new()),
            Box::new(WhitelistAnnotator::new(&config.extraction.whitelist)),
        ];

        Ok(Self {
            extractors: ExtractorSet::with_tlds(tlds),
            config,
            content,
            annotators,
            tags,
            graph,
        })
    }

    /// Runs the extractors and annotators over `text`.
    pub fn extract_observables(&self, text: &str) -> ObservableAggregator {
        self.extractors
            .scan(text)
            .map(|mut observable| {
                for annotator in &self.annotators {
                    annotator.annotate(&mut observable);
                }
                observable
            })
            .collect()
    }

    /// Processes one file. Ineligible files are reported as skipped; any
    /// error is the caller's per-file failure.
    pub async fn process(&self, file: &DocumentFile, run: &mut AnalysisRun) -> Result<FileReport> {
        if !file.is_analyzable() {
            debug!(file = %file.name, mime_type = %file.mime_type, "Skipping ineligible file");
            return Ok(FileReport::new(file, FileOutcome::Skipped));
        }

        let max_bytes = self.config.pipeline.max_file_bytes();
        if max_bytes > 0 && file.content.len() as u64 > max_bytes {
            return Err(PipelineError::Validation(format!(
                "File too large ({} bytes): {}",
                file.content.len(),
                file.name
            )));
        }

        let limit = self.config.pipeline.collaborator_timeout();
        let content = with_timeout(
            "content extraction",
            limit,
            self.content.extract(&file.content, &file.mime_type),
        )
        .await?;

        let mut report = FileReport::new(file, FileOutcome::Processed);
        report.title = content.title().map(str::to_string);
        report.date = content
            .metadata
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("date"))
            .and_then(|(_, value)| parse_metadata_date(value));

        let detected = detect_labels(&content.text);
        report.tags_attached += run.attach_labels(&detected, self.tags.as_ref()).await;

        if run
            .document
            .structured_data_enabled(self.config.extraction.structured_data)
        {
            let extracted = self.extract_observables(&content.text);
            if !extracted.is_empty() {
                let view = self.ensure_view(run, limit).await?;
                with_timeout(
                    "graph store add",
                    limit,
                    self.graph
                        .add(extracted.observables(), &run.document, Some(file), &view),
                )
                .await?;

                report.observables = extracted.len();
                if self.config.extraction.tag_observable_types {
                    let summary = extracted.summary_labels();
                    report.tags_attached += run.attach_labels(&summary, self.tags.as_ref()).await;
                }
                run.observables.merge(extracted);
            }
        } else {
            debug!(file = %file.name, "Structured data extraction disabled");
        }

        debug!(
            file = %file.name,
            observables = report.observables,
            tags = report.tags_attached,
            "File processed"
        );
        Ok(report)
    }

    async fn ensure_view(&self, run: &mut AnalysisRun, limit: Duration) -> Result<ViewHandle> {
        if let Some(view) = &run.view {
            return Ok(view.clone());
        }
        let view = with_timeout(
            "graph view creation",
            limit,
            self.graph.create_view(&run.document),
        )
        .await?;
        run.view = Some(view.clone());
        Ok(view)
    }
}
