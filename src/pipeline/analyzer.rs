// file: src/pipeline/analyzer.rs
// description: document analysis lifecycle driving submitted documents to analyzed or registered
// reference: per-file failures are contained; document-level failures leave status untouched

use crate::config::Config;
use crate::database::{
    ConfigRuleSource, DocumentStore, GraphStore, InMemoryDocumentStore, InMemoryGraphStore,
    InMemoryTagStore, RewriteRuleSource, TagStore,
};
use crate::error::{PipelineError, Result};
use crate::models::{Document, DocumentStatus, Observable, ObservableType};
use crate::parser::{ContentExtractor, PlainTextExtractor};
use crate::pipeline::processor::{
    AnalysisRun, FileOutcome, FileProcessor, FileReport, with_timeout,
};
use crate::tagging::TagResolver;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// The external services one analysis talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub content: Arc<dyn ContentExtractor>,
    pub rules: Arc<dyn RewriteRuleSource>,
    pub tags: Arc<dyn TagStore>,
    pub graph: Arc<dyn GraphStore>,
    pub documents: Arc<dyn DocumentStore>,
}

impl Collaborators {
    /// Plain-text extraction, configured rewrite rules and in-memory stores.
    pub fn in_memory(config: &Config) -> Self {
        Self {
            content: Arc::new(PlainTextExtractor::new()),
            rules: Arc::new(ConfigRuleSource::from_config(&config.tagging)),
            tags: Arc::new(InMemoryTagStore::new()),
            graph: Arc::new(InMemoryGraphStore::new()),
            documents: Arc::new(InMemoryDocumentStore::new()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub document_id: Uuid,
    pub title: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub previous_status: DocumentStatus,
    pub status: DocumentStatus,
    pub tags: Vec<String>,
    /// Tags newly attached during this analysis.
    pub tags_attached: usize,
    pub observables: Vec<Observable>,
    pub observable_counts: BTreeMap<ObservableType, usize>,
    pub files: Vec<FileReport>,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisReport {
    fn unchanged(document: &Document) -> Self {
        Self {
            document_id: document.id,
            title: document.title.clone(),
            date: document.date,
            previous_status: document.status,
            status: document.status,
            tags: document.tags.iter().map(|t| t.label.clone()).collect(),
            tags_attached: 0,
            observables: Vec::new(),
            observable_counts: BTreeMap::new(),
            files: Vec::new(),
            analyzed_at: Utc::now(),
        }
    }

    fn from_run(previous_status: DocumentStatus, run: &AnalysisRun, files: Vec<FileReport>) -> Self {
        Self {
            document_id: run.document.id,
            title: run.document.title.clone(),
            date: run.document.date,
            previous_status,
            status: run.document.status,
            tags: run
                .document
                .tags
                .iter()
                .map(|t| run.cache.display_label(t))
                .collect(),
            tags_attached: run.tags_attached,
            observables: run.observables.observables().to_vec(),
            observable_counts: run.observables.counts(),
            files,
            analyzed_at: Utc::now(),
        }
    }

    /// True when the document was already registered and nothing ran.
    pub fn was_skipped(&self) -> bool {
        self.previous_status == DocumentStatus::Registered
    }

    pub fn files_processed(&self) -> usize {
        self.count_files(FileOutcome::Processed)
    }

    pub fn files_failed(&self) -> usize {
        self.count_files(FileOutcome::Failed)
    }

    fn count_files(&self, outcome: FileOutcome) -> usize {
        self.files.iter().filter(|f| f.outcome == outcome).count()
    }
}

pub struct DocumentAnalyzer {
    config: Config,
    processor: FileProcessor,
    rules: Arc<dyn RewriteRuleSource>,
    graph: Arc<dyn GraphStore>,
    documents: Arc<dyn DocumentStore>,
}

impl DocumentAnalyzer {
    pub fn new(config: Config, collaborators: Collaborators) -> Result<Self> {
        let processor = FileProcessor::new(
            config.clone(),
            collaborators.content,
            collaborators.tags,
            collaborators.graph.clone(),
        )?;

        Ok(Self {
            config,
            processor,
            rules: collaborators.rules,
            graph: collaborators.graph,
            documents: collaborators.documents,
        })
    }

    /// Loads the document, analyzes it and saves the result. Nothing is
    /// saved when the analysis fails.
    pub async fn analyze(&self, document_id: Uuid) -> Result<AnalysisReport> {
        let mut document = self.documents.get(document_id).await?.ok_or_else(|| {
            PipelineError::DocumentStore(format!("document {} not found", document_id))
        })?;

        if document.status == DocumentStatus::Registered {
            info!(document_id = %document_id, "Document already registered, skipping");
            return Ok(AnalysisReport::unchanged(&document));
        }

        let report = self.analyze_document(&mut document).await?;
        self.documents.save(&document).await?;
        Ok(report)
    }

    /// Runs one analysis pass over `document`. The document is only written
    /// once every step has succeeded; on error it is left exactly as it was.
    pub async fn analyze_document(&self, document: &mut Document) -> Result<AnalysisReport> {
        if document.status == DocumentStatus::Registered {
            return Ok(AnalysisReport::unchanged(document));
        }

        let previous_status = document.status;
        info!(document_id = %document.id, files = document.files.len(), "Analyzing document");

        let resolver = TagResolver::load(self.rules.as_ref()).await?;
        let mut run = AnalysisRun::new(document.clone(), resolver);

        let files = run.document.files.clone();
        let mut reports = Vec::with_capacity(files.len());

        for (index, file) in files.iter().enumerate() {
            match self.processor.process(file, &mut run).await {
                Ok(report) => {
                    if let Some(date) = report.date {
                        run.document.files[index].date = Some(date);
                    }
                    reports.push(report);
                }
                Err(e) => {
                    warn!(
                        document_id = %run.document.id,
                        file = %file.name,
                        "File analysis failed: {}",
                        e
                    );
                    reports.push(FileReport::failed(file, &e));
                }
            }
        }

        backfill(&mut run.document, &reports);
        run.document.status = DocumentStatus::Analyzed;

        if run.document.auto_register() {
            with_timeout(
                "graph store merge",
                self.config.pipeline.collaborator_timeout(),
                self.graph.merge(&run.document),
            )
            .await?;
            run.document.status = DocumentStatus::Registered;
        }

        let report = AnalysisReport::from_run(previous_status, &run, reports);
        info!(
            document_id = %run.document.id,
            status = %run.document.status,
            observables = report.observables.len(),
            tags = report.tags_attached,
            "Document analysis complete"
        );

        *document = run.document;
        Ok(report)
    }
}

fn backfill(document: &mut Document, reports: &[FileReport]) {
    let untitled = document
        .title
        .as_deref()
        .is_none_or(|title| title.trim().is_empty());
    if untitled {
        if let Some(title) = reports.iter().find_map(|r| r.title.clone()) {
            document.title = Some(title);
        }
    }

    if document.date.is_none() {
        document.date = Some(document.earliest_file_date().unwrap_or_else(Utc::now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentFile, DocumentMetadata, Source};
    use chrono::TimeZone;

    struct Harness {
        analyzer: DocumentAnalyzer,
        documents: Arc<InMemoryDocumentStore>,
        graph: Arc<InMemoryGraphStore>,
    }

    fn harness() -> Harness {
        let config = Config::default_config();
        let documents = Arc::new(InMemoryDocumentStore::new());
        let graph = Arc::new(InMemoryGraphStore::new());
        let collaborators = Collaborators {
            documents: documents.clone(),
            graph: graph.clone(),
            ..Collaborators::in_memory(&config)
        };
        Harness {
            analyzer: DocumentAnalyzer::new(config, collaborators).unwrap(),
            documents,
            graph,
        }
    }

    fn text(name: &str, body: &str) -> DocumentFile {
        DocumentFile::new(name, "text/plain", body.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn test_stops_at_analyzed_without_metadata() {
        let h = harness();
        let mut doc = Document::new(vec![text("a.txt", "C2 1.2.3[.]4")]);

        let report = h.analyzer.analyze_document(&mut doc).await.unwrap();

        assert_eq!(report.previous_status, DocumentStatus::Submitted);
        assert_eq!(doc.status, DocumentStatus::Analyzed);
        assert!(h.graph.merged(doc.id).is_none());
    }

    #[tokio::test]
    async fn test_source_auto_registration() {
        let h = harness();
        let mut doc = Document::new(vec![text("a.txt", "C2 1.2.3[.]4")])
            .with_source(Source::new("feed", DocumentMetadata::auto_register()));

        h.analyzer.analyze_document(&mut doc).await.unwrap();

        assert_eq!(doc.status, DocumentStatus::Registered);
        assert_eq!(h.graph.merged(doc.id).map(|o| o.len()), Some(1));
    }

    #[tokio::test]
    async fn test_registered_is_noop() {
        let h = harness();
        let mut doc = Document::new(vec![text("a.txt", "APT29")]);
        doc.status = DocumentStatus::Registered;

        let report = h.analyzer.analyze_document(&mut doc).await.unwrap();
        assert!(report.was_skipped());
        assert!(doc.tags.is_empty());
        assert!(doc.date.is_none());
    }

    #[tokio::test]
    async fn test_file_failure_does_not_block() {
        let h = harness();
        let mut doc = Document::new(vec![
            DocumentFile::new("scan.pdf", "application/pdf", b"%PDF".to_vec()),
            text("notes.txt", "APT28 at evil[.]ru"),
            DocumentFile::new("img.png", "image/png", vec![1]),
        ]);

        let report = h.analyzer.analyze_document(&mut doc).await.unwrap();

        assert_eq!(doc.status, DocumentStatus::Analyzed);
        assert_eq!(report.files_failed(), 1);
        assert_eq!(report.files_processed(), 1);
        assert_eq!(report.files[2].outcome, FileOutcome::Skipped);
        assert!(report.tags.contains(&"actor:APT28".to_string()));
    }

    #[tokio::test]
    async fn test_backfills_title_and_date() {
        let h = harness();
        let early = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let mut doc = Document::new(vec![
            text("a.txt", "no metadata here").with_date(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()),
            DocumentFile::new(
                "b.md",
                "text/markdown",
                b"---\ntitle: Quarterly threat brief\ndate: 2020-01-01\n---\nbody".to_vec(),
            ),
        ]);

        h.analyzer.analyze_document(&mut doc).await.unwrap();

        assert_eq!(doc.title.as_deref(), Some("Quarterly threat brief"));
        assert_eq!(doc.date, Some(early));
    }

    #[tokio::test]
    async fn test_existing_title_is_kept() {
        let h = harness();
        let mut doc = Document::new(vec![DocumentFile::new(
            "b.md",
            "text/markdown",
            b"---\ntitle: From file\n---\nbody".to_vec(),
        )])
        .with_title("Analyst title");

        h.analyzer.analyze_document(&mut doc).await.unwrap();
        assert_eq!(doc.title.as_deref(), Some("Analyst title"));
        assert!(doc.date.is_some());
    }

    #[tokio::test]
    async fn test_merge_failure_leaves_document_unchanged() {
        let h = harness();
        let mut doc = Document::new(vec![text("a.txt", "APT29")])
            .with_metadata(DocumentMetadata::auto_register());
        h.graph.set_available(false);

        let result = h.analyzer.analyze_document(&mut doc).await;

        assert!(result.is_err());
        assert_eq!(doc.status, DocumentStatus::Submitted);
        assert!(doc.tags.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_by_id_saves() {
        let h = harness();
        let doc = Document::new(vec![text("a.txt", "CVE-2024-3094")]);
        let id = doc.id;
        h.documents.insert(doc);

        h.analyzer.analyze(id).await.unwrap();

        let stored = h.documents.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status, DocumentStatus::Analyzed);
        assert_eq!(stored.tags.len(), 1);
    }

    #[tokio::test]
    async fn test_analyze_unknown_document() {
        let h = harness();
        assert!(matches!(
            h.analyzer.analyze(Uuid::new_v4()).await,
            Err(PipelineError::DocumentStore(_))
        ));
    }
}
