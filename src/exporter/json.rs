// file: src/exporter/json.rs
// description: json export of analysis reports and run manifests

use crate::error::Result;
use crate::pipeline::{AnalysisReport, PipelineStats};
use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone)]
pub struct JsonExporter {
    output_dir: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct ExportManifest {
    pub exported_at: String,
    pub total_documents: usize,
    pub stats: PipelineStats,
    pub files: Vec<String>,
}

impl JsonExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes one report as `<document id>.json`.
    pub fn export_report(&self, report: &AnalysisReport, pretty: bool) -> Result<PathBuf> {
        let path = self.output_dir.join(format!("{}.json", report.document_id));
        write_json(&path, report, pretty)?;
        debug!("Exported report for document {}", report.document_id);
        Ok(path)
    }

    /// Writes every report plus a manifest listing them.
    pub fn export_all(
        &self,
        reports: &[AnalysisReport],
        stats: &PipelineStats,
        pretty: bool,
    ) -> Result<ExportManifest> {
        info!("Starting JSON export to {:?}", self.output_dir);

        let mut files = Vec::with_capacity(reports.len());
        for report in reports {
            let path = self.export_report(report, pretty)?;
            if let Some(name) = path.file_name() {
                files.push(name.to_string_lossy().into_owned());
            }
        }
        files.sort();

        let manifest = ExportManifest {
            exported_at: Utc::now().to_rfc3339(),
            total_documents: reports.len(),
            stats: stats.clone(),
            files,
        };
        write_json(&self.output_dir.join(MANIFEST_FILE), &manifest, pretty)?;

        info!(
            "Export complete: {} documents exported",
            manifest.total_documents
        );
        Ok(manifest)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{Document, DocumentFile};
    use crate::pipeline::{Collaborators, DocumentAnalyzer};
    use tempfile::tempdir;

    async fn sample_report() -> AnalysisReport {
        let config = Config::default_config();
        let analyzer =
            DocumentAnalyzer::new(config.clone(), Collaborators::in_memory(&config)).unwrap();
        let mut document = Document::new(vec![DocumentFile::new(
            "note.txt",
            "text/plain",
            b"beacon to 10.0.0[.]1 via CVE-2021-44228".to_vec(),
        )]);
        analyzer.analyze_document(&mut document).await.unwrap()
    }

    #[test]
    fn test_exporter_creation() {
        let dir = tempdir().unwrap();
        let exporter = JsonExporter::new(dir.path().join("nested"));
        assert!(exporter.is_ok());
        assert!(dir.path().join("nested").is_dir());
    }

    #[tokio::test]
    async fn test_export_all_writes_manifest() {
        let dir = tempdir().unwrap();
        let exporter = JsonExporter::new(dir.path()).unwrap();
        let report = sample_report().await;

        let manifest = exporter
            .export_all(std::slice::from_ref(&report), &PipelineStats::new(), true)
            .unwrap();

        assert_eq!(manifest.total_documents, 1);
        assert_eq!(manifest.files, vec![format!("{}.json", report.document_id)]);

        let written = fs::read_to_string(dir.path().join(&manifest.files[0])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["status"], "analyzed");
        assert_eq!(value["observables"][0]["type"], "ipv4");
        assert!(dir.path().join(MANIFEST_FILE).exists());
    }
}
