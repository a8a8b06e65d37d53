// file: src/intake/scanner.rs
// description: Directory walking and file discovery with filtering
// reference: https://docs.rs/walkdir

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::intake::classifier::FileClassifier;
use crate::models::DocumentFile;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub struct FileScanner {
    config: PipelineConfig,
    classifier: FileClassifier,
}

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub relative_path: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

impl FileScanner {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            classifier: FileClassifier::new(),
        }
    }

    /// Files under `root` in path order, minus skipped and oversized ones.
    pub fn scan_directory(&self, root: &Path) -> Result<Vec<ScannedFile>> {
        if !root.is_dir() {
            return Err(PipelineError::Validation(format!(
                "Not a directory: {}",
                root.display()
            )));
        }

        info!("Scanning directory: {}", root.display());
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();

            if self.should_skip(path) {
                debug!("Skipping file: {}", path.display());
                continue;
            }

            let Ok(metadata) = entry.metadata() else {
                continue;
            };

            let size = metadata.len();
            let max_size = self.config.max_file_bytes();
            if max_size > 0 && size > max_size {
                debug!(
                    "Skipping large file ({} MB): {}",
                    size / 1024 / 1024,
                    path.display()
                );
                continue;
            }

            let modified = metadata.modified().ok().map(DateTime::<Utc>::from);

            let relative_path = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .to_string();

            files.push(ScannedFile {
                path: path.to_path_buf(),
                relative_path,
                size,
                modified,
            });
        }

        info!("Found {} files", files.len());
        Ok(files)
    }

    /// `*.ext` matches an extension, `name/` any directory along the path,
    /// anything else an exact file name.
    fn should_skip(&self, path: &Path) -> bool {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        self.config.skip_patterns.iter().any(|pattern| {
            if let Some(extension) = pattern.strip_prefix("*.") {
                file_name.ends_with(&format!(".{}", extension.to_ascii_lowercase()))
            } else if let Some(dir) = pattern.strip_suffix('/') {
                path.parent().is_some_and(|parent| {
                    parent.components().any(|c| c.as_os_str() == dir)
                })
            } else {
                file_name == pattern.to_ascii_lowercase()
            }
        })
    }

    /// Reads a scanned file into a [`DocumentFile`] dated by its mtime.
    pub fn load(&self, file: &ScannedFile) -> Result<DocumentFile> {
        let content = fs::read(&file.path).map_err(|source| PipelineError::FileOperation {
            path: file.path.clone(),
            source,
        })?;
        let mime_type = self.classifier.mime_type(&file.path);

        let document_file = DocumentFile::new(file.relative_path.clone(), mime_type, content);
        Ok(match file.modified {
            Some(modified) => document_file.with_date(modified),
            None => document_file,
        })
    }

    pub fn load_directory(&self, root: &Path) -> Result<Vec<DocumentFile>> {
        self.scan_directory(root)?
            .iter()
            .map(|file| self.load(file))
            .collect()
    }
}
