// file: src/models/document.rs
// description: analyzed documents, their files, sources and metadata overrides
// reference: internal data structures

use crate::models::Tag;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Submitted,
    Analyzed,
    Registered,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Submitted => "submitted",
            DocumentStatus::Analyzed => "analyzed",
            DocumentStatus::Registered => "registered",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionOverride {
    #[serde(rename = "structuredData")]
    pub structured_data: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationOverride {
    pub auto: bool,
}

/// Override blocks shared by documents and sources. Absent blocks on a
/// document fall back to its source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration: Option<RegistrationOverride>,
}

impl DocumentMetadata {
    pub fn auto_register() -> Self {
        Self {
            registration: Some(RegistrationOverride { auto: true }),
            ..Self::default()
        }
    }

    pub fn without_structured_data() -> Self {
        Self {
            extraction: Some(ExtractionOverride {
                structured_data: false,
            }),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl Source {
    pub fn new(name: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            metadata,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFile {
    pub id: Uuid,
    pub name: String,
    pub mime_type: String,
    #[serde(skip)]
    pub content: Vec<u8>,
    pub content_hash: String,
    pub date: Option<DateTime<Utc>>,
}

impl DocumentFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: Vec<u8>) -> Self {
        let content_hash = Self::compute_hash(&content);
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            mime_type: mime_type.into(),
            content,
            content_hash,
            date: None,
        }
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    fn compute_hash(content: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content);
        format!("{:x}", hasher.finalize())
    }

    /// Only PDFs and `text/*` files go through content extraction.
    pub fn is_analyzable(&self) -> bool {
        let mime = self.mime_type.to_ascii_lowercase();
        mime == "application/pdf" || mime.starts_with("text/")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub title: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub status: DocumentStatus,
    #[serde(default)]
    pub metadata: DocumentMetadata,
    pub source: Option<Source>,
    #[serde(default)]
    pub files: Vec<DocumentFile>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Document {
    pub fn new(files: Vec<DocumentFile>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: None,
            date: None,
            status: DocumentStatus::Submitted,
            metadata: DocumentMetadata::default(),
            source: None,
            files,
            tags: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn source_metadata(&self) -> Option<&DocumentMetadata> {
        self.source.as_ref().map(|s| &s.metadata)
    }

    /// Structured-data extraction runs unless the document (or, when the
    /// document is silent, its source) disables it.
    pub fn structured_data_enabled(&self, default: bool) -> bool {
        self.metadata
            .extraction
            .or_else(|| self.source_metadata().and_then(|m| m.extraction))
            .map(|e| e.structured_data)
            .unwrap_or(default)
    }

    pub fn auto_register(&self) -> bool {
        self.metadata
            .registration
            .or_else(|| self.source_metadata().and_then(|m| m.registration))
            .map(|r| r.auto)
            .unwrap_or(false)
    }

    /// Attaches a tag unless one with the same id is already present.
    pub fn attach_tag(&mut self, tag: Tag) -> bool {
        if self.tags.iter().any(|t| t.id == tag.id) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn earliest_file_date(&self) -> Option<DateTime<Utc>> {
        self.files.iter().filter_map(|f| f.date).min()
    }
}
