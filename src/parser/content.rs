// file: src/parser/content.rs
// description: content-extraction collaborator turning file bytes into text and metadata
// reference: text/* handling with frontmatter metadata; pdf left to external extractors

use crate::error::{PipelineError, Result};
use crate::parser::frontmatter::FrontmatterParser;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

/// Metadata keys that carry a document title, in preference order.
const TITLE_KEYS: [&str; 3] = ["title", "dc:title", "subject"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedContent {
    pub text: String,
    pub metadata: HashMap<String, String>,
}

impl ExtractedContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// First non-empty title-like metadata field.
    pub fn title(&self) -> Option<&str> {
        TITLE_KEYS.iter().find_map(|wanted| {
            self.metadata
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(wanted))
                .map(|(_, value)| value.trim())
                .filter(|value| !value.is_empty())
        })
    }
}

#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn extract(&self, content: &[u8], mime_type: &str) -> Result<ExtractedContent>;
}

/// Handles `text/*`. Anything else (including PDF) is reported as
/// unsupported so the caller can fall through to its per-file failure path.
pub struct PlainTextExtractor {
    frontmatter: FrontmatterParser,
}

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self {
            frontmatter: FrontmatterParser::new(),
        }
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentExtractor for PlainTextExtractor {
    async fn extract(&self, content: &[u8], mime_type: &str) -> Result<ExtractedContent> {
        if !mime_type.to_ascii_lowercase().starts_with("text/") {
            return Err(PipelineError::UnsupportedContent {
                mime_type: mime_type.to_string(),
            });
        }

        let text = String::from_utf8_lossy(content);

        match self.frontmatter.extract(&text)? {
            Some((frontmatter, body)) => {
                debug!("Frontmatter carried {} fields", frontmatter.fields.len());
                Ok(ExtractedContent {
                    text: body.to_string(),
                    metadata: frontmatter.fields,
                })
            }
            None => Ok(ExtractedContent::new(text)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_plain_text() {
        let extractor = PlainTextExtractor::new();
        let content = extractor
            .extract(b"C2 at 1.2.3[.]4", "text/plain")
            .await
            .unwrap();
        assert_eq!(content.text, "C2 at 1.2.3[.]4");
        assert!(content.metadata.is_empty());
        assert_eq!(content.title(), None);
    }

    #[tokio::test]
    async fn test_frontmatter_title() {
        let extractor = PlainTextExtractor::new();
        let content = extractor
            .extract(b"---\nTitle: Lazarus update\n---\nbody", "text/markdown")
            .await
            .unwrap();
        assert_eq!(content.text, "body");
        assert_eq!(content.title(), Some("Lazarus update"));
    }

    #[tokio::test]
    async fn test_pdf_is_unsupported() {
        let extractor = PlainTextExtractor::new();
        let err = extractor
            .extract(b"%PDF-1.7", "application/pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedContent { .. }));
    }

    #[test]
    fn test_blank_title_is_skipped() {
        let content = ExtractedContent::new("")
            .with_field("title", "   ")
            .with_field("dc:title", "Fallback");
        assert_eq!(content.title(), Some("Fallback"));
    }

    #[test]
    fn test_lossy_decoding() {
        let extractor = PlainTextExtractor::new();
        let content = tokio_test::block_on(extractor.extract(b"bad \xFF byte", "text/plain"))
            .unwrap();
        assert!(content.text.starts_with("bad "));
    }
}
