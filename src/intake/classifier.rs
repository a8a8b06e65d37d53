// file: src/intake/classifier.rs
// description: content-type classification for intake files
// reference: extension-based mime mapping

use std::path::Path;

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

pub struct FileClassifier;

impl FileClassifier {
    pub fn new() -> Self {
        Self
    }

    /// MIME type inferred from the file extension.
    pub fn mime_type(&self, path: &Path) -> &'static str {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match extension.as_str() {
            "txt" | "log" | "ioc" => "text/plain",
            "md" | "markdown" => "text/markdown",
            "csv" => "text/csv",
            "htm" | "html" => "text/html",
            "xml" => "text/xml",
            "yml" | "yaml" => "text/yaml",
            "pdf" => "application/pdf",
            "json" => "application/json",
            "eml" => "message/rfc822",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "zip" => "application/zip",
            _ => DEFAULT_MIME_TYPE,
        }
    }
}

impl Default for FileClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_types() {
        let classifier = FileClassifier::new();
        assert_eq!(classifier.mime_type(Path::new("report.TXT")), "text/plain");
        assert_eq!(classifier.mime_type(Path::new("notes/apt29.md")), "text/markdown");
        assert_eq!(classifier.mime_type(Path::new("a.pdf")), "application/pdf");
        assert_eq!(classifier.mime_type(Path::new("Makefile")), DEFAULT_MIME_TYPE);
    }
}
