// file: src/parser/mod.rs
// description: text normalization and content extraction module exports
// reference: internal module structure

pub mod content;
pub mod frontmatter;
pub mod normalizer;

pub use content::{ContentExtractor, ExtractedContent, PlainTextExtractor};
pub use frontmatter::{Frontmatter, FrontmatterParser};
pub use normalizer::{normalize_common, refang_dots, strip_brackets};
