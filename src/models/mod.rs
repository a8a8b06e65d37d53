// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod document;
pub mod observable;
pub mod tag;

pub use document::{
    Document, DocumentFile, DocumentMetadata, DocumentStatus, ExtractionOverride,
    RegistrationOverride, Source,
};
pub use observable::{Observable, ObservableType, TAG_PRIVATE_NETWORK, TAG_WORKFLOW_IGNORE};
pub use tag::{LabelRef, RewriteRule, RewriteRuleSet, Tag, TagFacet};
