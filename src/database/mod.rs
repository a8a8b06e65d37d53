// file: src/database/mod.rs
// description: backing-store collaborator contracts and in-memory implementations
// reference: internal module structure

pub mod documents;
pub mod graph;
pub mod rules;
pub mod tags;

pub use documents::{DocumentStore, InMemoryDocumentStore};
pub use graph::{GraphStore, InMemoryGraphStore, ViewHandle};
pub use rules::{ConfigRuleSource, RewriteRuleSource};
pub use tags::{InMemoryTagStore, StoreResult, TagStore};
