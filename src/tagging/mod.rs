// file: src/tagging/mod.rs
// description: label rewriting, tag resolution and auto-tag detectors
// reference: internal module structure

pub mod detectors;
pub mod resolver;
pub mod rewrite;

pub use detectors::{Detector, detect_labels};
pub use resolver::{ResolutionCache, TagResolver};
pub use rewrite::RewriteChain;
