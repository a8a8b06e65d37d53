// file: src/intake/mod.rs
// description: directory intake turning files on disk into document files
// reference: internal module structure

pub mod classifier;
pub mod scanner;

pub use classifier::FileClassifier;
pub use scanner::{FileScanner, ScannedFile};
