// file: src/pipeline/progress.rs
// description: progress tracking and statistics reporting for document analysis
// reference: uses indicatif for progress bars and tracks processing metrics

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineStats {
    pub documents_analyzed: usize,
    pub documents_registered: usize,
    pub documents_skipped: usize,
    pub documents_failed: usize,
    pub files_processed: usize,
    pub files_failed: usize,
    pub observables_extracted: usize,
    pub tags_attached: usize,
    pub duration_secs: u64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents_per_second(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        self.documents_analyzed as f64 / self.duration_secs as f64
    }

    /// Share of eligible files that made it through extraction.
    pub fn success_rate(&self) -> f64 {
        let total = self.files_processed + self.files_failed;
        if total == 0 {
            return 0.0;
        }
        (self.files_processed as f64 / total as f64) * 100.0
    }
}

pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    documents_analyzed: Arc<AtomicUsize>,
    documents_registered: Arc<AtomicUsize>,
    documents_skipped: Arc<AtomicUsize>,
    documents_failed: Arc<AtomicUsize>,
    files_processed: Arc<AtomicUsize>,
    files_failed: Arc<AtomicUsize>,
    observables: Arc<AtomicUsize>,
    tags: Arc<AtomicUsize>,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn new(total_documents: usize) -> Self {
        Self::with_options(total_documents, true, true)
    }

    pub fn with_color(total_documents: usize, colored: bool) -> Self {
        Self::with_options(total_documents, colored, true)
    }

    /// A tracker that counts but never draws.
    pub fn hidden(total_documents: usize) -> Self {
        Self::with_options(total_documents, false, false)
    }

    fn with_options(total_documents: usize, colored: bool, visible: bool) -> Self {
        let multi_progress = if visible {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };

        let main_bar = create_progress_bar(&multi_progress, total_documents as u64, colored);
        let detail_bar = create_detail_bar(&multi_progress);

        Self {
            main_bar,
            detail_bar,
            documents_analyzed: Arc::new(AtomicUsize::new(0)),
            documents_registered: Arc::new(AtomicUsize::new(0)),
            documents_skipped: Arc::new(AtomicUsize::new(0)),
            documents_failed: Arc::new(AtomicUsize::new(0)),
            files_processed: Arc::new(AtomicUsize::new(0)),
            files_failed: Arc::new(AtomicUsize::new(0)),
            observables: Arc::new(AtomicUsize::new(0)),
            tags: Arc::new(AtomicUsize::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_documents_analyzed(&self) {
        self.documents_analyzed.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    /// Registered documents also count as analyzed.
    pub fn inc_documents_registered(&self) {
        self.documents_registered.fetch_add(1, Ordering::SeqCst);
        self.inc_documents_analyzed();
    }

    pub fn inc_documents_skipped(&self) {
        self.documents_skipped.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn inc_documents_failed(&self) {
        self.documents_failed.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn add_files(&self, processed: usize, failed: usize) {
        self.files_processed.fetch_add(processed, Ordering::SeqCst);
        self.files_failed.fetch_add(failed, Ordering::SeqCst);
    }

    pub fn add_observables(&self, count: usize) {
        self.observables.fetch_add(count, Ordering::SeqCst);
    }

    pub fn add_tags(&self, count: usize) {
        self.tags.fetch_add(count, Ordering::SeqCst);
    }

    pub fn set_message(&self, message: String) {
        self.detail_bar.set_message(message);
    }

    pub fn finish(&self) {
        self.main_bar.finish_with_message("Analysis complete");
        self.detail_bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> PipelineStats {
        PipelineStats {
            documents_analyzed: self.documents_analyzed.load(Ordering::SeqCst),
            documents_registered: self.documents_registered.load(Ordering::SeqCst),
            documents_skipped: self.documents_skipped.load(Ordering::SeqCst),
            documents_failed: self.documents_failed.load(Ordering::SeqCst),
            files_processed: self.files_processed.load(Ordering::SeqCst),
            files_failed: self.files_failed.load(Ordering::SeqCst),
            observables_extracted: self.observables.load(Ordering::SeqCst),
            tags_attached: self.tags.load(Ordering::SeqCst),
            duration_secs: self.start_time.elapsed().as_secs(),
        }
    }

    fn update_detail_bar(&self) {
        let registered = self.documents_registered.load(Ordering::SeqCst);
        let failed = self.documents_failed.load(Ordering::SeqCst);
        let observables = self.observables.load(Ordering::SeqCst);

        let message = format!(
            "Registered: {} | Failed: {} | Observables: {}",
            registered, failed, observables
        );

        self.detail_bar.set_message(message);
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    if colored {
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
                )
                .expect("Failed to create progress bar template")
                .progress_chars("█▓▒░"),
        );
    } else {
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({eta}) {msg}")
                .expect("Failed to create progress bar template")
                .progress_chars("=>-"),
        );
    }
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    let style = ProgressStyle::default_bar()
        .template("{msg}")
        .expect("Failed to create detail bar template");
    bar.set_style(style);
    bar
}
