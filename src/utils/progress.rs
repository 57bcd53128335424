use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress over a run of documents, drawn on stderr. Hidden when disabled.
pub struct ProgressTracker {
    progress_bar: Option<ProgressBar>,
}

impl ProgressTracker {
    pub fn new(total: u64, enabled: bool) -> Self {
        let progress_bar = enabled.then(|| {
            let pb = ProgressBar::new(total);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });
        Self { progress_bar }
    }

    pub fn start_document(&self, doc_name: &str, stage: &str) {
        if let Some(pb) = &self.progress_bar {
            pb.set_message(format!("{} [{}]", stage, doc_name));
        }
    }

    pub fn finish_document(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.inc(1);
        }
    }

    pub fn finish(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_and_clear();
        }
    }
}
