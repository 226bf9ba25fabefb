use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

use splatgen_core::models::JobSnapshot;

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.blue} {msg}") {
        pb.set_style(template.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn finish_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✓ {}", message));
}

pub fn finish_error(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✗ {}", message));
}

/// Progress tracker for the generate pipeline
pub struct GenerateProgress {
    pub multi: MultiProgress,
    pub upload: ProgressBar,
    pub job: ProgressBar,
    pub download: ProgressBar,
}

impl GenerateProgress {
    /// When `quiet` is set (JSON mode) the bars render nowhere.
    pub fn new(quiet: bool) -> Self {
        let multi = MultiProgress::new();
        if quiet {
            multi.set_draw_target(ProgressDrawTarget::hidden());
        }

        let upload = multi.add(create_spinner("Uploading image..."));
        let job = multi.add(create_spinner("Waiting for the service..."));
        let download = multi.add(create_spinner("Waiting for artifact..."));

        Self { multi, upload, job, download }
    }

    pub fn finish_upload(&self, image_id: &str) {
        finish_success(&self.upload, &format!("Uploaded (image {})", image_id));
    }

    /// Reflect the latest snapshot in the job spinner.
    pub fn update_job(&self, snapshot: &JobSnapshot) {
        let message = if let Some(position) = snapshot.queue_position.filter(|p| *p > 0) {
            match snapshot.estimated_wait_seconds {
                Some(wait) => format!("Queued at position {} (~{}s)...", position, wait),
                None => format!("Queued at position {}...", position),
            }
        } else if let Some(detail) = &snapshot.status_detail {
            format!("Processing: {}...", detail)
        } else if let Some(progress) = snapshot.progress {
            format!("Processing ({:.0}%)...", progress * 100.0)
        } else {
            "Processing...".to_string()
        };
        self.job.set_message(message);
    }

    pub fn finish_job(&self, processing_time_ms: Option<u64>) {
        match processing_time_ms {
            Some(ms) => finish_success(&self.job, &format!("Generated in {:.1}s", ms as f64 / 1000.0)),
            None => finish_success(&self.job, "Generated"),
        }
    }

    pub fn fail_job(&self, message: &str) {
        finish_error(&self.job, message);
        self.download.finish_and_clear();
    }

    pub fn start_download(&self) {
        self.download.set_message("Downloading artifact...");
    }

    pub fn finish_download(&self, bytes: usize) {
        finish_success(&self.download, &format!("Downloaded {} bytes", bytes));
    }
}
