use crate::scanner::SkippedFile;
use crate::search::SearchProgress;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Outcome of one search run, printed to the terminal after the report is written.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub root: PathBuf,
    pub output_path: PathBuf,
    pub pattern: String,
    pub files_searched: usize,
    pub files_with_matches: usize,
    pub records_written: usize,
    pub bytes_written: u64,
    pub limit_reached: bool,
    pub skipped: Vec<SkippedFile>,
}

impl RunSummary {
    pub fn from_progress(
        progress: &SearchProgress,
        started_at: DateTime<Utc>,
        root: PathBuf,
        output_path: PathBuf,
        pattern: String,
        bytes_written: u64,
    ) -> Self {
        Self {
            started_at,
            duration: progress.elapsed(),
            root,
            output_path,
            pattern,
            files_searched: progress.files_searched,
            files_with_matches: progress.files_with_matches,
            records_written: progress.records_found,
            bytes_written,
            limit_reached: progress.limit_reached,
            skipped: progress.skipped.clone(),
        }
    }

    pub fn has_skipped_files(&self) -> bool {
        !self.skipped.is_empty()
    }
}
