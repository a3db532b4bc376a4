use crate::scanner::SkippedFile;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct SearchProgress {
    pub files_searched: usize,
    pub files_with_matches: usize,
    pub records_found: usize,
    pub current_file: Option<String>,
    pub start_time: Instant,
    pub skipped: Vec<SkippedFile>,
    pub limit_reached: bool,
}

impl SearchProgress {
    pub fn new() -> Self {
        Self {
            files_searched: 0,
            files_with_matches: 0,
            records_found: 0,
            current_file: None,
            start_time: Instant::now(),
            skipped: Vec::new(),
            limit_reached: false,
        }
    }

    pub fn update_file(&mut self, filename: String, records: usize) {
        self.files_searched += 1;
        self.records_found += records;
        if records > 0 {
            self.files_with_matches += 1;
        }
        self.current_file = Some(filename);
    }

    pub fn add_skipped(&mut self, skipped: SkippedFile) {
        self.skipped.push(skipped);
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Default for SearchProgress {
    fn default() -> Self {
        Self::new()
    }
}
