use crate::config::FilterConfig;
use crate::error::{CtxGrepError, Result};
use crate::scanner::file_filter::FileFilter;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path as produced by the walk (the root joined with `relative_path`).
    pub path: PathBuf,
    pub relative_path: PathBuf,
    pub extension: String,
    pub size: u64,
}

impl SourceFile {
    pub fn new(path: PathBuf, relative_path: PathBuf, size: u64) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        Self {
            path,
            relative_path,
            extension,
            size,
        }
    }

    pub fn display_path(&self, relative: bool) -> String {
        if relative {
            self.relative_path.display().to_string()
        } else {
            self.path.display().to_string()
        }
    }
}

/// A file or directory left out of the search, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    PermissionDenied,
    WalkError { message: String },
    TooLarge { size: u64, max_size: u64 },
    Unreadable { message: String },
    Undecodable,
}

impl std::fmt::Display for SkippedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let path = self.path.display();
        match &self.reason {
            SkipReason::PermissionDenied => write!(f, "Permission denied: {}", path),
            SkipReason::WalkError { message } => write!(f, "Scan error at {}: {}", path, message),
            SkipReason::TooLarge { size, max_size } => write!(
                f,
                "Skipped {} ({} bytes exceeds limit of {} bytes)",
                path, size, max_size
            ),
            SkipReason::Unreadable { message } => write!(f, "Could not read {}: {}", path, message),
            SkipReason::Undecodable => write!(f, "Skipped {} (not valid UTF-8)", path),
        }
    }
}

pub struct SourceScanner {
    filter: FileFilter,
    max_depth: Option<usize>,
    ignore_path: Option<PathBuf>,
}

impl SourceScanner {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            filter: FileFilter::new(config),
            max_depth: config.max_depth,
            ignore_path: None,
        }
    }

    /// Never yield `path`, even if its extension is allowed. Used for the report file.
    pub fn with_ignored_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.ignore_path = std::fs::canonicalize(path.as_ref()).ok();
        self
    }

    /// Lazily walks `root`, yielding allowlisted files in file-name order.
    pub fn files<P: AsRef<Path>>(&self, root: P) -> Result<SourceFiles<'_>> {
        let root_path = root.as_ref();

        if !root_path.exists() {
            return Err(CtxGrepError::InvalidPath {
                path: root_path.display().to_string(),
            });
        }

        if !root_path.is_dir() {
            return Err(CtxGrepError::InvalidPath {
                path: format!("{} is not a directory", root_path.display()),
            });
        }

        let mut walker = WalkDir::new(root_path)
            .follow_links(false)
            .sort_by_file_name();

        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        Ok(SourceFiles {
            walker: walker.into_iter(),
            scanner: self,
            root: root_path.to_path_buf(),
            skipped: Vec::new(),
        })
    }

    pub fn scan_directory<P: AsRef<Path>>(&self, root: P) -> Result<ScanResult> {
        let mut files_iter = self.files(root)?;
        let files: Vec<SourceFile> = files_iter.by_ref().collect();

        Ok(ScanResult {
            files,
            skipped: files_iter.into_skipped(),
        })
    }

    pub fn filter(&self) -> &FileFilter {
        &self.filter
    }

    fn is_ignored(&self, path: &Path) -> bool {
        match self.ignore_path {
            Some(ref ignored) => {
                // Only pay for canonicalize when the names line up.
                if path.file_name() != ignored.file_name() {
                    return false;
                }
                std::fs::canonicalize(path)
                    .map(|p| p == *ignored)
                    .unwrap_or(false)
            }
            None => false,
        }
    }

    pub fn get_statistics(&self, files: &[SourceFile]) -> ScanStatistics {
        let mut files_by_extension = BTreeMap::new();
        for file in files {
            *files_by_extension.entry(file.extension.clone()).or_insert(0) += 1;
        }

        ScanStatistics {
            total_files: files.len(),
            total_size: files.iter().map(|f| f.size).sum(),
            files_by_extension,
        }
    }
}

/// Iterator returned by [`SourceScanner::files`]. Entries that could not be
/// visited are collected instead of ending the walk.
pub struct SourceFiles<'a> {
    walker: walkdir::IntoIter,
    scanner: &'a SourceScanner,
    root: PathBuf,
    skipped: Vec<SkippedFile>,
}

impl SourceFiles<'_> {
    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }

    pub fn into_skipped(self) -> Vec<SkippedFile> {
        self.skipped
    }

    fn record_walk_error(&mut self, err: walkdir::Error) {
        let path = err
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());

        let reason = if err
            .io_error()
            .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied)
        {
            SkipReason::PermissionDenied
        } else {
            SkipReason::WalkError {
                message: err.to_string(),
            }
        };

        self.skipped.push(SkippedFile { path, reason });
    }

    fn process_file(&mut self, entry: &DirEntry) -> Option<SourceFile> {
        let path = entry.path();
        let scanner = self.scanner;
        let filter = &scanner.filter;

        if !filter.is_source_file(path) || scanner.is_ignored(path) {
            return None;
        }

        let size = if entry.path_is_symlink() {
            // Size of the target, not of the link itself.
            match std::fs::metadata(path) {
                Ok(metadata) => metadata.len(),
                Err(err) => {
                    self.skipped.push(SkippedFile {
                        path: path.to_path_buf(),
                        reason: SkipReason::Unreadable {
                            message: err.to_string(),
                        },
                    });
                    return None;
                }
            }
        } else {
            match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(err) => {
                    self.record_walk_error(err);
                    return None;
                }
            }
        };

        if !filter.is_size_allowed(size) {
            self.skipped.push(SkippedFile {
                path: path.to_path_buf(),
                reason: SkipReason::TooLarge {
                    size,
                    max_size: filter.get_max_file_size().unwrap_or(0),
                },
            });
            return None;
        }

        let relative_path = path
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf());

        Some(SourceFile::new(path.to_path_buf(), relative_path, size))
    }
}

impl Iterator for SourceFiles<'_> {
    type Item = SourceFile;

    fn next(&mut self) -> Option<SourceFile> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    self.record_walk_error(err);
                    continue;
                }
            };

            let file_type = entry.file_type();

            if file_type.is_dir() {
                if entry.depth() > 0 && !self.scanner.filter.should_traverse_directory(entry.path())
                {
                    self.walker.skip_current_dir();
                }
                continue;
            }

            // Links to regular files are searched; links to directories are not followed.
            let is_file =
                file_type.is_file() || (file_type.is_symlink() && entry.path().is_file());
            if !is_file {
                continue;
            }

            if let Some(file) = self.process_file(&entry) {
                return Some(file);
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanResult {
    pub files: Vec<SourceFile>,
    pub skipped: Vec<SkippedFile>,
}

#[derive(Debug, Default)]
pub struct ScanStatistics {
    pub total_files: usize,
    pub total_size: u64,
    pub files_by_extension: BTreeMap<String, usize>,
}

impl ScanStatistics {
    pub fn display_summary(&self) -> String {
        let mut summary = format!(
            "Scan Results:\n  Total files: {}\n  Total size: {}\n",
            self.total_files,
            format_bytes(self.total_size)
        );

        if !self.files_by_extension.is_empty() {
            summary.push_str("  Files by type:\n");
            let mut extensions: Vec<_> = self.files_by_extension.iter().collect();
            extensions.sort_by(|a, b| b.1.cmp(a.1));

            for (ext, count) in extensions {
                summary.push_str(&format!("    {}: {} files\n", ext, count));
            }
        }

        summary
    }
}

pub(crate) fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}
