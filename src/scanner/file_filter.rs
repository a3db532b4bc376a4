use crate::config::{normalize_extension, FilterConfig};
use std::path::Path;

pub struct FileFilter {
    extensions: Vec<String>,
    exclude_dirs: Vec<String>,
    max_file_size: Option<u64>,
}

impl FileFilter {
    pub fn new(config: &FilterConfig) -> Self {
        let extensions = config
            .extensions
            .iter()
            .map(|e| normalize_extension(e))
            .filter(|e| !e.is_empty())
            .collect();

        let exclude_dirs = config
            .exclude_dirs
            .iter()
            .map(|d| d.trim().to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();

        Self {
            extensions,
            exclude_dirs,
            max_file_size: config.max_file_size,
        }
    }

    /// True when the file's extension is on the allowlist (case-insensitive).
    pub fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }

    pub fn should_traverse_directory(&self, path: &Path) -> bool {
        match path.file_name().and_then(|s| s.to_str()) {
            Some(dir_name) => {
                let dir_name_lower = dir_name.to_lowercase();
                !self.exclude_dirs.iter().any(|d| *d == dir_name_lower)
            }
            None => true,
        }
    }

    pub fn is_size_allowed(&self, size: u64) -> bool {
        self.max_file_size.map_or(true, |max| size <= max)
    }

    pub fn get_extensions(&self) -> &Vec<String> {
        &self.extensions
    }

    pub fn get_max_file_size(&self) -> Option<u64> {
        self.max_file_size
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        let config = FilterConfig::default();
        Self::new(&config)
    }
}
