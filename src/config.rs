use crate::error::{CtxGrepError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONTEXT_LINES: usize = 5;
pub const DEFAULT_OUTPUT_FILE: &str = "results.txt";
pub const DEFAULT_EXTENSIONS: &[&str] = &["cpp", "h", "hpp", "cxx", "cc", "inl"];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub filters: FilterConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    pub pattern: String,
    pub context: usize,
    pub regex: bool,
    pub ignore_case: bool,
    /// Stop after this many match records; 0 means no limit.
    pub max_matches: usize,
    pub decode: DecodeMode,
}

/// How files that are not valid UTF-8 are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeMode {
    /// Skip the file.
    #[default]
    Strict,
    /// Replace invalid sequences with U+FFFD and search anyway.
    Lossy,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    pub extensions: Vec<String>,
    pub exclude_dirs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub relative_paths: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            context: DEFAULT_CONTEXT_LINES,
            regex: false,
            ignore_case: false,
            max_matches: 0,
            decode: DecodeMode::Strict,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            exclude_dirs: Vec::new(),
            max_depth: None,
            max_file_size: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            relative_paths: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration searching for `pattern`.
    pub fn with_pattern<S: Into<String>>(pattern: S) -> Self {
        let mut config = Self::default();
        config.search.pattern = pattern.into();
        config
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(CtxGrepError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CtxGrepError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| CtxGrepError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["ctxgrep.toml", ".ctxgrep.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref pattern) = cli_args.pattern {
            self.search.pattern = pattern.clone();
        }

        if let Some(context) = cli_args.context {
            self.search.context = context;
        }

        if cli_args.regex {
            self.search.regex = true;
        }

        if cli_args.ignore_case {
            self.search.ignore_case = true;
        }

        if let Some(max_matches) = cli_args.max_matches {
            self.search.max_matches = max_matches;
        }

        if cli_args.lossy {
            self.search.decode = DecodeMode::Lossy;
        }

        if let Some(ref extensions) = cli_args.extensions {
            self.filters.extensions = parse_extension_list(extensions);
        }

        if let Some(ref exclude) = cli_args.exclude {
            self.filters.exclude_dirs.extend(exclude.clone());
        }

        if let Some(ref output) = cli_args.output {
            self.output.path = output.clone();
        }

        if cli_args.relative_paths {
            self.output.relative_paths = true;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| CtxGrepError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| CtxGrepError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.search.pattern.is_empty() {
            return Err(CtxGrepError::Config {
                message: "A search pattern must be specified".to_string(),
            });
        }

        if self.filters.extensions.iter().all(|e| normalize_extension(e).is_empty()) {
            return Err(CtxGrepError::Config {
                message: "At least one file extension must be specified".to_string(),
            });
        }

        if self.filters.max_depth == Some(0) {
            return Err(CtxGrepError::Config {
                message: "Maximum directory depth must be greater than 0".to_string(),
            });
        }

        if self.filters.max_file_size == Some(0) {
            return Err(CtxGrepError::Config {
                message: "Maximum file size must be greater than 0".to_string(),
            });
        }

        if self.output.path.as_os_str().is_empty() {
            return Err(CtxGrepError::Config {
                message: "Output path must not be empty".to_string(),
            });
        }

        // Surface a bad expression now rather than after the walk.
        if self.search.regex {
            regex::Regex::new(&self.search.pattern).map_err(|source| {
                CtxGrepError::InvalidPattern {
                    pattern: self.search.pattern.clone(),
                    source,
                }
            })?;
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let mut sample_config = Self::default();
        sample_config.search.pattern = "TODO".to_string();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

/// Lower-cases an extension and strips a leading dot, so `.CPP` and `cpp` compare equal.
pub fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}

pub fn parse_extension_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(normalize_extension)
        .filter(|s| !s.is_empty())
        .collect()
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub pattern: Option<String>,
    pub context: Option<usize>,
    pub regex: bool,
    pub ignore_case: bool,
    pub max_matches: Option<usize>,
    pub lossy: bool,
    pub extensions: Option<String>,
    pub exclude: Option<Vec<String>>,
    pub output: Option<PathBuf>,
    pub relative_paths: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pattern(mut self, pattern: Option<String>) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_context(mut self, context: Option<usize>) -> Self {
        self.context = context;
        self
    }

    pub fn with_regex(mut self, regex: bool) -> Self {
        self.regex = regex;
        self
    }

    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn with_max_matches(mut self, max_matches: Option<usize>) -> Self {
        self.max_matches = max_matches;
        self
    }

    pub fn with_lossy(mut self, lossy: bool) -> Self {
        self.lossy = lossy;
        self
    }

    pub fn with_extensions(mut self, extensions: Option<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_exclude(mut self, exclude: Option<Vec<String>>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    pub fn with_relative_paths(mut self, relative: bool) -> Self {
        self.relative_paths = relative;
        self
    }
}
