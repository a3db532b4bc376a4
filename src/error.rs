use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CtxGrepError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Invalid search pattern: {pattern}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to write report {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

impl CtxGrepError {
    pub fn output_write<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        CtxGrepError::OutputWrite {
            path: path.into(),
            source,
        }
    }

    /// Process exit code reported by the binary for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CtxGrepError::Cancelled => 130, // Interrupted (SIGINT)
            CtxGrepError::InvalidPath { .. } => 3,
            CtxGrepError::OutputWrite { .. } => 4,
            _ => 1,
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for CtxGrepError {
    fn user_message(&self) -> String {
        match self {
            CtxGrepError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            CtxGrepError::InvalidPath { path } => {
                format!("Invalid search root: {}", path)
            }
            CtxGrepError::InvalidPattern { pattern, source } => {
                format!("Pattern '{}' is not a valid regular expression: {}", pattern, source)
            }
            CtxGrepError::OutputWrite { path, source } => {
                format!("Could not write report to {}: {}", path.display(), source)
            }
            CtxGrepError::Cancelled => "Search was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            CtxGrepError::Config { .. } => Some(
                "Check your configuration file syntax and the values passed on the command line.".to_string()
            ),
            CtxGrepError::InvalidPath { .. } => Some(
                "Pass an existing directory as ROOT, or run ctxgrep from inside the tree you want to search.".to_string()
            ),
            CtxGrepError::InvalidPattern { .. } => Some(
                "Drop --regex to search for the text literally, or escape special characters such as ( [ . * +".to_string()
            ),
            CtxGrepError::OutputWrite { .. } => Some(
                "Ensure the report location is writable and the disk is not full, or choose another path with --out.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for CtxGrepError {
    fn from(error: toml::de::Error) -> Self {
        CtxGrepError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CtxGrepError>;
