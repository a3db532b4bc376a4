pub mod file_filter;
pub mod source_scanner;

pub use file_filter::FileFilter;
pub use source_scanner::{
    ScanResult, ScanStatistics, SkipReason, SkippedFile, SourceFile, SourceFiles, SourceScanner,
};
