pub mod cli;
pub mod config;
pub mod error;
pub mod report;
pub mod scanner;
pub mod search;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, DecodeMode, FilterConfig, OutputConfig, SearchConfig};
pub use error::{CtxGrepError, Result, UserFriendlyError};

// Core functionality re-exports
pub use report::{ReportWriter, RunSummary};
pub use scanner::{FileFilter, ScanResult, ScanStatistics, SkippedFile, SourceFile, SourceScanner};
pub use search::{LineMatcher, MatchRecord, Matcher, SearchProgress};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use chrono::Utc;
use std::path::Path;

/// Main library interface: walks a tree, searches it, and writes the report.
pub struct CtxGrep {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl CtxGrep {
    /// Create a new instance. No signal handler is installed; see [`CtxGrep::with_shutdown`].
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode != OutputMode::Json);

        Self {
            config,
            output_formatter,
            progress_manager,
            shutdown: GracefulShutdown::detached(),
        }
    }

    pub fn with_shutdown(mut self, shutdown: GracefulShutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Create an instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        Ok(Self::new(
            config,
            cli_args.output_mode(),
            cli_args.verbosity_level(),
            cli_args.quiet,
        ))
    }

    /// Search `root` and write every match to the configured report file.
    ///
    /// The report is replaced even when nothing matches. A cancelled run
    /// returns [`CtxGrepError::Cancelled`] and leaves the previous report alone.
    pub fn run<P: AsRef<Path>>(&self, root: P) -> Result<RunSummary> {
        let root = root.as_ref();
        let started_at = Utc::now();

        self.shutdown.check_shutdown()?;

        // Step 1: Compile the pattern
        let line_matcher = LineMatcher::new(&self.config.search)?;
        let description = line_matcher.matcher().describe();

        self.output_formatter.start_operation(&format!(
            "Searching {} for {}",
            root.display(),
            description
        ));

        // Step 2: Walk and search
        let (records, progress) = self.search_tree(root, &line_matcher)?;
        self.shutdown.check_shutdown()?;

        if progress.limit_reached {
            self.output_formatter.warning(&format!(
                "Stopped after {} matches (max_matches)",
                records.len()
            ));
        }

        for skipped in &progress.skipped {
            self.output_formatter.info(&skipped.to_string());
        }

        // Step 3: Write the report
        let bytes_written = self.write_report(&records)?;

        let summary = RunSummary::from_progress(
            &progress,
            started_at,
            root.to_path_buf(),
            self.config.output.path.clone(),
            description,
            bytes_written,
        );

        self.output_formatter.print_run_summary(&summary);

        Ok(summary)
    }

    fn search_tree(
        &self,
        root: &Path,
        line_matcher: &LineMatcher,
    ) -> Result<(Vec<MatchRecord>, SearchProgress)> {
        let scanner =
            SourceScanner::new(&self.config.filters).with_ignored_path(&self.config.output.path);
        let mut files = scanner.files(root)?;

        let relative = self.config.output.relative_paths;
        let limit = self.config.search.max_matches;

        let pb = self.progress_manager.create_search_progress();
        let mut progress = SearchProgress::new();
        let mut records = Vec::new();

        for file in files.by_ref() {
            if let Err(e) = self.shutdown.check_shutdown() {
                pb.abandon_with_message("Cancelled");
                return Err(e);
            }

            let display_path = file.display_path(relative);

            match line_matcher.search_file(&file.path, &display_path) {
                Ok(mut found) => {
                    if limit > 0 {
                        found.truncate(limit - records.len());
                    }
                    self.output_formatter.debug(&format!(
                        "{}: {} matches",
                        display_path,
                        found.len()
                    ));
                    progress.update_file(display_path, found.len());
                    records.extend(found);
                }
                Err(reason) => {
                    let skipped = SkippedFile {
                        path: file.path.clone(),
                        reason,
                    };
                    self.output_formatter.debug(&skipped.to_string());
                    progress.add_skipped(skipped);
                }
            }

            ui::progress::update_search_progress(&pb, &progress);

            if limit > 0 && records.len() >= limit {
                progress.limit_reached = true;
                break;
            }
        }

        for skipped in files.into_skipped() {
            progress.add_skipped(skipped);
        }

        ui::progress::finish_progress_with_summary(
            &pb,
            &format!("Searched {} files", progress.files_searched),
            progress.elapsed(),
        );

        Ok((records, progress))
    }

    fn write_report(&self, records: &[MatchRecord]) -> Result<u64> {
        let writer = ReportWriter::new(self.config.output.path.clone());
        let bytes_written = writer.write_records(records)?;

        self.output_formatter.info(&format!(
            "Wrote {} records ({} bytes) to {}",
            records.len(),
            bytes_written,
            writer.path().display()
        ));

        Ok(bytes_written)
    }

    /// Walk `root` without searching, for `--dry-run`.
    pub fn plan<P: AsRef<Path>>(&self, root: P) -> Result<(ScanResult, ScanStatistics)> {
        let scanner =
            SourceScanner::new(&self.config.filters).with_ignored_path(&self.config.output.path);
        let result = scanner.scan_directory(root)?;
        let stats = scanner.get_statistics(&result.files);
        Ok((result, stats))
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn progress_manager(&self) -> &ProgressManager {
        &self.progress_manager
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &CtxGrepError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Get build information
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
        build_date: option_env!("BUILD_DATE").unwrap_or("unknown"),
        target: std::env::consts::ARCH.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_date: &'static str,
    pub target: String,
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ctxgrep {} ({}) built on {} for {}",
            self.version, self.git_hash, self.build_date, self.target
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn numbered_lines(count: usize) -> String {
        (1..=count).map(|i| format!("line {}\n", i)).collect()
    }

    fn quiet_instance(pattern: &str, out: PathBuf) -> CtxGrep {
        let mut config = Config::with_pattern(pattern);
        config.output.path = out;
        CtxGrep::new(config, OutputMode::Plain, 0, true)
    }

    #[test]
    fn test_run_writes_context_block() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        fs::create_dir(&src).unwrap();

        let mut contents = numbered_lines(20);
        contents = contents.replace("line 10\n", "call LegacyAllocator here\n");
        fs::write(src.join("a.h"), contents).unwrap();

        let out = temp_dir.path().join("results.txt");
        let ctxgrep = quiet_instance("LegacyAllocator", out.clone());

        let summary = ctxgrep.run(&src).unwrap();
        assert_eq!(summary.files_searched, 1);
        assert_eq!(summary.records_written, 1);
        assert!(!summary.has_skipped_files());

        let report = fs::read_to_string(&out).unwrap();
        let expected_lines: Vec<String> = (5..=15)
            .map(|i| {
                if i == 10 {
                    "call LegacyAllocator here".to_string()
                } else {
                    format!("line {}", i)
                }
            })
            .collect();
        let expected = format!(
            "FILE: {}\nMATCH LINE: 10\n{}\n\n----\n\n",
            src.join("a.h").display(),
            expected_lines.join("\n")
        );
        assert_eq!(report, expected);
        assert_eq!(summary.bytes_written, expected.len() as u64);
    }

    #[test]
    fn test_run_without_matches_creates_empty_report() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.cpp"), "int main() {}\n").unwrap();

        let out = temp_dir.path().join("results.txt");
        fs::write(&out, "stale contents").unwrap();

        let summary = quiet_instance("missing", out.clone())
            .run(temp_dir.path())
            .unwrap();

        assert_eq!(summary.records_written, 0);
        assert_eq!(fs::read_to_string(&out).unwrap(), "");
    }

    #[test]
    fn test_run_honors_max_matches() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.h"), "hit\nhit\nhit\n").unwrap();
        fs::write(temp_dir.path().join("b.h"), "hit\n").unwrap();

        let out = temp_dir.path().join("results.txt");
        let mut config = Config::with_pattern("hit");
        config.output.path = out.clone();
        config.search.max_matches = 2;
        config.search.context = 0;

        let summary = CtxGrep::new(config, OutputMode::Plain, 0, true)
            .run(temp_dir.path())
            .unwrap();

        assert!(summary.limit_reached);
        assert_eq!(summary.records_written, 2);
        assert_eq!(summary.files_searched, 1);
        assert_eq!(fs::read_to_string(&out).unwrap().matches("MATCH LINE").count(), 2);
    }

    #[test]
    fn test_run_records_undecodable_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("bin.h"), [0xffu8, 0xfe, b'x', b'\n']).unwrap();
        fs::write(temp_dir.path().join("ok.h"), "x\n").unwrap();

        let out = temp_dir.path().join("results.txt");
        let summary = quiet_instance("x", out).run(temp_dir.path()).unwrap();

        assert_eq!(summary.records_written, 1);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].path, temp_dir.path().join("bin.h"));
    }

    #[test]
    fn test_run_rejects_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("results.txt");

        let err = quiet_instance("x", out.clone())
            .run(temp_dir.path().join("missing"))
            .unwrap_err();

        assert!(matches!(err, CtxGrepError::InvalidPath { .. }));
        assert_eq!(err.exit_code(), 3);
        assert!(!out.exists());
    }

    #[test]
    fn test_cancelled_run_leaves_report_untouched() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.h"), "x\n").unwrap();

        let out = temp_dir.path().join("results.txt");
        fs::write(&out, "previous").unwrap();

        let ctxgrep = quiet_instance("x", out.clone());
        ctxgrep.request_shutdown();
        assert!(!ctxgrep.is_running());

        let err = ctxgrep.run(temp_dir.path()).unwrap_err();
        assert!(matches!(err, CtxGrepError::Cancelled));
        assert_eq!(fs::read_to_string(&out).unwrap(), "previous");
    }

    #[test]
    fn test_plan_lists_files_without_writing() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.cpp"), "x\n").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "x\n").unwrap();

        let out = temp_dir.path().join("results.txt");
        let (result, stats) = quiet_instance("x", out.clone())
            .plan(temp_dir.path())
            .unwrap();

        assert_eq!(result.files.len(), 1);
        assert_eq!(stats.total_files, 1);
        assert!(!out.exists());
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.toml");

        CtxGrep::generate_sample_config(&config_path).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[search]"));
        assert!(content.contains("[filters]"));
        assert!(content.contains("[output]"));
        assert!(Config::load_from_file(&config_path).is_ok());
    }

    #[test]
    fn test_build_info_display() {
        assert!(!version_info().is_empty());

        let build_info = build_info();
        let display_string = build_info.to_string();
        assert!(display_string.contains("ctxgrep"));
        assert!(display_string.contains(build_info.version));
    }
}
