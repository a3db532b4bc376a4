use crate::config::{CliOverrides, Config};
use crate::error::Result;
use crate::ui::OutputMode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ctxgrep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search C/C++ sources for a pattern and write every match with context to a report")]
#[command(
    long_about = "ctxgrep walks a directory tree, searches every file whose extension is on the \
                  allowlist for a pattern, and writes each matching line together with the lines \
                  around it to a report file. The report is replaced on every run."
)]
#[command(before_help = "🔍 ctxgrep - Context Search Tool")]
#[command(after_help = "EXAMPLES:\n  \
    ctxgrep LegacyAllocator\n  \
    ctxgrep 'TODO|FIXME' src --regex -i -n 3\n  \
    ctxgrep malloc . --extensions c,h --out reports/malloc.txt\n  \
    ctxgrep --config ctxgrep.toml\n  \
    ctxgrep --generate-config")]
pub struct Cli {
    /// Text to search for (a regular expression with --regex)
    pub pattern: Option<String>,

    /// Directory to search
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Lines of context before and after each match
    #[arg(short = 'n', long)]
    pub context: Option<usize>,

    /// Report file (overwritten on every run)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// File extensions to search (comma-separated)
    #[arg(
        short,
        long,
        help = "File extensions to search (e.g., cpp,h,hpp)"
    )]
    pub extensions: Option<String>,

    /// Directory names to skip
    #[arg(short = 'x', long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Treat the pattern as a regular expression
    #[arg(long)]
    pub regex: bool,

    /// Case-insensitive matching
    #[arg(short, long)]
    pub ignore_case: bool,

    /// Stop after this many matches (0 = no limit)
    #[arg(long)]
    pub max_matches: Option<usize>,

    /// Search files that are not valid UTF-8, replacing invalid bytes
    #[arg(long, help = "Decode invalid UTF-8 lossily instead of skipping the file")]
    pub lossy: bool,

    /// Print file paths relative to the search root
    #[arg(long)]
    pub relative_paths: bool,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Format of terminal status output (the report format is fixed)
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// List the files that would be searched without writing a report
    #[arg(long)]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Write a sample configuration file (to --config or ctxgrep.toml)")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl From<OutputFormat> for OutputMode {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        }
    }
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_pattern(self.pattern.clone())
            .with_context(self.context)
            .with_regex(self.regex)
            .with_ignore_case(self.ignore_case)
            .with_max_matches(self.max_matches)
            .with_lossy(self.lossy)
            .with_extensions(self.extensions.clone())
            .with_exclude(self.exclude.clone())
            .with_output(self.out.clone())
            .with_relative_paths(self.relative_paths)
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_format.into()
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}
