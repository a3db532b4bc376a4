use clap::Parser;
use ctxgrep::{
    build_info, Cli, CtxGrep, CtxGrepError, GracefulShutdown, OutputFormatter, UserFriendlyError,
};
use std::path::PathBuf;
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let ctxgrep = match CtxGrep::from_cli(&cli) {
        Ok(ctxgrep) => ctxgrep,
        Err(e) => {
            print_startup_error(&cli, &e);
            return e.exit_code();
        }
    };

    ctxgrep.output_formatter().debug(&build_info().to_string());

    if cli.dry_run {
        return handle_dry_run(&cli, &ctxgrep);
    }

    let ctxgrep = match GracefulShutdown::install() {
        Ok(shutdown) => ctxgrep.with_shutdown(shutdown),
        Err(e) => {
            ctxgrep.handle_error(&e);
            return e.exit_code();
        }
    };

    // Skipped files are listed in the summary; they do not fail the run.
    match ctxgrep.run(&cli.root) {
        Ok(_) => 0,
        Err(e) => {
            ctxgrep.handle_error(&e);
            e.exit_code()
        }
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("ctxgrep.toml"));

    match CtxGrep::generate_sample_config(&config_path) {
        Ok(()) => {
            println!(
                "Generated sample configuration file: {}",
                config_path.display()
            );
            println!("\nTo use this configuration:");
            println!("  ctxgrep --config {}", config_path.display());
            println!("\nEdit the file to set the pattern and filters for your tree.");
            0
        }
        Err(e) => {
            eprintln!(
                "Failed to generate configuration file: {}",
                e.user_message()
            );
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(cli: &Cli, ctxgrep: &CtxGrep) -> i32 {
    let formatter = ctxgrep.output_formatter();
    let config = ctxgrep.config();

    formatter.info("DRY RUN MODE - no report will be written");
    formatter.print_separator();

    formatter.info("Configuration that would be used:");
    formatter.info(&format!("  Pattern: {}", config.search.pattern));
    formatter.info(&format!("  Context lines: {}", config.search.context));
    formatter.info(&format!(
        "  Extensions: {}",
        config.filters.extensions.join(", ")
    ));
    if !config.filters.exclude_dirs.is_empty() {
        formatter.info(&format!(
            "  Exclude directories: {}",
            config.filters.exclude_dirs.join(", ")
        ));
    }
    formatter.info(&format!("  Report: {}", config.output.path.display()));

    let (result, stats) = match ctxgrep.plan(&cli.root) {
        Ok(plan) => plan,
        Err(e) => {
            ctxgrep.handle_error(&e);
            return e.exit_code();
        }
    };

    formatter.print_file_plan(&result.files, &stats, config.output.relative_paths);

    for skipped in &result.skipped {
        formatter.warning(&skipped.to_string());
    }

    formatter.print_separator();
    formatter.success("Dry run completed successfully");

    0
}

fn print_startup_error(cli: &Cli, error: &CtxGrepError) {
    let formatter = OutputFormatter::new(cli.output_mode(), 0, false);
    formatter.print_user_friendly_error(error);
}
