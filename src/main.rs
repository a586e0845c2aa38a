//! hlink - Hard Link Mirrored Directory Trees
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use hlink::config::{CliArgs, HlinkConfig, PairingMode};
use hlink::driver::Driver;
use hlink::progress::{print_header, print_summary};
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Help and usage errors both go to stderr; usage errors exit 1.
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprint!("{}", e.render());
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<()> {
    // Setup logging
    setup_logging(args.verbose)?;

    // Validate roots and build config
    let config = HlinkConfig::from_args(args).context("Invalid arguments")?;

    if config.show_progress {
        let mode = match (config.pairing, config.dry_run) {
            (PairingMode::Keyed, false) => "keyed",
            (PairingMode::Keyed, true) => "keyed, dry run",
            (PairingMode::Lockstep, false) => "lockstep",
            (PairingMode::Lockstep, true) => "lockstep, dry run",
        };
        print_header(
            &config.source.to_string(),
            &config.destination.to_string(),
            mode,
        );
    }

    let show_summary = config.show_progress;
    let dry_run = config.dry_run;
    let driver = Driver::new(config);

    // Setup signal handler for graceful shutdown
    let shutdown_flag = driver.shutdown_flag();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, stopping after the current file...");
        shutdown_flag.store(true, Ordering::SeqCst);
    })
    .context("Failed to set signal handler")?;

    let stdout = std::io::stdout();
    let mut report = stdout.lock();
    let stats = driver.run(&mut report).context("Run failed")?;
    drop(report);

    if show_summary {
        print_summary(&stats, dry_run);
    }

    if !stats.completed {
        info!("Run was interrupted before completion");
    }

    if stats.errors > 0 {
        info!(errors = stats.errors, "Run completed with errors");
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("hlink=debug,warn")
        } else {
            EnvFilter::new("hlink=info,warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
