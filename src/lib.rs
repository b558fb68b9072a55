//! finddup - Find duplicate files using file sizes and cryptographic hashes.
//!
//! A cross-platform CLI tool that scans one or more directory trees and
//! reports groups of byte-identical files. Detection is a two-phase filter:
//! files are bucketed by exact size first, then same-size files are compared
//! by streaming content digests, so content is only ever read when a size
//! collision makes a duplicate possible.

pub mod cli;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;

use crate::cli::{Cli, OutputFormat};
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::output::JsonOutput;
use crate::progress::Progress;
use crate::scanner::DigestAlgorithm;

/// Run the application with parsed CLI arguments.
///
/// Returns the exit code for normal completions; fatal problems come back
/// as errors and are rendered by `main`.
///
/// # Errors
///
/// Fails on invalid roots, on user interruption, on strict-mode warnings
/// and on I/O errors while writing the report.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    if cli.list_digests {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "digest algorithms supported:")?;
        for algorithm in DigestAlgorithm::ALL {
            writeln!(stdout, "   {}", algorithm)?;
        }
        return Ok(ExitCode::Success);
    }

    let handler = signal::install_handler().context("failed to install Ctrl+C handler")?;

    // Progress bars draw to stderr, so they are safe for both formats,
    // but quiet mode silences them entirely.
    let progress = Arc::new(Progress::new(cli.quiet));

    let config = FinderConfig::default()
        .with_io_threads(cli.io_threads)
        .with_digests(cli.digest_chain())
        .with_strict(cli.strict)
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(progress);

    let finder = DuplicateFinder::new(config);
    let (groups, summary) = finder.find_duplicates(&cli.dirs)?;

    let exit_code = if summary.interrupted {
        ExitCode::Interrupted
    } else if !summary.warnings.is_empty() {
        ExitCode::PartialSuccess
    } else if groups.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    };

    match cli.output {
        OutputFormat::Text => {
            let mut stdout = std::io::stdout().lock();
            output::write_report(&mut stdout, &groups, &summary)
                .context("failed to write report")?;
            let mut stderr = std::io::stderr().lock();
            output::write_warnings(&mut stderr, &summary.warnings)
                .context("failed to write warnings")?;
        }
        OutputFormat::Json => {
            let document = JsonOutput::new(&groups, &summary, exit_code);
            let mut stdout = std::io::stdout().lock();
            document
                .write_to(&mut stdout)
                .context("failed to write JSON report")?;
        }
    }

    Ok(exit_code)
}
