//! Command-line interface definitions, using the clap derive API.
//!
//! # Example
//!
//! ```bash
//! # Scan the current directory
//! finddup
//!
//! # Scan several trees at once
//! finddup ~/Documents ~/Backups
//!
//! # Chain two digests and emit JSON for scripting
//! finddup -d blake3 -d sha256 --output json ~/Documents
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::scanner::DigestAlgorithm;

/// Find duplicate files using file sizes and cryptographic hashes.
///
/// Scans the given directory trees, groups byte-identical regular files and
/// prints the groups. Symbolic links are never candidates and traversal
/// never crosses onto a different filesystem than the root it started from.
#[derive(Debug, Parser)]
#[command(name = "finddup")]
#[command(author, version, about)]
pub struct Cli {
    /// Root search location(s)
    #[arg(value_name = "DIR", default_value = ".")]
    pub dirs: Vec<PathBuf>,

    /// Digest algorithm(s); may be given multiple times to chain them
    #[arg(
        short = 'd',
        long = "digest",
        value_name = "ALGO",
        value_parser = parse_digest
    )]
    pub digests: Vec<DigestAlgorithm>,

    /// List supported digest algorithms and exit
    #[arg(short = 'l', long)]
    pub list_digests: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Number of I/O threads for hashing
    ///
    /// Lower values reduce disk thrashing on spinning disks.
    #[arg(long, value_name = "N", default_value = "4")]
    pub io_threads: usize,

    /// Abort on the first skipped entry instead of continuing with a warning
    #[arg(long)]
    pub strict: bool,

    /// Report fatal errors as JSON objects on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Increase verbosity level (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and the report
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,
}

impl Cli {
    /// The digest chain to run, defaulting to BLAKE3 when none was given.
    #[must_use]
    pub fn digest_chain(&self) -> Vec<DigestAlgorithm> {
        if self.digests.is_empty() {
            vec![DigestAlgorithm::Blake3]
        } else {
            self.digests.clone()
        }
    }
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing, groups sorted by size
    Text,
    /// JSON document for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse one `--digest` value.
fn parse_digest(s: &str) -> Result<DigestAlgorithm, String> {
    s.parse()
}
