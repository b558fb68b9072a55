//! JSON output formatter for duplicate scan results.
//!
//! Machine-readable output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "size": 1024,
//!       "digests": [{"algorithm": "blake3", "hex": "abc123..."}],
//!       "files": ["/path/to/file1.txt", "/path/to/file2.txt"]
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 100,
//!     "duplicate_groups": 5,
//!     "reclaimable_space": 51200,
//!     "scan_duration_ms": 1234,
//!     "interrupted": false
//!   },
//!   "warnings": [
//!     {"reason": "symlink-skipped", "path": "/path/to/link"}
//!   ]
//! }
//! ```

use std::io::{self, Write};

use serde::Serialize;

use crate::duplicates::{DuplicateGroup, ScanSummary};
use crate::error::ExitCode;
use crate::scanner::{digest_to_hex, DigestAlgorithm};

/// One entry of a group's digest chain.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDigest {
    /// Algorithm that produced the digest
    pub algorithm: DigestAlgorithm,
    /// Digest as lowercase hex (64 characters)
    pub hex: String,
}

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// File size in bytes
    pub size: u64,
    /// Digest chain that confirmed the group
    pub digests: Vec<JsonDigest>,
    /// Absolute paths to all members, sorted
    pub files: Vec<String>,
}

impl JsonDuplicateGroup {
    /// Convert a [`DuplicateGroup`].
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup) -> Self {
        Self {
            size: group.size,
            digests: group
                .digests
                .iter()
                .map(|(algorithm, digest)| JsonDigest {
                    algorithm: *algorithm,
                    hex: digest_to_hex(digest),
                })
                .collect(),
            files: group
                .files
                .iter()
                .map(|f| f.path.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of candidate files
    pub total_files: usize,
    /// Total size of all candidates in bytes
    pub total_size: u64,
    /// Files eliminated by the size filter
    pub eliminated_by_size: usize,
    /// Zero-byte files dropped
    pub eliminated_empty: usize,
    /// Number of content digests computed
    pub hashed_files: usize,
    /// Total bytes read for hashing
    pub bytes_hashed: u64,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Number of redundant files
    pub duplicate_files: usize,
    /// Space reclaimable by deduplication (bytes)
    pub reclaimable_space: u64,
    /// Scan duration in milliseconds
    pub scan_duration_ms: u64,
    /// Whether the scan was interrupted
    pub interrupted: bool,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "FD000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Convert a [`ScanSummary`] with its exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            eliminated_by_size: summary.eliminated_by_size,
            eliminated_empty: summary.eliminated_empty,
            hashed_files: summary.hashed_files,
            bytes_hashed: summary.bytes_hashed,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            interrupted: summary.interrupted,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// One warning in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonWarning {
    /// Machine-readable reason tag
    pub reason: String,
    /// Path the warning refers to
    pub path: String,
    /// Full human-readable message
    pub message: String,
}

/// Complete JSON output document.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// List of duplicate groups
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Scan summary statistics
    pub summary: JsonSummary,
    /// Non-fatal warnings collected during the scan
    pub warnings: Vec<JsonWarning>,
}

impl JsonOutput {
    /// Build the document from the finder's results.
    #[must_use]
    pub fn new(groups: &[DuplicateGroup], summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            duplicates: groups
                .iter()
                .map(JsonDuplicateGroup::from_duplicate_group)
                .collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
            warnings: summary
                .warnings
                .iter()
                .map(|w| JsonWarning {
                    reason: w.reason().to_string(),
                    path: w.path().to_string_lossy().into_owned(),
                    message: w.to_string(),
                })
                .collect(),
        }
    }

    /// Serialize as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error; with these types it cannot occur in
    /// practice.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty-printed JSON plus a trailing newline.
    ///
    /// # Errors
    ///
    /// Any I/O error from the underlying writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let json = self.to_json_pretty().map_err(io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}
