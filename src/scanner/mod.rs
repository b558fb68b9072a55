//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Multi-root directory walking with walkdir
//! - Eligibility classification (symlinks, foreign devices, special files)
//! - Content hashing with BLAKE3 or SHA-256
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and candidate discovery
//! - [`classify`]: Per-entry eligibility rules and physical-file identity
//! - [`hasher`]: Streaming content digests
//!
//! # Example
//!
//! ```no_run
//! use finddup::scanner::Walker;
//! use std::path::PathBuf;
//!
//! let walker = Walker::new(vec![PathBuf::from("/home/user/Downloads")]);
//! for item in walker.walk().unwrap() {
//!     match item {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(warning) => eprintln!("warning: {}", warning),
//!     }
//! }
//! ```

pub mod classify;
pub mod hasher;
pub mod walker;

use std::fs::Metadata;
use std::path::{Path, PathBuf};

// Re-export main types
pub use classify::{Classification, IdentityTracker, PathClassifier, SkipReason};
pub use hasher::{digest_to_hex, Digest, DigestAlgorithm, Hasher};
pub use walker::Walker;

/// Stable identity of a physical file on disk.
///
/// Two directory entries with the same identity are the same file (hardlinks
/// or the same path reached from overlapping roots), never duplicates of
/// each other. The device half doubles as the mount boundary check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    /// Device id of the filesystem holding the entry
    pub dev: u64,
    /// Inode number within that filesystem
    pub ino: u64,
}

impl FileIdentity {
    /// Extract the identity from file metadata.
    ///
    /// Returns `None` on platforms without stable (device, inode) pairs;
    /// identity de-duplication and mount boundary checks are disabled there.
    #[cfg(unix)]
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    #[must_use]
    pub fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }
}

/// Metadata for a discovered candidate file.
///
/// Carries everything the grouping phases need so no path is re-stat'ed
/// later.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes at stat time
    pub size: u64,
    /// Device/inode identity, when the platform provides one
    pub identity: Option<FileIdentity>,
}

impl FileEntry {
    /// Create a new entry.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            size,
            identity: None,
        }
    }

    /// Attach a device/inode identity.
    #[must_use]
    pub fn with_identity(mut self, identity: Option<FileIdentity>) -> Self {
        self.identity = identity;
        self
    }
}

/// Fatal problems with the requested scan roots.
///
/// All of these abort before any traversal begins.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The root path does not exist.
    #[error("Root not found: {0}")]
    RootNotFound(PathBuf),

    /// The root path exists but is not a directory.
    #[error("Root is not a directory: {0}")]
    RootNotADirectory(PathBuf),

    /// The root path is itself a symbolic link.
    #[error("Root is a symbolic link: {0}")]
    RootIsSymlink(PathBuf),

    /// The root path could not be inspected.
    #[error("Cannot read root {path}: {source}")]
    RootUnreadable {
        /// The offending root
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Non-fatal per-entry notices produced while scanning.
///
/// Warnings are collected on a side channel and surfaced alongside the final
/// report; they never abort the scan (unless strict mode promotes them) and
/// never appear inside a duplicate group.
#[derive(thiserror::Error, Debug)]
pub enum ScanWarning {
    /// A directory or file could not be listed or stat'ed.
    #[error("Unreadable entry {path}: {source}")]
    Unreadable {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An entry lives on a different filesystem than its root; the subtree
    /// is not entered.
    #[error("Refusing to cross mountpoint: {0}")]
    MountpointCrossed(PathBuf),

    /// A symbolic link was skipped as a candidate.
    #[error("Ignoring symbolic link: {0}")]
    SymlinkSkipped(PathBuf),

    /// A file disappeared between being listed and being read.
    #[error("File vanished during scan: {0}")]
    RemovedMidScan(PathBuf),

    /// Reading a file for hashing failed partway through.
    #[error("Failed to hash {path}: {source}")]
    HashFailed {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanWarning {
    /// Machine-readable reason tag, used by the JSON report.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Unreadable { .. } => "unreadable",
            Self::MountpointCrossed(_) => "mountpoint-crossed",
            Self::SymlinkSkipped(_) => "symlink-skipped",
            Self::RemovedMidScan(_) => "removed-mid-scan",
            Self::HashFailed { .. } => "hash-failed",
        }
    }

    /// The path the warning refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Unreadable { path, .. } | Self::HashFailed { path, .. } => path,
            Self::MountpointCrossed(path)
            | Self::SymlinkSkipped(path)
            | Self::RemovedMidScan(path) => path,
        }
    }
}
