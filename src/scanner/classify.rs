//! Eligibility rules for filesystem entries.
//!
//! # Overview
//!
//! Every entry the walker encounters goes through [`PathClassifier`], which
//! decides whether it may become a duplicate candidate. The rules, in order:
//!
//! 1. Symbolic links are never candidates. A link may resolve to a path
//!    already under scan (the file would show up as a duplicate of itself)
//!    or to a path outside every scanned tree (the report would cover files
//!    the user never asked about). Links are skipped, not followed.
//! 2. Entries on a different device than their root are never candidates and
//!    their subtrees are not entered. A separately mounted volume may alias
//!    content already visible under another path, or belong to a filesystem
//!    outside the requested scope.
//! 3. Only regular files are candidates. Directories are descended into;
//!    device nodes, sockets and FIFOs are skipped.
//!
//! The classifier holds nothing but the root's device id, so one instance
//! per root is enough and repeated scans can run in the same process.
//!
//! [`IdentityTracker`] is the companion stateful piece: it remembers every
//! (device, inode) pair already emitted so the same physical file is yielded
//! at most once, whether reached through overlapping roots or a hardlink.

use std::collections::HashSet;
use std::fs::{FileType, Metadata};

use super::FileIdentity;

/// Why an entry was not accepted as a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The entry is a symbolic link.
    Symlink,
    /// The entry sits on a different device than its scan root.
    ForeignDevice,
    /// The entry is neither a regular file nor a directory.
    NotRegular,
}

/// Decision for one filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Regular file on the root's device, subject to duplicate analysis.
    Candidate,
    /// Directory on the root's device, traversed but never emitted.
    Descend,
    /// Everything else.
    Skip(SkipReason),
}

/// Per-root eligibility check.
///
/// Stateless apart from the device id recorded when the root was validated.
#[derive(Debug, Clone, Copy)]
pub struct PathClassifier {
    /// Device id of the root, `None` where the platform reports none.
    root_device: Option<u64>,
}

impl PathClassifier {
    /// Create a classifier for a root with the given device id.
    #[must_use]
    pub fn new(root_device: Option<u64>) -> Self {
        Self { root_device }
    }

    /// Create a classifier from the root's own metadata.
    #[must_use]
    pub fn for_root(metadata: &Metadata) -> Self {
        Self::new(FileIdentity::from_metadata(metadata).map(|id| id.dev))
    }

    /// Classify a single entry.
    ///
    /// `file_type` must come from a non-following stat so links are seen as
    /// links. The rules are applied in a fixed order; the first that matches
    /// wins.
    #[must_use]
    pub fn classify(&self, file_type: FileType, metadata: &Metadata) -> Classification {
        if file_type.is_symlink() {
            return Classification::Skip(SkipReason::Symlink);
        }
        if self.crosses_device(metadata) {
            return Classification::Skip(SkipReason::ForeignDevice);
        }
        if file_type.is_dir() {
            return Classification::Descend;
        }
        if file_type.is_file() {
            return Classification::Candidate;
        }
        Classification::Skip(SkipReason::NotRegular)
    }

    /// Whether the entry lives on a different device than the root.
    ///
    /// Unknowable device ids (either side) count as not crossing, so scans
    /// still work on platforms without device metadata.
    #[must_use]
    pub fn crosses_device(&self, metadata: &Metadata) -> bool {
        match (self.root_device, FileIdentity::from_metadata(metadata)) {
            (Some(root), Some(entry)) => entry.dev != root,
            _ => false,
        }
    }
}

/// Tracks (device, inode) pairs already emitted as candidates.
///
/// Overlapping roots and hardlinks both make one physical file reachable
/// under several paths; the tracker makes sure only the first sighting is
/// analyzed.
///
/// # Thread Safety
///
/// Not thread-safe; the walk that owns it is single-threaded.
#[derive(Debug, Default)]
pub struct IdentityTracker {
    seen: HashSet<FileIdentity>,
}

impl IdentityTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an identity, returning `true` the first time it is seen.
    ///
    /// Entries without an identity are always treated as first sightings;
    /// there is nothing to compare them by.
    pub fn first_sighting(&mut self, identity: Option<FileIdentity>) -> bool {
        match identity {
            Some(id) => self.seen.insert(id),
            None => true,
        }
    }

    /// Number of distinct identities recorded.
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
