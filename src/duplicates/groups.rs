//! Size bucketing and duplicate group types.
//!
//! # Overview
//!
//! Grouping by exact byte size is the first phase of duplicate detection:
//! files of different sizes cannot be duplicates, so most of the tree is
//! eliminated without reading a single content byte. Zero-byte files are
//! dropped here as well; every empty file trivially matches every other and
//! reporting them is pure noise.
//!
//! # Example
//!
//! ```
//! use finddup::duplicates::group_by_size;
//! use finddup::scanner::FileEntry;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileEntry::new(PathBuf::from("/file1.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file2.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file3.txt"), 2048),
//! ];
//!
//! let (buckets, stats) = group_by_size(files);
//! assert_eq!(buckets.len(), 1);
//! assert_eq!(stats.potential_duplicates, 2);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::{digest_to_hex, Digest, DigestAlgorithm, FileEntry};

/// Statistics from the size bucketing phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Zero-byte files dropped without bucketing
    pub eliminated_empty: usize,
    /// Files whose size matched nothing else
    pub eliminated_unique: usize,
    /// Files that still could be duplicates after this phase
    pub potential_duplicates: usize,
    /// Number of size buckets with 2+ files
    pub candidate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by the size comparison alone.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            let eliminated = self.total_files - self.potential_duplicates;
            (eliminated as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group files by exact size, keeping only buckets that can hold duplicates.
///
/// Buckets with a single member are discarded; they are never hashed. The
/// returned map is keyed by file size in bytes.
#[must_use]
pub fn group_by_size(files: Vec<FileEntry>) -> (HashMap<u64, Vec<FileEntry>>, GroupingStats) {
    let mut stats = GroupingStats {
        total_files: files.len(),
        ..Default::default()
    };

    let mut buckets: HashMap<u64, Vec<FileEntry>> = HashMap::new();
    for file in files {
        if file.size == 0 {
            log::debug!("Skipping empty file: {}", file.path.display());
            stats.eliminated_empty += 1;
            continue;
        }
        buckets.entry(file.size).or_default().push(file);
    }

    buckets.retain(|size, members| {
        if members.len() > 1 {
            log::debug!("Size bucket {}: {} candidates", size, members.len());
            stats.candidate_groups += 1;
            stats.potential_duplicates += members.len();
            true
        } else {
            stats.eliminated_unique += members.len();
            false
        }
    });

    (buckets, stats)
}

/// A confirmed group of byte-identical files.
///
/// Every member shares the same size and the same digest under every
/// algorithm in the chain. Members are sorted by path.
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    /// File size in bytes, shared by all members
    pub size: u64,
    /// Digest chain that confirmed the group, in application order
    pub digests: Vec<(DigestAlgorithm, Digest)>,
    /// The identical files
    pub files: Vec<FileEntry>,
}

impl DuplicateGroup {
    /// Create a group, sorting members by path for stable output.
    #[must_use]
    pub fn new(
        size: u64,
        digests: Vec<(DigestAlgorithm, Digest)>,
        mut files: Vec<FileEntry>,
    ) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Self {
            size,
            digests,
            files,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of redundant copies (total minus one kept original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Space reclaimable by keeping a single copy.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Just the member paths.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// The digest chain rendered as `algo:hex` labels.
    #[must_use]
    pub fn digest_labels(&self) -> Vec<String> {
        self.digests
            .iter()
            .map(|(algorithm, digest)| format!("{}:{}", algorithm, digest_to_hex(digest)))
            .collect()
    }
}
