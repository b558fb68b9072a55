//! Duplicate finder implementation with two-phase detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Walk**: collect eligible files from every root (see
//!    [`crate::scanner::walker`])
//! 2. **Size grouping**: bucket by exact size, prune singletons (see
//!    [`crate::duplicates::groups`])
//! 3. **Digest grouping**: stream full content through each configured
//!    digest in turn, re-bucketing and pruning after every pass
//!
//! Hashing dominates the cost, which is exactly why the size filter runs
//! first: no file is read unless another file of the same size exists. The
//! size index is completed before any hashing starts, since singleton
//! pruning needs full bucket membership.
//!
//! # Example
//!
//! ```no_run
//! use finddup::duplicates::DuplicateFinder;
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (groups, summary) = finder
//!     .find_duplicates(&[PathBuf::from("/data")])
//!     .unwrap();
//!
//! println!("{} duplicate groups", groups.len());
//! println!("reclaimable: {}", summary.reclaimable_display());
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::progress::ProgressCallback;
use crate::scanner::{
    ConfigError, Digest, DigestAlgorithm, FileEntry, Hasher, ScanWarning, Walker,
};

use super::groups::{group_by_size, DuplicateGroup};

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Digest chain applied in order; every pass refines the buckets.
    pub digests: Vec<DigestAlgorithm>,
    /// Fail on the first non-fatal warning instead of collecting it.
    pub strict: bool,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("digests", &self.digests)
            .field("strict", &self.strict)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            digests: vec![DigestAlgorithm::Blake3],
            strict: false,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the I/O thread count (minimum 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the digest chain. An empty chain falls back to BLAKE3.
    #[must_use]
    pub fn with_digests(mut self, digests: Vec<DigestAlgorithm>) -> Self {
        self.digests = if digests.is_empty() {
            vec![DigestAlgorithm::Blake3]
        } else {
            digests
        };
        self
    }

    /// Fail on the first warning.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate scan.
///
/// Also carries the warnings channel: every non-fatal skip recorded during
/// the scan, kept apart from the duplicate groups themselves.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Total number of candidate files the walker yielded
    pub total_files: usize,
    /// Total size of all candidates in bytes
    pub total_size: u64,
    /// Zero-byte files dropped before bucketing
    pub eliminated_empty: usize,
    /// Files eliminated because their size was unique
    pub eliminated_by_size: usize,
    /// Files eliminated by digest mismatch across all passes
    pub eliminated_by_digest: usize,
    /// Number of successful content digests computed
    pub hashed_files: usize,
    /// Total bytes read for hashing
    pub bytes_hashed: u64,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Number of redundant files (group members minus one original each)
    pub duplicate_files: usize,
    /// Space reclaimable by keeping one copy per group
    pub reclaimable_space: u64,
    /// Wall-clock duration of the scan
    pub scan_duration: Duration,
    /// Whether the scan was cut short by shutdown
    pub interrupted: bool,
    /// Non-fatal warnings collected along the way
    pub warnings: Vec<ScanWarning>,
}

impl ScanSummary {
    /// Percentage of scanned bytes wasted by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Reclaimable space as a human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        format_size(self.reclaimable_space)
    }

    /// Total candidate size as a human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        format_size(self.total_size)
    }
}

/// Format a byte size as a human-readable string.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Errors that can abort duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by the user.
    #[error("Scan interrupted by user")]
    Interrupted,

    /// A scan root failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A warning promoted to an error by strict mode.
    #[error(transparent)]
    Scan(#[from] ScanWarning),
}

/// Bucket key during digest refinement: the size plus every digest
/// computed so far, so buckets from different size classes can never merge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BucketKey {
    size: u64,
    digests: Vec<Digest>,
}

type Buckets = HashMap<BucketKey, Vec<FileEntry>>;

/// Duplicate finder orchestrating the detection pipeline.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<Hasher>,
}

impl DuplicateFinder {
    /// Create a finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new();
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(Arc::clone(flag));
        }
        Self {
            config,
            hasher: Arc::new(hasher),
        }
    }

    /// Create a finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find all duplicate files under the given roots.
    ///
    /// Returns the confirmed groups, sorted by size then digest with member
    /// paths sorted, plus the scan summary with the warnings channel.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Config`] before any scanning when a root is
    /// invalid, [`FinderError::Interrupted`] when shutdown was requested,
    /// and in strict mode the first [`FinderError::Scan`] warning.
    pub fn find_duplicates(
        &self,
        roots: &[PathBuf],
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let mut summary = ScanSummary::default();

        let mut walker = Walker::new(roots.to_vec());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }
        // Root validation happens here, before anything is read
        let walk = walker.walk()?;

        log::info!("Scanning {} root(s)", roots.len());
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walk", 0);
        }

        let mut files = Vec::new();
        for item in walk {
            match item {
                Ok(file) => {
                    summary.total_size += file.size;
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(files.len() + 1, &file.path.to_string_lossy());
                    }
                    files.push(file);
                }
                Err(warning) => {
                    if self.config.strict {
                        return Err(warning.into());
                    }
                    log::warn!("{}", warning);
                    summary.warnings.push(warning);
                }
            }
        }
        summary.total_files = files.len();

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walk");
        }
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        log::info!(
            "Found {} candidate files ({})",
            summary.total_files,
            summary.total_size_display()
        );

        // Size bucketing must be complete before any hashing: singleton
        // pruning depends on full bucket membership.
        let (size_buckets, grouping_stats) = group_by_size(files);
        summary.eliminated_empty = grouping_stats.eliminated_empty;
        summary.eliminated_by_size = grouping_stats.eliminated_unique;

        log::info!(
            "Size grouping: {} files remain in {} buckets ({:.1}% eliminated)",
            grouping_stats.potential_duplicates,
            grouping_stats.candidate_groups,
            grouping_stats.elimination_rate()
        );

        let mut buckets: Buckets = size_buckets
            .into_iter()
            .map(|(size, members)| {
                (
                    BucketKey {
                        size,
                        digests: Vec::new(),
                    },
                    members,
                )
            })
            .collect();

        // Size equality alone proves nothing; an unconfigured chain still
        // hashes with the default algorithm.
        let chain: Vec<DigestAlgorithm> = if self.config.digests.is_empty() {
            vec![DigestAlgorithm::Blake3]
        } else {
            self.config.digests.clone()
        };
        for &algorithm in &chain {
            if buckets.is_empty() {
                break;
            }
            buckets = self.refine_with_digest(buckets, algorithm, &mut summary)?;
        }

        let mut groups: Vec<DuplicateGroup> = buckets
            .into_iter()
            .map(|(key, members)| {
                let digests = chain.iter().copied().zip(key.digests).collect();
                DuplicateGroup::new(key.size, digests, members)
            })
            .collect();
        groups.sort_by(|a, b| {
            a.size.cmp(&b.size).then_with(|| {
                a.digests
                    .iter()
                    .map(|(_, digest)| digest)
                    .cmp(b.digests.iter().map(|(_, digest)| digest))
            })
        });

        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} groups, {} redundant files, {} reclaimable, {} warning(s)",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display(),
            summary.warnings.len()
        );

        Ok((groups, summary))
    }

    /// One digest pass: hash every bucket member, split buckets by digest,
    /// prune the singletons that fall out.
    fn refine_with_digest(
        &self,
        buckets: Buckets,
        algorithm: DigestAlgorithm,
        summary: &mut ScanSummary,
    ) -> Result<Buckets, FinderError> {
        let work: Vec<(BucketKey, FileEntry)> = buckets
            .into_iter()
            .flat_map(|(key, members)| members.into_iter().map(move |f| (key.clone(), f)))
            .collect();

        log::info!(
            "Computing {} digests for {} files on {} thread(s)",
            algorithm,
            work.len(),
            self.config.io_threads
        );
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(algorithm.name(), work.len());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads)
            .build()
            .unwrap_or_else(|_| {
                log::warn!(
                    "Failed to create bounded thread pool, using {} threads",
                    rayon::current_num_threads()
                );
                rayon::ThreadPoolBuilder::new().build().unwrap()
            });

        let hasher = Arc::clone(&self.hasher);
        let results: Vec<(BucketKey, FileEntry, std::io::Result<Digest>)> = pool.install(|| {
            work.into_par_iter()
                .enumerate()
                .map(|(idx, (key, file))| {
                    if self.config.is_shutdown_requested() {
                        let err = std::io::Error::new(
                            std::io::ErrorKind::Interrupted,
                            "shutdown requested",
                        );
                        return (key, file, Err(err));
                    }
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(idx + 1, &file.path.to_string_lossy());
                    }
                    let result = hasher.digest_file(&file.path, algorithm);
                    if result.is_ok() {
                        if let Some(ref callback) = self.config.progress_callback {
                            callback.on_item_completed(file.size);
                        }
                    }
                    (key, file, result)
                })
                .collect()
        });

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(algorithm.name());
        }
        if self.config.is_shutdown_requested() {
            summary.interrupted = true;
            return Err(FinderError::Interrupted);
        }

        let mut refined: Buckets = HashMap::new();
        for (mut key, file, result) in results {
            match result {
                Ok(digest) => {
                    summary.hashed_files += 1;
                    summary.bytes_hashed += file.size;
                    key.digests.push(digest);
                    refined.entry(key).or_default().push(file);
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => {
                    let warning = if e.kind() == std::io::ErrorKind::NotFound {
                        ScanWarning::RemovedMidScan(file.path)
                    } else {
                        ScanWarning::HashFailed {
                            path: file.path,
                            source: e,
                        }
                    };
                    if self.config.strict {
                        return Err(warning.into());
                    }
                    log::warn!("{}", warning);
                    summary.warnings.push(warning);
                }
            }
        }

        // A file dropped by an error above may leave its bucket with one
        // member; that bucket must not survive as a false duplicate pair.
        let mut eliminated = 0usize;
        refined.retain(|_, members| {
            if members.len() > 1 {
                true
            } else {
                eliminated += members.len();
                false
            }
        });
        summary.eliminated_by_digest += eliminated;

        log::info!(
            "{} pass: {} buckets remain, {} files eliminated",
            algorithm,
            refined.len(),
            eliminated
        );

        Ok(refined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1024 * 1024), "1.00 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn test_finds_identical_pair() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.txt", b"identical content");
        let b = write_file(&dir, "b.txt", b"identical content");
        write_file(&dir, "c.txt", b"something different");

        let finder = DuplicateFinder::with_defaults();
        let (groups, summary) = finder
            .find_duplicates(&[dir.path().to_path_buf()])
            .unwrap();

        assert_eq!(groups.len(), 1);
        let paths = groups[0].paths();
        assert_eq!(paths, {
            let mut expected = vec![a.canonicalize().unwrap(), b.canonicalize().unwrap()];
            expected.sort();
            expected
        });
        assert_eq!(summary.duplicate_groups, 1);
        assert_eq!(summary.duplicate_files, 1);
        assert_eq!(summary.reclaimable_space, 17);
    }

    #[test]
    fn test_same_size_different_content_not_grouped() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "a.txt", b"AAAAAAAAAA");
        write_file(&dir, "b.txt", b"BBBBBBBBBB");

        let finder = DuplicateFinder::with_defaults();
        let (groups, summary) = finder
            .find_duplicates(&[dir.path().to_path_buf()])
            .unwrap();

        assert!(groups.is_empty());
        // Both files were hashed (same size), neither grouped
        assert_eq!(summary.hashed_files, 2);
        assert_eq!(summary.eliminated_by_digest, 2);
    }

    #[test]
    fn test_unique_sizes_never_hashed() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "a.txt", b"short");
        write_file(&dir, "b.txt", b"a bit longer");
        write_file(&dir, "c.txt", b"even longer than that");

        let finder = DuplicateFinder::with_defaults();
        let (groups, summary) = finder
            .find_duplicates(&[dir.path().to_path_buf()])
            .unwrap();

        assert!(groups.is_empty());
        assert_eq!(summary.hashed_files, 0, "no singleton bucket may be hashed");
        assert_eq!(summary.eliminated_by_size, 3);
    }

    #[test]
    fn test_zero_byte_files_not_grouped() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "a.txt", b"");
        write_file(&dir, "b.txt", b"");

        let finder = DuplicateFinder::with_defaults();
        let (groups, summary) = finder
            .find_duplicates(&[dir.path().to_path_buf()])
            .unwrap();

        assert!(groups.is_empty());
        assert_eq!(summary.eliminated_empty, 2);
    }

    #[test]
    fn test_digest_chain_refines_not_merges() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "a.txt", b"identical content");
        write_file(&dir, "b.txt", b"identical content");

        let config = FinderConfig::default()
            .with_digests(vec![DigestAlgorithm::Blake3, DigestAlgorithm::Sha256]);
        let finder = DuplicateFinder::new(config);
        let (groups, summary) = finder
            .find_duplicates(&[dir.path().to_path_buf()])
            .unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].digests.len(), 2);
        assert_eq!(groups[0].digests[0].0, DigestAlgorithm::Blake3);
        assert_eq!(groups[0].digests[1].0, DigestAlgorithm::Sha256);
        // Two files hashed twice each
        assert_eq!(summary.hashed_files, 4);
    }

    #[test]
    fn test_two_roots_scenario() {
        let dir_a = TempDir::new().unwrap();
        let dir_b = TempDir::new().unwrap();
        let x = write_file(&dir_a, "x.txt", b"0123456789");
        write_file(&dir_a, "z.txt", b"9876543210");
        let y = write_file(&dir_b, "y.txt", b"0123456789");

        let finder = DuplicateFinder::with_defaults();
        let (groups, _) = finder
            .find_duplicates(&[dir_a.path().to_path_buf(), dir_b.path().to_path_buf()])
            .unwrap();

        assert_eq!(groups.len(), 1);
        let paths = groups[0].paths();
        assert!(paths.contains(&x.canonicalize().unwrap()));
        assert!(paths.contains(&y.canonicalize().unwrap()));
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn test_missing_root_fails_before_scan() {
        let finder = DuplicateFinder::with_defaults();
        let err = finder
            .find_duplicates(&[PathBuf::from("/definitely/not/here")])
            .unwrap_err();
        assert!(matches!(err, FinderError::Config(_)));
    }

    #[test]
    fn test_idempotent_scans() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "a.txt", b"dup");
        write_file(&dir, "b.txt", b"dup");
        write_file(&dir, "c.txt", b"dup");
        write_file(&dir, "d.txt", b"one");

        let finder = DuplicateFinder::with_defaults();
        let roots = [dir.path().to_path_buf()];
        let (first, _) = finder.find_duplicates(&roots).unwrap();
        let (second, _) = finder.find_duplicates(&roots).unwrap();

        let paths = |groups: &[DuplicateGroup]| -> Vec<Vec<PathBuf>> {
            groups.iter().map(DuplicateGroup::paths).collect()
        };
        assert_eq!(paths(&first), paths(&second));
    }

    #[test]
    fn test_interrupted_before_walk() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "a.txt", b"dup");
        write_file(&dir, "b.txt", b"dup");

        let flag = Arc::new(AtomicBool::new(true));
        let config = FinderConfig::default().with_shutdown_flag(flag);
        let finder = DuplicateFinder::new(config);

        let err = finder
            .find_duplicates(&[dir.path().to_path_buf()])
            .unwrap_err();
        assert!(matches!(err, FinderError::Interrupted));
    }
}
