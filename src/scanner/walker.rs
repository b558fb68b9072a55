//! Directory walker producing duplicate candidates.
//!
//! # Overview
//!
//! [`Walker`] traverses one or more root directories and yields a lazy
//! sequence of [`FileEntry`] values for every eligible regular file. Roots
//! are validated up front (must exist, must be directories, must not be
//! symbolic links); everything after that is non-fatal and reported through
//! the [`ScanWarning`] side of the iterator.
//!
//! Each root's device id is recorded at validation time and traversal never
//! leaves it: a subtree on a different device is announced once and not
//! entered. Symbolic links are skipped as candidates without being followed.
//! A shared [`IdentityTracker`] guarantees that one physical file is yielded
//! at most once across all roots, even when roots overlap or hardlinks alias
//! the same inode.
//!
//! Directory entries are visited in file-name order so repeated runs over an
//! unchanged tree produce identical sequences.

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::WalkDir;

use super::classify::{Classification, IdentityTracker, PathClassifier, SkipReason};
use super::{ConfigError, FileEntry, FileIdentity, ScanWarning};

/// Directory walker over a set of scan roots.
#[derive(Debug)]
pub struct Walker {
    /// Root directories in user-given order
    roots: Vec<PathBuf>,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

/// A validated root: canonical path plus its device id.
#[derive(Debug, Clone)]
struct ScanRoot {
    path: PathBuf,
    device: Option<u64>,
}

impl Walker {
    /// Create a walker for the given root directories.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag becomes `true` the walk stops yielding entries as soon
    /// as possible.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Validate the roots and start the walk.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] before anything is scanned when a root is
    /// missing, unreadable, not a directory, or a symbolic link.
    pub fn walk(&self) -> Result<Walk, ConfigError> {
        let mut pending = VecDeque::with_capacity(self.roots.len());
        for root in &self.roots {
            pending.push_back(validate_root(root)?);
        }
        Ok(Walk {
            pending,
            current: None,
            tracker: IdentityTracker::new(),
            shutdown_flag: self.shutdown_flag.clone(),
        })
    }
}

/// Check one root and resolve it to canonical form.
fn validate_root(root: &Path) -> Result<ScanRoot, ConfigError> {
    let metadata = match std::fs::symlink_metadata(root) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ConfigError::RootNotFound(root.to_path_buf()));
        }
        Err(e) => {
            return Err(ConfigError::RootUnreadable {
                path: root.to_path_buf(),
                source: e,
            });
        }
    };

    if metadata.file_type().is_symlink() {
        return Err(ConfigError::RootIsSymlink(root.to_path_buf()));
    }
    if !metadata.is_dir() {
        return Err(ConfigError::RootNotADirectory(root.to_path_buf()));
    }

    let canonical = root
        .canonicalize()
        .map_err(|e| ConfigError::RootUnreadable {
            path: root.to_path_buf(),
            source: e,
        })?;
    let device = FileIdentity::from_metadata(&metadata).map(|id| id.dev);

    log::debug!(
        "Validated root {} (device {:?})",
        canonical.display(),
        device
    );
    Ok(ScanRoot {
        path: canonical,
        device,
    })
}

/// The walk in progress over one root.
struct ActiveRoot {
    classifier: PathClassifier,
    iter: walkdir::IntoIter,
}

/// Lazy iterator over candidates and warnings.
///
/// Yields `Ok(FileEntry)` for every eligible file and `Err(ScanWarning)` for
/// every non-fatal skip the caller should surface.
pub struct Walk {
    pending: VecDeque<ScanRoot>,
    current: Option<ActiveRoot>,
    tracker: IdentityTracker,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walk {
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

impl Iterator for Walk {
    type Item = Result<FileEntry, ScanWarning>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.is_shutdown_requested() {
                log::debug!("Walker: shutdown requested, stopping iteration");
                return None;
            }

            if self.current.is_none() {
                let root = self.pending.pop_front()?;
                let iter = WalkDir::new(&root.path)
                    .follow_links(false)
                    .sort_by_file_name()
                    .into_iter();
                self.current = Some(ActiveRoot {
                    classifier: PathClassifier::new(root.device),
                    iter,
                });
            }
            let active = self.current.as_mut().expect("active root just installed");

            let entry = match active.iter.next() {
                None => {
                    self.current = None;
                    continue;
                }
                Some(Err(e)) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    return Some(Err(ScanWarning::Unreadable {
                        path,
                        source: e.into(),
                    }));
                }
                Some(Ok(entry)) => entry,
            };

            // With follow_links(false) both the file type and the metadata
            // describe the link itself, not its target.
            let file_type = entry.file_type();
            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    let path = entry.path().to_path_buf();
                    let source: io::Error = e.into();
                    return Some(Err(if source.kind() == io::ErrorKind::NotFound {
                        ScanWarning::RemovedMidScan(path)
                    } else {
                        ScanWarning::Unreadable { path, source }
                    }));
                }
            };

            match active.classifier.classify(file_type, &metadata) {
                Classification::Descend => continue,
                Classification::Skip(SkipReason::Symlink) => {
                    return Some(Err(ScanWarning::SymlinkSkipped(entry.into_path())));
                }
                Classification::Skip(SkipReason::ForeignDevice) => {
                    if file_type.is_dir() {
                        active.iter.skip_current_dir();
                    }
                    return Some(Err(ScanWarning::MountpointCrossed(entry.into_path())));
                }
                Classification::Skip(SkipReason::NotRegular) => {
                    log::trace!("Skipping special file: {}", entry.path().display());
                    continue;
                }
                Classification::Candidate => {
                    let identity = FileIdentity::from_metadata(&metadata);
                    if !self.tracker.first_sighting(identity) {
                        log::debug!(
                            "Already visited physical file, skipping: {}",
                            entry.path().display()
                        );
                        continue;
                    }
                    return Some(Ok(FileEntry::new(entry.into_path(), metadata.len())
                        .with_identity(identity)));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    /// Create a test directory with some files.
    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();

        let mut f = File::create(dir.path().join("file1.txt")).unwrap();
        writeln!(f, "Hello, world!").unwrap();

        let mut f = File::create(dir.path().join("file2.txt")).unwrap();
        writeln!(f, "Another file").unwrap();

        let subdir = dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        let mut f = File::create(subdir.join("nested.txt")).unwrap();
        writeln!(f, "Nested file content").unwrap();

        dir
    }

    fn candidates(walker: &Walker) -> Vec<FileEntry> {
        walker.walk().unwrap().filter_map(Result::ok).collect()
    }

    fn warnings(walker: &Walker) -> Vec<ScanWarning> {
        walker.walk().unwrap().filter_map(Result::err).collect()
    }

    #[test]
    fn test_walker_finds_files() {
        let dir = create_test_dir();
        let walker = Walker::new(vec![dir.path().to_path_buf()]);

        let files = candidates(&walker);
        assert_eq!(files.len(), 3);
        for file in &files {
            assert!(file.size > 0);
            assert!(file.path.is_absolute());
        }
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let walker = Walker::new(vec![PathBuf::from("/nonexistent/path/12345")]);
        assert!(matches!(
            walker.walk(),
            Err(ConfigError::RootNotFound(_))
        ));
    }

    #[test]
    fn test_file_root_is_fatal() {
        let dir = create_test_dir();
        let walker = Walker::new(vec![dir.path().join("file1.txt")]);
        assert!(matches!(
            walker.walk(),
            Err(ConfigError::RootNotADirectory(_))
        ));
    }

    #[test]
    #[cfg(unix)]
    fn test_symlink_root_is_fatal() {
        let dir = create_test_dir();
        let link = dir.path().join("root_link");
        std::os::unix::fs::symlink(dir.path().join("subdir"), &link).unwrap();

        let walker = Walker::new(vec![link]);
        assert!(matches!(walker.walk(), Err(ConfigError::RootIsSymlink(_))));
    }

    #[test]
    #[cfg(unix)]
    fn test_symlink_entry_warned_not_yielded() {
        let dir = create_test_dir();
        let link = dir.path().join("link.txt");
        std::os::unix::fs::symlink(dir.path().join("file1.txt"), &link).unwrap();

        let walker = Walker::new(vec![dir.path().to_path_buf()]);

        let files = candidates(&walker);
        assert_eq!(files.len(), 3, "link must not become a candidate");
        assert!(files.iter().all(|f| f.path.file_name().unwrap() != "link.txt"));

        let warns = warnings(&walker);
        assert_eq!(warns.len(), 1);
        assert_eq!(warns[0].reason(), "symlink-skipped");
    }

    #[test]
    fn test_overlapping_roots_visit_files_once() {
        let dir = create_test_dir();
        let walker = Walker::new(vec![
            dir.path().to_path_buf(),
            dir.path().join("subdir"),
        ]);

        let files = candidates(&walker);
        assert_eq!(files.len(), 3, "overlap must not double-count files");
    }

    #[test]
    #[cfg(unix)]
    fn test_hardlinks_visit_inode_once() {
        let dir = create_test_dir();
        let original = dir.path().join("file1.txt");
        let link = dir.path().join("alias.txt");
        fs::hard_link(&original, &link).unwrap();

        let walker = Walker::new(vec![dir.path().to_path_buf()]);
        let files = candidates(&walker);

        let aliases: Vec<_> = files
            .iter()
            .filter(|f| {
                let name = f.path.file_name().unwrap();
                name == "file1.txt" || name == "alias.txt"
            })
            .collect();
        assert_eq!(aliases.len(), 1, "one physical file, one candidate");
    }

    #[test]
    fn test_walk_order_is_deterministic() {
        let dir = create_test_dir();
        let walker = Walker::new(vec![dir.path().to_path_buf()]);

        let first: Vec<_> = candidates(&walker).into_iter().map(|f| f.path).collect();
        let second: Vec<_> = candidates(&walker).into_iter().map(|f| f.path).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_shutdown_flag_stops_walk() {
        let dir = create_test_dir();
        let flag = Arc::new(AtomicBool::new(true));
        let walker =
            Walker::new(vec![dir.path().to_path_buf()]).with_shutdown_flag(Arc::clone(&flag));

        let items: Vec<_> = walker.walk().unwrap().collect();
        assert!(items.is_empty());
    }

    #[test]
    fn test_empty_files_still_yielded_by_walker() {
        // Zero-byte exclusion belongs to the size index, not the walker
        let dir = create_test_dir();
        File::create(dir.path().join("empty.txt")).unwrap();

        let walker = Walker::new(vec![dir.path().to_path_buf()]);
        let files = candidates(&walker);
        assert!(files.iter().any(|f| f.size == 0));
    }
}
