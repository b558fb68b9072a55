//! Streaming content digests.
//!
//! # Overview
//!
//! The [`Hasher`] reads a file's full content in fixed-size chunks and feeds
//! it through the selected digest. The whole file is always read; a prefix
//! hash could match files that share a common head but differ later, which
//! would put non-identical files in the same group.
//!
//! Both supported algorithms produce 256-bit digests:
//! - [`DigestAlgorithm::Blake3`] (default) for speed
//! - [`DigestAlgorithm::Sha256`] for environments that standardize on SHA-2
//!
//! The hasher polls a shared shutdown flag between chunks, so a Ctrl+C
//! aborts an in-flight hash within one buffer's worth of reading and the
//! file handle is dropped immediately.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use sha2::Digest as Sha2Digest;

/// A 256-bit content digest.
pub type Digest = [u8; 32];

/// Read buffer size for streaming. 64 KiB keeps syscall overhead low
/// without holding large files in memory.
const READ_BUF_SIZE: usize = 64 * 1024;

/// Render a digest as lowercase hex.
#[must_use]
pub fn digest_to_hex(digest: &Digest) -> String {
    use fmt::Write as _;
    let mut out = String::with_capacity(64);
    for byte in digest {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

/// Selectable digest algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// BLAKE3, the default
    Blake3,
    /// SHA-256 via the sha2 crate
    Sha256,
}

impl DigestAlgorithm {
    /// All supported algorithms, in the order `--list-digests` prints them.
    pub const ALL: [Self; 2] = [Self::Blake3, Self::Sha256];

    /// Canonical lowercase name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Blake3 => "blake3",
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blake3" => Ok(Self::Blake3),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            other => Err(format!(
                "unknown digest algorithm '{}' (supported: blake3, sha256)",
                other
            )),
        }
    }
}

/// Incremental digest state, one variant per algorithm.
enum DigestState {
    Blake3(Box<blake3::Hasher>),
    Sha256(sha2::Sha256),
}

impl DigestState {
    fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
            DigestAlgorithm::Sha256 => Self::Sha256(sha2::Sha256::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Blake3(h) => {
                h.update(data);
            }
            Self::Sha256(h) => h.update(data),
        }
    }

    fn finalize(self) -> Digest {
        match self {
            Self::Blake3(h) => *h.finalize().as_bytes(),
            Self::Sha256(h) => h.finalize().into(),
        }
    }
}

/// File hasher with cooperative cancellation.
#[derive(Debug, Default)]
pub struct Hasher {
    /// Optional shutdown flag polled between read chunks
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Hasher {
    /// Create a new hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Digest the full content of one file.
    ///
    /// The file is held open only for the duration of this call.
    ///
    /// # Errors
    ///
    /// Any I/O error from opening or reading the file, or an error of kind
    /// [`io::ErrorKind::Interrupted`] when shutdown was requested mid-read.
    pub fn digest_file(&self, path: &Path, algorithm: DigestAlgorithm) -> io::Result<Digest> {
        let mut file = File::open(path)?;
        let mut state = DigestState::new(algorithm);
        let mut buf = vec![0u8; READ_BUF_SIZE];

        loop {
            if self.is_shutdown_requested() {
                return Err(io::Error::new(
                    io::ErrorKind::Interrupted,
                    "shutdown requested",
                ));
            }
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            state.update(&buf[..n]);
        }

        log::trace!("{} digest computed: {}", algorithm, path.display());
        Ok(state.finalize())
    }
}
