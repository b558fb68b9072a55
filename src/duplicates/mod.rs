//! Duplicate detection pipeline.
//!
//! [`groups`] holds the size index and the result types; [`finder`] runs the
//! full walk, size-bucket, digest-bucket pipeline and collects warnings.

pub mod finder;
pub mod groups;

pub use finder::{format_size, DuplicateFinder, FinderConfig, FinderError, ScanSummary};
pub use groups::{group_by_size, DuplicateGroup, GroupingStats};
