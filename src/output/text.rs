//! Plain-text report for human review.
//!
//! One block per duplicate group: a header line with the shared size and
//! the digest chain, then each member path indented below it. Groups arrive
//! pre-sorted from the finder, so output is stable across runs.

use std::io::{self, Write};

use yansi::Paint;

use crate::duplicates::{DuplicateGroup, ScanSummary};
use crate::scanner::ScanWarning;

/// Write the duplicate groups and a summary footer.
///
/// # Errors
///
/// Any I/O error from the underlying writer.
pub fn write_report<W: Write>(
    writer: &mut W,
    groups: &[DuplicateGroup],
    summary: &ScanSummary,
) -> io::Result<()> {
    for group in groups {
        writeln!(
            writer,
            "{} {:>10}   {} {}",
            "size:".bold(),
            group.size,
            "digests:".bold(),
            group.digest_labels().join(", ")
        )?;
        for file in &group.files {
            writeln!(writer, "   {}", file.path.display())?;
        }
        writeln!(writer)?;
    }

    if groups.is_empty() {
        writeln!(writer, "{}", "No duplicate files found.".green())?;
    } else {
        writeln!(
            writer,
            "{} duplicate group(s), {} redundant file(s), {} reclaimable ({:.1}% of {} scanned)",
            summary.duplicate_groups.to_string().bold(),
            summary.duplicate_files,
            summary.reclaimable_display().bold().green(),
            summary.wasted_percentage(),
            summary.total_size_display()
        )?;
    }
    Ok(())
}

/// Write the collected warnings, one per line.
///
/// Meant for stderr, after the report, so skips are visible but never mixed
/// into the group listing.
///
/// # Errors
///
/// Any I/O error from the underlying writer.
pub fn write_warnings<W: Write>(writer: &mut W, warnings: &[ScanWarning]) -> io::Result<()> {
    for warning in warnings {
        writeln!(
            writer,
            "{} [{}] {}",
            "warning:".yellow().bold(),
            warning.reason(),
            warning
        )?;
    }
    if !warnings.is_empty() {
        writeln!(writer, "{} entr(ies) skipped during scan", warnings.len())?;
    }
    Ok(())
}
