//! Report rendering for scan results.
//!
//! The finder hands over duplicate groups and a summary; these formatters
//! turn them into a human listing ([`text`]) or a machine document
//! ([`json`]). Nothing here touches the filesystem.

pub mod json;
pub mod text;

pub use json::JsonOutput;
pub use text::{write_report, write_warnings};
