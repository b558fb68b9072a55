//! Logging setup on the `log` facade with an `env_logger` backend.
//!
//! Level selection, in priority order: the `RUST_LOG` environment variable
//! if set, then `--quiet` (errors only), then the `-v` count (debug, trace),
//! then the info default.

use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Initialize the logging subsystem from the CLI verbosity flags.
///
/// Call once at startup, before any log statements.
///
/// # Panics
///
/// Panics if called more than once; `env_logger` installs a global logger.
pub fn init_logging(verbose: u8, quiet: bool) {
    let mut builder = Builder::new();

    if env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }

    // Debug builds carry the module path; release output stays compact
    #[cfg(debug_assertions)]
    builder.format(|buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        writeln!(
            buf,
            "{} {style}{:<5}{style:#} [{}] {}",
            buf.timestamp_seconds(),
            level,
            record.module_path().unwrap_or("unknown"),
            record.args()
        )
    });
    #[cfg(not(debug_assertions))]
    builder.format(|buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        writeln!(buf, "{style}{:<5}{style:#} {}", level, record.args())
    });

    builder.init();
}

/// Map the CLI flags to a level filter.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
