//! Logging through `tracing-subscriber`.
//!
//! The library logs through the `log` facade. The subscriber installs a
//! `tracing-log` bridge, so those records come out here as well.

use anyhow::{anyhow, Result};
use std::io;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// The level for a number of `-v` flags.
///
/// - 0: warnings and errors
/// - 1 (`-v`): info, one line per run and per convergence
/// - 2 (`-vv`): debug, one line per step
/// - 3+ (`-vvv`): trace
fn level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Installs the global subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over the verbosity.
pub(crate) fn init(verbosity: u8) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level(verbosity).into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|e| anyhow!("cannot install the logger: {}", e))
}
