//! Diagnostic logging.
//!
//! Library code logs through `tracing`; the binary installs a stderr
//! subscriber whose level follows `-v`/`-q`, unless `RUST_LOG` is set.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// The default filter for a verbosity level.
fn default_directive(verbosity: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbosity {
        0 => "warn",
        1 => "poetry_uvify=debug,warn",
        _ => "poetry_uvify=trace,debug",
    }
}

/// Install the global `tracing` subscriber.
pub fn setup_logging(verbosity: u8, quiet: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity, quiet)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1)
        .without_time()
        .try_init()
        .map_err(|err| anyhow!(err))
}
