//! User-facing output for poetry-uvify.
//!
//! The [`Printer`] writes status messages to stderr, honoring `--quiet`, and
//! writes the converted document to stdout. Diagnostics go through `tracing`
//! instead (see [`crate::logging`]).

use std::io::Write;

use anstream::{eprintln, stdout};
use owo_colors::OwoColorize;

/// Controls where and whether poetry-uvify prints.
#[derive(Copy, Clone, Debug)]
pub struct Printer {
    /// Whether status messages are suppressed.
    quiet: bool,
}

impl Printer {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Print a status message to stderr.
    pub fn info(&self, message: &str) {
        if !self.quiet {
            eprintln!("{message}");
        }
    }

    /// Print an error to stderr.
    ///
    /// Errors are printed even in quiet mode.
    pub fn error(&self, message: &str) {
        eprintln!("{}: {}", "error".red().bold(), message);
    }

    /// Write a rendered document to stdout.
    ///
    /// The document is the command's result, so `--quiet` does not apply.
    pub fn document(&self, content: &str) -> std::io::Result<()> {
        let mut stdout = stdout().lock();
        stdout.write_all(content.as_bytes())?;
        stdout.flush()
    }
}
