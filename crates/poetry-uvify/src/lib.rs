//! poetry-uvify: convert Poetry projects to PEP 621 metadata and uv configuration.
//!
//! This crate provides the entry point for the `poetry-uvify` binary and the
//! conversion library behind it. The binary parses CLI arguments, loads the
//! nearest `pyproject.toml`, and either prints the converted document or
//! rewrites the file in place.

#![deny(clippy::print_stdout, clippy::print_stderr)]

use std::ffi::OsString;
use std::process::ExitCode;

use anstream::eprintln;
use clap::Parser;
use owo_colors::OwoColorize;

use crate::cli::Cli;
use crate::commands::ExitStatus;
use crate::printer::Printer;

pub mod cli;
pub mod commands;
pub mod logging;
pub mod poetry;
pub mod printer;

/// Entry point for the poetry-uvify CLI.
///
/// Parses CLI arguments, installs the logging subscriber, and runs the
/// conversion. Errors are printed with their full cause chain.
pub fn main<I, T>(args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => err.exit(),
    };

    let printer = Printer::new(cli.quiet);

    let result = logging::setup_logging(cli.verbose, cli.quiet)
        .and_then(|()| commands::dispatch(&cli.uvify, printer));

    match result {
        Ok(code) => code.into(),
        Err(err) => {
            let mut causes = err.chain();
            if let Some(error) = causes.next() {
                printer.error(&error.to_string());
            }
            for cause in causes {
                eprintln!(
                    "  {}: {}",
                    "Caused by".red().bold(),
                    cause.to_string().trim()
                );
            }
            ExitStatus::Error.into()
        }
    }
}
