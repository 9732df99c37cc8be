//! CLI argument definitions for poetry-uvify.
//!
//! All clap derive structs live here. [`Cli`] is the top-level parser; the
//! conversion options are in [`UvifyArgs`].

use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, Parser};

/// Clap v3-style help menu colors, matching uv's convention.
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Convert a Poetry project to PEP 621 metadata and uv configuration.
#[derive(Parser, Debug)]
#[command(
    name = "poetry-uvify",
    author,
    version,
    about = "Convert a Poetry project to PEP 621 metadata and uv configuration.",
    styles = STYLES
)]
pub struct Cli {
    #[command(flatten)]
    pub uvify: UvifyArgs,

    /// Increase logging verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except the converted document and errors.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the conversion.
#[derive(Args, Debug)]
pub struct UvifyArgs {
    /// The project directory or `pyproject.toml` to convert.
    ///
    /// Directories are searched upward for `pyproject.toml`. Defaults to the
    /// current directory.
    pub path: Option<PathBuf>,

    /// Rewrite `pyproject.toml` in place instead of printing the result.
    #[arg(short, long)]
    pub rewrite: bool,
}
