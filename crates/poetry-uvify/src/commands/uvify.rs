//! `poetry-uvify`: convert `[tool.poetry]` into `[project]` and `[tool.uv]`.
//!
//! Two modes:
//! - Default: print the converted document to stdout.
//! - `--rewrite`: overwrite the `pyproject.toml` in place.

use anyhow::{Context, Result};
use tracing::debug;

use crate::cli::UvifyArgs;
use crate::commands::ExitStatus;
use crate::poetry::{PoetryProject, Uvifier, find_pyproject, writer};
use crate::printer::Printer;

/// Execute the conversion.
pub(crate) fn execute(args: &UvifyArgs, printer: Printer) -> Result<ExitStatus> {
    let start = match &args.path {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("failed to determine the current directory")?,
    };

    let pyproject = match find_pyproject(&start) {
        Ok(pyproject) => pyproject,
        Err(err) => {
            printer.error(&err.to_string());
            return Ok(ExitStatus::Failure);
        }
    };

    let project = PoetryProject::from_path(&pyproject)
        .with_context(|| format!("failed to load `{}`", pyproject.display()))?;
    debug!(
        "Converting `{}` in `{}`",
        project.package.name,
        project.root().display()
    );

    let document = Uvifier::new(&project)
        .eject()
        .with_context(|| format!("failed to convert `{}`", pyproject.display()))?;

    if args.rewrite {
        writer::write_to(&document, &pyproject)
            .with_context(|| format!("failed to write `{}`", pyproject.display()))?;
        printer.info(&format!("Rewrote `{}`", pyproject.display()));
    } else {
        printer
            .document(&writer::to_toml_string(&document))
            .context("failed to write the converted document")?;
    }

    Ok(ExitStatus::Success)
}
