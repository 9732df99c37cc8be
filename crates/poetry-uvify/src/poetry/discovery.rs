//! Project discovery: walk up directories to find the nearest `pyproject.toml`.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tracing::trace;

/// The filename we're looking for.
const PYPROJECT_NAME: &str = "pyproject.toml";

/// Locate the `pyproject.toml` to convert.
///
/// `start` may point at the file itself. Otherwise the directory and each of
/// its parents are searched, and the first `pyproject.toml` found wins.
pub fn find_pyproject(start: &Path) -> Result<PathBuf> {
    if start.is_file() {
        return Ok(start.to_path_buf());
    }

    for directory in start.ancestors() {
        let candidate = directory.join(PYPROJECT_NAME);
        trace!("Checking for `{}`", candidate.display());
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    bail!(
        "No `{PYPROJECT_NAME}` found in `{}` or any parent directory",
        start.display()
    );
}
