//! Writing a converted document back out.
//!
//! `toml_edit` keeps the comments and layout of every table the conversion
//! did not touch, so the rendered text diffs cleanly against the original.

use std::path::Path;

use toml_edit::DocumentMut;
use tracing::debug;

/// Render a document to TOML.
pub fn to_toml_string(document: &DocumentMut) -> String {
    document.to_string()
}

/// Overwrite `path` with the rendered document.
pub fn write_to(document: &DocumentMut, path: &Path) -> std::io::Result<()> {
    let content = to_toml_string(document);
    debug!("Writing {} bytes to `{}`", content.len(), path.display());
    fs_err::write(path, content)
}
