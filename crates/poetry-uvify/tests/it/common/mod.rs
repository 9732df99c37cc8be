// The `unreachable_pub` is to silence false positives in RustRover.
#![allow(dead_code, unreachable_pub)]

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Insta snapshot filters shared across poetry-uvify tests.
pub const INSTA_FILTERS: &[(&str, &str)] = &[
    // Rewrite Windows output to Unix output
    (r"\\([\w\d]|\.)", "/$1"),
    (r"poetry-uvify\.exe", "poetry-uvify"),
    // poetry-uvify version display
    (
        r"poetry-uvify \d+\.\d+\.\d+(-(alpha|beta|rc)\.\d+)?(\+\d+)?",
        r"poetry-uvify [VERSION]",
    ),
    // Scratch directories
    (r"`[^`]*/(fixtures|\.tmp[\w]+)/", "`[TEMP]/"),
    // Trim end-of-line whitespaces
    (r"([^\s])[ \t]+(\r?\n)", "$1$2"),
];

/// Returns the poetry-uvify binary that cargo built before launching the tests.
pub fn get_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_poetry-uvify"))
}

/// Return the path to a test fixture directory.
pub fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures");
    path.push(name);
    path
}

/// Copy a fixture's `pyproject.toml` into a fresh temporary directory.
pub fn scratch_project(name: &str) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temporary directory");
    fs_err::copy(
        fixture(name).join("pyproject.toml"),
        dir.path().join("pyproject.toml"),
    )
    .expect("Failed to copy fixture");
    dir
}

/// Create a `poetry-uvify` command for testing.
pub fn uvify_command() -> Command {
    let mut command = Command::new(get_bin());
    // Clear environment variables that might interfere with tests.
    command.env_remove("RUST_LOG");
    command.env("NO_COLOR", "1");
    command
}

/// Create a `poetry-uvify` command converting the project at `path`.
pub fn uvify_project(path: &Path) -> Command {
    let mut command = uvify_command();
    command.arg(path);
    command
}

/// Snapshot test helper macro. Runs a command and asserts against an insta snapshot.
#[macro_export]
macro_rules! uvify_snapshot {
    ($filters:expr, $command:expr, @$expected:literal) => {{
        let output = $command.output().expect("Failed to execute poetry-uvify");
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        let mut combined = format!(
            "success: {:?}\nexit_code: {}\n----- stdout -----\n{}\n----- stderr -----\n{}",
            output.status.success(),
            output.status.code().unwrap_or(-1),
            stdout.trim(),
            stderr.trim(),
        );

        // Apply filters
        for (pattern, replacement) in $filters.iter() {
            let re = regex::Regex::new(pattern).expect("Invalid filter regex");
            combined = re.replace_all(&combined, *replacement).to_string();
        }

        insta::assert_snapshot!(combined, @$expected);
    }};
}
