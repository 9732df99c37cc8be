//! `--rewrite` overwrites `pyproject.toml` in place.

use crate::common::{scratch_project, uvify_project};

#[test]
fn rewrite_replaces_pyproject() {
    let project = scratch_project("full");
    let mut cmd = uvify_project(project.path());
    cmd.arg("--rewrite");

    let output = cmd.output().expect("Failed to execute poetry-uvify");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success(), "rewrite failed: {stderr}");
    assert!(stdout.is_empty(), "Expected nothing on stdout, got: {stdout}");
    assert!(stderr.contains("Rewrote"));

    let rewritten = fs_err::read_to_string(project.path().join("pyproject.toml")).unwrap();
    assert!(rewritten.contains("[project]"));
    assert!(rewritten.contains("[dependency-groups]"));
    assert!(rewritten.contains("[[tool.uv.index]]"));
    assert!(!rewritten.contains("[tool.poetry"));
    assert!(!rewritten.contains("[build-system]"));
}

#[test]
fn rewrite_matches_printed_output() {
    let project = scratch_project("minimal");

    let printed = uvify_project(project.path())
        .output()
        .expect("Failed to execute poetry-uvify");
    let printed = String::from_utf8_lossy(&printed.stdout).to_string();

    let mut cmd = uvify_project(project.path());
    cmd.arg("-r");
    let output = cmd.output().expect("Failed to execute poetry-uvify");
    assert!(output.status.success());

    let rewritten = fs_err::read_to_string(project.path().join("pyproject.toml")).unwrap();
    assert_eq!(rewritten, printed);
}

#[test]
fn failed_conversion_leaves_file_untouched() {
    let project = scratch_project("malformed-author");
    let path = project.path().join("pyproject.toml");
    let before = fs_err::read_to_string(&path).unwrap();

    let mut cmd = uvify_project(project.path());
    cmd.arg("--rewrite");
    let output = cmd.output().expect("Failed to execute poetry-uvify");

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(fs_err::read_to_string(&path).unwrap(), before);
}
