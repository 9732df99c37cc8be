use crate::common::{fixture, scratch_project, uvify_project};

#[test]
fn quiet_suppresses_rewrite_message() {
    let project = scratch_project("minimal");
    let mut cmd = uvify_project(project.path());
    cmd.args(["--quiet", "--rewrite"]);

    let output = cmd.output().expect("Failed to execute poetry-uvify");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(0));
    assert!(
        stderr.is_empty(),
        "Expected no output with --quiet, got: {stderr}"
    );
}

#[test]
fn quiet_still_prints_the_document() {
    let mut cmd = uvify_project(&fixture("minimal"));
    cmd.arg("-q");

    let output = cmd.output().expect("Failed to execute poetry-uvify");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout.contains("[project]"));
}

#[test]
fn quiet_suppresses_warnings() {
    let dir = tempfile::TempDir::new().unwrap();
    fs_err::write(
        dir.path().join("pyproject.toml"),
        "[tool.poetry]\nname = \"demo\"\nversion = \"1.0.0\"\n\n[build-system]\nrequires = [\"poetry-core\"]\n",
    )
    .unwrap();

    let mut cmd = uvify_project(dir.path());
    let output = cmd.output().expect("Failed to execute poetry-uvify");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("writing `requires-python = \"*\"`"), "got: {stderr}");

    let mut cmd = uvify_project(dir.path());
    cmd.arg("--quiet");
    let output = cmd.output().expect("Failed to execute poetry-uvify");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.is_empty(), "Expected no output with --quiet, got: {stderr}");
}

#[test]
fn verbose_flag_logs_progress() {
    let mut cmd = uvify_project(&fixture("minimal"));
    cmd.arg("--verbose");

    let output = cmd.output().expect("Failed to execute poetry-uvify");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(0));
    assert!(
        stderr.contains("Converting `demo`"),
        "Expected debug output with --verbose, got: {stderr}"
    );
}

#[test]
fn double_verbose_accepted() {
    let mut cmd = uvify_project(&fixture("minimal"));
    cmd.arg("-vv");

    let output = cmd.output().expect("Failed to execute poetry-uvify");

    assert_eq!(output.status.code(), Some(0));
}
