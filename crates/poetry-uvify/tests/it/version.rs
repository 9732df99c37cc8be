use crate::common::uvify_command;

#[test]
fn version_flag_shows_version() {
    let mut cmd = uvify_command();
    cmd.arg("--version");

    let output = cmd.output().expect("Failed to execute poetry-uvify");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(
        stdout.starts_with("poetry-uvify "),
        "Expected version string starting with 'poetry-uvify ', got: {stdout}"
    );
}

#[test]
fn short_version_flag_works() {
    let mut cmd = uvify_command();
    cmd.arg("-V");

    let output = cmd.output().expect("Failed to execute poetry-uvify");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(
        stdout.starts_with("poetry-uvify "),
        "Expected version string starting with 'poetry-uvify ', got: {stdout}"
    );
}
