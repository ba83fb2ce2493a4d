use assert_cmd::cargo; // handy crate for testing CLIs

#[test]
fn prints_help() {
    let mut cmd = cargo::cargo_bin_cmd!();

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains("Usage"));
}

#[test]
fn prints_version() {
    let mut cmd = cargo::cargo_bin_cmd!();

    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn rejects_unknown_diff_source() {
    let mut cmd = cargo::cargo_bin_cmd!();

    cmd.args(["--diff-source", "everything"]).assert().failure();
}

#[test]
fn fails_cleanly_outside_a_repository() {
    let dir = tempfile::tempdir().expect("tempdir");

    let mut cmd = cargo::cargo_bin_cmd!();
    cmd.current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicates::str::contains("not a git repository"));
}
