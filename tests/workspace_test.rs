use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Run ignition in `dir` with credentials and colors stripped.
fn ignition(dir: &assert_fs::TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("ignition");
    cmd.current_dir(dir.path())
        .env_remove("IGNITION_GITHUB_TOKEN")
        .env_remove("GEMINI_API_KEY")
        .env_remove("IGNITION_LOG")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn init_creates_workspace_files() {
    let dir = assert_fs::TempDir::new().unwrap();

    ignition(&dir)
        .args(["init", "--name", "Apollo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created project.json"));

    dir.child(".ignition/config.toml")
        .assert(predicate::str::contains("project_name = \"Apollo\""));
    dir.child(".ignition/project.json")
        .assert(predicate::str::contains("\"projectName\": \"Apollo\""))
        .assert(predicate::str::contains("ProjectInitialized"));
}

#[test]
fn init_twice_fails() {
    let dir = assert_fs::TempDir::new().unwrap();
    ignition(&dir).arg("init").assert().success();

    ignition(&dir)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn init_rejects_malformed_repository() {
    let dir = assert_fs::TempDir::new().unwrap();

    ignition(&dir)
        .args(["init", "--repo", "not a repo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("owner/repo"));

    dir.child(".ignition").assert(predicate::path::missing());
}

#[test]
fn init_with_repo_writes_github_section() {
    let dir = assert_fs::TempDir::new().unwrap();

    ignition(&dir)
        .args(["init", "--repo", "acme/apollo"])
        .assert()
        .success();

    let config = std::fs::read_to_string(dir.path().join(".ignition/config.toml")).unwrap();
    assert!(config.contains("[github]"));
    assert!(config.contains("repository = \"acme/apollo\""));
    assert!(!config.contains("token"));
}

#[test]
fn custom_dir_flag_is_honored() {
    let dir = assert_fs::TempDir::new().unwrap();

    ignition(&dir)
        .args(["--dir", "meta", "init"])
        .assert()
        .success();
    dir.child("meta/project.json").assert(predicate::path::exists());

    ignition(&dir)
        .args(["--dir", "meta", "req", "add", "Works with a custom dir"])
        .assert()
        .success();
    dir.child("meta/project.json")
        .assert(predicate::str::contains("Works with a custom dir"));
}

#[test]
fn commands_before_init_explain_setup() {
    let dir = assert_fs::TempDir::new().unwrap();

    ignition(&dir)
        .args(["req", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"))
        .stderr(predicate::str::contains("ignition init"));
}

#[test]
fn push_without_github_section_explains_fix() {
    let dir = assert_fs::TempDir::new().unwrap();
    ignition(&dir).arg("init").assert().success();

    ignition(&dir)
        .arg("push")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ignition init --repo"));
}

#[test]
fn push_without_token_names_the_variable() {
    let dir = assert_fs::TempDir::new().unwrap();
    ignition(&dir)
        .args(["init", "--repo", "acme/apollo"])
        .assert()
        .success();

    ignition(&dir)
        .arg("push")
        .assert()
        .failure()
        .stderr(predicate::str::contains("IGNITION_GITHUB_TOKEN"));
}

#[test]
fn missing_token_only_warns_about_audit_mirror() {
    let dir = assert_fs::TempDir::new().unwrap();
    ignition(&dir)
        .args(["init", "--repo", "acme/apollo"])
        .assert()
        .success();

    ignition(&dir)
        .args(["req", "add", "Local edits still work"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added requirement"))
        .stdout(predicate::str::contains("Audit log not mirrored"));
}

#[test]
fn ai_commands_require_a_key() {
    let dir = assert_fs::TempDir::new().unwrap();
    ignition(&dir).arg("init").assert().success();

    ignition(&dir)
        .args(["ai", "draft", "test-plan"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}
