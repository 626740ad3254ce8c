// End-to-end tests spawning the built binary against tempdir repositories.

use git2::{Oid, Repository};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_cli(args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_semver-release"));
    cmd.args(args);
    for (key, value) in envs {
        cmd.env(key, value);
    }
    cmd.output().expect("Failed to execute semver-release")
}

fn setup_repo() -> (TempDir, Repository) {
    let temp = TempDir::new().expect("Could not create temp dir");
    let repo = Repository::init(temp.path()).expect("Could not init git repo");

    {
        let mut config = repo.config().expect("Could not get config");
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
    }

    (temp, repo)
}

fn commit_file(repo: &Repository, name: &str, content: &str, message: &str) -> Oid {
    let workdir = repo.workdir().unwrap();
    fs::write(workdir.join(name), content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(name)).unwrap();
    index.write().unwrap();

    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = repo.signature().unwrap();

    let parent = repo.head().ok().map(|h| h.peel_to_commit().unwrap());
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

fn tag(repo: &Repository, name: &str, oid: Oid) {
    repo.tag_lightweight(name, &repo.find_object(oid, None).unwrap(), false)
        .unwrap();
}

#[test]
fn help_describes_the_tool() {
    let output = run_cli(&["--help"], &[]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("semver-release"));
    assert!(stdout.contains("latest"));
    assert!(stdout.contains("release-needed"));
    assert!(stdout.contains("release"));
}

#[test]
fn latest_prints_version_with_newline() {
    let (temp, repo) = setup_repo();
    let c = commit_file(&repo, "README.md", "hello\n", "Initial commit");
    tag(&repo, "v0.1.0", c);

    let output = run_cli(&["latest", temp.path().to_str().unwrap()], &[]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "0.1.0\n");
}

#[test]
fn latest_skip_newline_flag() {
    let (temp, repo) = setup_repo();
    let c = commit_file(&repo, "README.md", "hello\n", "Initial commit");
    tag(&repo, "v0.1.0", c);

    let output = run_cli(&["latest", "-n", temp.path().to_str().unwrap()], &[]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "0.1.0");
}

#[test]
fn latest_skip_newline_env_var() {
    let (temp, repo) = setup_repo();
    let c = commit_file(&repo, "README.md", "hello\n", "Initial commit");
    tag(&repo, "v0.1.0", c);

    let output = run_cli(
        &["latest", temp.path().to_str().unwrap()],
        &[("SKIP_NEWLINE", "true")],
    );
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "0.1.0");
}

#[test]
fn latest_defaults_to_zero_and_reports_skipped_tags() {
    let (temp, repo) = setup_repo();
    let c = commit_file(&repo, "README.md", "hello\n", "Initial commit");
    tag(&repo, "nightly", c);

    let output = run_cli(&["latest", temp.path().to_str().unwrap()], &[]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "0.0.0\n");

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("skipping tag 'nightly'"));
}

#[test]
fn latest_fails_outside_a_repository() {
    let temp = TempDir::new().unwrap();

    let output = run_cli(&["latest", temp.path().to_str().unwrap()], &[]);
    assert!(!output.status.success());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("no git repository"));
}

#[test]
fn release_needed_prints_true_and_false() {
    let (temp, repo) = setup_repo();
    let c = commit_file(&repo, "README.md", "hello\n", "Initial commit");

    let output = run_cli(&["release-needed", temp.path().to_str().unwrap()], &[]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "true\n");

    tag(&repo, "v1.0.0", c);
    let output = run_cli(&["release-needed", temp.path().to_str().unwrap()], &[]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "false\n");
}

#[test]
fn release_creates_next_patch_tag() {
    let (temp, repo) = setup_repo();
    let c = commit_file(&repo, "README.md", "hello\n", "Initial commit");
    tag(&repo, "v1.2.3", c);
    commit_file(&repo, "README.md", "more\n", "feat: more");

    let output = run_cli(&["release", temp.path().to_str().unwrap()], &[]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Latest version: 1.2.3"));
    assert!(repo.find_reference("refs/tags/v1.2.4").is_ok());
}

#[test]
fn release_type_env_var_bumps_minor() {
    let (temp, repo) = setup_repo();
    let c = commit_file(&repo, "README.md", "hello\n", "Initial commit");
    tag(&repo, "v1.2.3", c);
    commit_file(&repo, "README.md", "more\n", "feat: more");

    let output = run_cli(
        &["release", temp.path().to_str().unwrap()],
        &[("RELEASE_TYPE", "minor")],
    );
    assert!(output.status.success());
    assert!(repo.find_reference("refs/tags/v1.3.0").is_ok());
}

#[test]
fn release_noop_reports_nothing_to_tag() {
    let (temp, repo) = setup_repo();
    let c = commit_file(&repo, "README.md", "hello\n", "Initial commit");
    tag(&repo, "v1.2.3", c);

    let output = run_cli(&["release", temp.path().to_str().unwrap()], &[]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("No changes since last release, nothing to tag"));
    assert!(repo.find_reference("refs/tags/v1.2.4").is_err());
}
