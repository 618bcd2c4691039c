//! Integration tests for the rogit CLI.
//!
//! These tests run the built binary against real git repositories and
//! check its output.

use std::path::Path;
use std::process::Command as StdCommand;

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

/// A repository with three commits on `main`, a `feature` branch and a
/// `v1.0` annotated tag.
struct Fixture {
    repo: TempDir,
    /// Isolated home so that no user config is picked up
    home: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let repo = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();

        git(repo.path(), &["init", "-q", "--initial-branch=main"]);
        git(repo.path(), &["config", "user.email", "test@example.com"]);
        git(repo.path(), &["config", "user.name", "Test User"]);
        git(repo.path(), &["config", "tag.gpgsign", "false"]);
        git(repo.path(), &["config", "commit.gpgsign", "false"]);

        repo.child("README.md").write_str("# Fixture\n").unwrap();
        commit(repo.path(), "README.md", "Initial commit", 1);

        repo.child("src/lib.rs").write_str("pub fn a() {}\n").unwrap();
        commit(repo.path(), "src/lib.rs", "Add library", 2);
        git(repo.path(), &["branch", "feature"]);

        repo.child("docs/guide.md").write_str("Guide\n").unwrap();
        commit(repo.path(), "docs/guide.md", "Add guide", 3);

        git_at(
            repo.path(),
            &["tag", "-a", "v1.0", "-m", "First release", "HEAD~1"],
            4,
        );

        Self { repo, home }
    }

    /// A `rogit` invocation against this repository.
    fn rogit(&self) -> Command {
        let mut cmd = Command::cargo_bin("rogit").unwrap();
        cmd.arg("--repo")
            .arg(self.repo.path())
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.home.path())
            .env_remove("ROGIT_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }
}

fn git(dir: &Path, args: &[&str]) {
    git_at(dir, args, 0);
}

/// Run git with author and committer time pinned to `2024-01-01 + step h`.
fn git_at(dir: &Path, args: &[&str], step: i64) {
    let date = format!("@{} +0000", 1_704_067_200 + step * 3_600);
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_DATE", &date)
        .env("GIT_COMMITTER_DATE", &date)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .output()
        .expect("git command failed");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

fn commit(dir: &Path, path: &str, message: &str, step: i64) {
    git_at(dir, &["add", path], step);
    git_at(dir, &["commit", "-q", "-m", message], step);
}

// =============================================================================
// Global behaviour
// =============================================================================

#[test]
fn version_flag_works() {
    Command::cargo_bin("rogit")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rogit"));
}

#[test]
fn help_lists_commands() {
    Command::cargo_bin("rogit")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("refs"))
        .stdout(predicate::str::contains("tree"))
        .stdout(predicate::str::contains("log"));
}

#[test]
fn outside_a_repository_fails() {
    let dir = TempDir::new().unwrap();
    Command::cargo_bin("rogit")
        .unwrap()
        .args(["refs", "--repo"])
        .arg(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .env_remove("ROGIT_CONFIG")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open repository"));
}

#[test]
fn completion_generates_script() {
    Command::cargo_bin("rogit")
        .unwrap()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rogit"));
}

// =============================================================================
// refs
// =============================================================================

#[test]
fn refs_lists_branches_and_tags() {
    let fx = Fixture::new();
    fx.rogit()
        .arg("refs")
        .assert()
        .success()
        .stdout(predicate::str::contains("Branches:"))
        .stdout(predicate::str::contains("* main"))
        .stdout(predicate::str::contains("feature"))
        .stdout(predicate::str::contains("Tags:"))
        .stdout(predicate::str::contains("annotated tag"));
}

#[test]
fn refs_json_orders_newest_first() {
    let fx = Fixture::new();
    let output = fx.rogit().args(["refs", "--json"]).output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["head"], "main");

    let branches: Vec<&str> = report["branches"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect();
    assert_eq!(branches, ["main", "feature"]);

    assert_eq!(report["tags"][0]["name"], "v1.0");
    assert_eq!(report["tags"][0]["kind"], "annotated_tag");
    assert!(report["warnings"].as_array().unwrap().is_empty());
}

#[test]
fn refs_json_reports_skipped_refs() {
    let fx = Fixture::new();
    git_at(
        fx.repo.path(),
        &["tag", "-a", "tree-tag", "-m", "Not a commit", "HEAD^{tree}"],
        5,
    );
    git(fx.repo.path(), &["symbolic-ref", "refs/heads/alias", "refs/heads/main"]);

    let output = fx.rogit().args(["refs", "--json"]).output().unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let warnings = report["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 2);

    let non_commit = warnings
        .iter()
        .find(|w| w["warning"] == "non_commit_target")
        .unwrap();
    assert_eq!(non_commit["name"], "refs/tags/tree-tag");
    assert_eq!(non_commit["kind"], "tree");

    let symbolic = warnings
        .iter()
        .find(|w| w["warning"] == "unsupported_ref_kind")
        .unwrap();
    assert_eq!(symbolic["name"], "refs/heads/alias");
    assert_eq!(symbolic["target"], "refs/heads/main");
}

#[test]
fn refs_tags_only() {
    let fx = Fixture::new();
    fx.rogit()
        .args(["refs", "--tags"])
        .assert()
        .success()
        .stdout(predicate::str::contains("v1.0"))
        .stdout(predicate::str::contains("Branches:").not());
}

// =============================================================================
// show
// =============================================================================

#[test]
fn show_commit() {
    let fx = Fixture::new();
    fx.rogit()
        .args(["show", "main"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("commit "))
        .stdout(predicate::str::contains("Author: Test User <test@example.com>"))
        .stdout(predicate::str::contains("    Add guide"));
}

#[test]
fn show_lists_changed_paths() {
    let fx = Fixture::new();
    fx.repo.child("README.md").write_str("# Changed\n").unwrap();
    fx.repo.child("docs/guide.md").write_str("Guide v2\n").unwrap();
    git_at(fx.repo.path(), &["add", "-A"], 5);
    git_at(fx.repo.path(), &["rm", "-q", "src/lib.rs"], 5);
    git_at(fx.repo.path(), &["commit", "-q", "-m", "Update docs"], 5);

    let output = fx.rogit().args(["show", "HEAD"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.ends_with("\nM\tREADME.md\nM\tdocs/guide.md\nD\tsrc/lib.rs\n"), "{}", stdout);
}

#[test]
fn show_json_includes_changes() {
    let fx = Fixture::new();
    let output = fx.rogit().args(["show", "main", "--json"]).output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["commit"]["summary"], "Add guide");
    let changes = report["changes"].as_array().unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0]["status"], "added");
    assert_eq!(changes[0]["path"], "docs/guide.md");
    assert!(changes[0].get("old_path").is_none());
}

#[test]
fn show_annotated_tag_prints_tag_first() {
    let fx = Fixture::new();
    fx.rogit()
        .args(["show", "v1.0"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("tag v1.0"))
        .stdout(predicate::str::contains("First release"))
        .stdout(predicate::str::contains("    Add library"));
}

#[test]
fn show_unknown_revision_fails() {
    let fx = Fixture::new();
    fx.rogit()
        .args(["show", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("revision not found: does-not-exist"));
}

// =============================================================================
// tree
// =============================================================================

#[test]
fn tree_defaults_to_head_root() {
    let fx = Fixture::new();
    fx.rogit()
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("\tdocs/"))
        .stdout(predicate::str::contains("\tsrc/"))
        .stdout(predicate::str::contains("\tREADME.md"));
}

#[test]
fn tree_subdirectory_at_tag() {
    let fx = Fixture::new();
    fx.rogit()
        .args(["tree", "v1.0", "src"])
        .assert()
        .success()
        .stdout(predicate::str::contains("100644 blob"))
        .stdout(predicate::str::contains("\tlib.rs"));
}

#[test]
fn tree_missing_path_fails() {
    let fx = Fixture::new();
    fx.rogit()
        .args(["tree", "v1.0", "docs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("path not found: docs"));
}

#[test]
fn tree_json() {
    let fx = Fixture::new();
    let output = fx.rogit().args(["tree", "--json"]).output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["rev"], "HEAD");
    assert_eq!(report["directories"].as_array().unwrap().len(), 2);
    assert_eq!(report["files"][0]["name"], "README.md");
}

// =============================================================================
// log
// =============================================================================

#[test]
fn log_shows_history_newest_first() {
    let fx = Fixture::new();
    let output = fx.rogit().arg("log").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let summaries: Vec<&str> = stdout
        .lines()
        .map(|l| l.rsplit("  ").next().unwrap())
        .collect();
    assert_eq!(summaries, ["Add guide", "Add library", "Initial commit"]);
}

#[test]
fn log_filters_by_path() {
    let fx = Fixture::new();
    fx.rogit()
        .args(["log", "--path", "src/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Add library"))
        .stdout(predicate::str::contains("Add guide").not());
}

#[test]
fn log_limit_flag() {
    let fx = Fixture::new();
    let output = fx.rogit().args(["log", "-n", "1", "--json"]).output().unwrap();
    assert!(output.status.success());

    let commits: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(commits.as_array().unwrap().len(), 1);
    assert_eq!(commits[0]["summary"], "Add guide");
}

#[test]
fn log_zero_limit_is_rejected() {
    let fx = Fixture::new();
    fx.rogit()
        .args(["log", "--limit", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 1"));
}

#[test]
fn log_no_matches() {
    let fx = Fixture::new();
    fx.rogit()
        .args(["log", "--path", "nothing/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No commits touching 'nothing/'."));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn config_sets_log_defaults() {
    let fx = Fixture::new();
    let config = fx.home.child("rogit.toml");
    config
        .write_str("[log]\nlimit = 1\npath_prefix = \"src\"\n")
        .unwrap();

    fx.rogit()
        .arg("--config")
        .arg(config.path())
        .arg("log")
        .assert()
        .success()
        .stdout(predicate::str::contains("Add library"))
        .stdout(predicate::str::contains("Initial commit").not());
}

#[test]
fn config_repository_is_used_without_flag() {
    let fx = Fixture::new();
    let config = fx.home.child("rogit/config.toml");
    config
        .write_str(&format!(
            "repository = {:?}\n",
            fx.repo.path().display().to_string()
        ))
        .unwrap();

    Command::cargo_bin("rogit")
        .unwrap()
        .arg("refs")
        .current_dir(fx.home.path())
        .env("HOME", fx.home.path())
        .env("XDG_CONFIG_HOME", fx.home.path())
        .env_remove("ROGIT_CONFIG")
        .assert()
        .success()
        .stdout(predicate::str::contains("v1.0"));
}

#[test]
fn invalid_config_fails() {
    let fx = Fixture::new();
    let config = fx.home.child("bad.toml");
    config.write_str("colour = \"blue\"\n").unwrap();

    fx.rogit()
        .arg("--config")
        .arg(config.path())
        .arg("refs")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn strict_config_rejects_symbolic_branch() {
    let fx = Fixture::new();
    git(fx.repo.path(), &["symbolic-ref", "refs/heads/alias", "refs/heads/main"]);

    fx.rogit()
        .arg("refs")
        .assert()
        .success()
        .stderr(predicate::str::contains("skipped symbolic ref 'refs/heads/alias'"));

    let config = fx.home.child("strict.toml");
    config.write_str("[refs]\nstrict = true\n").unwrap();

    fx.rogit()
        .arg("--config")
        .arg(config.path())
        .arg("refs")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported ref 'refs/heads/alias'"));
}
