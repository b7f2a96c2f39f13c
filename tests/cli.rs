use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const BODY: &str = "This body is comfortably longer than fifty characters of text.\n";

/// Return a `Command` for the `extlint` binary built by Cargo, reading an
/// empty manifest so that only built-in schemas apply.
fn extlint() -> Command {
    let mut cmd = cargo_bin_cmd!("extlint");
    cmd.env("EXTLINT_MANIFEST", "/nonexistent/version-manifest.json");
    cmd
}

/// Create a temp dir with a named subdirectory containing a SKILL.md.
/// Returns the parent TempDir (for lifetime) and the path to the subdirectory.
fn make_skill_dir(name: &str, content: &str) -> (tempfile::TempDir, PathBuf) {
    let parent = tempdir().unwrap();
    let dir = parent.path().join(name);
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("SKILL.md"), content).unwrap();
    (parent, dir)
}

fn write_manifest(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join("manifest.json");
    fs::write(&path, json).unwrap();
    path
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ── Global flags ────────────────────────────────────────────────────

#[test]
fn help_flag() {
    extlint()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Validator for agent extensions"));
}

#[test]
fn version_flag() {
    extlint()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn about_flag() {
    extlint()
        .arg("--about")
        .assert()
        .success()
        .stdout(predicate::str::contains("extlint:"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")))
        .stdout(predicate::str::contains("licence:"));
}

#[test]
fn no_args_shows_usage() {
    extlint()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn missing_path_is_usage_error() {
    extlint()
        .args(["validate", "/nonexistent/SKILL.md"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("path not found"));
}

#[test]
fn uninferable_kind_is_usage_error() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    fs::write(&file, "x").unwrap();
    extlint()
        .args(["validate", arg(&file)])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("pass --kind"));
}

// ── validate ────────────────────────────────────────────────────────

#[test]
fn validate_valid_skill() {
    let (_parent, dir) = make_skill_dir(
        "my-skill",
        &format!("---\nname: my-skill\ndescription: A test skill\n---\n{BODY}"),
    );
    extlint()
        .args(["validate", arg(&dir)])
        .assert()
        .success()
        .stderr(predicate::str::contains("ok"));
}

#[test]
fn validate_missing_description() {
    let (_parent, dir) = make_skill_dir("my-skill", "---\nname: foo\n---\n");
    extlint()
        .args(["validate", arg(&dir)])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Missing required frontmatter: 'description'",
        ));
}

#[test]
fn validate_warnings_only_exit_zero() {
    let (_parent, dir) = make_skill_dir(
        "my-skill",
        "---\nname: my-skill\ndescription: d\n---\nTiny.\n",
    );
    extlint()
        .args(["validate", arg(&dir)])
        .assert()
        .success()
        .stderr(predicate::str::contains("warning: Skill body is very short"));
}

#[test]
fn validate_agent_by_directory_convention() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("agents")).unwrap();
    let agent = dir.path().join("agents/reviewer.md");
    fs::write(
        &agent,
        "---\nname: reviewer\ndescription: Reviews\nmodel: gpt-4\n---\nBody\n",
    )
    .unwrap();
    extlint()
        .args(["validate", arg(&agent)])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid model 'gpt-4'"))
        .stderr(predicate::str::contains("<example>"));
}

#[test]
fn validate_kind_override() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("notes.md");
    fs::write(&file, "Run the deployment script and report.\n").unwrap();
    // Inferred as a skill, this has no header; as a command it is fine.
    extlint().args(["validate", arg(&file)]).assert().code(1);
    extlint()
        .args(["validate", "--kind", "command", arg(&file)])
        .assert()
        .success();
}

#[test]
fn validate_json_output() {
    let (_parent, dir) = make_skill_dir("my-skill", "---\nname: foo\n---\n");
    let output = extlint()
        .args(["validate", "--format", "json", arg(&dir)])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entry = &parsed[0];
    assert_eq!(entry["kind"], "skill");
    assert_eq!(entry["errors"][0]["code"], "E002");
    assert_eq!(entry["errors"][0]["severity"], "error");
    assert_eq!(entry["errors"][0]["field"], "description");
}

#[test]
fn validate_multiple_prints_summary() {
    let (_p1, good) = make_skill_dir(
        "good",
        &format!("---\nname: good\ndescription: d\n---\n{BODY}"),
    );
    let (_p2, bad) = make_skill_dir("bad", "---\nname: bad\n---\n");
    extlint()
        .args(["validate", arg(&good), arg(&bad)])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("2 extensions: 1 ok, 1 errors"));
}

#[test]
fn manifest_flag_changes_schema() {
    let dir = tempdir().unwrap();
    let manifest = write_manifest(
        dir.path(),
        r#"{ "schemas": { "skill_frontmatter": { "required": ["name", "version"] } } }"#,
    );
    let (_parent, skill) = make_skill_dir(
        "s",
        &format!("---\nname: s\ndescription: d\n---\n{BODY}"),
    );
    extlint()
        .args(["--manifest", arg(&manifest), "validate", arg(&skill)])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Missing required frontmatter: 'version'"));
}

#[test]
fn manifest_from_environment() {
    let dir = tempdir().unwrap();
    let manifest = write_manifest(
        dir.path(),
        r#"{ "schemas": { "hooks": { "valid_models": ["inherit"] } } }"#,
    );
    let (_parent, skill) = make_skill_dir(
        "s",
        &format!("---\nname: s\ndescription: d\nmodel: inherit\n---\n{BODY}"),
    );
    extlint()
        .env("EXTLINT_MANIFEST", &manifest)
        .args(["validate", arg(&skill)])
        .assert()
        .success();
}

// ── links ───────────────────────────────────────────────────────────

#[test]
fn links_broken_with_suggestion() {
    let (_parent, dir) = make_skill_dir(
        "s",
        "---\nname: s\ndescription: d\n---\nSee [bad](missing.md).\n",
    );
    fs::create_dir(dir.join("references")).unwrap();
    fs::write(dir.join("references/missing.md"), "# Missing\n").unwrap();
    extlint()
        .args(["links", arg(&dir)])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Line 5: missing.md"))
        .stderr(predicate::str::contains("Try: references/missing.md"));
}

#[test]
fn links_fenced_examples_ignored() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("guide.md");
    fs::write(&file, "Example:\n```markdown\n[x](nope.md)\n```\n").unwrap();
    extlint()
        .args(["links", arg(&file)])
        .assert()
        .success()
        .stderr(predicate::str::contains("0 links checked, 0 broken"));
}

#[test]
fn links_verbose_lists_valid_links() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("other.md"), "").unwrap();
    let file = dir.path().join("guide.md");
    fs::write(&file, "[o](other.md) and [site](https://example.com)\n").unwrap();
    extlint()
        .args(["links", "--verbose", arg(&file)])
        .assert()
        .success()
        .stderr(predicate::str::contains("[ok] Line 1: other.md"))
        .stderr(predicate::str::contains("[external] Line 1: https://example.com"));
}

#[test]
fn links_json_output() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("guide.md");
    fs::write(&file, "\n[gone](gone.md)\n").unwrap();
    let output = extlint()
        .args(["links", "--format", "json", arg(&file)])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let link = &parsed[0]["links"][0];
    assert_eq!(link["validity"], "broken");
    assert_eq!(link["line"], 2);
    assert_eq!(link["kind"], "markdown");
}

// ── deprecations ────────────────────────────────────────────────────

const RULES: &str = r#"{ "deprecations": [
    { "pattern": "oldTool", "severity": "error", "replacement": "newTool", "since": "2.0" },
    { "pattern": "legacy", "replacement": "modern" }
] }"#;

#[test]
fn deprecations_error_fails() {
    let dir = tempdir().unwrap();
    let manifest = write_manifest(dir.path(), RULES);
    let file = dir.path().join("run.sh");
    fs::write(&file, "#!/bin/sh\noldTool --fast\n").unwrap();
    extlint()
        .args(["--manifest", arg(&manifest), "deprecations", arg(&file)])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[ERROR] Line 2: oldTool"))
        .stderr(predicate::str::contains("Replace with: newTool"))
        .stderr(predicate::str::contains("Deprecated since: v2.0"));
}

#[test]
fn deprecations_warning_passes() {
    let dir = tempdir().unwrap();
    let manifest = write_manifest(dir.path(), RULES);
    let file = dir.path().join("notes.md");
    fs::write(&file, "legacy mode\n").unwrap();
    extlint()
        .args(["--manifest", arg(&manifest), "deprecations", arg(&file)])
        .assert()
        .success()
        .stderr(predicate::str::contains("Found 0 errors and 1 warnings"));
}

#[test]
fn deprecations_severity_filter() {
    let dir = tempdir().unwrap();
    let manifest = write_manifest(dir.path(), RULES);
    let file = dir.path().join("notes.md");
    fs::write(&file, "legacy mode\n").unwrap();
    extlint()
        .args([
            "--manifest",
            arg(&manifest),
            "deprecations",
            "--severity",
            "error",
            arg(&file),
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("No deprecated patterns found."));
}

#[test]
fn deprecations_survive_mistyped_manifest_member() {
    let dir = tempdir().unwrap();
    let manifest = write_manifest(
        dir.path(),
        r#"{ "version": 2, "deprecations": [ { "pattern": "oldTool", "severity": "error" } ] }"#,
    );
    let (_parent, skill) = make_skill_dir(
        "s",
        &format!("---\nname: s\ndescription: d\n---\n{BODY}use oldTool\n"),
    );
    extlint()
        .args(["--manifest", arg(&manifest), "scan", arg(&skill)])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Verdict: FAIL"));
}

#[test]
fn deprecations_without_rules() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("notes.md");
    fs::write(&file, "anything\n").unwrap();
    extlint()
        .args(["deprecations", arg(&file)])
        .assert()
        .success()
        .stderr(predicate::str::contains("No deprecation patterns loaded"));
}

// ── scan ────────────────────────────────────────────────────────────

#[test]
fn scan_clean_skill_passes() {
    let (_parent, dir) = make_skill_dir(
        "s",
        &format!("---\nname: s\ndescription: d\n---\n{BODY}"),
    );
    extlint()
        .args(["scan", arg(&dir)])
        .assert()
        .success()
        .stderr(predicate::str::contains("Verdict: PASS"))
        .stderr(predicate::str::contains("tokens:"));
}

#[test]
fn scan_error_rule_fails_verdict() {
    let dir = tempdir().unwrap();
    let manifest = write_manifest(dir.path(), RULES);
    let (_parent, skill) = make_skill_dir(
        "s",
        &format!("---\nname: s\ndescription: d\n---\n{BODY}Use oldTool.\n"),
    );
    extlint()
        .args(["--manifest", arg(&manifest), "scan", arg(&skill)])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Verdict: FAIL"));
}

#[test]
fn scan_json_output() {
    let (_parent, dir) = make_skill_dir(
        "s",
        &format!("---\nname: s\ndescription: d\n---\n{BODY}See [x](x.md).\n"),
    );
    let output = extlint()
        .args(["scan", "--format", "json", arg(&dir)])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["verdict"], "fail");
    assert_eq!(parsed["validation_passed"], true);
    assert_eq!(parsed["links_passed"], false);
    assert_eq!(parsed["documents"][0]["kind"], "skill");
}

#[test]
fn scan_with_repository_manifest() {
    let (_parent, dir) = make_skill_dir(
        "s",
        &format!("---\nname: s\ndescription: d\nallowed_tools: Read\n---\n{BODY}"),
    );
    let mut cmd = cargo_bin_cmd!("extlint");
    cmd.env_remove("EXTLINT_MANIFEST")
        .args([
            "--manifest",
            concat!(env!("CARGO_MANIFEST_DIR"), "/data/version-manifest.json"),
            "scan",
            arg(&dir),
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("allowed-tools:"));
}
