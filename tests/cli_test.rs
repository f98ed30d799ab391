//! CLI contract tests
//!
//! Drive the compiled binary against throwaway repositories. User config
//! and `AGENT_READY_*` variables are isolated so the host environment never
//! leaks into results.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn agent_ready(config_home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_agent-ready"));
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env_remove("AGENT_READY_PROFILE")
        .env_remove("AGENT_READY_LANG")
        .env_remove("RUST_LOG");
    cmd
}

fn run(args: &[&str]) -> (Output, TempDir) {
    let config_home = TempDir::new().unwrap();
    let output = agent_ready(config_home.path())
        .args(args)
        .output()
        .unwrap();
    (output, config_home)
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// A small but healthy JavaScript project
fn sample_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "README.md",
        "# Widgets\n\n## Installation\n\nnpm install\n\n## Usage\n\nnpm start\n",
    );
    write(
        root,
        "package.json",
        r#"{"name": "widgets", "scripts": {"build": "tsc", "test": "jest", "lint": "eslint ."},
            "devDependencies": {"jest": "^29.0.0", "eslint": "^8.0.0"}}"#,
    );
    write(root, "package-lock.json", "{}");
    write(root, ".gitignore", "node_modules\n.env\n");
    write(
        root,
        ".github/workflows/ci.yml",
        "on: [push, pull_request]\njobs:\n  test:\n    runs-on: ubuntu-latest\n    steps:\n      - uses: actions/checkout@v4\n      - run: npm test\n",
    );
    write(root, "src/index.js", "module.exports = {};\n");
    write(root, "src/index.test.js", "test('ok', () => {});\n");
    write(
        root,
        "node_modules/left-pad/index.js",
        "module.exports = 1;\n",
    );
    dir
}

fn scan_json(repo: &Path, extra: &[&str]) -> serde_json::Value {
    let path = repo.to_str().unwrap();
    let mut args = vec!["scan", path, "--format", "json"];
    args.extend_from_slice(extra);
    let (output, _home) = run(&args);
    assert!(
        output.status.success(),
        "scan failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is a JSON report")
}

#[test]
fn test_json_report_shape() {
    let repo = sample_repo();
    let report = scan_json(repo.path(), &[]);

    let name = repo.path().file_name().unwrap().to_str().unwrap();
    assert_eq!(report["meta"]["repo"], name);
    assert!(report["meta"]["commit"].is_string());
    assert_eq!(report["meta"]["profile"], "factory_compat");
    assert_eq!(report["meta"]["language"], "en");
    assert_eq!(report["meta"]["agents_used"], 9);
    let pillars = report["detailed_analysis"]["pillars"].as_array().unwrap();
    assert_eq!(pillars.len(), 9);
    let levels = report["charts"]["level_progress"].as_array().unwrap();
    assert_eq!(levels.len(), 5);
    for key in ["quick_wins", "short_term", "medium_term", "long_term"] {
        assert!(
            report["improvement_roadmap"][key].is_array(),
            "missing {}",
            key
        );
    }

    let docs = &report["detailed_analysis"]["pillars"][0];
    assert_eq!(docs["pillar"], "docs");
    let readme = docs["checks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["check_id"] == "docs.readme")
        .expect("docs.readme fact");
    assert_eq!(readme["passed"], true);
}

#[test]
fn test_default_excludes_hide_vendored_files() {
    let repo = sample_repo();
    let report = scan_json(repo.path(), &[]);
    let text = report.to_string();
    assert!(!text.contains("node_modules/left-pad"));
}

#[test]
fn test_language_flag_and_env_override() {
    let repo = sample_repo();
    let report = scan_json(repo.path(), &["--language", "zh"]);
    assert_eq!(report["meta"]["language"], "zh");
    assert_eq!(report["charts"]["pillar_radar"][0]["pillar"], "文档");

    // Environment beats the flag
    let config_home = TempDir::new().unwrap();
    let output = agent_ready(config_home.path())
        .env("AGENT_READY_LANG", "en")
        .args([
            "scan",
            repo.path().to_str().unwrap(),
            "-f",
            "json",
            "--language",
            "zh",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["meta"]["language"], "en");
}

#[test]
fn test_project_config_is_applied() {
    let repo = sample_repo();
    write(
        repo.path(),
        "agent-ready.toml",
        "[scan]\nlanguage = \"zh\"\n",
    );
    let report = scan_json(repo.path(), &[]);
    assert_eq!(report["meta"]["language"], "zh");
}

#[test]
fn test_target_level_gates_exit_code() {
    let empty = TempDir::new().unwrap();
    let (output, _home) = run(&[
        "scan",
        empty.path().to_str().unwrap(),
        "-f",
        "json",
        "--level",
        "L1",
    ]);
    assert_eq!(output.status.code(), Some(1));
    // The report is still printed before failing
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(report["executive_summary"]["level"].is_null());
    assert!(String::from_utf8_lossy(&output.stderr).contains("L1 was required"));
}

#[test]
fn test_output_file_markdown() {
    let repo = sample_repo();
    let out_dir = TempDir::new().unwrap();
    let out_file = out_dir.path().join("report.md");
    let (output, _home) = run(&[
        "scan",
        repo.path().to_str().unwrap(),
        "--format",
        "markdown",
        "--output-file",
        out_file.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let md = std::fs::read_to_string(&out_file).unwrap();
    assert!(md.starts_with("# Agent Ready Scan Report"));
    assert!(md.contains("## Improvement Roadmap"));
}

#[test]
fn test_text_output() {
    let repo = sample_repo();
    let (output, _home) = run(&["scan", repo.path().to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Agent Ready Scan Report"));
    assert!(stdout.contains("Documentation"));
}

#[test]
fn test_missing_path_fails() {
    let (output, _home) = run(&["scan", "/definitely/not/a/repo"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Path does not exist"));
}

#[test]
fn test_unknown_profile_fails() {
    let repo = sample_repo();
    let (output, _home) = run(&["scan", repo.path().to_str().unwrap(), "--profile", "nope"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Profile 'nope' not found"));
    assert!(stderr.contains("factory_compat"));
}

#[test]
fn test_custom_profile_directory() {
    let repo = sample_repo();
    write(
        repo.path(),
        "rubrics/tiny.yaml",
        r#"
name: tiny
version: "0.1.0"
checks:
  - id: docs.readme
    name: README
    pillar: docs
    level: L1
    required: true
    type: file_exists
    path: README.md
"#,
    );
    write(
        repo.path(),
        "agent-ready.toml",
        "[profiles]\ndirs = [\"rubrics\"]\n",
    );

    let report = scan_json(repo.path(), &["--profile", "tiny"]);
    assert_eq!(report["meta"]["profile"], "tiny");
    assert_eq!(report["meta"]["profile_version"], "0.1.0");
    // Every pillar is evaluated; only docs has checks
    assert_eq!(report["detailed_analysis"]["pillars"][0]["checks_total"], 1);
    assert_eq!(report["detailed_analysis"]["pillars"][1]["checks_total"], 0);
}

#[test]
fn test_profiles_list_and_show() {
    let (output, _home) = run(&["profiles"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("factory_compat"));

    let (output, _home) = run(&["profiles", "--show", "factory_compat"]);
    assert!(output.status.success());
    let profile: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(profile["name"], "factory_compat");
    assert_eq!(profile["version"], "1.0.0");
    assert!(!profile["checks"].as_array().unwrap().is_empty());
}

#[test]
fn test_init_writes_config() {
    let repo = TempDir::new().unwrap();
    let (output, _home) = run(&["init", repo.path().to_str().unwrap()]);
    assert!(output.status.success());
    assert!(repo.path().join("agent-ready.toml").is_file());
}

#[test]
fn test_invalid_workers_rejected() {
    let (output, _home) = run(&["--workers", "0", "scan", "."]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("workers must be at least 1"));
}
