//! End-to-end tests for the `embgen` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

const COMMANDS_YAML: &str = "\
name: Demo
commands:
  - name: ping
    id: 1
  - name: reset
    id: 2
";

const REGISTERS_YAML: &str = "\
name: Periph
regmap:
  - name: CTRL
    address: 0
    bitfields:
      - { name: EN, reset: 0, width: 1, offset: 0 }
";

const TESTING_YAML: &str = "\
name: Sample
items:
  - { name: alpha, value: 3 }
";

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../embgen-adapters/tests/fixtures/domains")
}

/// The binary, isolated from the caller's config, `.env` and domains.
fn embgen(work: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("embgen");
    cmd.current_dir(work.path())
        .env("XDG_CONFIG_HOME", work.path().join("xdg"))
        .env("NO_COLOR", "1")
        .env_remove("EMBGEN_DOMAINS_DIR")
        .env_remove("EMBGEN_OUTPUT_DIR")
        .env_remove("RUST_LOG");
    cmd
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

// ── Help and version ────────────────────────────────────────────────────────

#[test]
fn help_lists_domains_and_fixed_commands() {
    let work = TempDir::new().unwrap();
    embgen(&work)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("commands"))
        .stdout(predicate::str::contains("registers"))
        .stdout(predicate::str::contains("auto"))
        .stdout(predicate::str::contains("new"));
}

#[test]
fn version_flag() {
    let work = TempDir::new().unwrap();
    embgen(&work)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn domain_help_shows_output_flags() {
    let work = TempDir::new().unwrap();
    embgen(&work)
        .args(["registers", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--c-multi"))
        .stdout(predicate::str::contains("Generate Markdown output"));
}

#[test]
fn missing_subcommand_fails() {
    let work = TempDir::new().unwrap();
    embgen(&work).assert().failure().code(1);
}

#[test]
fn unknown_subcommand_fails() {
    let work = TempDir::new().unwrap();
    embgen(&work).arg("frobnicate").assert().failure().code(1);
}

// ── Generation ──────────────────────────────────────────────────────────────

#[test]
fn commands_header_generation() {
    let work = TempDir::new().unwrap();
    let input = write(&work, "demo.yml", COMMANDS_YAML);
    let out = work.path().join("out");

    embgen(&work)
        .arg("commands")
        .arg(&input)
        .args(["--h", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("demo.h"));

    let header = fs::read_to_string(out.join("demo.h")).unwrap();
    assert!(header.contains("#ifndef DEMO_H"));
    assert!(header.contains("PING"));
    assert_eq!(fs::read_dir(&out).unwrap().count(), 1);
}

#[test]
fn default_output_dir_is_generated() {
    let work = TempDir::new().unwrap();
    let input = write(&work, "demo.yml", COMMANDS_YAML);

    embgen(&work).arg("commands").arg(&input).arg("--md").assert().success();
    assert!(work.path().join("generated/demo.md").is_file());
}

#[test]
fn no_output_flags_fails() {
    let work = TempDir::new().unwrap();
    let input = write(&work, "demo.yml", COMMANDS_YAML);

    embgen(&work)
        .arg("commands")
        .arg(&input)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No output formats selected"));
}

#[test]
fn missing_input_fails() {
    let work = TempDir::new().unwrap();
    embgen(&work)
        .args(["commands", "nope.yml", "--h"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("nope.yml"));
}

#[test]
fn invalid_document_fails_validation() {
    let work = TempDir::new().unwrap();
    let input = write(&work, "bad.yml", "name: Demo\ncommands: 3\n");
    embgen(&work)
        .arg("commands")
        .arg(&input)
        .arg("--h")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to validate commands"));
}

// ── auto ────────────────────────────────────────────────────────────────────

#[test]
fn auto_detects_registers() {
    let work = TempDir::new().unwrap();
    let input = write(&work, "regs.yml", REGISTERS_YAML);
    let out = work.path().join("out");

    embgen(&work)
        .arg("auto")
        .arg(&input)
        .args(["--md", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Detected domain: registers"));
    assert!(out.join("periph.md").is_file());
}

#[test]
fn auto_without_flags_fails_before_reading_input() {
    let work = TempDir::new().unwrap();
    embgen(&work)
        .args(["auto", "nope.yml"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No output formats selected for 'auto'"))
        .stderr(predicate::str::contains("nope.yml").not());
}

#[test]
fn auto_without_match_fails() {
    let work = TempDir::new().unwrap();
    let input = write(&work, "other.yml", "name: X\nunrelated: 1\n");

    embgen(&work)
        .arg("auto")
        .arg(&input)
        .arg("--md")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Could not detect domain"))
        .stderr(predicate::str::contains("commands, registers"));
}

// ── User domains ────────────────────────────────────────────────────────────

#[test]
fn domains_dir_flag_adds_fixture_domains() {
    let work = TempDir::new().unwrap();
    let input = write(&work, "sample.yml", TESTING_YAML);
    let out = work.path().join("out");

    embgen(&work)
        .arg("--domains-dir")
        .arg(fixtures())
        .arg("testing")
        .arg(&input)
        .args(["--txt", "-o"])
        .arg(&out)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(out.join("sample.txt")).unwrap(),
        "Sample (sample)\n- alpha = 3\n"
    );
    assert!(out.join("testing_helper.txt").is_file());
}

#[test]
fn domains_dir_from_environment() {
    let work = TempDir::new().unwrap();
    let input = write(&work, "sample.yml", TESTING_YAML);
    let out = work.path().join("out");

    embgen(&work)
        .env("EMBGEN_DOMAINS_DIR", fixtures())
        .arg("testing")
        .arg(&input)
        .args(["--dat-multi", "-o"])
        .arg(&out)
        .assert()
        .success();

    for n in 1..=3 {
        assert!(out.join(format!("sample_{n}.dat")).is_file());
    }
}

#[test]
fn user_domain_overrides_builtin() {
    let work = TempDir::new().unwrap();
    let input = write(&work, "demo.yml", COMMANDS_YAML);
    let out = work.path().join("out");

    embgen(&work)
        .arg("commands")
        .arg(&input)
        .args(["--md", "-o"])
        .arg(&out)
        .arg("--domains-dir")
        .arg(fixtures())
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(out.join("demo.md")).unwrap(),
        "# Demo (override)\n- ping\n- reset\n"
    );
}

#[test]
fn config_file_sets_output_dir() {
    let work = TempDir::new().unwrap();
    let input = write(&work, "demo.yml", COMMANDS_YAML);
    let config = write(&work, "embgen.toml", "output_dir = \"from_config\"\n");

    embgen(&work)
        .arg("--config")
        .arg(&config)
        .arg("commands")
        .arg(&input)
        .arg("--md")
        .assert()
        .success();
    assert!(work.path().join("from_config/demo.md").is_file());
}

#[test]
fn missing_config_file_fails() {
    let work = TempDir::new().unwrap();
    embgen(&work)
        .args(["-cabsent.toml", "list"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}

// ── new ─────────────────────────────────────────────────────────────────────

#[test]
fn new_domain_is_usable_immediately() {
    let work = TempDir::new().unwrap();
    let domains = work.path().join("domains");
    fs::create_dir(&domains).unwrap();

    embgen(&work)
        .args(["new", "Sensor Map", "--location"])
        .arg(&domains)
        .assert()
        .success()
        .stdout(predicate::str::contains("--domains-dir"));
    assert!(domains.join("sensor_map/domain.toml").is_file());
    assert!(domains.join("sensor_map/templates/template.md.j2").is_file());

    let input = write(&work, "board.yml", "name: Board\nsensor_map:\n  - temp\n  - humidity\n");
    let out = work.path().join("out");
    embgen(&work)
        .arg("--domains-dir")
        .arg(&domains)
        .arg("sensor_map")
        .arg(&input)
        .args(["--md", "-o"])
        .arg(&out)
        .assert()
        .success();

    let md = fs::read_to_string(out.join("board.md")).unwrap();
    assert!(md.contains("# Board"));
    assert!(md.contains("- temp\n- humidity"));
}

#[test]
fn new_refuses_existing_directory() {
    let work = TempDir::new().unwrap();
    fs::create_dir(work.path().join("taken")).unwrap();

    embgen(&work)
        .args(["new", "taken"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn new_rejects_invalid_name() {
    let work = TempDir::new().unwrap();
    embgen(&work)
        .args(["new", "9lives"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid domain name"));
}

// ── list and completions ────────────────────────────────────────────────────

#[test]
fn list_json_reports_domains() {
    let work = TempDir::new().unwrap();
    let assert = embgen(&work)
        .arg("--domains-dir")
        .arg(fixtures())
        .args(["list", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["commands", "registers", "testing"]);
}

#[test]
fn list_table_warns_about_skipped_candidates() {
    let work = TempDir::new().unwrap();
    embgen(&work)
        .arg("--domains-dir")
        .arg(fixtures())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("testing - "))
        .stdout(predicate::str::contains("broken"));
}

#[test]
fn bash_completions() {
    let work = TempDir::new().unwrap();
    embgen(&work)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("embgen"))
        .stdout(predicate::str::contains("registers"));
}
