//! End-to-end tests for the `fardel` binary.

// assert_cmd::cargo_bin is deprecated but still works
#![allow(deprecated)]

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn fardel() -> Command {
    let mut cmd = Command::cargo_bin("fardel").expect("fardel binary");
    cmd.env("NO_COLOR", "1")
        .env_remove("FORCE_COLOR")
        .env_remove("RUST_LOG")
        .env_remove("FARDEL_MODE")
        .env_remove("FARDEL_PROFILE")
        .env_remove("FARDEL_CONTEXT")
        .env_remove("FARDEL_OUTPUT_PATH");
    cmd
}

fn starter() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    fardel().arg("init").arg(dir.path()).assert().success();
    dir
}

/// Files under `dir`, relative and sorted.
fn files(dir: &Path) -> Vec<String> {
    let mut out: Vec<String> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(dir)
                .expect("inside dir")
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    out.sort();
    out
}

#[test]
fn help_lists_subcommands() {
    fardel()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn init_then_build_produces_hashed_output() {
    let dir = starter();
    fardel()
        .args(["build", "--cwd"])
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Build Summary"))
        .stderr(predicate::str::contains("index.html"));

    let out = files(&dir.path().join("build"));
    assert!(out.contains(&"index.html".to_string()), "{out:?}");
    assert!(out.iter().any(|f| f.starts_with("js/index-") && f.ends_with(".js")), "{out:?}");
    assert!(out.iter().any(|f| f.starts_with("css/index-") && f.ends_with(".css")), "{out:?}");

    let page = fs::read_to_string(dir.path().join("build/index.html")).unwrap();
    assert!(page.contains("<script type=\"text/javascript\" src=\"js/index-"));
    assert!(page.contains("<link href=\"css/index-"));
}

#[test]
fn repeated_builds_produce_identical_names() {
    let dir = starter();
    let build = || {
        fardel()
            .args(["build", "--cwd"])
            .arg(dir.path())
            .assert()
            .success();
        files(&dir.path().join("build"))
    };
    assert_eq!(build(), build());
}

#[test]
fn development_mode_applies_the_profile() {
    let dir = starter();
    fardel()
        .args(["build", "--mode", "development", "--cwd"])
        .arg(dir.path())
        .assert()
        .success();

    let script = fs::read_to_string(dir.path().join("build/js/index.js")).unwrap();
    assert!(script.contains("\"development\""));
    assert!(script.contains("__fardel__.define({\n"));
}

#[test]
fn out_dir_flag_overrides_output_path() {
    let dir = starter();
    fardel()
        .args(["build", "--out-dir", "dist", "--cwd"])
        .arg(dir.path())
        .assert()
        .success();
    assert!(dir.path().join("dist/index.html").is_file());
    assert!(!dir.path().join("build").exists());
}

#[test]
fn quiet_build_prints_no_summary() {
    let dir = starter();
    fardel()
        .args(["-q", "build", "--cwd"])
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Build Summary").not());
}

#[test]
fn missing_config_fails_with_hint() {
    let dir = TempDir::new().unwrap();
    fardel()
        .args(["build", "--cwd"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("config not found"))
        .stderr(predicate::str::contains("fardel init"));
}

#[test]
fn unmatched_file_type_fails_the_build() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("fardel.toml"),
        "[entries]\nindex = \"index.js\"\n",
    )
    .unwrap();
    fs::write(dir.path().join("index.js"), "require('./logo.webp');\n").unwrap();
    fs::write(dir.path().join("logo.webp"), "webp").unwrap();

    fardel()
        .args(["build", "--cwd"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No rule matches"));
    assert!(!dir.path().join("build").exists());
}

#[test]
fn init_refuses_to_overwrite() {
    let dir = starter();
    fardel()
        .arg("init")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"))
        .stderr(predicate::str::contains("--force"));

    fardel()
        .args(["init", "--force"])
        .arg(dir.path())
        .assert()
        .success();
}

#[test]
fn check_passes_on_the_starter_project() {
    let dir = starter();
    fardel()
        .args(["check", "--cwd"])
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Configuration is valid"))
        .stderr(predicate::str::contains("clean → define → extract-css → minify → html"));
}

#[test]
fn check_reports_rule_order_dependence() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("fardel.toml"),
        r#"
[entries]
index = "index.js"

[[rules]]
test = '\.svg$'
use = ["file-loader"]

[[rules]]
test = '\.(svg|txt)$'
use = ["raw-loader"]
"#,
    )
    .unwrap();
    fs::write(dir.path().join("index.js"), "").unwrap();
    fs::write(dir.path().join("icon.svg"), "<svg/>").unwrap();

    fardel()
        .args(["check", "--cwd"])
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("icon.svg: rules[0] wins over rules[1]"));

    fardel()
        .args(["check", "--strict", "--cwd"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 3 files depend on rule order"));
}

#[test]
fn check_fails_on_a_missing_entry() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("fardel.toml"),
        "[entries]\nindex = \"src/missing.js\"\n",
    )
    .unwrap();
    fardel()
        .args(["check", "--cwd"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("src/missing.js"));
}
