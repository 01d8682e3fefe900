//! Integration tests for the `gearsdoc` binary.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn gearsdoc_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_gearsdoc"))
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/project")
        .join(name)
}

fn temp_out(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("gearsdoc-cli-test").join(name);
    // Clean up from previous runs
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn path_arg(path: &PathBuf) -> &str {
    path.to_str().unwrap()
}

#[test]
fn generate_with_flags_writes_site() {
    let out = temp_out("flags");
    let (src, index, guides) = (fixture("src"), fixture("README.md"), fixture("guides"));
    let output = Command::new(gearsdoc_bin())
        .args([
            "generate",
            "--input",
            path_arg(&src),
            "--output",
            path_arg(&out),
            "--ignore",
            "vendor",
            "--index",
            path_arg(&index),
            "--additional-docs",
            path_arg(&guides),
            "--link",
            "[GitHub](https://github.com/demo)",
            "--name",
            "Demo",
            "--quiet",
        ])
        .output()
        .expect("failed to run gearsdoc generate");

    assert!(output.status.success(), "generate should succeed: {}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty(), "--quiet should print nothing");

    for page in ["base.html", "index.html", "App.html", "lib/Gear.html", "lib/deep/Cog.html", "usage.html"] {
        assert!(out.join(page).exists(), "{page} should exist");
    }
    assert!(!out.join("vendor/Ignored.html").exists());

    let app = fs::read_to_string(out.join("App.html")).unwrap();
    assert!(app.contains("<a class=\"brand\" href=\"index.html\">Demo</a>"));
    assert!(app.contains("<li><a href=\"https://github.com/demo\">GitHub</a></li>"));

    let _ = fs::remove_dir_all(&out);
}

#[test]
fn generate_prints_summary_without_quiet() {
    let out = temp_out("summary");
    let src = fixture("src");
    let output = Command::new(gearsdoc_bin())
        .env("NO_COLOR", "1")
        .args(["generate", "--input", path_arg(&src), "--output", path_arg(&out), "--ignore", "vendor"])
        .output()
        .expect("failed to run gearsdoc generate");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Generated 3 pages"), "unexpected summary: {stdout}");
    assert!(stdout.contains("skipped 2 files without docblocks"));
    assert!(stdout.contains("Broken.js:1: warning:"));

    let _ = fs::remove_dir_all(&out);
}

#[test]
fn generate_fails_when_output_is_missing() {
    let out = std::env::temp_dir().join("gearsdoc-cli-test").join("does-not-exist");
    let _ = fs::remove_dir_all(&out);
    let src = fixture("src");

    let output = Command::new(gearsdoc_bin())
        .args(["generate", "--input", path_arg(&src), "--output", path_arg(&out), "--quiet"])
        .output()
        .expect("failed to run gearsdoc generate");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does-not-exist"), "stderr should name the path: {stderr}");
    assert!(!out.exists(), "the output directory is never created");
}

#[test]
fn generate_rejects_malformed_link() {
    let out = temp_out("bad-link");
    let src = fixture("src");
    let output = Command::new(gearsdoc_bin())
        .args(["generate", "--input", path_arg(&src), "--output", path_arg(&out), "--link", "GitHub"])
        .output()
        .expect("failed to run gearsdoc generate");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid link 'GitHub'"));

    let _ = fs::remove_dir_all(&out);
}

#[test]
fn generate_reads_config_file() {
    let out = temp_out("config");
    let (config, src) = (fixture("gearsdoc.json"), fixture("src"));
    let output = Command::new(gearsdoc_bin())
        .args([
            "generate",
            "--config",
            path_arg(&config),
            "--input",
            path_arg(&src),
            "--output",
            path_arg(&out),
            "--quiet",
        ])
        .output()
        .expect("failed to run gearsdoc generate");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(!out.join("vendor/Ignored.html").exists(), "config ignore list applies");

    let home = fs::read_to_string(out.join("index.html")).unwrap();
    assert!(home.contains("<h1>Welcome to Configured</h1>"));
    assert!(home.contains("<li><a href=\"https://example.com/repo\">Repository</a></li>"));

    let _ = fs::remove_dir_all(&out);
}

#[test]
fn scan_json_lists_blocks() {
    let app = fixture("src/App.php");
    let output = Command::new(gearsdoc_bin())
        .args(["scan", path_arg(&app), "--format", "json"])
        .output()
        .expect("failed to run gearsdoc scan");

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("scan output should be JSON");
    let blocks = json["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0]["title"], "Class: Widget");
    assert_eq!(blocks[0]["context"], "primary");
    assert_eq!(blocks[1]["signature"], "public function render()");
    assert!(json["diagnostics"].as_array().unwrap().is_empty());
}

#[test]
fn scan_reports_unterminated_block() {
    let broken = fixture("src/Broken.js");
    let output = Command::new(gearsdoc_bin())
        .env("NO_COLOR", "1")
        .args(["scan", path_arg(&broken)])
        .output()
        .expect("failed to run gearsdoc scan");

    assert!(output.status.success(), "diagnostics are warnings, not failures");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Broken.js:1: warning: [S001]"), "unexpected stderr: {stderr}");
}
