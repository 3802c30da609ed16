mod common;

use std::fs;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use serde_json::Value;

use common::{TestWorkspace, fixture_path};

fn csv_dashboard() -> Command {
    Command::cargo_bin("csv-dashboard").expect("binary exists")
}

fn stdout_json(assert: assert_cmd::assert::Assert) -> Value {
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("stdout utf8");
    serde_json::from_str(&stdout).unwrap_or_else(|err| panic!("invalid JSON {err}: {stdout}"))
}

#[test]
fn generate_writes_json_to_stdout() {
    let orders = fixture_path("orders.csv");
    let assert = csv_dashboard()
        .args(["generate", "-i", orders.to_str().unwrap()])
        .assert()
        .success();
    let json = stdout_json(assert);

    assert_eq!(json["layout"], "simple");
    assert_eq!(json["kpis"][0]["value"], "14");
    assert_eq!(json["charts"][0]["title"], "Top 10 region");
    assert_eq!(json["insights"][0]["title"], "Extreme Value in units");
}

#[test]
fn generate_with_style_and_pretty_output_file() {
    let workspace = TestWorkspace::new();
    let output = workspace.path().join("dashboard.json");
    let orders = fixture_path("orders.csv");

    csv_dashboard()
        .args([
            "generate",
            "-i",
            orders.to_str().unwrap(),
            "--style",
            "PowerBI",
            "--pretty",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let written = fs::read_to_string(&output).expect("read output");
    assert!(written.contains("\n  \"layout\": \"powerbi\""));
    let json: Value = serde_json::from_str(&written).expect("valid JSON");
    assert_eq!(json["charts"][0]["gridPos"]["w"], 6);
}

#[test]
fn generate_emits_yaml_on_request() {
    let orders = fixture_path("orders.csv");
    csv_dashboard()
        .args([
            "generate",
            "-i",
            orders.to_str().unwrap(),
            "-s",
            "ml",
            "--format",
            "yaml",
        ])
        .assert()
        .success()
        .stdout(contains("layout: ml").and(contains("Correlation: units vs revenue")));
}

#[test]
fn generate_reads_stdin_with_dash() {
    let assert = csv_dashboard()
        .args(["generate", "-i", "-"])
        .write_stdin("category,amount\nA,10\nB,20\nA,30\n")
        .assert()
        .success();
    let json = stdout_json(assert);
    assert_eq!(json["charts"][0]["data"][0]["x"], serde_json::json!(["A", "B"]));
    assert_eq!(json["charts"][1]["data"][0]["x"], serde_json::json!([10.0, 20.0, 30.0]));
}

#[test]
fn generate_honours_delimiter_and_encoding_flags() {
    let latin1 = fixture_path("cafes_latin1.csv");
    let assert = csv_dashboard()
        .args([
            "generate",
            "-i",
            latin1.to_str().unwrap(),
            "--delimiter",
            ";",
            "--input-encoding",
            "windows-1252",
        ])
        .assert()
        .success();
    let json = stdout_json(assert);
    assert_eq!(
        json["charts"][0]["data"][0]["x"],
        serde_json::json!(["Café Central", "Bäckerei"])
    );
}

#[test]
fn generate_reuses_documents_from_cache_dir() {
    let workspace = TestWorkspace::new();
    let cache = workspace.path().join("cache");
    let input = fixture_path("orders.csv");

    let run = || {
        stdout_json(
            csv_dashboard()
                .args([
                    "generate",
                    "-i",
                    input.to_str().unwrap(),
                    "--cache-dir",
                    cache.to_str().unwrap(),
                ])
                .assert()
                .success(),
        )
    };
    let first = run();
    let second = run();

    assert_eq!(first["generatedAt"], second["generatedAt"]);
    let entries = fs::read_dir(&cache).expect("cache dir").count();
    assert_eq!(entries, 1);
}

#[test]
fn cache_dir_keeps_runs_with_other_settings_apart() {
    let workspace = TestWorkspace::new();
    let cache = workspace.path().join("cache");
    let config = workspace.write("settings.yml", "top_categories: 2\n");
    let input = fixture_path("orders.csv");

    let mut args = vec![
        "generate".to_string(),
        "-i".to_string(),
        input.to_str().unwrap().to_string(),
        "--cache-dir".to_string(),
        cache.to_str().unwrap().to_string(),
    ];
    let defaults = stdout_json(csv_dashboard().args(&args).assert().success());
    args.extend(["--config".to_string(), config.to_str().unwrap().to_string()]);
    let narrowed = stdout_json(csv_dashboard().args(&args).assert().success());

    assert_eq!(defaults["charts"][0]["title"], "Top 10 region");
    assert_eq!(narrowed["charts"][0]["title"], "Top 2 region");
    assert_eq!(fs::read_dir(&cache).expect("cache dir").count(), 2);
}

#[test]
fn generate_rejects_unknown_style() {
    let orders = fixture_path("orders.csv");
    csv_dashboard()
        .args(["generate", "-i", orders.to_str().unwrap(), "--style", "fancy"])
        .assert()
        .failure()
        .stderr(contains("unknown dashboard style 'fancy'"));
}

#[test]
fn generate_fails_on_empty_file() {
    let workspace = TestWorkspace::new();
    let empty = workspace.write("empty.csv", "");
    csv_dashboard()
        .args(["generate", "-i", empty.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("input is empty"));
}

#[test]
fn generate_fails_on_missing_file() {
    csv_dashboard()
        .args(["generate", "-i", "does-not-exist.csv"])
        .assert()
        .failure()
        .stderr(contains("Opening input file"));
}

#[test]
fn settings_file_limits_input_size() {
    let workspace = TestWorkspace::new();
    let config = workspace.write("settings.yml", "max_input_bytes: 16\n");
    let orders = fixture_path("orders.csv");
    csv_dashboard()
        .args([
            "generate",
            "-i",
            orders.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("byte limit"));
}

#[test]
fn settings_file_overrides_top_categories() {
    let workspace = TestWorkspace::new();
    let config = workspace.write("settings.yml", "top_categories: 2\n");
    let orders = fixture_path("orders.csv");
    let assert = csv_dashboard()
        .args([
            "generate",
            "-i",
            orders.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ])
        .assert()
        .success();
    let json = stdout_json(assert);
    assert_eq!(json["charts"][0]["title"], "Top 2 region");
}

#[test]
fn profile_reports_schema_and_preview() {
    let ragged = fixture_path("ragged.csv");
    let assert = csv_dashboard()
        .args(["profile", "-i", ragged.to_str().unwrap(), "--preview-rows", "2"])
        .assert()
        .success();
    let json = stdout_json(assert);

    assert_eq!(json["rowCount"], 3);
    assert_eq!(json["skippedRows"], 2);
    assert_eq!(json["preview"].as_array().map(Vec::len), Some(2));
    let temp = json["columns"]
        .as_array()
        .and_then(|columns| columns.iter().find(|column| column["name"] == "temp"))
        .expect("temp column");
    assert_eq!(temp["type"], "numeric");
    assert_eq!(temp["count"], 3);
}

#[test]
fn stats_prints_summary_table() {
    let orders = fixture_path("orders.csv");
    csv_dashboard()
        .args(["stats", "-i", orders.to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            contains("column")
                .and(contains("mean"))
                .and(contains("units"))
                .and(contains("7.5000"))
                .and(contains("channel")),
        );
}
