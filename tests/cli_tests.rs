//! CLI and basic command tests

mod common;

use common::{html_form_ng, iqc, markdown_form, setup_form_dir, write_doc};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    iqc()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("inspection forms"));
}

#[test]
fn test_version_displays() {
    iqc()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("iqc"));
}

#[test]
fn test_unknown_command_fails() {
    iqc()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

// ============================================================================
// Spec Command Tests
// ============================================================================

#[test]
fn test_spec_bilateral_yaml() {
    iqc()
        .args(["spec", "27.80+0.10-0.00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("grammar: bilateral"))
        .stdout(predicate::str::contains("lsl: 27.8"));
}

#[test]
fn test_spec_table_shows_confidence() {
    iqc()
        .args(["spec", "--format", "table", "Φ6.00±0.10", "not-a-spec"])
        .assert()
        .success()
        .stdout(predicate::str::contains("diameter-symmetric"))
        .stdout(predicate::str::contains("unparseable"))
        .stdout(predicate::str::contains("low"));
}

#[test]
fn test_spec_json_plus_only() {
    iqc()
        .args(["spec", "--format", "json", "12.5+0.2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"grammar\": \"plus_only\""));
}

#[test]
fn test_spec_requires_argument() {
    iqc().arg("spec").assert().failure();
}

// ============================================================================
// Stats Command Tests
// ============================================================================

#[test]
fn test_stats_from_arguments() {
    iqc()
        .args([
            "stats", "--spec", "10±0.5", "--format", "json", "10.0", "10.1", "9.9", "10.05",
            "9.95",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"OK\""))
        .stdout(predicate::str::contains("\"cpk\""));
}

#[test]
fn test_stats_from_stdin() {
    iqc()
        .args(["stats", "--spec", "Φ6.00±0.10", "--format", "json"])
        .write_stdin("6.01\n6.02, 5.99\n6.00\n6.03\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"count\": 5"));
}

#[test]
fn test_stats_out_of_tolerance_is_ng() {
    iqc()
        .args([
            "stats", "--spec", "10±0.1", "--format", "json", "10.0", "10.02", "10.3", "9.99",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"NG\""));
}

#[test]
fn test_stats_table_output() {
    iqc()
        .args(["stats", "--spec", "10±0.5", "--format", "table"])
        .args(["10.0", "10.1", "9.9", "10.05", "9.95", "10.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cpk"))
        .stdout(predicate::str::contains("Capable"));
}

#[test]
fn test_stats_chart() {
    iqc()
        .args(["stats", "--spec", "10±0.5", "--format", "table", "--chart"])
        .args(["10.0", "10.1", "9.9", "10.05", "9.95", "10.0", "10.02", "9.97", "10.04", "9.98"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Xbar  UCL="))
        .stdout(predicate::str::contains("LSL="));
}

#[test]
fn test_stats_without_values_fails() {
    iqc()
        .args(["stats", "--spec", "10±0.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No measurements"));
}

#[test]
fn test_stats_rejects_non_numeric() {
    iqc()
        .args(["stats", "--spec", "10±0.5", "10.0", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a number"));
}

#[test]
fn test_stats_rejects_nan() {
    iqc()
        .args(["stats", "-s", "10±0.1", "10", "NaN", "10.01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a number: 'NaN'"));
}

// ============================================================================
// Extract Command Tests
// ============================================================================

#[test]
fn test_extract_json() {
    let (_tmp, path) = setup_form_dir();
    let output = iqc()
        .args(["extract", "--format", "json"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["metadata"]["material_name"], "垫片");
    assert_eq!(doc["metadata"]["batch_number"], "JSR20240311");
    assert_eq!(doc["metadata"]["sample_size"], 10);

    let records = doc["records"].as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["identity"], "①");
    assert_eq!(records[1]["spec"]["grammar"], "diameter_symmetric");
    assert_eq!(records[2]["measurements"].as_array().unwrap().len(), 10);
    assert_eq!(records[0]["measurements"][0], 27.85);
}

#[test]
fn test_extract_table() {
    let (_tmp, path) = setup_form_dir();
    iqc()
        .arg("extract")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Φ6.00±0.10"))
        .stdout(predicate::str::contains("bilateral"));
}

#[test]
fn test_extract_csv_one_row_per_measurement() {
    let (_tmp, path) = setup_form_dir();
    let output = iqc()
        .args(["extract", "--format", "csv"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines();
    assert_eq!(
        lines.next(),
        Some("dimension,spec,lsl,usl,index,value")
    );
    assert_eq!(lines.count(), 30);
}

#[test]
fn test_extract_sample_size_from_env() {
    let tmp = TempDir::new().unwrap();
    let path = write_doc(tmp.path(), "form.md", &markdown_form(12));
    let output = iqc()
        .args(["extract", "--format", "json"])
        .arg(&path)
        .env("IQC_SAMPLE_SIZE", "5")
        .output()
        .unwrap();
    assert!(output.status.success());

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let records = doc["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["measurements"].as_array().unwrap().len(), 5);
}

#[test]
fn test_extract_missing_file_fails() {
    iqc()
        .args(["extract", "does-not-exist.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.md"));
}

#[test]
fn test_extract_unrecognized_document() {
    let tmp = TempDir::new().unwrap();
    let path = write_doc(tmp.path(), "notes.md", "# Just notes\n\nnothing tabular\n");
    iqc()
        .arg("extract")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("no dimensions recognized"));
}

// ============================================================================
// Analyze Command Tests
// ============================================================================

#[test]
fn test_analyze_table() {
    let (_tmp, path) = setup_form_dir();
    iqc()
        .arg("analyze")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cpk"))
        .stdout(predicate::str::contains("3 dimensions: 3 OK, 0 NG"))
        .stdout(predicate::str::contains("batch JSR20240311"));
}

#[test]
fn test_analyze_directory_json() {
    let tmp = TempDir::new().unwrap();
    write_doc(tmp.path(), "a/form1.md", &common::html_form());
    write_doc(tmp.path(), "b/form2.html", &html_form_ng());
    write_doc(tmp.path(), "b/scan.pdf", "binary");

    let output = iqc()
        .args(["analyze", "--format", "json"])
        .arg(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["summary"]["ng"], 0);
    assert_eq!(reports[1]["summary"]["ng"], 1);
    assert_eq!(reports[1]["dimensions"][1]["capability"]["status"], "NG");
    assert!(reports[0]["analyzed_at"].is_string());
}

#[test]
fn test_analyze_csv() {
    let (_tmp, path) = setup_form_dir();
    let output = iqc()
        .args(["analyze", "--format", "csv"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("source,dimension,spec,n,mean,cp,cpk,pp,ppk,level,status"));
    assert_eq!(stdout.lines().count(), 4);
}

#[test]
fn test_analyze_strict_fails_on_ng() {
    let tmp = TempDir::new().unwrap();
    let path = write_doc(tmp.path(), "ng.md", &html_form_ng());

    iqc()
        .args(["analyze", "--strict"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 3 dimensions NG"));

    iqc().arg("analyze").arg(&path).assert().success();
}

#[test]
fn test_analyze_lists_out_of_tolerance_parts() {
    let tmp = TempDir::new().unwrap();
    let path = write_doc(tmp.path(), "ng.md", &html_form_ng());

    iqc()
        .arg("analyze")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("out of tolerance: #5 6.150"));
}

#[test]
fn test_analyze_chart() {
    let (_tmp, path) = setup_form_dir();
    iqc()
        .args(["analyze", "--chart"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Xbar  UCL="))
        .stdout(predicate::str::contains("R  UCL="));
}

#[test]
fn test_analyze_subgroup_size_flag() {
    let (_tmp, path) = setup_form_dir();
    iqc()
        .args(["analyze", "--format", "json", "--subgroup-size", "2"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"members\""));

    iqc()
        .args(["analyze", "--subgroup-size", "1"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("subgroup_size"));
}

#[test]
fn test_analyze_empty_directory_fails() {
    let tmp = TempDir::new().unwrap();
    iqc()
        .arg("analyze")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No documents found"));
}

#[test]
fn test_analyze_warns_on_unrecognized_with_verbose_log() {
    let tmp = TempDir::new().unwrap();
    let path = write_doc(tmp.path(), "notes.md", "no tables\n");
    iqc()
        .arg("analyze")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("no dimensions recognized"))
        .stderr(predicate::str::contains("no dimensions recognized"));
}

#[test]
fn test_quiet_suppresses_warnings() {
    let tmp = TempDir::new().unwrap();
    let path = write_doc(tmp.path(), "notes.md", "no tables\n");
    iqc()
        .args(["analyze", "-q"])
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

// ============================================================================
// Config Command Tests
// ============================================================================

#[test]
fn test_config_show_merges_explicit_file() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("iqc.yaml");
    fs::write(&config, "analysis:\n  capable_cpk: 1.67\n  acceptable_cpk: 1.33\n").unwrap();

    iqc()
        .current_dir(tmp.path())
        .args(["config", "show", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("capable_cpk: 1.67"))
        .stdout(predicate::str::contains("default_sample_size: 60"));
}

#[test]
fn test_project_config_is_loaded() {
    let tmp = TempDir::new().unwrap();
    write_doc(
        tmp.path(),
        ".iqc/config.yaml",
        "extraction:\n  min_measurements: 7\n",
    );

    iqc()
        .current_dir(tmp.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("min_measurements: 7"));
}

#[test]
fn test_config_syntax_error_reported() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("broken.yaml");
    fs::write(&config, "analysis: [1, 2\n").unwrap();

    iqc()
        .current_dir(tmp.path())
        .args(["config", "show", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.yaml"));
}

#[test]
fn test_config_missing_explicit_file() {
    iqc()
        .args(["config", "show", "--config", "/nonexistent/iqc.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_config_path_lists_project_location() {
    let tmp = TempDir::new().unwrap();
    iqc()
        .current_dir(tmp.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".iqc"));
}

// ============================================================================
// Completions
// ============================================================================

#[test]
fn test_completions_bash() {
    iqc()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("iqc"));
}
