mod common;

use std::fs;

use assert_cmd::Command;
use predicates::str::contains;

use common::TestWorkspace;

fn chartboard() -> Command {
    let mut cmd = Command::cargo_bin("chartboard").expect("binary exists");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn seeded_workspace() -> TestWorkspace {
    let workspace = TestWorkspace::new();
    workspace.write_chart(
        "2025-12-21",
        &[
            (1, "Jhol", "Maanu", 90_000),
            (2, "Pal Pal", "Afusic", 80_000),
            (3, "Pasoori", "Ali Sethi", 70_000),
        ],
    );
    workspace.write_chart(
        "2025-12-22",
        &[
            (1, "Pal Pal", "Afusic", 95_000),
            (2, "Pasoori", "Ali Sethi", 85_000),
            (3, "Jhol", "Maanu", 60_000),
        ],
    );
    workspace
}

#[test]
fn empty_data_dir_fails_with_setup_hint() {
    let workspace = TestWorkspace::new();
    chartboard()
        .args(["kpis", "--data-dir", workspace.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("No chart data available."))
        .stderr(contains("YYYY-MM-DD"));
}

#[test]
fn unmatched_artist_warns_and_succeeds() {
    let workspace = seeded_workspace();
    chartboard()
        .args([
            "kpis",
            "--data-dir",
            workspace.path().to_str().unwrap(),
            "--artist",
            "Nobody",
        ])
        .assert()
        .success()
        .stderr(contains("No rows match your filters."));
}

#[test]
fn kpis_summarize_the_selection() {
    let workspace = seeded_workspace();
    chartboard()
        .args(["kpis", "--data-dir", workspace.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Unique tracks"))
        .stdout(contains("2025-12-21"));
}

#[test]
fn movers_report_rank_improvements_as_json() {
    let workspace = seeded_workspace();
    let output = chartboard()
        .args([
            "movers",
            "--data-dir",
            workspace.path().to_str().unwrap(),
            "--format",
            "json",
        ])
        .output()
        .expect("run movers");
    assert!(output.status.success());
    let movers: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    let first = &movers.as_array().expect("array")[0];
    assert_eq!(first["track"], "Pal Pal");
    assert_eq!(first["best_improvement"], 1);
}

#[test]
fn table_export_writes_canonical_csv() {
    let workspace = seeded_workspace();
    let out_dir = TestWorkspace::new();
    let export_path = out_dir.path().join("filtered.csv");
    chartboard()
        .args([
            "table",
            "--data-dir",
            workspace.path().to_str().unwrap(),
            "--top-n",
            "10",
            "--keyword",
            "pal",
            "--export",
            export_path.to_str().unwrap(),
        ])
        .assert()
        .success();

    let contents = fs::read_to_string(&export_path).expect("read export");
    let lines = contents.lines().collect::<Vec<_>>();
    assert_eq!(lines[0], "Date,Position,Track,Artist,Streams,URL");
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("2025-12-21,2,Pal Pal,Afusic,80000,"));
    assert!(lines[2].starts_with("2025-12-22,1,Pal Pal,Afusic,95000,"));
}

#[test]
fn sources_lists_skipped_files() {
    let workspace = seeded_workspace();
    workspace.write("charts-latest.csv", "Position,Streams\n1,10\n");
    chartboard()
        .args(["sources", "--data-dir", workspace.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("charts-latest.csv"))
        .stdout(contains("sources skipped"));
}

#[test]
fn config_file_sets_the_data_dir() {
    let workspace = seeded_workspace();
    let config_dir = TestWorkspace::new();
    let config_path = config_dir.write(
        "dashboard.yaml",
        &format!("data_dir: {}\n", workspace.path().display()),
    );
    chartboard()
        .args([
            "catalog",
            "--config",
            config_path.to_str().unwrap(),
            "--kind",
            "tracks",
        ])
        .assert()
        .success()
        .stdout(contains("Pasoori"));
}
