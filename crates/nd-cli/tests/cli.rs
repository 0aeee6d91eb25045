//! CLI command integration tests.
//! Each test uses a temp directory via ND_DATA_DIR for full isolation.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const NOW: &str = "2026-03-10T12:00:00Z";

fn nd_cmd(data_dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("nd").unwrap();
    cmd.env("ND_DATA_DIR", data_dir.path());
    cmd
}

/// Three DeFi signals, written as a `{"signals": [...]}` document.
fn write_signals(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("signals.json");
    std::fs::write(
        &path,
        r#"{"signals": [
            {"id": "1", "signal": "DeFi yield liquidity grows", "timestamp": "2026-03-10T10:00:00Z", "source": "github", "strength": 0.8},
            {"id": "2", "signal": "DeFi yield liquidity grows", "timestamp": "2026-03-10T09:00:00Z", "source": "twitter", "strength": 0.7},
            {"id": "3", "signal": "DeFi yield liquidity grows", "timestamp": "2026-03-10T08:00:00Z", "source": "web", "strength": 0.9}
        ]}"#,
    )
    .unwrap();
    path
}

#[test]
fn latest_on_fresh_dir() {
    let dir = TempDir::new().unwrap();
    nd_cmd(&dir)
        .arg("latest")
        .assert()
        .success()
        .stdout(predicate::str::contains("(no snapshots)"));
}

#[test]
fn analyze_without_store_prints_report() {
    let dir = TempDir::new().unwrap();
    let input = write_signals(&dir);

    let output = nd_cmd(&dir)
        .args(["analyze", "--no-store", "--now", NOW])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["strategy"], "signal");
    assert_eq!(report["total_items_analyzed"], 3);
    assert_eq!(report["narrative_count"], 1);
    assert_eq!(report["narratives"][0]["name"], "DeFi Evolution");
    assert_eq!(report["analysis_timestamp"], NOW);

    nd_cmd(&dir)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("(no snapshots)"));
}

#[test]
fn analyze_stores_snapshot_then_latest_and_history() {
    let dir = TempDir::new().unwrap();
    let input = write_signals(&dir);

    nd_cmd(&dir)
        .args(["analyze", "--now", NOW])
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("stored snapshot"));

    nd_cmd(&dir)
        .arg("latest")
        .assert()
        .success()
        .stdout(predicate::str::contains("strategy:   signal"))
        .stdout(predicate::str::contains("narratives: 1"))
        .stdout(predicate::str::contains("DeFi Evolution"));

    nd_cmd(&dir)
        .args(["latest", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"narrative_count\": 1"));

    nd_cmd(&dir)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("last refresh: 2026-03-10T12:00:00Z"))
        .stdout(predicate::str::contains("1 narratives"));
}

#[test]
fn analyze_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write_signals(&dir);
    let out = dir.path().join("report.json");

    nd_cmd(&dir)
        .args(["analyze", "--no-store", "--mode", "content", "--now", NOW, "--output"])
        .arg(&out)
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 narratives from 3 items written to"));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(report["strategy"], "content");
    assert_eq!(report["fallback_used"], true);
}

#[test]
fn prune_keeps_newest() {
    let dir = TempDir::new().unwrap();
    let input = write_signals(&dir);

    for _ in 0..3 {
        nd_cmd(&dir)
            .args(["analyze", "--now", NOW])
            .arg(&input)
            .assert()
            .success();
    }

    nd_cmd(&dir)
        .args(["prune", "--keep", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pruned 2 snapshots, kept at most 1"));

    let output = nd_cmd(&dir).arg("history").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().filter(|l| l.ends_with(" narratives")).count(), 1);
}

#[test]
fn taxonomy_lists_builtin_and_custom() {
    let dir = TempDir::new().unwrap();
    nd_cmd(&dir)
        .arg("taxonomy")
        .assert()
        .success()
        .stdout(predicate::str::contains("DeFi Evolution: defi, yield"))
        .stdout(predicate::str::contains("Cross-Chain & Bridges"));

    let config = dir.path().join("nd.toml");
    std::fs::write(
        &config,
        "[[taxonomy]]\nname = \"Payments\"\nkeywords = [\"payment\", \"merchant\"]\n",
    )
    .unwrap();
    nd_cmd(&dir)
        .args(["taxonomy", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::diff("Payments: payment, merchant\n"));
}

#[test]
fn bad_now_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_signals(&dir);
    nd_cmd(&dir)
        .args(["analyze", "--no-store", "--now", "yesterday"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--now is not a valid timestamp"));
}

#[test]
fn missing_items_file_fails() {
    let dir = TempDir::new().unwrap();
    nd_cmd(&dir)
        .args(["analyze", "--no-store"])
        .arg(dir.path().join("nope.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read items"));
}
