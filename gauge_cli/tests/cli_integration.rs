use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::{TempDir, tempdir};

// Fast ticks and a private profile store; everything else stays at defaults.
fn write_valid_config(dir: &TempDir) -> PathBuf {
    let toml = format!(
        r#"
[sampling]
tick_hz = 100

[calibration]
duration_ms = 200
debounce_ms = 30

[store]
path = "{}"
"#,
        dir.path().join("profile.bin").display()
    );
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn gauge(cfg: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("gauge_cli").unwrap();
    cmd.arg("--config").arg(cfg);
    cmd
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["run", "--ticks", "3"], 0, "Gal", "stdout")]
#[case(&["run", "--ticks", "3", "--slide", "101"], 2, "101", "stderr")]
#[case(&["self-check"], 0, "self-check ok: profile factory", "stdout")]
#[case(&["profile", "show"], 0, "profile (factory)", "stdout")]
#[case(&["calibrate", "--dry-run"], 0, "calibrated (dry run)", "stdout")]
#[case(&["frobnicate"], 2, "unrecognized subcommand", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = gauge(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn invalid_config_exits_with_config_code() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("bad.toml");
    fs::write(&cfg, "[sampling]\ntick_hz = 0\n").unwrap();

    gauge(&cfg)
        .arg("self-check")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Configuration is invalid"))
        .stderr(predicate::str::contains("tick_hz"));
}

#[rstest]
fn missing_config_file_is_reported() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("nope.toml");

    gauge(&cfg)
        .arg("self-check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file could not be read"));
}

#[rstest]
fn calibration_is_persisted_across_invocations() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    gauge(&cfg)
        .arg("calibrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("profile (calibrated)"))
        .stdout(predicate::str::contains("shower"));
    assert!(dir.path().join("profile.bin").exists());

    gauge(&cfg)
        .args(["profile", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("profile (stored)"));
}

#[rstest]
fn dry_run_leaves_store_untouched() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    gauge(&cfg).args(["calibrate", "--dry-run"]).assert().success();
    assert!(!dir.path().join("profile.bin").exists());
}

#[rstest]
fn profile_csv_export_then_import() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let csv = dir.path().join("profile.csv");

    gauge(&cfg)
        .args(["profile", "export", "--csv"])
        .arg(&csv)
        .assert()
        .success();
    let text = fs::read_to_string(&csv).unwrap();
    assert!(text.starts_with("channel,raw_low,raw_high"), "{text}");
    assert_eq!(text.lines().count(), 7);

    // Narrow the shower travel and load it back.
    let edited: String = text
        .lines()
        .map(|l| {
            if l.starts_with("shower,") {
                "shower,100,900".to_string()
            } else {
                l.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    fs::write(&csv, edited).unwrap();

    gauge(&cfg)
        .args(["profile", "import", "--csv"])
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("profile (imported)"));

    gauge(&cfg)
        .args(["profile", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("profile (stored)"))
        .stdout(predicate::str::is_match(r"shower\s+100\s+900").unwrap());
}

#[rstest]
fn cli_reports_bad_profile_header() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let bad_csv = dir.path().join("profile.csv");
    let mut f = fs::File::create(&bad_csv).unwrap();
    writeln!(f, "channel,low,high").unwrap();
    writeln!(f, "shower,50,950").unwrap();

    gauge(&cfg)
        .args(["profile", "import", "--csv"])
        .arg(&bad_csv)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid headers"));
}

#[rstest]
fn corrupt_store_falls_back_to_factory() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    fs::write(dir.path().join("profile.bin"), b"not a profile").unwrap();

    gauge(&cfg)
        .args(["profile", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("profile (fallback)"));
}
