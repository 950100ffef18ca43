use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;
use wind_core::sink::nmea_checksum;

// Minimal valid config for sim mode with a short period.
const VALID: &str = r#"
[pins]
# pins are unused in sim backend but must be present
speed = 17
direction = 27

[timing]
period_ms = 50

[simulation]
rps = 1000.0
angle_deg = 10.0
"#;

fn write_config(dir: &tempfile::TempDir, toml: &str) -> PathBuf {
    let path = dir.path().join("wind.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn wind(cfg: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("wind").unwrap();
    cmd.env_remove("RUST_LOG").arg("--config").arg(cfg);
    cmd
}

fn assert_valid_mwv(line: &str) {
    let inner = line.strip_prefix('$').expect("sentence starts with $");
    let (body, checksum) = inner.split_once('*').expect("checksum delimiter");
    assert!(body.starts_with("WIMWV,"), "unexpected body {body:?}");
    assert_eq!(checksum, format!("{:02X}", nmea_checksum(body)));
    let fields: Vec<&str> = body.split(',').collect();
    assert_eq!(fields.len(), 6);
    assert_eq!(fields[2], "R");
    assert_eq!(fields[4], "M");
    assert_eq!(fields[5], "A");
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["self-check"], 0, "ok", "stdout")]
#[case(&["run", "--cycles", "2", "--stats"], 0, "cycles: 2", "stderr")]
#[case(&["run", "--filter-gain", "1.5", "--cycles", "1"], 3, "filter-gain", "stderr")]
#[case(&["run", "--sim-rps", "-5", "--cycles", "1"], 3, "simulated rate", "stderr")]
#[case(&["run", "--format", "csv"], 2, "invalid value", "stderr")]
#[case(&["run", "--cycles", "0"], 2, "invalid value", "stderr")]
#[case(&["bogus"], 2, "unrecognized subcommand", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, VALID);
    let mut cmd = wind(&cfg);
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

#[test]
fn run_emits_one_mwv_sentence_per_cycle() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, VALID);
    let out = wind(&cfg).args(["run", "--cycles", "3"]).output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.ends_with("\r\n"));
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    for line in lines {
        assert_valid_mwv(line);
    }
}

#[test]
fn run_json_format_emits_objects() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, VALID);
    let out = wind(&cfg)
        .args([
            "run", "--cycles", "2", "--format", "json", "--offset", "-15",
        ])
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        let v: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(v["speed_mps"].as_f64().unwrap() >= 0.0);
        let angle = v["angle_rad"].as_f64().unwrap();
        assert!((0.0..std::f64::consts::TAU).contains(&angle));
    }
}

#[test]
fn diag_json_reports_the_simulated_wind() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, &VALID.replace("rps = 1000.0", "rps = 2000.0"));
    let out = wind(&cfg)
        .args(["--json", "--log-level", "warn", "diag"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    let v: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    // Five 50 ms cycles against 50 ms revolutions (21.58 m/s): the first
    // step from calm is rejected, a later one published.
    let speed = v["speed_out_cmps"].as_i64().unwrap();
    assert!((1900..=2158).contains(&speed), "speed {speed}");
    assert!(v["speed_outcome"].is_string());
}

#[rstest]
#[case("[pins]\nspeed = 4\ndirection = 4\n", "must differ")]
#[case("[pins]\nspeed = 4\ndirection = 5\n[timing]\nperiod_ms = 0\n", "period_ms")]
#[case("[tuning]\nfilter_gain = 0.5\n", "pins")]
#[case("[pins]\nspeed = 4\ndirection = 5\n[output]\ntalker = \"x\"\n", "talker")]
fn invalid_config_exits_with_config_code(#[case] toml: &str, #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, toml);
    wind(&cfg)
        .arg("self-check")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("What happened: Configuration"))
        .stderr(predicate::str::contains(needle));
}

#[test]
fn missing_config_file_is_a_config_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    wind(&missing)
        .arg("self-check")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn json_mode_reports_errors_as_json() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "[pins]\nspeed = 4\ndirection = 4\n");
    let out = wind(&cfg).args(["--json", "self-check"]).output().unwrap();
    assert_eq!(out.status.code(), Some(3));
    let stderr = String::from_utf8(out.stderr).unwrap();
    let last = stderr.lines().last().expect("error line");
    let v: serde_json::Value = serde_json::from_str(last).unwrap();
    assert_eq!(v["reason"], "Config");
    assert_eq!(v["exit_code"], 3);
}

#[test]
fn log_file_receives_json_lines() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("wind.log");
    let toml = format!(
        "{VALID}\n[logging]\nfile = {:?}\nlevel = \"info\"\n",
        log.display().to_string()
    );
    let cfg = write_config(&dir, &toml);
    wind(&cfg).args(["run", "--cycles", "1"]).assert().success();
    let text = fs::read_to_string(&log).unwrap();
    let first = text.lines().next().expect("at least one log line");
    let v: serde_json::Value = serde_json::from_str(first).unwrap();
    assert!(v["level"].is_string());
}
