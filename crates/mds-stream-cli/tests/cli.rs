use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("mds-stream"))
}

fn repo_root() -> std::path::PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest
        .parent()
        .and_then(|p| p.parent())
        .expect("repo root")
        .to_path_buf()
}

fn fixture(name: &str) -> std::path::PathBuf {
    repo_root().join("tests").join("fixtures").join(name)
}

#[test]
fn help_supports_analyse_and_analyze() {
    cmd().arg("analyse").arg("--help").assert().success();
    cmd().arg("analyze").arg("--help").assert().success();
}

#[test]
fn decode_prints_packet_json() {
    let assert = cmd().arg("decode").arg("050102030405").assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let value: Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(value["sequence"], 5);
    assert_eq!(value["payload"], "0102030405");
    assert_eq!(value["payload_length"], 5);
}

#[test]
fn decode_masks_reserved_header_bits() {
    cmd()
        .arg("decode")
        .arg("e5 aa")
        .assert()
        .success()
        .stdout(contains("\"sequence\":5"));
}

#[test]
fn decode_with_report_id() {
    cmd()
        .arg("decode")
        .arg("--report-id")
        .arg("0607beef")
        .assert()
        .success()
        .stdout(contains("\"sequence\":7").and(contains("beef")));
}

#[test]
fn decode_rejects_non_stream_report() {
    cmd()
        .arg("decode")
        .arg("--report-id")
        .arg("0301")
        .assert()
        .failure()
        .stderr(contains("not a stream data report").and(contains("hint:")));
}

#[test]
fn decode_oversized_payload_reports_status() {
    let packet = format!("01{}", "ff".repeat(64));
    cmd()
        .arg("decode")
        .arg(packet)
        .assert()
        .code(2)
        .stderr(contains("payload too large").and(contains("status -90")));
}

#[test]
fn decode_rejects_invalid_hex() {
    cmd()
        .arg("decode")
        .arg("zz")
        .assert()
        .code(2)
        .stderr(contains("invalid hex packet"));
}

#[test]
fn decode_accepts_upper_case_hex_prefix() {
    cmd()
        .arg("decode")
        .arg("0X05aa")
        .assert()
        .success()
        .stdout(contains("\"sequence\":5").and(contains("\"payload\":\"aa\"")));
}

#[test]
fn decode_strips_only_one_hex_prefix() {
    cmd()
        .arg("decode")
        .arg("0x0x05aa")
        .assert()
        .code(2)
        .stderr(contains("invalid hex packet '0x0x05aa'"));
}

#[test]
fn decode_report_without_header_is_too_short() {
    cmd()
        .arg("decode")
        .arg("--report-id")
        .arg("06")
        .assert()
        .code(2)
        .stderr(contains("status -61").and(contains("hint: a stream report is the id 0x06")));
}

#[test]
fn validate_reports_wraparound() {
    cmd()
        .arg("validate")
        .arg("31")
        .arg("0")
        .assert()
        .success()
        .stdout(contains("valid"));
}

#[test]
fn validate_rejects_repeat() {
    cmd()
        .arg("validate")
        .arg("5")
        .arg("5")
        .assert()
        .code(1)
        .stdout(contains("invalid"));
}

#[test]
fn missing_capture_names_path_and_accepted_formats() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.hex");

    cmd()
        .arg("analyze")
        .arg(&missing)
        .arg("--stdout")
        .assert()
        .code(2)
        .stderr(
            contains("error: input file not found")
                .and(contains("missing.hex"))
                .and(contains("hint: pass a .hex, .txt or .log capture")),
        );
}

#[test]
fn stdout_outputs_json() {
    let assert = cmd()
        .arg("analyze")
        .arg(fixture("in_order.hex"))
        .arg("--stdout")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let value: Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(value["stream"]["packets"], 4);
    assert_eq!(value["stream"]["first_sequence"], 30);
    assert_eq!(value["stream"]["last_sequence"], 1);
    assert_eq!(value["stream"]["dropped_packets"], 0);
}

#[test]
fn stdout_flag_rejects_report_path() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("report.json");

    cmd()
        .arg("analyze")
        .arg(fixture("gaps.hex"))
        .arg("--stdout")
        .arg("-o")
        .arg(&report)
        .assert()
        .code(2)
        .stdout("")
        .stderr(contains("--stdout").and(contains("cannot be used with")));
    assert!(!report.exists());
}

#[test]
fn report_written_to_file() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("out").join("report.json");

    cmd()
        .arg("analyse")
        .arg(fixture("hid_reports.hex"))
        .arg("--report-id")
        .arg("-o")
        .arg(&report)
        .assert()
        .success()
        .stderr(contains("OK: report written"));

    let json = std::fs::read_to_string(&report).expect("report written");
    let value: Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["capture_summary"]["reports_skipped"], 1);
    assert_eq!(value["violations"][0]["id"], "MDS-TOO-SHORT");
}

#[test]
fn quiet_writes_gap_report_without_status_lines() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("report.json");

    cmd()
        .env("RUST_LOG", "off")
        .arg("analyze")
        .arg(fixture("gaps.hex"))
        .arg("-o")
        .arg(&report)
        .arg("--quiet")
        .arg("--list-violations")
        .assert()
        .success()
        .stderr("");

    let json = std::fs::read_to_string(&report).expect("report written");
    let value: Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["stream"]["gap_count"], 2);
    assert_eq!(value["stream"]["duplicate_packets"], 1);
}

#[test]
fn unsupported_extension_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("capture.pcapng");
    std::fs::write(&input, "0501\n").expect("write input");

    cmd()
        .arg("analyze")
        .arg(input)
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("unsupported input format"));
}

#[test]
fn report_must_differ_from_input() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("capture.hex");
    std::fs::write(&input, "0501\n").expect("write input");

    cmd()
        .arg("analyze")
        .arg(&input)
        .arg("-o")
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("report path must differ from input"));
}

#[test]
fn list_violations_prints_counts_and_lines() {
    cmd()
        .arg("analyze")
        .arg(fixture("gaps.hex"))
        .arg("--stdout")
        .arg("--list-violations")
        .assert()
        .success()
        .stderr(
            contains("Violations:")
                .and(contains("warning MDS-SEQUENCE-DUPLICATE x1"))
                .and(contains("at line 5"))
                .and(contains("warning MDS-SEQUENCE-GAP x2"))
                .and(contains("at line 4, line 7")),
        );
}

#[test]
fn strict_fails_when_violations_present() {
    cmd()
        .arg("analyze")
        .arg(fixture("gaps.hex"))
        .arg("--stdout")
        .arg("--strict")
        .assert()
        .code(2)
        .stderr(
            contains("stream violations detected: MDS-SEQUENCE-DUPLICATE, MDS-SEQUENCE-GAP")
                .and(contains("hint: use --list-violations")),
        );
}

#[test]
fn strict_passes_on_clean_capture() {
    cmd()
        .arg("analyze")
        .arg(fixture("in_order.hex"))
        .arg("--stdout")
        .arg("--strict")
        .assert()
        .success();
}

#[test]
fn glob_resolves_the_single_capture_among_other_files() {
    let temp = TempDir::new().expect("tempdir");
    std::fs::write(temp.path().join("capture.hex"), "0501\n0602\n").expect("write capture");
    std::fs::write(temp.path().join("notes.md"), "bench run 3\n").expect("write notes");

    let assert = cmd()
        .arg("analyse")
        .arg(temp.path().join("*"))
        .arg("--stdout")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let value: Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(value["stream"]["packets"], 2);
    assert!(
        value["input"]["path"]
            .as_str()
            .expect("input path")
            .ends_with("capture.hex")
    );
}

#[test]
fn glob_matching_several_captures_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    std::fs::write(temp.path().join("a.hex"), "0501\n").expect("write a");
    std::fs::write(temp.path().join("b.log"), "0602\n").expect("write b");

    cmd()
        .arg("analyse")
        .arg(temp.path().join("*"))
        .arg("--stdout")
        .assert()
        .code(2)
        .stdout("")
        .stderr(
            contains("multiple files match pattern")
                .and(contains("(2 captures)"))
                .and(contains("hint: pass a single capture file")),
        );
}

#[test]
fn glob_without_captures_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    std::fs::write(temp.path().join("capture.pcapng"), "0501\n").expect("write input");

    cmd()
        .arg("analyse")
        .arg(temp.path().join("*"))
        .arg("--stdout")
        .assert()
        .code(2)
        .stderr(contains("no capture files match pattern"));
}

#[test]
fn version_carries_commit_and_date() {
    let assert = cmd().arg("--version").assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let prefix = format!("mds-stream {} (", env!("CARGO_PKG_VERSION"));
    let build = stdout
        .trim_end()
        .strip_prefix(prefix.as_str())
        .and_then(|rest| rest.strip_suffix(')'))
        .expect("version followed by build info");
    let fields: Vec<&str> = build.split(' ').collect();
    assert_eq!(fields.len(), 2, "commit and date in {stdout:?}");
    assert!(fields.iter().all(|field| !field.is_empty()));
}

#[test]
fn default_logging_reports_sequence_gaps() {
    cmd()
        .env_remove("RUST_LOG")
        .arg("analyse")
        .arg(fixture("gaps.hex"))
        .arg("--stdout")
        .assert()
        .success()
        .stderr(
            contains("WARN")
                .and(contains("sequence gap"))
                .and(contains("DEBUG").not()),
        );
}

#[test]
fn verbose_flag_enables_debug_events() {
    cmd()
        .env_remove("RUST_LOG")
        .arg("-v")
        .arg("analyse")
        .arg(fixture("in_order.hex"))
        .arg("--stdout")
        .assert()
        .success()
        .stderr(
            contains("DEBUG")
                .and(contains("analysing capture"))
                .and(contains("first stream packet")),
        );
}

#[test]
fn rust_log_overrides_verbose_flag() {
    cmd()
        .env("RUST_LOG", "off")
        .arg("-vv")
        .arg("analyse")
        .arg(fixture("gaps.hex"))
        .arg("--stdout")
        .assert()
        .success()
        .stderr("");
}
