#![cfg(feature = "cli")]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn wirebytes(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wirebytes"))
        .args(["--log-level", "error"])
        .args(args)
        .output()
        .expect("wirebytes should run")
}

fn unique_temp_file(tag: &str, contents: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "wirebytes-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::write(&path, contents).expect("temp file should be writable");
    path
}

#[test]
fn wrap_prints_hex() {
    let output = wirebytes(&["--format", "hex", "wrap", "--width", "2", "--hex", "aabbcc"]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "0003aabbcc");
}

#[test]
fn wrap_raw_writes_binary() {
    let output = wirebytes(&["--format", "raw", "wrap", "--tag", "0x04", "--data", "hi"]);

    assert!(output.status.success());
    assert_eq!(output.stdout, b"\x04\x02hi");
}

#[test]
fn wrap_json_reports_length() {
    let output = wirebytes(&["--format", "json", "wrap", "--width", "1", "--data", "abc"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("wrap.schema.json"));
    assert!(stdout.contains("\"len\":4"));
    assert!(stdout.contains("\"hex\":\"03616263\""));
}

#[test]
fn wrap_overflow_returns_60() {
    let payload = "a".repeat(300);
    let output = wirebytes(&["wrap", "--width", "1", "--data", &payload]);

    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("exceeds prefix capacity"));
}

#[test]
fn wrap_over_max_len_returns_60() {
    let output = wirebytes(&[
        "--format", "hex", "wrap", "--width", "1", "--max-len", "3", "--data", "hello",
    ]);

    assert_eq!(output.status.code(), Some(60));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("exceeds limit 3"));
}

#[test]
fn inspect_der_json() {
    let output = wirebytes(&[
        "--format",
        "json",
        "inspect",
        "--hex",
        "30 07 02 01 05 04 02 68 69",
    ]);

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(json["mode"], "der");
    assert_eq!(json["input_len"], 9);
    let fields = json["fields"].as_array().expect("fields array");
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0]["kind"], "SEQUENCE");
    assert_eq!(fields[2]["value_hex"], "6869");
    assert_eq!(fields[2]["depth"], 1);
}

#[test]
fn inspect_prefixed_from_file() {
    let path = unique_temp_file("records", &[0x01, 0xaa, 0x02, 0xbb, 0xcc]);
    let output = wirebytes(&[
        "--format",
        "hex",
        "inspect",
        "--mode",
        "prefixed",
        "--width",
        "1",
        "--file",
        path.to_str().expect("utf-8 path"),
    ]);
    let _ = std::fs::remove_file(&path);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "aa\nbbcc\n");
}

#[test]
fn inspect_reads_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_wirebytes"))
        .args(["--log-level", "error", "--format", "pretty", "inspect"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("inspect should start");
    child
        .stdin
        .take()
        .expect("stdin piped")
        .write_all(&[0x02, 0x01, 0x07])
        .expect("stdin writable");
    let output = child.wait_with_output().expect("inspect should finish");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("INTEGER (0x02) @0 len=1 07"));
}

#[test]
fn inspect_malformed_der_returns_60() {
    let output = wirebytes(&["inspect", "--hex", "048101ff"]);

    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("malformed DER"));
}

#[test]
fn invalid_hex_returns_usage() {
    let output = wirebytes(&["inspect", "--hex", "xyz"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn wrapped_output_inspects_back() {
    let wrapped = wirebytes(&["--format", "hex", "wrap", "--tag", "0x30", "--hex", "020105"]);
    let hex = String::from_utf8_lossy(&wrapped.stdout).trim().to_string();

    let output = wirebytes(&["--format", "json", "inspect", "--hex", &hex]);
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(json["fields"][1]["kind"], "INTEGER");
    assert_eq!(json["fields"][1]["value_hex"], "05");
}

#[test]
fn version_prints_name() {
    let output = wirebytes(&["version"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("wirebytes "));
}
