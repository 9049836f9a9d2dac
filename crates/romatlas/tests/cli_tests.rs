//! CLI integration tests for romatlas.
//!
//! The extract subcommand needs a cross toolchain, so these exercise the
//! database-facing subcommands against files written on the fly.

use std::fs;
use std::process::{Command, Output};

fn run_romatlas(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_romatlas"))
        .args(args)
        .output()
        .expect("failed to execute romatlas")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_help() {
    let output = run_romatlas(&["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    for subcommand in ["extract", "fmt", "sizes", "export"] {
        assert!(text.contains(subcommand), "help should mention {subcommand}");
    }
}

#[test]
fn test_fmt_canonicalizes_and_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ram.yml");
    // Fields out of schema order, lower-case hex.
    fs::write(
        &path,
        "-\n  addr: 0x2000010\n  desc: gWork\n  size: 0xb0\n  type: u8\n",
    )
    .unwrap();

    let output = run_romatlas(&["fmt", path.to_str().unwrap(), "--category", "ram"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert_eq!(
        text,
        "-\n  desc: gWork\n  type: u8\n  addr: 0x2000010\n  size: 0xB0\n"
    );

    // Formatting canonical text changes nothing.
    fs::write(&path, &text).unwrap();
    let again = run_romatlas(&["fmt", path.to_str().unwrap(), "--category", "ram"]);
    assert!(again.status.success());
    assert_eq!(stdout(&again), text);
}

#[test]
fn test_fmt_combines_directory_parts() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("b.yml"),
        "-\n  desc: gLate\n  addr: 0x2000100\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("a.yml"),
        "-\n  desc: gEarly\n  addr: 0x2000000\n",
    )
    .unwrap();

    let output = run_romatlas(&["fmt", dir.path().to_str().unwrap(), "--category", "ram"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    let early = text.find("gEarly").unwrap();
    let late = text.find("gLate").unwrap();
    assert!(early < late, "records should be in address order:\n{text}");
}

#[test]
fn test_fmt_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("code.yml");
    let out = dir.path().join("formatted.yml");
    fs::write(&path, "-\n  desc: Main\n  addr: 0x8000000\n").unwrap();

    let output = run_romatlas(&[
        "fmt",
        path.to_str().unwrap(),
        "--category",
        "code",
        "--out",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "-\n  desc: Main\n  addr: 0x8000000\n"
    );
}

#[test]
fn test_export_renders_hex_strings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ram.yml");
    fs::write(
        &path,
        "-\n  desc: gWork\n  type: u16\n  addr: 0x2000010\n  size: 0x2\n",
    )
    .unwrap();

    let output = run_romatlas(&["export", path.to_str().unwrap(), "--category", "ram"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let entry = &json.as_array().unwrap()[0];
    assert_eq!(entry["desc"], "gWork");
    assert_eq!(entry["addr"], "2000010");
    assert_eq!(entry["size"], "2");
}

#[test]
fn test_sizes_reports_per_region() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ram.yml");
    fs::write(
        &path,
        "-\n  desc: gUnits\n  type: Unit\n  addr:\n    U: 0x2000100\n    E: 0x2000140\n  count: 0x2\n",
    )
    .unwrap();
    let structs = dir.path().join("structs.yml");
    fs::write(&structs, "Unit:\n  size: 0x48\n").unwrap();

    let output = run_romatlas(&[
        "sizes",
        path.to_str().unwrap(),
        "--category",
        "ram",
        "--structs",
        structs.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("gUnits"), "{text}");
    assert!(text.contains("U:0x90"), "{text}");
    assert!(text.contains("E:0x90"), "{text}");
}

#[test]
fn test_sizes_rejects_code_category() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("code.yml");
    fs::write(&path, "-\n  desc: Main\n  addr: 0x8000000\n").unwrap();

    let output = run_romatlas(&["sizes", path.to_str().unwrap(), "--category", "code"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("data and ram"));
}

#[test]
fn test_missing_database_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nothing.yml");
    let output = run_romatlas(&["fmt", path.to_str().unwrap(), "--category", "ram"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("no database found"));
}

#[test]
fn test_unknown_category_is_rejected() {
    let output = run_romatlas(&["fmt", "whatever.yml", "--category", "sprites"]);
    assert!(!output.status.success());
}
