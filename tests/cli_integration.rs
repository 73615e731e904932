// Black-box CLI tests: the `ad` binary driven through std::process::Command,
// covering the end-to-end scenarios and exit statuses.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Locate the `ad` binary produced by Cargo.
fn ad_bin() -> PathBuf {
    if let Ok(p) = std::env::var("CARGO_BIN_EXE_ad") {
        return PathBuf::from(p);
    }
    let mut p = std::env::current_exe().unwrap();
    p.pop();
    if p.ends_with("deps") {
        p.pop();
    }
    p.push("ad");
    p
}

/// Run `ad` with `argv`, feeding `input` on stdin.  Color is pinned off so
/// the caller's terminal environment cannot leak into expectations.
fn run_ad(argv: &[&str], input: &[u8]) -> Output {
    let mut child = Command::new(ad_bin())
        .args(["--color=never"])
        .args(argv)
        .env_remove("AD_COLORS")
        .env_remove("GREP_COLORS")
        .env_remove("GREP_COLOR")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.as_mut().unwrap().write_all(input).unwrap();
    child.wait_with_output().unwrap()
}

fn stdout_str(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr_str(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// 1. Canonical dump
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn default_dump_of_hello_world() {
    let out = run_ad(&[], b"Hello, World!\n");
    assert!(out.status.success());
    assert_eq!(
        stdout_str(&out),
        "000000000000: 4865 6C6C 6F2C 2057  6F72 6C64 210A        Hello, World!.\n"
    );
}

#[test]
fn string_search_reports_one_match() {
    let out = run_ad(&["--string=World", "-t"], b"Hello, World!\n");
    assert!(out.status.success());
    assert_eq!(stderr_str(&out).trim(), "1");
    assert!(stdout_str(&out).starts_with("000000000000: 4865"));
}

#[test]
fn forty_zero_bytes_elide() {
    let out = run_ad(&[], &[0u8; 40]);
    assert!(out.status.success());
    let text = stdout_str(&out);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "------------: (16 | 0x10)");
    assert!(lines[2].starts_with("000000000020: "));
}

#[test]
fn verbose_suppresses_elision() {
    let out = run_ad(&["--verbose"], &[0u8; 40]);
    let text = stdout_str(&out);
    assert_eq!(text.lines().count(), 3);
    assert!(!text.contains('-'));
}

// ─────────────────────────────────────────────────────────────────────────────
// 2. C array
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn c_array_from_named_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blob.bin");
    fs::write(&path, (0u8..20).collect::<Vec<u8>>()).unwrap();

    let out = run_ad(&["--c-array=c", path.to_str().unwrap()], b"");
    assert!(out.status.success());
    let text = stdout_str(&out);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "const unsigned char blob_bin[] = {");
    // 20 bytes: two full 8-byte rows plus a short one.
    assert_eq!(lines.len(), 1 + 3 + 1);
    assert!(lines[1].starts_with("  /* 0 */ 0x00, 0x01,"));
    assert_eq!(lines[lines.len() - 1], "};");
    // No length-type letter: no length variable.
    assert!(!text.contains("_len"));
}

#[test]
fn c_array_from_stdin_with_length() {
    let out = run_ad(&["-Cst"], b"xyz");
    assert!(out.status.success());
    let text = stdout_str(&out);
    assert!(text.starts_with("static unsigned char stdin[] = {"));
    assert!(text.contains("static size_t stdin_len = 3;"));
}

// ─────────────────────────────────────────────────────────────────────────────
// 3. Reverse mode
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn reverse_round_trips_a_dump() {
    let original = b"Hello, World!\n".to_vec();
    let dumped = run_ad(&[], &original);
    assert!(dumped.status.success());

    let reversed = run_ad(&["--reverse"], &dumped.stdout);
    assert!(reversed.status.success());
    assert_eq!(reversed.stdout, original);
}

#[test]
fn reverse_round_trips_elided_dump_via_files() {
    let dir = TempDir::new().unwrap();
    let input_path = dir.path().join("input.bin");
    let dump_path = dir.path().join("dump.txt");
    let back_path = dir.path().join("back.bin");

    let mut original = vec![0u8; 64];
    original.extend_from_slice(b"trailer");
    fs::write(&input_path, &original).unwrap();

    let out = run_ad(
        &[input_path.to_str().unwrap(), dump_path.to_str().unwrap()],
        b"",
    );
    assert!(out.status.success());

    let out = run_ad(
        &["-r", dump_path.to_str().unwrap(), back_path.to_str().unwrap()],
        b"",
    );
    assert!(out.status.success(), "stderr: {}", stderr_str(&out));
    assert_eq!(fs::read(&back_path).unwrap(), original);
}

#[test]
fn reverse_rejects_malformed_dump() {
    let out = run_ad(&["--reverse"], b"this is not a dump\n");
    assert_eq!(out.status.code(), Some(65));
    let err = stderr_str(&out);
    assert!(err.starts_with("ad: "), "{}", err);
    assert!(err.contains(":1:"), "{}", err);
}

// ─────────────────────────────────────────────────────────────────────────────
// 4. Searches and exit statuses
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn kmp_overlap_scenario() {
    let out = run_ad(&["--string=ABABC", "-T"], &[0x41, 0x42, 0x41, 0x42, 0x43]);
    assert!(out.status.success());
    assert_eq!(stderr_str(&out).trim(), "1");
    // -T suppresses the dump itself.
    assert!(out.stdout.is_empty());
}

#[test]
fn search_without_matches_exits_one() {
    let out = run_ad(&["--string=zzz"], b"abcdef");
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn strings_mode_counts_runs() {
    let out = run_ad(&["-n4", "-T"], b"\x01\x02alpha\x03beta\x04xy\x05");
    assert!(out.status.success());
    assert_eq!(stderr_str(&out).trim(), "2");
}

#[test]
fn numeric_search_matches_byte_layout() {
    // Big-endian 0x4243 is the bytes "BC".
    let out = run_ad(&["--big-endian=0x4243", "-T"], b"ABCD");
    assert!(out.status.success());
    assert_eq!(stderr_str(&out).trim(), "1");
}

#[test]
fn ignore_case_search() {
    let out = run_ad(&["-i", "-shello", "-T"], b"say HELLO twice, hello");
    assert_eq!(stderr_str(&out).trim(), "2");
}

// ─────────────────────────────────────────────────────────────────────────────
// 5. Usage and I/O failures
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn bad_usage_exits_64() {
    for argv in [
        &["-g3"][..],
        &["--nope"][..],
        &["-b16"][..],
        &["-i"][..],
        &["-N4", "-L2"][..],
    ] {
        let out = run_ad(argv, b"");
        assert_eq!(out.status.code(), Some(64), "argv: {:?}", argv);
        assert!(stderr_str(&out).starts_with("ad: "));
    }
}

#[test]
fn missing_input_exits_66() {
    let out = run_ad(&["/no/such/file/anywhere"], b"");
    assert_eq!(out.status.code(), Some(66));
}

#[test]
fn help_and_version_exit_zero() {
    let out = run_ad(&["--help"], b"");
    assert!(out.status.success());
    assert!(stdout_str(&out).contains("usage: ad"));

    let out = run_ad(&["--version"], b"");
    assert!(out.status.success());
    assert!(stdout_str(&out).starts_with("ad "));
}

// ─────────────────────────────────────────────────────────────────────────────
// 6. Offsets, skipping, and plain mode
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn skip_bytes_from_a_file_keeps_absolute_offsets() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("skip.bin");
    let mut data = vec![b'_'; 32];
    data.extend_from_slice(b"payload!");
    fs::write(&path, &data).unwrap();

    let out = run_ad(&["-j32", path.to_str().unwrap()], b"");
    assert!(out.status.success());
    assert!(stdout_str(&out).starts_with("000000000020: 7061"));
}

#[test]
fn plus_operand_adds_to_skip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plus.bin");
    fs::write(&path, b"0123456789abcdef").unwrap();

    let out = run_ad(&["+8", path.to_str().unwrap()], b"");
    assert!(out.status.success());
    assert!(stdout_str(&out).starts_with("000000000008: 3839"));
}

#[test]
fn plain_mode_is_bare_hex() {
    let out = run_ad(&["--plain"], b"AB");
    assert!(out.status.success());
    assert_eq!(stdout_str(&out), "4142\n");
}

#[test]
fn max_bytes_caps_the_dump() {
    let out = run_ad(&["-N4"], b"abcdefgh");
    assert!(out.status.success());
    let text = stdout_str(&out);
    assert!(text.starts_with("000000000000: 6162 6364  "));
    assert_eq!(text.lines().count(), 1);
}

#[test]
fn output_operand_writes_a_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dump.txt");
    let out = run_ad(&["-", path.to_str().unwrap()], b"Q");
    assert!(out.status.success());
    assert!(out.stdout.is_empty());
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("000000000000: 51"));
}
