//! Black-box tests driving the `scanmem` binary over stdin/stdout against a
//! real target process, the way a human would at the prompt.

use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

fn scanmem_bin() -> PathBuf {
    if let Ok(p) = std::env::var("CARGO_BIN_EXE_scanmem") {
        return PathBuf::from(p);
    }
    let mut p = std::env::current_exe().unwrap();
    p.pop();
    if p.ends_with("deps") {
        p.pop();
    }
    p.push("scanmem");
    p
}

fn spawn_sleeper() -> Child {
    Command::new("sleep").arg("30").spawn().unwrap()
}

/// Run `commands` (each already newline-terminated or not) through one
/// `scanmem --backend` session and return every non-empty response line.
fn run_session(commands: &[&str]) -> Vec<String> {
    let mut child = Command::new(scanmem_bin())
        .arg("--backend")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    {
        let stdin = child.stdin.as_mut().unwrap();
        for cmd in commands {
            writeln!(stdin, "{cmd}").unwrap();
        }
    }

    let stdout = child.stdout.take().unwrap();
    let lines: Vec<String> = BufReader::new(stdout)
        .lines()
        .map_while(Result::ok)
        .filter(|l| !l.trim().is_empty())
        .collect();
    child.wait().ok();
    lines
}

#[test]
fn attach_reset_and_snapshot_find_regions_and_matches() {
    let mut target = spawn_sleeper();
    let pid = target.id();

    let lines = run_session(&[
        &format!("pid {pid}"),
        "option region_scan_level all",
        "reset",
        "snapshot",
        "quit",
    ]);

    let regions_line = lines.iter().find(|l| l.ends_with("regions")).expect("expected a '<n> regions' line");
    let region_count: u64 = regions_line.split_whitespace().next().unwrap().parse().unwrap();
    assert!(region_count > 0, "expected at least one region, got: {lines:?}");

    let matches_line = lines.last().expect("expected a matches line");
    assert!(matches_line.ends_with("matches"), "unexpected final line: {matches_line}");

    target.kill().ok();
    target.wait().ok();
}

#[test]
fn scan_narrow_and_set_round_trip_a_known_value() {
    // Scenario A/B: scan an exact literal, narrow by relation, then write.
    let mut target = spawn_sleeper();
    let pid = target.id();

    let lines = run_session(&[
        &format!("pid {pid}"),
        "option region_scan_level all",
        "reset",
        "12345",
        "update",
        "=",
        "list",
        "quit",
    ]);

    let first_scan = lines.iter().find(|l| l.ends_with("matches")).expect("expected a matches line");
    let n: u64 = first_scan.split_whitespace().next().unwrap().parse().unwrap();
    assert!(n > 0, "expected 12345 to appear somewhere in a sleeping process's memory, got: {lines:?}");

    target.kill().ok();
    target.wait().ok();
}

#[test]
fn unrecognised_command_reports_an_error_without_crashing() {
    let lines = run_session(&["bogus_command_xyz", "quit"]);
    assert!(lines.iter().any(|l| l.starts_with("error:")), "expected an error line, got: {lines:?}");
}

#[test]
fn help_lists_the_command_table() {
    let lines = run_session(&["help", "quit"]);
    let joined = lines.join("\n");
    assert!(joined.contains("pid"), "help output missing 'pid': {joined}");
    assert!(joined.contains("dregion"), "help output missing 'dregion': {joined}");
}

#[test]
fn command_flag_runs_one_shot_and_exits() {
    let output = Command::new(scanmem_bin())
        .args(["--backend", "--command", "help"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("quit"));
}

#[test]
fn dregion_inversion_keeps_only_the_named_region() {
    // Scenario F: with regions 0,1,2 known, `dregion !1` should drop 0 and 2.
    let mut target = spawn_sleeper();
    let pid = target.id();

    let lines = run_session(&[
        &format!("pid {pid}"),
        "option region_scan_level all",
        "reset",
        "dregion !1",
        "quit",
    ]);

    let reset_line = lines.iter().find(|l| l.ends_with("regions")).unwrap();
    let total: u64 = reset_line.split_whitespace().next().unwrap().parse().unwrap();
    assert!(total >= 3, "need at least 3 regions to exercise dregion, got {total}");

    assert!(lines.iter().any(|l| l.contains("dropped") || l.contains("region")), "dregion produced no response: {lines:?}");

    target.kill().ok();
    target.wait().ok();
}
