use std::io::Write;
use std::process::{Command, Stdio};

fn run(args: &[&str], stdin: &[u8]) -> (bool, String, String) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_tml-dump"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn tml-dump");
    child.stdin.take().unwrap().write_all(stdin).unwrap();
    let out = child.wait_with_output().expect("wait for tml-dump");
    (
        out.status.success(),
        String::from_utf8_lossy(&out.stdout).into_owned(),
        String::from_utf8_lossy(&out.stderr).into_owned(),
    )
}

// FrameStart (0x6e) + FrameEnd (0x70): one empty, unnamed frame.
const MINIMAL_DOCUMENT: &[u8] = &[0x6e, 0x70];

#[test]
fn dumps_token_trace_from_stdin() {
    let (ok, stdout, _stderr) = run(&[], MINIMAL_DOCUMENT);
    assert!(ok);
    assert!(stdout.contains("BeginFrame"));
    assert!(stdout.contains("EndFrame"));
}

#[test]
fn quiet_mode_prints_only_summary() {
    let (ok, stdout, _stderr) = run(&["--quiet"], MINIMAL_DOCUMENT);
    assert!(ok);
    assert!(!stdout.contains("BeginFrame"));
    assert!(stdout.contains("frames=1"));
}

#[test]
fn truncated_stream_is_reported_as_a_cli_error() {
    // FrameStart with no matching FrameEnd.
    let (ok, _stdout, stderr) = run(&["--quiet"], &[0x6e]);
    assert!(!ok);
    assert!(stderr.contains("truncated"));
}

#[test]
fn json_flag_materializes_a_record() {
    let (ok, stdout, _stderr) = run(&["--json"], MINIMAL_DOCUMENT);
    assert!(ok);
    assert!(stdout.contains("\"array\""));
}
