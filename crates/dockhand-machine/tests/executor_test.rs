#![cfg(unix)]

use std::collections::HashMap;

use dockhand_machine::error::ExecError;
use dockhand_machine::executor::{CommandExecutor, CommandSpec, RealExecutor, StreamSource};

fn sh(script: &str) -> CommandSpec {
    CommandSpec::new("/bin/sh", ["-c", script])
}

#[tokio::test]
async fn run_captures_both_streams() {
    let output = RealExecutor
        .run(sh("echo out; echo err >&2"))
        .await
        .unwrap();

    assert_eq!(output.stdout, "out\n");
    assert_eq!(output.stderr, "err\n");
}

#[tokio::test]
async fn run_nonzero_exit_maps_to_command_failed() {
    let result = RealExecutor.run(sh("echo boom >&2; exit 3")).await;

    assert!(matches!(
        result,
        Err(ExecError::CommandFailed { code: Some(3), ref stderr, .. })
            if stderr.contains("boom")
    ));
}

#[tokio::test]
async fn run_missing_program_maps_to_not_found() {
    let result = RealExecutor
        .run(CommandSpec::new("dockhand-test-no-such-program", ["x"]))
        .await;

    assert!(matches!(result, Err(ExecError::NotFound { .. })));
}

#[tokio::test]
async fn run_with_env_replaces_the_child_environment() {
    let mut env = HashMap::new();
    env.insert("MARKER".to_owned(), "42".to_owned());

    let output = RealExecutor
        .run(sh("echo \"$MARKER:${HOME:-unset}\"").with_env(env))
        .await
        .unwrap();

    // MARKER comes from the map; HOME from the parent never leaks in.
    assert_eq!(output.stdout, "42:unset\n");
}

#[tokio::test]
async fn run_enforces_the_output_cap() {
    let mut spec = sh("head -c 4096 /dev/zero | tr '\\0' 'x'");
    spec.max_output = 1024;

    let result = RealExecutor.run(spec).await;

    assert!(matches!(
        result,
        Err(ExecError::OutputTooLarge { limit: 1024, .. })
    ));
}

#[tokio::test]
async fn run_streaming_forwards_lines_per_stream_in_order() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let run = RealExecutor.run_streaming(sh("echo one; echo two >&2; echo three"), tx);
    let collect = async {
        let mut lines = Vec::new();
        while let Some(line) = rx.recv().await {
            lines.push(line);
        }
        lines
    };

    let (status, lines) = tokio::join!(run, collect);
    status.unwrap();

    // Per-stream order holds; ordering across the two streams is not
    // asserted.
    let stdout: Vec<_> = lines
        .iter()
        .filter(|l| l.source == StreamSource::Stdout)
        .map(|l| l.text.as_str())
        .collect();
    let stderr: Vec<_> = lines
        .iter()
        .filter(|l| l.source == StreamSource::Stderr)
        .map(|l| l.text.as_str())
        .collect();
    assert_eq!(stdout, ["one", "three"]);
    assert_eq!(stderr, ["two"]);
}

#[tokio::test]
async fn run_streaming_nonzero_exit_keeps_streamed_stderr() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let run = RealExecutor.run_streaming(sh("echo fail >&2; exit 7"), tx);
    let drain = async { while rx.recv().await.is_some() {} };

    let (status, ()) = tokio::join!(run, drain);

    assert!(matches!(
        status,
        Err(ExecError::CommandFailed { code: Some(7), ref stderr, .. })
            if stderr.contains("fail")
    ));
}
