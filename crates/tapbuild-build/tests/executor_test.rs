//! Tests for the shell executor against the host `sh`

#![cfg(unix)]

use std::collections::HashMap;

use tapbuild_build::{CommandError, CommandExecutor, ExecutorConfig, OutputMode, ShellExecutor};
use tempfile::TempDir;

#[tokio::test]
async fn test_run_captures_stdout() {
    let executor = ShellExecutor::default();

    let output = executor.run("printf 'abc123  /tmp/tool\\n'").await.unwrap();

    assert_eq!(output, "abc123  /tmp/tool\n");
}

#[tokio::test]
async fn test_run_reports_exit_code_and_stderr() {
    let executor = ShellExecutor::default();

    let err = executor.run("echo broken >&2; exit 3").await.unwrap_err();

    match err {
        CommandError::Failed { code, stderr, command } => {
            assert_eq!(code, Some(3));
            assert_eq!(stderr, "broken");
            assert!(command.contains("exit 3"));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_run_and_print_inherit() {
    let executor = ShellExecutor::default();

    assert!(executor.run_and_print("true").await.is_ok());
    assert!(matches!(
        executor.run_and_print("false").await,
        Err(CommandError::Failed { code: Some(1), .. })
    ));
}

#[tokio::test]
async fn test_run_and_print_log_mode_keeps_stderr_tail() {
    let executor =
        ShellExecutor::new(ExecutorConfig { output: OutputMode::Log, ..Default::default() });

    executor.run_and_print("echo compiling; echo done").await.unwrap();

    let err = executor.run_and_print("echo first >&2; echo second >&2; exit 2").await.unwrap_err();
    match err {
        CommandError::Failed { code, stderr, .. } => {
            assert_eq!(code, Some(2));
            assert_eq!(stderr, "first\nsecond");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_stderr_tail_keeps_last_twenty_lines() {
    let executor =
        ShellExecutor::new(ExecutorConfig { output: OutputMode::Log, ..Default::default() });

    let err = executor
        .run_and_print("i=1; while [ $i -le 25 ]; do echo line$i >&2; i=$((i+1)); done; exit 1")
        .await
        .unwrap_err();

    match err {
        CommandError::Failed { stderr, .. } => {
            let lines: Vec<&str> = stderr.lines().collect();
            assert_eq!(lines.len(), 20);
            assert_eq!(lines.first(), Some(&"line6"));
            assert_eq!(lines.last(), Some(&"line25"));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_working_dir_and_env() {
    let temp_dir = TempDir::new().unwrap();
    let mut env = HashMap::new();
    env.insert("TAPBUILD_TEST_VALUE".to_string(), "from-env".to_string());

    let executor = ShellExecutor::new(ExecutorConfig {
        working_dir: Some(temp_dir.path().to_path_buf()),
        env,
        ..Default::default()
    });

    executor.run_and_print("mkdir -p .build/universal/").await.unwrap();
    assert!(temp_dir.path().join(".build/universal").is_dir());

    let output = executor.run("echo $TAPBUILD_TEST_VALUE").await.unwrap();
    assert_eq!(output.trim(), "from-env");
}

#[tokio::test]
async fn test_timeout() {
    let executor =
        ShellExecutor::new(ExecutorConfig { timeout_seconds: Some(1), ..Default::default() });

    let err = executor.run("sleep 5").await.unwrap_err();

    assert!(matches!(err, CommandError::Timeout { .. }));
    assert_eq!(err.command(), "sleep 5");
}

#[tokio::test]
async fn test_missing_shell() {
    let executor = ShellExecutor::new(ExecutorConfig {
        shell: "/nonexistent/tapbuild-shell".to_string(),
        ..Default::default()
    });

    let err = executor.run("true").await.unwrap_err();

    assert!(matches!(err, CommandError::Spawn { .. }));
}
