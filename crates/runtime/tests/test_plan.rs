use std::time::{Duration, Instant};

use mxfixture_config::ShellConfig;
use mxfixture_runtime::{delay, CommandError, CommandRunner};

fn sh_runner() -> CommandRunner {
    CommandRunner::new(&ShellConfig {
        program: "/bin/sh".to_string(),
        timeout_seconds: 10,
    })
}

#[tokio::test]
async fn run_captures_stdout_and_stderr() {
    let result = sh_runner()
        .run("echo out; echo err >&2")
        .await
        .expect("command should run");

    assert_eq!(result.stdout, "out\n");
    assert_eq!(result.stderr, "err\n");
    assert_eq!(result.exit_code, 0);
    assert!(result.success());
}

#[tokio::test]
async fn run_reports_non_zero_exit_code_without_failing() {
    let result = sh_runner().run("exit 7").await.expect("command should run");

    assert_eq!(result.exit_code, 7);
    assert!(!result.success());
}

#[tokio::test]
async fn run_checked_turns_non_zero_exit_into_error() {
    let error = sh_runner()
        .run_checked("echo broken >&2; exit 7")
        .await
        .expect_err("non-zero exit should fail");

    match error {
        CommandError::Failed { exit_code, stderr } => {
            assert_eq!(exit_code, 7);
            assert_eq!(stderr, "broken");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn run_checked_tolerates_stderr_on_success() {
    let result = sh_runner()
        .run_checked("echo warning >&2; echo done")
        .await
        .expect("zero exit should succeed");

    assert_eq!(result.stdout.trim(), "done");
    assert_eq!(result.stderr.trim(), "warning");
}

#[tokio::test]
async fn run_times_out_long_commands() {
    let runner = sh_runner().with_timeout(Duration::from_millis(100));

    let started = Instant::now();
    let error = runner.run("sleep 5").await.expect_err("should time out");

    assert!(matches!(error, CommandError::TimedOut { .. }));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn run_reports_missing_shell() {
    let runner = CommandRunner::new(&ShellConfig {
        program: "/nonexistent/shell".to_string(),
        timeout_seconds: 1,
    });

    let error = runner.run("true").await.expect_err("spawn should fail");
    assert!(matches!(error, CommandError::Spawn { .. }));
}

#[tokio::test]
async fn delay_waits_at_least_the_requested_time() {
    let started = Instant::now();
    delay(50).await;
    assert!(started.elapsed() >= Duration::from_millis(50));
}
