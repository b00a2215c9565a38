//! Lifecycle tests for the one-shot supervisor
//!
//! These tests drive real child processes. Pre-exec commands install a TERM
//! trap that writes a marker file, which makes the teardown signal
//! observable from the outside; SIGKILL (the kill-on-drop path) cannot be
//! trapped, so cancellation leaves no marker behind.

use super::*;
use schema::{HealthCheckKind, HealthCheckSpec, PreExecSpec, ProcessSpec};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::time::sleep;

fn tokens(parts: &[&str]) -> ProcessSpec {
    ProcessSpec::from_tokens(parts.iter().copied()).unwrap()
}

fn sh(script: String) -> ProcessSpec {
    ProcessSpec::new("sh", vec!["-c".to_string(), script])
}

/// Pre-exec command that stays up until SIGTERM, then writes `marker`
fn trap_pre_exec(marker: &Path) -> ProcessSpec {
    sh(format!(
        "trap 'touch {}; exit 0' TERM; sleep 30 & wait",
        marker.display()
    ))
}

fn run_spec(pre: ProcessSpec, check: Option<HealthCheckSpec>, main: ProcessSpec) -> RunSpec {
    RunSpec {
        pre_exec: PreExecSpec {
            process: pre,
            health_check: check,
        },
        main,
    }
}

fn tcp_check(port: u16, retries: u32) -> HealthCheckSpec {
    HealthCheckSpec {
        kind: HealthCheckKind::Tcp,
        port,
        path: "/".to_string(),
        retries,
        interval_secs: 0,
        timeout_secs: 1,
    }
}

async fn wait_for_marker(path: &Path) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if path.exists() {
            return true;
        }
        sleep(Duration::from_millis(25)).await;
    }
    path.exists()
}

fn marker_path(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

#[tokio::test]
async fn test_run_starts_pre_exec_before_main_and_signals_teardown() {
    let dir = tempfile::tempdir().unwrap();
    let started = marker_path(&dir, "pre.started");
    let terminated = marker_path(&dir, "pre.terminated");

    let pre = sh(format!(
        "touch {}; trap 'touch {}; exit 0' TERM; sleep 30 & wait",
        started.display(),
        terminated.display()
    ));
    // Main succeeds only once it has seen the pre-exec start marker
    let main = sh(format!(
        "for i in $(seq 1 100); do test -f {} && exit 0; sleep 0.05; done; exit 1",
        started.display()
    ));

    let outcome = Supervisor::new(run_spec(pre, None, main))
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::Completed);
    assert!(
        wait_for_marker(&terminated).await,
        "pre-exec should receive SIGTERM after main exits"
    );
}

#[tokio::test]
async fn test_main_failure_surfaces_error_but_still_tears_down() {
    let dir = tempfile::tempdir().unwrap();
    let terminated = marker_path(&dir, "pre.terminated");

    let spec = run_spec(trap_pre_exec(&terminated), None, tokens(&["sh", "-c", "exit 3"]));
    let err = Supervisor::new(spec)
        .run(CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        CoreError::MainProcessFailed(_) => {}
        other => panic!("expected MainProcessFailed, got {other:?}"),
    }
    assert!(
        wait_for_marker(&terminated).await,
        "pre-exec teardown must run even when main fails"
    );
}

#[tokio::test]
async fn test_cancellation_returns_promptly_without_teardown_signal() {
    let dir = tempfile::tempdir().unwrap();
    let terminated = marker_path(&dir, "pre.terminated");

    let spec = run_spec(trap_pre_exec(&terminated), None, tokens(&["sleep", "30"]));
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let outcome = Supervisor::new(spec).run(cancel).await.unwrap();

    assert_eq!(outcome, RunOutcome::Cancelled);
    assert!(
        start.elapsed() < Duration::from_secs(5),
        "cancellation must not wait for main's natural exit"
    );

    // The SIGTERM path is skipped on cancellation; kill-on-drop sends
    // SIGKILL, which the trap cannot observe
    sleep(Duration::from_millis(300)).await;
    assert!(
        !terminated.exists(),
        "cancellation must not invoke the teardown signal path"
    );
}

#[tokio::test]
async fn test_pre_exec_launch_failure_is_fatal() {
    let spec = run_spec(
        tokens(&["nonexistent_command_12345"]),
        None,
        tokens(&["true"]),
    );
    let err = Supervisor::new(spec)
        .run(CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::LaunchFailure(_)));
}

#[tokio::test]
async fn test_main_launch_failure_stops_pre_exec() {
    let dir = tempfile::tempdir().unwrap();
    let terminated = marker_path(&dir, "pre.terminated");

    let spec = run_spec(
        trap_pre_exec(&terminated),
        None,
        tokens(&["nonexistent_command_12345"]),
    );
    let err = Supervisor::new(spec)
        .run(CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::LaunchFailure(_)));
    assert!(
        wait_for_marker(&terminated).await,
        "pre-exec should be stopped when main cannot launch"
    );
}

#[tokio::test]
async fn test_exhausted_gate_fails_run_and_never_starts_main() {
    let dir = tempfile::tempdir().unwrap();
    let terminated = marker_path(&dir, "pre.terminated");
    let main_ran = marker_path(&dir, "main.ran");

    // Port 1 refuses connections, so every probe fails
    let spec = run_spec(
        trap_pre_exec(&terminated),
        Some(tcp_check(1, 2)),
        sh(format!("touch {}", main_ran.display())),
    );
    let err = Supervisor::new(spec)
        .run(CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        CoreError::HealthCheckExhausted { attempts } => assert_eq!(attempts, 2),
        other => panic!("expected HealthCheckExhausted, got {other:?}"),
    }
    assert!(
        wait_for_marker(&terminated).await,
        "pre-exec should be stopped when the gate gives up"
    );
    sleep(Duration::from_millis(200)).await;
    assert!(!main_ran.exists(), "main must never start on gate failure");
}

#[tokio::test]
async fn test_unknown_health_check_kind_fails_without_probing() {
    let dir = tempfile::tempdir().unwrap();
    let terminated = marker_path(&dir, "pre.terminated");
    let main_ran = marker_path(&dir, "main.ran");

    let check = HealthCheckSpec {
        kind: HealthCheckKind::Other("udp".to_string()),
        port: 8000,
        path: "/".to_string(),
        retries: 5,
        interval_secs: 1,
        timeout_secs: 10,
    };
    let spec = run_spec(
        trap_pre_exec(&terminated),
        Some(check),
        sh(format!("touch {}", main_ran.display())),
    );

    let start = Instant::now();
    let err = Supervisor::new(spec)
        .run(CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        CoreError::UnknownHealthCheckKind(kind) => assert_eq!(kind, "udp"),
        other => panic!("expected UnknownHealthCheckKind, got {other:?}"),
    }
    // No retries were attempted
    assert!(start.elapsed() < Duration::from_secs(2));
    assert!(
        wait_for_marker(&terminated).await,
        "pre-exec should be stopped on an unknown check kind"
    );
    assert!(!main_ran.exists());
}

#[tokio::test]
async fn test_http_gate_passes_and_run_completes() {
    use hyper::service::{make_service_fn, service_fn};
    use hyper::{Body, Response, Server};
    use std::convert::Infallible;

    // Health endpoint the gate will probe
    let make_svc = make_service_fn(|_conn| async {
        Ok::<_, Infallible>(service_fn(|_req| async {
            Ok::<_, Infallible>(Response::new(Body::from("ok")))
        }))
    });
    let addr = ([127, 0, 0, 1], 0).into();
    let server = Server::bind(&addr).serve(make_svc);
    let port = server.local_addr().port();
    tokio::spawn(async move {
        let _ = server.await;
    });

    let dir = tempfile::tempdir().unwrap();
    let terminated = marker_path(&dir, "pre.terminated");

    let check = HealthCheckSpec {
        kind: HealthCheckKind::Http,
        port,
        path: "/".to_string(),
        retries: 5,
        interval_secs: 1,
        timeout_secs: 10,
    };
    let spec = run_spec(
        trap_pre_exec(&terminated),
        Some(check),
        tokens(&["echo", "hello"]),
    );

    let outcome = Supervisor::new(spec)
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::Completed);
    assert!(wait_for_marker(&terminated).await);
}

#[tokio::test]
async fn test_teardown_is_noop_when_pre_exec_already_exited() {
    // Pre-exec exits on its own right away; teardown must not fail
    let spec = run_spec(tokens(&["true"]), None, tokens(&["sleep", "0.2"]));

    let outcome = Supervisor::new(spec)
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::Completed);
}
