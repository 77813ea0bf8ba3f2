//! Integration tests for the validator fixture lifecycle
//!
//! Fake validators are shell scripts, so these run on unix only. Readiness
//! is driven either by a mock probe or by a wiremock server standing in for
//! the validator's JSON-RPC service.

#![cfg(unix)]

mod common;

use futures_util::FutureExt;
use std::net::TcpListener;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio_test::assert_ok;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{TestFixtures, TestHelpers};
use shared::{ExitOutcome, SIGKILL, SIGTERM};
use validator_fixture::services::port_guard::pick_unused_port;
use validator_fixture::{
    FixtureError, ValidatorConfig, global_setup, global_teardown, setup_with_probe, with_fixture, with_fixture_probe,
};

#[tokio::test]
async fn test_setup_then_teardown_stops_validator() {
    let dir = TempDir::new().unwrap();
    let program = TestFixtures::sleepy_validator(dir.path());
    let config = TestHelpers::config_for(&program, &dir.path().join("ledger"), 5);
    let (probe, calls) = TestHelpers::probe_ready_on(2);

    let mut context = assert_ok!(setup_with_probe(&config, &probe).await);
    let pid = context.pid();

    assert_eq!(TestHelpers::recorded_pid(dir.path()).await, pid);
    assert_eq!(context.readiness().attempts, 2);
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    assert!(context.readiness().detail.contains("solana-core"));
    assert!(assert_ok!(context.is_running()));

    let outcome = global_teardown(Some(context)).await;
    assert_eq!(outcome, Some(ExitOutcome::Signaled { signal: SIGTERM }));
    assert!(TestHelpers::process_gone(pid));
}

#[tokio::test]
async fn test_teardown_without_context_is_noop() {
    assert_eq!(global_teardown(None).await, None);
}

#[tokio::test]
async fn test_failed_setup_reaps_validator() {
    let dir = TempDir::new().unwrap();
    let program = TestFixtures::sleepy_validator(dir.path());
    let config = TestHelpers::config_for(&program, &dir.path().join("ledger"), 3);
    let probe = TestHelpers::probe_never_ready();

    let result = setup_with_probe(&config, &probe).await;

    match result {
        Err(FixtureError::ReadinessTimeout {
            attempts, last_failure, ..
        }) => {
            assert_eq!(attempts, 3);
            assert!(last_failure.contains("connection refused"));
        }
        other => panic!("expected ReadinessTimeout, got {:?}", other),
    }

    let pid = TestHelpers::recorded_pid(dir.path()).await;
    assert!(TestHelpers::process_gone(pid), "validator {} outlived failed setup", pid);
}

#[tokio::test]
async fn test_missing_program_fails_setup() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("no-such-validator");
    let config = TestHelpers::config_for(&missing, &dir.path().join("ledger"), 3);

    let mut probe = validator_fixture::MockLivenessProbe::new();
    probe.expect_check().times(0);

    match setup_with_probe(&config, &probe).await {
        Err(FixtureError::SpawnError { program, .. }) => {
            assert_eq!(program, missing.to_string_lossy());
        }
        other => panic!("expected SpawnError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_busy_rpc_port_fails_before_spawn() {
    let dir = TempDir::new().unwrap();
    let program = TestFixtures::sleepy_validator(dir.path());
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let config = ValidatorConfig::builder()
        .program(program.to_string_lossy())
        .ledger_path(dir.path().join("ledger"))
        .rpc_port(port)
        .poll_interval(TestFixtures::FAST_POLL)
        .forward_output(false)
        .build();

    let mut probe = validator_fixture::MockLivenessProbe::new();
    probe.expect_check().times(0);

    match setup_with_probe(&config, &probe).await {
        Err(FixtureError::PortInUse { port: busy, .. }) => assert_eq!(busy, port),
        other => panic!("expected PortInUse, got {:?}", other),
    }

    assert!(!dir.path().join(TestFixtures::PID_FILE).exists());
}

#[tokio::test]
async fn test_teardown_escalates_for_stubborn_validator() {
    let dir = TempDir::new().unwrap();
    let program = TestFixtures::stubborn_validator(dir.path());
    let mut config = TestHelpers::config_for(&program, &dir.path().join("ledger"), 5);
    config.shutdown_grace = TestFixtures::SHORT_GRACE;
    let (probe, _) = TestHelpers::probe_ready_on(1);

    let context = assert_ok!(setup_with_probe(&config, &probe).await);
    let pid = context.pid();
    assert_eq!(TestHelpers::recorded_pid(dir.path()).await, pid);

    let started = Instant::now();
    let outcome = global_teardown(Some(context)).await;

    assert_eq!(outcome, Some(ExitOutcome::Signaled { signal: SIGKILL }));
    assert!(started.elapsed() >= TestFixtures::SHORT_GRACE);
    assert!(TestHelpers::process_gone(pid));
}

#[tokio::test]
async fn test_teardown_after_validator_exited() {
    let dir = TempDir::new().unwrap();
    let program = TestFixtures::crashing_validator(dir.path());
    let config = TestHelpers::config_for(&program, &dir.path().join("ledger"), 5);
    let (probe, _) = TestHelpers::probe_ready_on(1);

    let context = assert_ok!(setup_with_probe(&config, &probe).await);
    let pid = context.pid();
    tokio::time::sleep(Duration::from_millis(600)).await;

    let outcome = global_teardown(Some(context)).await;
    assert_eq!(outcome, Some(ExitOutcome::Exited { code: 3 }));
    assert!(TestHelpers::process_gone(pid));
}

#[tokio::test]
async fn test_with_fixture_returns_body_value() {
    let dir = TempDir::new().unwrap();
    let program = TestFixtures::sleepy_validator(dir.path());
    let config = TestHelpers::config_for(&program, &dir.path().join("ledger"), 5);
    let (probe, _) = TestHelpers::probe_ready_on(1);

    let pid = assert_ok!(with_fixture_probe(&config, &probe, |info| async move { info.pid }).await);

    assert!(pid > 0);
    assert!(TestHelpers::process_gone(pid));
}

#[tokio::test]
async fn test_with_fixture_tears_down_after_panic() {
    let dir = TempDir::new().unwrap();
    let program = TestFixtures::sleepy_validator(dir.path());
    let config = TestHelpers::config_for(&program, &dir.path().join("ledger"), 5);
    let (probe, _) = TestHelpers::probe_ready_on(1);

    let result = AssertUnwindSafe(with_fixture_probe::<_, _, ()>(&config, &probe, |_info| async move {
        panic!("token assertion failed");
    }))
    .catch_unwind()
    .await;

    assert!(result.is_err(), "panic should propagate to the caller");

    let pid = TestHelpers::recorded_pid(dir.path()).await;
    assert!(TestHelpers::process_gone(pid));
}

#[tokio::test]
async fn test_global_setup_against_rpc_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("getVersion"))
        .respond_with(ResponseTemplate::new(200).set_body_json(TestFixtures::version_body()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let program = TestFixtures::sleepy_validator(dir.path());
    let config = ValidatorConfig::builder()
        .program(program.to_string_lossy())
        .ledger_path(dir.path().join("ledger"))
        .rpc_port(server.address().port())
        .ready_timeout_secs(5)
        .poll_interval(Duration::from_millis(200))
        .forward_output(false)
        .check_port(false)
        .build();

    let result = with_fixture(&config, |info| async move {
        assert_eq!(info.readiness.attempts, 1);
        assert!(info.readiness.detail.contains("1.18.26"));
        info.pid
    })
    .await;

    let pid = assert_ok!(result);
    assert!(TestHelpers::process_gone(pid));
}

#[tokio::test]
async fn test_global_setup_times_out_without_rpc() {
    let dir = TempDir::new().unwrap();
    let program = TestFixtures::sleepy_validator(dir.path());
    let config = ValidatorConfig::builder()
        .program(program.to_string_lossy())
        .ledger_path(dir.path().join("ledger"))
        .rpc_port(pick_unused_port().unwrap())
        .ready_timeout_secs(2)
        .forward_output(false)
        .check_port(false)
        .build();

    let started = Instant::now();
    let result = global_setup(&config).await;
    let elapsed = started.elapsed();

    assert!(matches!(result, Err(FixtureError::ReadinessTimeout { attempts: 2, .. })));
    assert!(elapsed >= Duration::from_secs(2), "gave up early: {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(3), "gave up late: {:?}", elapsed);

    let pid = TestHelpers::recorded_pid(dir.path()).await;
    assert!(TestHelpers::process_gone(pid));
}

/// Runs against a real `solana-test-validator` when one is installed
#[tokio::test]
async fn test_live_validator_smoke() {
    let installed = std::process::Command::new("solana-test-validator")
        .arg("--version")
        .output()
        .is_ok();
    if !installed {
        eprintln!("solana-test-validator not found on PATH, skipping");
        return;
    }

    let dir = TempDir::new().unwrap();
    let config = ValidatorConfig::builder()
        .ledger_path(dir.path().join("test-ledger"))
        .rpc_port(pick_unused_port().unwrap())
        .ready_timeout_secs(60)
        .quiet(true)
        .forward_output(false)
        .build();

    let pid = assert_ok!(with_fixture(&config, |info| async move { info.pid }).await);
    assert!(TestHelpers::process_gone(pid));
}
