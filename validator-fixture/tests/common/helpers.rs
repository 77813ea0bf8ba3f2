//! Test helpers for lifecycle tests
//!
//! Config construction, mock probes and process-liveness checks shared by
//! the integration suites.

use nix::errno::Errno;
use nix::unistd::Pid;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use super::fixtures::TestFixtures;
use shared::{NotReadyReason, ReadinessCheck};
use validator_fixture::services::port_guard::pick_unused_port;
use validator_fixture::{MockLivenessProbe, ValidatorConfig};

pub struct TestHelpers;

impl TestHelpers {
    /// Config for a fake validator script with fast polling
    pub fn config_for(program: &Path, ledger: &Path, ready_timeout_secs: u32) -> ValidatorConfig {
        ValidatorConfig::builder()
            .program(program.to_string_lossy())
            .ledger_path(ledger)
            .rpc_port(pick_unused_port().expect("free port"))
            .ready_timeout_secs(ready_timeout_secs)
            .poll_interval(TestFixtures::FAST_POLL)
            .shutdown_grace(TestFixtures::GRACE)
            .forward_output(false)
            .build()
    }

    /// Mock probe that reports ready from attempt `ready_on` onwards
    pub fn probe_ready_on(ready_on: u32) -> (MockLivenessProbe, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let mut probe = MockLivenessProbe::new();
        probe.expect_check().returning(move || {
            let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt >= ready_on {
                ReadinessCheck::Ready {
                    detail: "solana-core 1.18.26".to_string(),
                }
            } else {
                ReadinessCheck::NotReady(NotReadyReason::ConnectionRefused)
            }
        });
        probe.expect_endpoint().returning(|| "http://127.0.0.1:8899/".to_string());

        (probe, calls)
    }

    /// Mock probe that never reports ready
    pub fn probe_never_ready() -> MockLivenessProbe {
        Self::probe_ready_on(u32::MAX).0
    }

    /// PID recorded by a fake validator script, waiting briefly for it to appear
    pub async fn recorded_pid(dir: &Path) -> u32 {
        let pid_file = dir.join(TestFixtures::PID_FILE);

        for _ in 0..50 {
            if let Ok(raw) = std::fs::read_to_string(&pid_file) {
                if let Ok(pid) = raw.trim().parse() {
                    return pid;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("fake validator never wrote {}", pid_file.display());
    }

    /// True when no process (not even a zombie) exists with `pid`
    pub fn process_gone(pid: u32) -> bool {
        matches!(nix::sys::signal::kill(Pid::from_raw(pid as i32), None), Err(Errno::ESRCH))
    }
}
