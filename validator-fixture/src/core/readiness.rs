//! Readiness polling
//!
//! [`ReadinessTracker`] is the pure `NotReady → Ready | Failed` state machine;
//! [`wait_until_ready`] drives it with one liveness query per interval.
//! Individual query failures only mean "not ready yet"; running out of
//! attempts is the single fatal outcome.

use std::time::Duration;
use tokio::time::Instant;

use crate::error::{FixtureError, FixtureResult};
use crate::traits::LivenessProbe;
use shared::{NotReadyReason, ReadinessCheck};

/// Waiter state. `Ready` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessState {
    NotReady,
    Ready,
    Failed,
}

/// Fixed-cadence polling budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl ReadinessPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self { interval, max_attempts }
    }

    /// One query per second for `timeout_secs` seconds
    pub fn from_timeout_secs(timeout_secs: u32) -> Self {
        Self::new(Duration::from_secs(1), timeout_secs)
    }

    /// Worst-case time spent waiting between queries
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self::from_timeout_secs(10)
    }
}

/// Readiness state machine fed with one check result per attempt
#[derive(Debug, Clone)]
pub struct ReadinessTracker {
    policy: ReadinessPolicy,
    attempts: u32,
    state: ReadinessState,
    detail: Option<String>,
    last_failure: Option<NotReadyReason>,
}

impl ReadinessTracker {
    pub fn new(policy: ReadinessPolicy) -> Self {
        // A zero budget can never succeed
        let state = if policy.max_attempts == 0 {
            ReadinessState::Failed
        } else {
            ReadinessState::NotReady
        };

        Self {
            policy,
            attempts: 0,
            state,
            detail: None,
            last_failure: None,
        }
    }

    pub fn state(&self) -> ReadinessState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn last_failure(&self) -> Option<&NotReadyReason> {
        self.last_failure.as_ref()
    }

    /// Record one attempt and return the resulting state
    ///
    /// Results recorded after a terminal state are ignored.
    pub fn record(&mut self, check: ReadinessCheck) -> ReadinessState {
        if self.state != ReadinessState::NotReady {
            return self.state;
        }

        self.attempts += 1;
        self.state = match check {
            ReadinessCheck::Ready { detail } => {
                self.detail = Some(detail);
                ReadinessState::Ready
            }
            ReadinessCheck::NotReady(reason) => {
                self.last_failure = Some(reason);
                if self.attempts >= self.policy.max_attempts {
                    ReadinessState::Failed
                } else {
                    ReadinessState::NotReady
                }
            }
        };

        self.state
    }
}

/// Summary of a successful wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessReport {
    pub attempts: u32,
    pub elapsed: Duration,
    pub detail: String,
}

/// Poll `probe` until it reports ready or the policy runs out of attempts
///
/// Each attempt sleeps one interval and then queries, so a service that
/// comes up after `k` intervals is detected after about `k` intervals.
pub async fn wait_until_ready(probe: &dyn LivenessProbe, policy: ReadinessPolicy) -> FixtureResult<ReadinessReport> {
    let started = Instant::now();
    let mut tracker = ReadinessTracker::new(policy);

    while tracker.state() == ReadinessState::NotReady {
        tokio::time::sleep(policy.interval).await;

        let check = probe.check().await;
        if let ReadinessCheck::NotReady(reason) = &check {
            tracing::trace!("Attempt {}: RPC is not ready yet ({})", tracker.attempts() + 1, reason);
        }
        tracker.record(check);
    }

    let elapsed = started.elapsed();

    match tracker.state() {
        ReadinessState::Ready => {
            let detail = tracker.detail().unwrap_or_default().to_string();
            tracing::info!("✅ RPC is ready after {:?}: {}", elapsed, detail);
            Ok(ReadinessReport {
                attempts: tracker.attempts(),
                elapsed,
                detail,
            })
        }
        _ => Err(FixtureError::ReadinessTimeout {
            endpoint: probe.endpoint(),
            elapsed,
            attempts: tracker.attempts(),
            last_failure: tracker
                .last_failure()
                .map(|reason| reason.to_string())
                .unwrap_or_else(|| "no attempts made".to_string()),
        }),
    }
}
