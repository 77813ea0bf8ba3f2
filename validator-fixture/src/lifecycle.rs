//! Test-run lifecycle hooks
//!
//! `global_setup` hands back a [`FixtureContext`] that the caller passes to
//! `global_teardown`; nothing is kept in global state. `with_fixture` wraps
//! both around a test body and tears down on every exit path, panics
//! included.

use futures_util::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use crate::config::{RpcEndpoint, ValidatorConfig};
use crate::core::{ReadinessReport, wait_until_ready};
use crate::error::FixtureResult;
use crate::services::port_guard::ensure_ports_free;
use crate::services::{ProcessFixture, ProcessHandle, RpcLivenessProbe};
use crate::traits::LivenessProbe;
use shared::logging::{log_error, log_shutdown, log_startup};
use shared::{ExitOutcome, FixtureId, fixture_debug, fixture_error, fixture_info};

/// Running fixture, owned by the setup/teardown pair that created it
#[derive(Debug)]
pub struct FixtureContext {
    fixture: ProcessFixture,
    handle: ProcessHandle,
    endpoint: RpcEndpoint,
    readiness: ReadinessReport,
    shutdown_grace: Duration,
}

/// Cloneable view of a running fixture handed to test bodies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureInfo {
    pub fixture_id: FixtureId,
    pub pid: u32,
    pub endpoint: RpcEndpoint,
    pub readiness: ReadinessReport,
}

impl FixtureContext {
    pub fn pid(&self) -> u32 {
        self.handle.pid()
    }

    pub fn fixture_id(&self) -> FixtureId {
        self.fixture.id()
    }

    pub fn endpoint(&self) -> &RpcEndpoint {
        &self.endpoint
    }

    pub fn readiness(&self) -> &ReadinessReport {
        &self.readiness
    }

    pub fn handle(&self) -> &ProcessHandle {
        &self.handle
    }

    /// Whether the validator is still alive
    pub fn is_running(&mut self) -> FixtureResult<bool> {
        self.fixture.is_running(&mut self.handle)
    }

    pub fn info(&self) -> FixtureInfo {
        FixtureInfo {
            fixture_id: self.fixture_id(),
            pid: self.pid(),
            endpoint: self.endpoint.clone(),
            readiness: self.readiness.clone(),
        }
    }
}

/// Spawn the validator and block until its RPC answers `getVersion`
pub async fn global_setup(config: &ValidatorConfig) -> FixtureResult<FixtureContext> {
    let probe = RpcLivenessProbe::new(config.endpoint().http_url()?, config.poll_interval)?;
    setup_with_probe(config, &probe).await
}

/// Setup with a caller-supplied liveness probe
///
/// If readiness fails the process is terminated and reaped before the error
/// is returned, so a failed setup never leaks a running validator.
pub async fn setup_with_probe(config: &ValidatorConfig, probe: &dyn LivenessProbe) -> FixtureResult<FixtureContext> {
    config.validate()?;

    if config.check_port {
        ensure_ports_free(&config.rpc_host, config.rpc_port)?;
    }

    let endpoint = config.endpoint();
    let fixture = ProcessFixture::new().with_output_forwarding(config.forward_output);
    log_startup(&fixture.id(), &format!("{} for RPC {}", config.program, endpoint));

    let mut handle = fixture.spawn(&config.program, &config.to_args())?;

    fixture_info!(
        fixture.id(),
        "⏳ Waiting for {} seconds for local test validator, PID: {}",
        config.ready_timeout_secs,
        handle.pid()
    );

    match wait_until_ready(probe, config.readiness_policy()).await {
        Ok(readiness) => Ok(FixtureContext {
            fixture,
            handle,
            endpoint,
            readiness,
            shutdown_grace: config.shutdown_grace,
        }),
        Err(e) => {
            fixture_error!(fixture.id(), "❌ Validator PID {} never became ready: {}", handle.pid(), e);
            if let Err(cleanup) = fixture.terminate(&mut handle, config.shutdown_grace).await {
                log_error(&fixture.id(), "cleanup after failed setup", &cleanup);
            }
            Err(e)
        }
    }
}

/// Stop and reap the validator; safe to call with `None`
///
/// Never fails: a process that is already gone is the desired end state,
/// anything else is logged.
pub async fn global_teardown(context: Option<FixtureContext>) -> Option<ExitOutcome> {
    let Some(mut context) = context else {
        tracing::debug!("No test validator to stop");
        return None;
    };

    let fixture_id = context.fixture_id();
    log_shutdown(&fixture_id, &format!("stopping test validator PID {}", context.pid()));

    match context.fixture.terminate(&mut context.handle, context.shutdown_grace).await {
        Ok(outcome) => {
            fixture_debug!(fixture_id, "🏁 Test validator exited with {}", outcome);
            Some(outcome)
        }
        Err(e) => {
            log_error(&fixture_id, "teardown", &e);
            context.handle.exit_outcome()
        }
    }
}

/// Run `body` against a fresh validator, tearing it down afterwards
pub async fn with_fixture<F, Fut, T>(config: &ValidatorConfig, body: F) -> FixtureResult<T>
where
    F: FnOnce(FixtureInfo) -> Fut,
    Fut: Future<Output = T>,
{
    let context = global_setup(config).await?;
    run_scoped(context, body).await
}

/// [`with_fixture`] with a caller-supplied liveness probe
pub async fn with_fixture_probe<F, Fut, T>(config: &ValidatorConfig, probe: &dyn LivenessProbe, body: F) -> FixtureResult<T>
where
    F: FnOnce(FixtureInfo) -> Fut,
    Fut: Future<Output = T>,
{
    let context = setup_with_probe(config, probe).await?;
    run_scoped(context, body).await
}

async fn run_scoped<F, Fut, T>(context: FixtureContext, body: F) -> FixtureResult<T>
where
    F: FnOnce(FixtureInfo) -> Fut,
    Fut: Future<Output = T>,
{
    let info = context.info();
    let outcome = AssertUnwindSafe(async move { body(info).await }).catch_unwind().await;

    global_teardown(Some(context)).await;

    match outcome {
        Ok(value) => Ok(value),
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
