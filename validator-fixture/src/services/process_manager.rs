//! Process fixture implementation
//!
//! Spawns, signals and reaps the external process a test run depends on.
//! Each handle walks `Running → SignaledForTermination → Reaped` and is
//! never reaped twice: the exit status is cached the first time it is
//! collected.

use std::time::{Duration, Instant};
use tokio::process::{Child, Command};

use crate::error::{FixtureError, FixtureResult};
use crate::services::process_output_handler::{configure_child_stdio, spawn_output_consumers};
use shared::{ExitOutcome, FixtureId, ProcessState, fixture_debug, fixture_info, fixture_warn};

/// Handle for one spawned process
#[derive(Debug)]
pub struct ProcessHandle {
    owner: FixtureId,
    pid: u32,
    program: String,
    args: Vec<String>,
    state: ProcessState,
    kill_sent: bool,
    exit: Option<ExitOutcome>,
    started_at: Instant,
    child: Child,
}

impl ProcessHandle {
    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn owner(&self) -> FixtureId {
        self.owner
    }

    /// Exit status, once collected
    pub fn exit_outcome(&self) -> Option<ExitOutcome> {
        self.exit
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    fn mark_reaped(&mut self, outcome: ExitOutcome) {
        self.exit = Some(outcome);
        self.state = ProcessState::Reaped;
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        // Last line of defence when teardown never ran (panic, early return)
        if self.exit.is_none() {
            fixture_warn!(
                self.owner,
                "🚨 Emergency cleanup: killing unreaped process {} (PID: {})",
                self.program,
                self.pid
            );
            let _ = self.child.start_kill();
        }
    }
}

/// Spawns and tears down fixture processes
#[derive(Debug, Clone)]
pub struct ProcessFixture {
    id: FixtureId,
    forward_output: bool,
}

impl ProcessFixture {
    /// Create a fixture that forwards child output to the log
    pub fn new() -> Self {
        Self {
            id: FixtureId::new(),
            forward_output: true,
        }
    }

    /// Configure output forwarding (fluent API)
    pub fn with_output_forwarding(mut self, forward_output: bool) -> Self {
        self.forward_output = forward_output;
        self
    }

    pub fn id(&self) -> FixtureId {
        self.id
    }

    /// Spawn `program` with `args` passed verbatim, without a shell
    ///
    /// The program is resolved on `PATH`. Must be called from within a tokio runtime.
    pub fn spawn(&self, program: &str, args: &[String]) -> FixtureResult<ProcessHandle> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        configure_child_stdio(&mut cmd, self.forward_output);

        let mut child = cmd.spawn().map_err(|e| FixtureError::spawn(program, &e))?;

        let pid = child.id().ok_or_else(|| FixtureError::SpawnError {
            program: program.to_string(),
            reason: "process exited before a PID could be read".to_string(),
        })?;

        spawn_output_consumers(&mut child, program, pid);

        fixture_debug!(self.id, "🚀 Spawned {} (PID: {}) with args {:?}", program, pid, args);

        Ok(ProcessHandle {
            owner: self.id,
            pid,
            program: program.to_string(),
            args: args.to_vec(),
            state: ProcessState::Running,
            kill_sent: false,
            exit: None,
            started_at: Instant::now(),
            child,
        })
    }

    /// Send the graceful termination signal
    ///
    /// No-op once the handle has been signalled or reaped. A process that is
    /// already gone counts as terminated.
    pub fn signal_terminate(&self, handle: &mut ProcessHandle) -> FixtureResult<()> {
        self.ensure_owned(handle)?;

        if handle.state != ProcessState::Running {
            return Ok(());
        }

        let delivered = deliver_terminate(handle)?;
        handle.state = ProcessState::SignaledForTermination;

        if delivered {
            fixture_debug!(self.id, "📤 Sent SIGTERM to {} (PID: {})", handle.program, handle.pid);
        } else {
            fixture_debug!(self.id, "✅ Process {} already gone", handle.pid);
        }

        Ok(())
    }

    /// Send the unconditional kill signal
    ///
    /// No-op once a kill has been delivered or the handle has been reaped.
    pub fn force_kill(&self, handle: &mut ProcessHandle) -> FixtureResult<()> {
        self.ensure_owned(handle)?;

        if handle.state == ProcessState::Reaped || handle.kill_sent {
            return Ok(());
        }

        let delivered = deliver_kill(handle)?;
        handle.kill_sent = true;
        handle.state = ProcessState::SignaledForTermination;

        if delivered {
            fixture_warn!(self.id, "🔨 Force killed {} (PID: {})", handle.program, handle.pid);
        } else {
            fixture_debug!(self.id, "✅ Process {} already gone", handle.pid);
        }

        Ok(())
    }

    /// Wait for the process to exit and collect its status
    ///
    /// Returns the cached status when the handle was already reaped.
    pub async fn reap(&self, handle: &mut ProcessHandle) -> FixtureResult<ExitOutcome> {
        self.ensure_owned(handle)?;

        if let Some(outcome) = handle.exit {
            return Ok(outcome);
        }

        let status = handle.child.wait().await?;
        let outcome = ExitOutcome::from(status);
        handle.mark_reaped(outcome);

        fixture_debug!(
            self.id,
            "🏁 Reaped {} (PID: {}) after {:?}: {}",
            handle.program,
            handle.pid,
            handle.uptime(),
            outcome
        );

        Ok(outcome)
    }

    /// Non-blocking exit check; an exit seen here is cached as reaped
    pub fn is_running(&self, handle: &mut ProcessHandle) -> FixtureResult<bool> {
        self.ensure_owned(handle)?;

        if handle.exit.is_some() {
            return Ok(false);
        }

        match handle.child.try_wait()? {
            Some(status) => {
                handle.mark_reaped(ExitOutcome::from(status));
                Ok(false)
            }
            None => Ok(true),
        }
    }

    /// Graceful shutdown with escalation
    ///
    /// Sends SIGTERM, waits up to `grace` for the exit, then force kills and reaps.
    pub async fn terminate(&self, handle: &mut ProcessHandle, grace: Duration) -> FixtureResult<ExitOutcome> {
        if let Err(e) = self.signal_terminate(handle) {
            match e {
                FixtureError::ReapError { .. } => return Err(e),
                other => {
                    fixture_warn!(self.id, "⚠️ Failed to terminate gracefully: {}", other);
                }
            }
        }

        match tokio::time::timeout(grace, self.reap(handle)).await {
            Ok(result) => {
                if let Ok(outcome) = &result {
                    fixture_info!(self.id, "✅ {} (PID: {}) stopped: {}", handle.program, handle.pid, outcome);
                }
                result
            }
            Err(_) => {
                fixture_warn!(
                    self.id,
                    "🔨 {} (PID: {}) did not exit within {:?}, escalating",
                    handle.program,
                    handle.pid,
                    grace
                );
                self.force_kill(handle)?;
                self.reap(handle).await
            }
        }
    }

    fn ensure_owned(&self, handle: &ProcessHandle) -> FixtureResult<()> {
        if handle.owner != self.id {
            return Err(FixtureError::ReapError {
                pid: handle.pid,
                owner: handle.owner,
                fixture: self.id,
            });
        }
        Ok(())
    }
}

impl Default for ProcessFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Deliver SIGTERM; `Ok(false)` when the process no longer exists
#[cfg(unix)]
fn deliver_terminate(handle: &mut ProcessHandle) -> FixtureResult<bool> {
    send_signal(handle.pid, nix::sys::signal::Signal::SIGTERM)
}

/// Deliver SIGKILL; `Ok(false)` when the process no longer exists
#[cfg(unix)]
fn deliver_kill(handle: &mut ProcessHandle) -> FixtureResult<bool> {
    send_signal(handle.pid, nix::sys::signal::Signal::SIGKILL)
}

#[cfg(unix)]
fn send_signal(pid: u32, signal: nix::sys::signal::Signal) -> FixtureResult<bool> {
    use nix::errno::Errno;
    use nix::unistd::Pid;

    match nix::sys::signal::kill(Pid::from_raw(pid as i32), signal) {
        Ok(()) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        Err(e) => Err(FixtureError::SignalError {
            pid,
            reason: e.to_string(),
        }),
    }
}

// No catchable termination signal off unix, both paths kill
#[cfg(not(unix))]
fn deliver_terminate(handle: &mut ProcessHandle) -> FixtureResult<bool> {
    deliver_kill(handle)
}

#[cfg(not(unix))]
fn deliver_kill(handle: &mut ProcessHandle) -> FixtureResult<bool> {
    match handle.child.start_kill() {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(false),
        Err(e) => Err(FixtureError::SignalError {
            pid: handle.pid,
            reason: e.to_string(),
        }),
    }
}
