//! Core types used throughout the validator fixture

use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::ExitStatus;
use uuid::Uuid;

/// Identity of the fixture that spawned a process
///
/// Every process handle remembers the fixture that created it, so a handle
/// can never be signalled or reaped through a fixture that does not own it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixtureId(Uuid);

impl FixtureId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for FixtureId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FixtureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = self.0.simple().to_string();
        write!(f, "fixture_{}", &short[..8])
    }
}

/// Lifecycle of one spawned OS process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessState {
    /// Spawned and not yet asked to stop
    Running,
    /// A termination signal has been delivered
    SignaledForTermination,
    /// Exit status collected from the OS
    Reaped,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessState::Running => write!(f, "running"),
            ProcessState::SignaledForTermination => write!(f, "signaled"),
            ProcessState::Reaped => write!(f, "reaped"),
        }
    }
}

/// How a reaped process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitOutcome {
    /// Exited on its own with a status code
    Exited { code: i32 },
    /// Terminated by a signal
    Signaled { signal: i32 },
    /// The platform reported neither a code nor a signal
    Unknown,
}

/// Signal number of SIGTERM on every unix we run on
pub const SIGTERM: i32 = 15;

/// Signal number of SIGKILL on every unix we run on
pub const SIGKILL: i32 = 9;

impl ExitOutcome {
    pub fn success(&self) -> bool {
        matches!(self, ExitOutcome::Exited { code: 0 })
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            ExitOutcome::Exited { code } => Some(*code),
            _ => None,
        }
    }

    pub fn signal(&self) -> Option<i32> {
        match self {
            ExitOutcome::Signaled { signal } => Some(*signal),
            _ => None,
        }
    }

    /// True when the process died from the graceful termination signal
    pub fn is_graceful_termination(&self) -> bool {
        self.signal() == Some(SIGTERM)
    }
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitOutcome::Exited { code };
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitOutcome::Signaled { signal };
            }
        }

        ExitOutcome::Unknown
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Exited { code } => write!(f, "exit code {code}"),
            ExitOutcome::Signaled { signal } => write!(f, "signal {signal}"),
            ExitOutcome::Unknown => write!(f, "unknown exit status"),
        }
    }
}

/// Why a single liveness query did not report ready
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotReadyReason {
    ConnectionRefused,
    Timeout,
    Malformed(String),
    Network(String),
}

impl fmt::Display for NotReadyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotReadyReason::ConnectionRefused => write!(f, "connection refused"),
            NotReadyReason::Timeout => write!(f, "request timed out"),
            NotReadyReason::Malformed(detail) => write!(f, "malformed response: {detail}"),
            NotReadyReason::Network(detail) => write!(f, "network error: {detail}"),
        }
    }
}

/// Outcome of one liveness query; consumed immediately by the waiter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessCheck {
    Ready { detail: String },
    NotReady(NotReadyReason),
}

impl ReadinessCheck {
    pub fn is_ready(&self) -> bool {
        matches!(self, ReadinessCheck::Ready { .. })
    }
}
