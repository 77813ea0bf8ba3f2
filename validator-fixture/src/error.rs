//! Fixture-specific error types

use shared::{FixtureId, SharedError};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Failed to spawn `{program}`: {reason}")]
    SpawnError { program: String, reason: String },

    #[error("RPC at {endpoint} is not ready after {elapsed:?} ({attempts} attempts, last failure: {last_failure})")]
    ReadinessTimeout {
        endpoint: String,
        elapsed: Duration,
        attempts: u32,
        last_failure: String,
    },

    #[error("Process {pid} belongs to {owner}, not {fixture}")]
    ReapError { pid: u32, owner: FixtureId, fixture: FixtureId },

    #[error("Port {port} is already in use (holders: {holders:?})")]
    PortInUse { port: u16, holders: Vec<i32> },

    #[error("Failed to signal process {pid}: {reason}")]
    SignalError { pid: u32, reason: String },

    #[error("Configuration error: {field}")]
    ConfigurationError { field: String },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl FixtureError {
    /// Build a spawn error, calling out a missing executable explicitly
    pub fn spawn(program: &str, err: &std::io::Error) -> Self {
        let reason = if err.kind() == std::io::ErrorKind::NotFound {
            format!("executable not found on PATH ({err})")
        } else {
            err.to_string()
        };

        FixtureError::SpawnError {
            program: program.to_string(),
            reason,
        }
    }

    pub fn config(field: impl Into<String>) -> Self {
        FixtureError::ConfigurationError { field: field.into() }
    }
}

pub type FixtureResult<T> = Result<T, FixtureError>;
