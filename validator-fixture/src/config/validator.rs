//! Validator Configuration
//!
//! Arguments, endpoint and timing knobs for the test validator fixture.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::core::ReadinessPolicy;
use crate::error::{FixtureError, FixtureResult};
use shared::SharedError;

pub const DEFAULT_VALIDATOR_PROGRAM: &str = "solana-test-validator";
pub const DEFAULT_RPC_HOST: &str = "127.0.0.1";
pub const DEFAULT_RPC_PORT: u16 = 8899;

/// Host and port of the validator's JSON-RPC service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcEndpoint {
    pub host: String,
    pub port: u16,
}

impl RpcEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }

    /// JSON-RPC HTTP URL
    pub fn http_url(&self) -> FixtureResult<Url> {
        Self::parse(&format!("http://{}:{}", self.host, self.port))
    }

    /// PubSub websocket URL, served one port above RPC
    pub fn ws_url(&self) -> FixtureResult<Url> {
        let ws_port = self
            .port
            .checked_add(1)
            .ok_or_else(|| FixtureError::config(format!("rpc port {} has no websocket port", self.port)))?;
        Self::parse(&format!("ws://{}:{}", self.host, ws_port))
    }

    fn parse(raw: &str) -> FixtureResult<Url> {
        Url::parse(raw).map_err(|e| {
            SharedError::InvalidConfig {
                field: "rpc_endpoint".to_string(),
                value: format!("{raw} ({e})"),
            }
            .into()
        })
    }
}

impl fmt::Display for RpcEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Executable, resolved on PATH
    pub program: String,
    pub ledger_path: PathBuf,
    pub rpc_host: String,
    pub rpc_port: u16,
    /// Wipe the ledger on start
    pub reset: bool,
    pub quiet: bool,
    pub slots_per_epoch: u64,
    pub ticks_per_slot: u64,
    /// Appended verbatim after the standard arguments
    pub extra_args: Vec<String>,
    pub ready_timeout_secs: u32,
    pub poll_interval: Duration,
    /// Time between SIGTERM and SIGKILL at teardown
    pub shutdown_grace: Duration,
    pub forward_output: bool,
    pub check_port: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_VALIDATOR_PROGRAM.to_string(),
            ledger_path: env::temp_dir().join("tmp-ledger"),
            rpc_host: DEFAULT_RPC_HOST.to_string(),
            rpc_port: DEFAULT_RPC_PORT,
            reset: true,
            quiet: false,
            slots_per_epoch: 32,
            ticks_per_slot: 2,
            extra_args: Vec::new(),
            ready_timeout_secs: 7,
            poll_interval: Duration::from_secs(1),
            shutdown_grace: Duration::from_secs(2),
            forward_output: true,
            check_port: true,
        }
    }
}

impl ValidatorConfig {
    /// Create a new builder
    pub fn builder() -> crate::config::builder::ValidatorConfigBuilder {
        crate::config::builder::ValidatorConfigBuilder::new()
    }

    /// Defaults overridden by `.env` and `VALIDATOR_*` environment variables
    pub fn from_env() -> FixtureResult<Self> {
        // A missing .env file is fine
        let _ = dotenv::dotenv();
        Self::default().apply_env(|key| env::var(key).ok())
    }

    /// Apply overrides from a variable lookup
    pub fn apply_env<F>(mut self, lookup: F) -> FixtureResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(program) = lookup("VALIDATOR_PROGRAM") {
            self.program = program;
        }
        if let Some(ledger) = lookup("VALIDATOR_LEDGER") {
            self.ledger_path = PathBuf::from(ledger);
        }
        if let Some(host) = lookup("VALIDATOR_RPC_HOST") {
            self.rpc_host = host;
        }
        if let Some(port) = lookup("VALIDATOR_RPC_PORT") {
            self.rpc_port = parse_var("VALIDATOR_RPC_PORT", &port)?;
        }
        if let Some(secs) = lookup("VALIDATOR_READY_TIMEOUT_SECS") {
            self.ready_timeout_secs = parse_var("VALIDATOR_READY_TIMEOUT_SECS", &secs)?;
        }
        if let Some(ms) = lookup("VALIDATOR_SHUTDOWN_GRACE_MS") {
            self.shutdown_grace = Duration::from_millis(parse_var("VALIDATOR_SHUTDOWN_GRACE_MS", &ms)?);
        }
        if let Some(extra) = lookup("VALIDATOR_EXTRA_ARGS") {
            self.extra_args = extra.split_whitespace().map(str::to_string).collect();
        }

        Ok(self)
    }

    /// Convert to command-line arguments for the validator
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--ledger".to_string(),
            self.ledger_path.to_string_lossy().into_owned(),
            "--rpc-port".to_string(),
            self.rpc_port.to_string(),
        ];

        if self.reset {
            args.push("--reset".to_string());
        }

        if self.quiet {
            args.push("--quiet".to_string());
        }

        args.push("--slots-per-epoch".to_string());
        args.push(self.slots_per_epoch.to_string());
        args.push("--ticks-per-slot".to_string());
        args.push(self.ticks_per_slot.to_string());

        args.extend(self.extra_args.iter().cloned());

        args
    }

    pub fn endpoint(&self) -> RpcEndpoint {
        RpcEndpoint::new(self.rpc_host.clone(), self.rpc_port)
    }

    pub fn readiness_policy(&self) -> ReadinessPolicy {
        ReadinessPolicy::new(self.poll_interval, self.ready_timeout_secs)
    }

    /// Check if this configuration is usable
    pub fn validate(&self) -> FixtureResult<()> {
        if self.program.trim().is_empty() {
            return Err(FixtureError::config("program must not be empty"));
        }
        if self.rpc_port == 0 || self.rpc_port == u16::MAX {
            return Err(FixtureError::config(format!("rpc port {} is not usable", self.rpc_port)));
        }
        if self.poll_interval.is_zero() {
            return Err(FixtureError::config("poll interval must be positive"));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(field: &str, value: &str) -> FixtureResult<T> {
    value.trim().parse().map_err(|_| {
        SharedError::InvalidConfig {
            field: field.to_string(),
            value: value.to_string(),
        }
        .into()
    })
}
