//! Validator Configuration Builder
//!
//! Provides a flexible builder pattern for constructing validator configurations

use super::ValidatorConfig;
use std::path::PathBuf;
use std::time::Duration;

pub struct ValidatorConfigBuilder {
    config: ValidatorConfig,
}

impl ValidatorConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ValidatorConfig::default(),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Set the executable to launch
    pub fn program<S: Into<String>>(mut self, program: S) -> Self {
        self.config.program = program.into();
        self
    }

    /// Set the ledger directory
    pub fn ledger_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.ledger_path = path.into();
        self
    }

    pub fn rpc_host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.rpc_host = host.into();
        self
    }

    pub fn rpc_port(mut self, port: u16) -> Self {
        self.config.rpc_port = port;
        self
    }

    pub fn reset(mut self, reset: bool) -> Self {
        self.config.reset = reset;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.config.quiet = quiet;
        self
    }

    pub fn slots_per_epoch(mut self, slots: u64) -> Self {
        self.config.slots_per_epoch = slots;
        self
    }

    pub fn ticks_per_slot(mut self, ticks: u64) -> Self {
        self.config.ticks_per_slot = ticks;
        self
    }

    /// Append one extra validator argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.config.extra_args.push(arg.into());
        self
    }

    /// Append extra validator arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set readiness timeout in seconds
    pub fn ready_timeout_secs(mut self, secs: u32) -> Self {
        self.config.ready_timeout_secs = secs;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.config.shutdown_grace = grace;
        self
    }

    pub fn forward_output(mut self, forward: bool) -> Self {
        self.config.forward_output = forward;
        self
    }

    pub fn check_port(mut self, check: bool) -> Self {
        self.config.check_port = check;
        self
    }

    pub fn build(self) -> ValidatorConfig {
        self.config
    }
}

impl Default for ValidatorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
