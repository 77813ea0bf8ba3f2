//! Main entry point for the validator-fixture binary
//!
//! Starts a local test validator with the fixture's arguments, waits until
//! its RPC is ready, and keeps it running until Ctrl-C or until the validator
//! exits on its own. Useful for running token tests against a long-lived
//! validator from another terminal.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use shared::{fixture_info, fixture_warn, logging};
use validator_fixture::{FixtureContext, ValidatorConfig, ValidatorConfigBuilder, global_setup, global_teardown};

/// Local test validator fixture
#[derive(Parser)]
#[command(name = "validator-fixture")]
#[command(about = "Runs a local test validator and tears it down cleanly")]
pub struct Args {
    /// Validator executable (resolved on PATH)
    #[arg(long)]
    pub program: Option<String>,

    /// Ledger directory
    #[arg(long)]
    pub ledger: Option<PathBuf>,

    /// JSON-RPC port (websocket uses the next port)
    #[arg(long)]
    pub rpc_port: Option<u16>,

    /// Seconds to wait for the RPC to answer
    #[arg(long)]
    pub ready_timeout_secs: Option<u32>,

    /// Milliseconds between SIGTERM and SIGKILL at shutdown
    #[arg(long)]
    pub shutdown_grace_ms: Option<u64>,

    /// Pass --quiet to the validator and do not forward its output
    #[arg(long)]
    pub quiet: bool,

    /// Skip the check that the RPC ports are free
    #[arg(long)]
    pub no_port_check: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Extra arguments passed verbatim to the validator
    #[arg(last = true)]
    pub extra_args: Vec<String>,
}

impl Args {
    fn into_config(self, base: ValidatorConfig) -> ValidatorConfig {
        let mut builder = ValidatorConfigBuilder::from_config(base).args(self.extra_args);

        if let Some(program) = self.program {
            builder = builder.program(program);
        }
        if let Some(ledger) = self.ledger {
            builder = builder.ledger_path(ledger);
        }
        if let Some(port) = self.rpc_port {
            builder = builder.rpc_port(port);
        }
        if let Some(secs) = self.ready_timeout_secs {
            builder = builder.ready_timeout_secs(secs);
        }
        if let Some(ms) = self.shutdown_grace_ms {
            builder = builder.shutdown_grace(Duration::from_millis(ms));
        }
        if self.quiet {
            builder = builder.quiet(true).forward_output(false);
        }
        if self.no_port_check {
            builder = builder.check_port(false);
        }

        builder.build()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init_tracing_with_level(Some(&args.log_level));

    let config = args.into_config(ValidatorConfig::from_env()?);
    let mut context = global_setup(&config).await?;

    let endpoint = context.endpoint().clone();
    fixture_info!(
        context.fixture_id(),
        "🌐 Test validator PID {} ready: {} (ws: {})",
        context.pid(),
        endpoint.http_url()?,
        endpoint.ws_url()?
    );

    wait_for_shutdown(&mut context).await;

    global_teardown(Some(context)).await;
    Ok(())
}

/// Return on Ctrl-C or when the validator exits by itself
async fn wait_for_shutdown(context: &mut FixtureContext) {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                fixture_info!(context.fixture_id(), "🛑 Ctrl-C received");
                return;
            }
            _ = ticker.tick() => {
                match context.is_running() {
                    Ok(true) => {}
                    Ok(false) => {
                        fixture_warn!(context.fixture_id(), "⚠️ Test validator exited unexpectedly");
                        return;
                    }
                    Err(e) => {
                        fixture_warn!(context.fixture_id(), "⚠️ Error checking validator status: {}", e);
                        return;
                    }
                }
            }
        }
    }
}
