//! Test validator fixture
//!
//! Spawns an external validator process for integration tests, waits until
//! its JSON-RPC service answers, and guarantees the process is stopped and
//! reaped when the test run ends, whether it passed, failed or panicked.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use validator_fixture::{ValidatorConfig, global_setup, global_teardown};
//!
//! # async fn run() -> validator_fixture::FixtureResult<()> {
//! let config = ValidatorConfig::builder().rpc_port(8899).build();
//!
//! let context = global_setup(&config).await?;
//! println!("validator PID {} at {}", context.pid(), context.endpoint());
//! // ... run tests against context.endpoint().http_url()? ...
//! global_teardown(Some(context)).await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod lifecycle;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use config::{RpcEndpoint, ValidatorConfig, ValidatorConfigBuilder};
pub use crate::core::{ReadinessPolicy, ReadinessReport, ReadinessState, ReadinessTracker, wait_until_ready};
pub use error::{FixtureError, FixtureResult};
pub use lifecycle::{
    FixtureContext, FixtureInfo, global_setup, global_teardown, setup_with_probe, with_fixture, with_fixture_probe,
};
pub use services::{ProcessFixture, ProcessHandle, RpcLivenessProbe, RpcVersion};
pub use traits::{LivenessProbe, MockLivenessProbe};
