//! Configuration
//!
//! Validator arguments, endpoint and timing, with a fluent builder and
//! environment overrides.

pub mod builder;
pub mod validator;

pub use builder::ValidatorConfigBuilder;
pub use validator::{DEFAULT_RPC_HOST, DEFAULT_RPC_PORT, DEFAULT_VALIDATOR_PROGRAM, RpcEndpoint, ValidatorConfig};
