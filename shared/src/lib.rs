//! Shared types for the validator test fixture
//!
//! Contains the process and readiness data model, the shared error type and
//! the tracing setup used by the fixture library, its binary and its tests.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
