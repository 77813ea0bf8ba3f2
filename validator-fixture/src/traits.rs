//! Trait definitions with mockall annotations for testing
//!
//! The readiness waiter only talks to the service through [`LivenessProbe`],
//! so the polling loop can be driven by a mock in tests and by the JSON-RPC
//! probe in production.

use shared::ReadinessCheck;

/// Liveness query abstraction for dependency injection
#[mockall::automock]
#[async_trait::async_trait]
pub trait LivenessProbe: Send + Sync {
    /// Issue a single liveness query
    ///
    /// Never fails: every problem is reported as `ReadinessCheck::NotReady`
    /// so the caller can decide whether it is fatal.
    async fn check(&self) -> ReadinessCheck;

    /// Endpoint description used in diagnostics
    fn endpoint(&self) -> String;
}
