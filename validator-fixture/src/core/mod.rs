//! Core fixture logic
//!
//! Pure readiness state machine and the polling loop that drives it.

pub mod readiness;

pub use readiness::{ReadinessPolicy, ReadinessReport, ReadinessState, ReadinessTracker, wait_until_ready};
