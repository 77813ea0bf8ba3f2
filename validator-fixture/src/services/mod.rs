//! Service implementations
//!
//! This module contains the implementations that touch the OS and the network:
//! process spawning and signalling, port checks and the RPC liveness probe.

pub mod port_guard;
pub mod process_manager;
pub mod process_output_handler;
pub mod rpc_probe;

mod tests;

// Re-export all service implementations
pub use process_manager::{ProcessFixture, ProcessHandle};
pub use rpc_probe::{RpcLivenessProbe, RpcVersion};
