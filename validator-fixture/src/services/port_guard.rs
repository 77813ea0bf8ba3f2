//! RPC port preflight
//!
//! A validator left over from an earlier run would answer the liveness query
//! on the same port and make a fresh fixture look ready. Before spawning we
//! make sure the RPC port and the websocket port next to it are free.

use std::net::TcpListener;
use std::process::Command;

use crate::error::{FixtureError, FixtureResult};

/// Fail with `PortInUse` if the RPC port or its websocket port (RPC + 1) is taken
pub fn ensure_ports_free(host: &str, rpc_port: u16) -> FixtureResult<()> {
    let ws_port = rpc_port
        .checked_add(1)
        .ok_or_else(|| FixtureError::config(format!("rpc port {rpc_port} leaves no room for the websocket port")))?;

    for port in [rpc_port, ws_port] {
        if !port_is_free(host, port) {
            return Err(FixtureError::PortInUse {
                port,
                holders: find_processes_using_port(port),
            });
        }
    }

    Ok(())
}

/// Check whether a TCP port can be bound on `host`
pub fn port_is_free(host: &str, port: u16) -> bool {
    TcpListener::bind((host, port)).is_ok()
}

/// Ask the OS for a currently unused port
///
/// Parallel test groups use this to give each validator its own port.
pub fn pick_unused_port() -> FixtureResult<u16> {
    let listener = TcpListener::bind(("127.0.0.1", 0))?;
    Ok(listener.local_addr()?.port())
}

/// PIDs listening on `port`, best effort via `lsof`
fn find_processes_using_port(port: u16) -> Vec<i32> {
    let output = match Command::new("lsof").arg("-ti").arg(format!(":{port}")).output() {
        Ok(output) => output,
        Err(e) => {
            tracing::debug!("lsof unavailable, cannot name holders of port {}: {}", port, e);
            return vec![];
        }
    };

    if !output.status.success() {
        // lsof exits non-zero when nothing holds the port
        return vec![];
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter_map(|line| line.trim().parse::<i32>().ok())
        .collect()
}
