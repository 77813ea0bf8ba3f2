//! Helper to handle child process stdout/stderr output
//!
//! Output of the fixture process is only ever logged, never interpreted:
//! - forwarding enabled: lines are piped and re-emitted on the `validator_output` target
//! - forwarding disabled: output goes to the null device

use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;

/// Configure stdio for a child process
pub fn configure_child_stdio(cmd: &mut tokio::process::Command, forward_output: bool) {
    if forward_output {
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).stdin(Stdio::null());
    } else {
        cmd.stdout(Stdio::null()).stderr(Stdio::null()).stdin(Stdio::null());
    }
}

/// If output was piped, spawn tasks that drain it into the log
///
/// Draining also keeps the child from blocking on a full pipe.
pub fn spawn_output_consumers(child: &mut Child, process_name: &str, pid: u32) {
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(forward_lines(stdout, process_name.to_string(), pid, "stdout"));
    }

    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(forward_lines(stderr, process_name.to_string(), pid, "stderr"));
    }
}

async fn forward_lines<R>(stream: R, process_name: String, pid: u32, stream_name: &'static str)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        tracing::debug!(
            target: "validator_output",
            process = %process_name,
            pid,
            stream = stream_name,
            "{}",
            line
        );
    }
}
