//! Service-specific tests
//!
//! Process tests spawn real, short-lived unix utilities (`sleep`, `sh`,
//! `echo`). RPC probe tests run against a wiremock server.


// Common test utilities for services
#[cfg(test)]
pub mod common {
    use std::time::Duration;
    use tokio::time::timeout;

    /// Upper bound for any single lifecycle operation in tests
    pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

    /// Helper to run async operations with timeout
    pub async fn with_timeout<T, F>(future: F) -> Result<T, tokio::time::error::Elapsed>
    where
        F: std::future::Future<Output = T>,
    {
        timeout(TEST_TIMEOUT, future).await
    }

    /// Argument list for a long-running dummy process
    pub fn sleep_args(secs: u64) -> Vec<String> {
        vec![secs.to_string()]
    }

    /// `sh -c` arguments for a process that ignores SIGTERM
    pub fn stubborn_args() -> Vec<String> {
        vec!["-c".to_string(), "trap '' TERM; exec sleep 30".to_string()]
    }
}
