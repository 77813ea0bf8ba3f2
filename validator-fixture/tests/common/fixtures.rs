//! Test fixtures and data for fixture lifecycle tests
//!
//! Fake validators are small shell scripts written into a temp directory.
//! They accept and ignore the validator arguments and record their PID so
//! tests can verify the process is gone after teardown.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    /// Fast polling so mock-driven setups finish quickly
    pub const FAST_POLL: Duration = Duration::from_millis(50);
    pub const GRACE: Duration = Duration::from_secs(2);
    pub const SHORT_GRACE: Duration = Duration::from_millis(300);

    pub const PID_FILE: &'static str = "validator.pid";

    pub fn version_body() -> serde_json::Value {
        serde_json::json!({
            "jsonrpc": "2.0",
            "result": { "solana-core": "1.18.26", "feature-set": 3241752014u64 },
            "id": 1
        })
    }

    /// Validator that runs until signalled
    pub fn sleepy_validator(dir: &Path) -> PathBuf {
        Self::write_script(dir, "sleepy-validator", "", "exec sleep 30")
    }

    /// Validator that ignores SIGTERM
    pub fn stubborn_validator(dir: &Path) -> PathBuf {
        Self::write_script(dir, "stubborn-validator", "trap '' TERM", "exec sleep 30")
    }

    /// Validator that exits with code 3 shortly after start
    pub fn crashing_validator(dir: &Path) -> PathBuf {
        Self::write_script(dir, "crashing-validator", "", "sleep 0.2\nexit 3")
    }

    /// The PID file is written after `prelude`, so its presence means the prelude ran
    fn write_script(dir: &Path, name: &str, prelude: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let pid_file = dir.join(Self::PID_FILE);
        let script = format!("#!/bin/sh\n{}\necho $$ > '{}'\n{}\n", prelude, pid_file.display(), body);

        fs::write(&path, script).expect("write fake validator");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod fake validator");
        path
    }
}
