//! Library resolution through the local dynamic linker's load trace.
//!
//! The image is executed with the trace variable set, which makes glibc's
//! `ld.so` print every library it maps instead of running `main`. Static
//! binaries ignore the variable and run normally, so the call is always
//! bounded by a timeout and the child is killed when it expires.

use std::path::Path;
use std::process::{Output, Stdio};

use tokio::process::Command;
use tracing::{debug, warn};

use super::{parse_trace, Libraries, LibraryResolver};
use crate::config::LibraryConfig;
use crate::error::{ElfError, Result};
use crate::timeout::{block_on_with_timeout, TimeoutConfig};

/// Runs the image under the dynamic-linker trace and parses its stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LddResolver {
    env_var: String,
    timeout_seconds: u64,
}

impl Default for LddResolver {
    fn default() -> Self {
        Self::from_config(&LibraryConfig::default())
    }
}

impl LddResolver {
    pub fn from_config(config: &LibraryConfig) -> Self {
        Self {
            env_var: config.trace_env_var.clone(),
            timeout_seconds: config.timeout_seconds,
        }
    }

    /// Spawn the image with the trace variable set and collect its output.
    async fn trace(path: &Path, env_var: &str) -> Result<Output> {
        let child = Command::new(path)
            .env(env_var, "1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ElfError::Subprocess(format!("failed to spawn {}: {}", path.display(), e))
            })?;
        child
            .wait_with_output()
            .await
            .map_err(|e| ElfError::Subprocess(format!("failed to collect output: {}", e)))
    }
}

impl LibraryResolver for LddResolver {
    /// A non-zero exit is only an error when stdout carried no trace lines.
    fn resolve(&self, path: &Path) -> Result<Libraries> {
        let budget = TimeoutConfig::new(self.timeout_seconds, "dynamic-linker trace");
        let output = block_on_with_timeout(&budget, Self::trace(path, &self.env_var))?;
        let libs = parse_trace(&String::from_utf8_lossy(&output.stdout));

        if !output.status.success() {
            warn!(
                path = %path.display(),
                status = %output.status,
                libraries = libs.len(),
                "Traced process exited unsuccessfully"
            );
            if libs.is_empty() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(ElfError::Subprocess(format!(
                    "{} exited with {}: {}",
                    path.display(),
                    output.status,
                    stderr.trim()
                )));
            }
        }
        debug!(path = %path.display(), libraries = libs.len(), "Resolved shared libraries");
        Ok(libs)
    }
}
