//! Time budgets for operations that wait on something outside the crate.
//!
//! The address-space model itself never blocks. The dynamic-linker trace run
//! by [`LddResolver`](crate::libs::LddResolver) does, so it is driven through
//! [`block_on_with_timeout`] on a private current-thread runtime.

use crate::error::{ElfError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error};

/// Default budget for external subprocess calls in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Budget for one external operation
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    pub duration: Duration,
    /// Emit an `error!` event when the budget is exceeded
    pub log_warnings: bool,
    /// Name used in log events
    pub operation_name: String,
}

impl TimeoutConfig {
    pub fn new(seconds: u64, operation: impl Into<String>) -> Self {
        Self {
            duration: Duration::from_secs(seconds),
            log_warnings: true,
            operation_name: operation.into(),
        }
    }

    pub fn default_timeout(operation: impl Into<String>) -> Self {
        Self::new(DEFAULT_TIMEOUT_SECONDS, operation)
    }

    fn expired(&self) -> ElfError {
        if self.log_warnings {
            error!(
                operation = %self.operation_name,
                seconds = self.duration.as_secs(),
                "Operation timed out"
            );
        }
        ElfError::Timeout {
            seconds: self.duration.as_secs(),
        }
    }
}

/// Await `future`, failing with `ElfError::Timeout` once the budget runs out.
///
/// The future is dropped on expiry, which is what kills a child spawned with
/// `kill_on_drop`.
pub async fn with_timeout<T, F>(config: &TimeoutConfig, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    debug!(
        operation = %config.operation_name,
        seconds = config.duration.as_secs(),
        "Starting bounded operation"
    );
    let result = timeout(config.duration, future)
        .await
        .map_err(|_| config.expired())?;
    debug!(operation = %config.operation_name, ok = result.is_ok(), "Bounded operation finished");
    result
}

/// Run `future` to completion from synchronous code under `config`.
///
/// A fresh current-thread runtime is built per call. When the caller is
/// already on a tokio runtime thread, that runtime cannot be re-entered, so
/// the future is driven on a scoped helper thread and the caller blocks until
/// it finishes.
pub fn block_on_with_timeout<T, F>(config: &TimeoutConfig, future: F) -> Result<T>
where
    F: Future<Output = Result<T>> + Send,
    T: Send,
{
    if tokio::runtime::Handle::try_current().is_err() {
        return run_on_fresh_runtime(config, future);
    }
    debug!(
        operation = %config.operation_name,
        "Called from inside a tokio runtime, driving on a helper thread"
    );
    std::thread::scope(|scope| {
        scope
            .spawn(|| run_on_fresh_runtime(config, future))
            .join()
            .unwrap_or_else(|_| {
                Err(ElfError::Subprocess(format!(
                    "{} panicked on its helper thread",
                    config.operation_name
                )))
            })
    })
}

fn run_on_fresh_runtime<T, F>(config: &TimeoutConfig, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(with_timeout(config, future))
}
