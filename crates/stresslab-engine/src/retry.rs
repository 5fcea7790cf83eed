//! Timeouts, retries and cancellation for provider calls.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{sleep, timeout};

use stresslab_traits::TraitError;

use crate::error::{EngineError, EngineResult};

// =============================================================================
// CANCELLATION
// =============================================================================

/// Caller side of a cancellation pair.
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    /// Cancel every load holding the paired token.
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

/// Loader side of a cancellation pair.
#[derive(Debug, Clone)]
pub struct CancelToken(watch::Receiver<bool>);

impl CancelToken {
    /// Returns true once cancelled.
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves when cancelled. Never resolves if the handle is dropped
    /// without cancelling.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.0.borrow_and_update() {
                return;
            }
            if self.0.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Create a linked handle and token.
pub fn cancellation() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle(tx), CancelToken(rx))
}

// =============================================================================
// LOAD OPTIONS
// =============================================================================

/// Limits applied to every provider call of a load.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Extra attempts after a transient failure or timeout.
    pub retries: u32,
    /// Delay before the first retry, doubled on each further retry.
    pub retry_delay: Duration,
    /// Optional cancellation.
    pub cancel: Option<CancelToken>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retries: 2,
            retry_delay: Duration::from_millis(250),
            cancel: None,
        }
    }
}

impl LoadOptions {
    /// Creates options with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-attempt timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry count.
    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Sets the initial retry delay.
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Attaches a cancellation token.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.retry_delay.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }

    /// Fails fast if the load was cancelled.
    pub fn check_cancelled(&self) -> EngineResult<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(EngineError::Cancelled),
            _ => Ok(()),
        }
    }
}

async fn wait_cancelled(token: Option<CancelToken>) {
    match token {
        Some(mut token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

/// Run a provider call under the load limits.
///
/// Transient provider errors and timeouts are retried up to
/// `options.retries` times; any other error is returned at once.
pub async fn call_with_retry<F, Fut, T>(
    operation: &'static str,
    options: &LoadOptions,
    mut f: F,
) -> EngineResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TraitError>>,
{
    let mut attempt = 0;

    loop {
        options.check_cancelled()?;

        let outcome = tokio::select! {
            biased;
            _ = wait_cancelled(options.cancel.clone()) => return Err(EngineError::Cancelled),
            r = timeout(options.timeout, f()) => r,
        };

        let error = match outcome {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) if !e.is_transient() => return Err(EngineError::upstream(operation, e)),
            Ok(Err(e)) => EngineError::upstream(operation, e),
            Err(_) => EngineError::Timeout {
                operation,
                after: options.timeout,
            },
        };

        attempt += 1;
        if attempt > options.retries {
            tracing::warn!(operation, attempt, error = %error, "All retry attempts exhausted");
            return Err(error);
        }

        let delay = options.delay_for_attempt(attempt);
        tracing::debug!(
            operation,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "Retrying after delay"
        );
        sleep(delay).await;
    }
}
