//! Bounded retries for the description collaborator.

use lexicut_error::{LexicutError, LexicutErrorKind, LexicutResult, RetryableError};
use lexicut_interface::{DescribeTarget, Describer, GroupDescription, RangeDescription};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, instrument, warn};

/// Exponential backoff settings.
///
/// ```toml
/// [describe]
/// max_retries = 3
/// initial_backoff_ms = 1000
/// max_delay_secs = 30
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    /// First backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Upper bound on a single delay in seconds
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_max_delay_secs() -> u64 {
    30
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_delay_secs: default_max_delay_secs(),
        }
    }
}

/// Whether an error from a collaborator is worth retrying.
fn is_transient(error: &LexicutError) -> bool {
    match error.kind() {
        LexicutErrorKind::Models(e) => e.is_retryable(),
        LexicutErrorKind::Http(_) => true,
        _ => false,
    }
}

/// [`Describer`] wrapper that retries transient failures, then gives up
/// quietly with an empty result.
#[derive(Debug, Clone)]
pub struct RetryingDescriber<D> {
    inner: D,
    policy: RetryPolicy,
}

impl<D> RetryingDescriber<D> {
    /// Wrap a describer.
    pub fn new(inner: D, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped describer.
    pub fn inner(&self) -> &D {
        &self.inner
    }

    async fn attempt<T, F, Fut>(&self, operation: &str, mut call: F) -> Vec<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = LexicutResult<Vec<T>>>,
    {
        // from_millis(2) doubles each step; the factor scales it to the configured start.
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(self.policy.initial_backoff_ms / 2)
            .max_delay(Duration::from_secs(self.policy.max_delay_secs))
            .map(jitter)
            .take(self.policy.max_retries);

        let result = Retry::spawn(strategy, || {
            let future = call();
            async move {
                future.await.map_err(|e| {
                    if is_transient(&e) {
                        debug!(error = %e, "Transient description failure, will retry");
                        RetryError::Transient {
                            err: e,
                            retry_after: None,
                        }
                    } else {
                        RetryError::Permanent(e)
                    }
                })
            }
        })
        .await;

        match result {
            Ok(descriptions) => descriptions,
            Err(e) => {
                warn!(operation, error = %e, "Description failed, continuing without it");
                Vec::new()
            }
        }
    }
}

#[async_trait::async_trait]
impl<D: Describer> Describer for RetryingDescriber<D> {
    #[instrument(skip_all, fields(file = %file.display()))]
    async fn describe_ranges(
        &self,
        file: &Path,
        target: &DescribeTarget,
        cache_key: Option<&str>,
    ) -> LexicutResult<Vec<RangeDescription>> {
        Ok(self
            .attempt("describe_ranges", || {
                self.inner.describe_ranges(file, target, cache_key)
            })
            .await)
    }

    #[instrument(skip_all, fields(file = %file.display()))]
    async fn describe_groups(
        &self,
        file: &Path,
        target: &DescribeTarget,
        cache_key: Option<&str>,
    ) -> LexicutResult<Vec<GroupDescription>> {
        Ok(self
            .attempt("describe_groups", || {
                self.inner.describe_groups(file, target, cache_key)
            })
            .await)
    }
}
