//! In-flight job sharing.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use lexicut_error::{CacheError, CacheErrorKind, LexicutResult};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type SharedJob<T> = Shared<BoxFuture<'static, Result<T, String>>>;

/// Registry of running jobs keyed by content fingerprint.
///
/// The first caller for a key starts the job; later callers await the same
/// future. The entry is removed as soon as the job finishes, so a call after
/// completion starts a fresh job.
///
/// # Example
///
/// ```
/// use lexicut_cache::JobRegistry;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let jobs: JobRegistry<String> = JobRegistry::new();
/// let (a, b) = tokio::join!(
///     jobs.run_or_join("cid-1", || async { Ok("transcript".to_string()) }),
///     jobs.run_or_join("cid-1", || async { Ok("never runs".to_string()) }),
/// );
/// assert_eq!(a.unwrap(), b.unwrap());
/// # }
/// ```
pub struct JobRegistry<T: Clone> {
    jobs: Arc<Mutex<HashMap<String, SharedJob<T>>>>,
}

impl<T> JobRegistry<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SharedJob<T>>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run the job for `key`, or join the one already running.
    ///
    /// `start` is only called when no job for `key` is in flight.
    ///
    /// # Errors
    ///
    /// Returns `JobFailed` carrying the job's error message; every caller
    /// joined to the job sees the same failure.
    #[tracing::instrument(skip(self, start))]
    pub async fn run_or_join<F, Fut>(&self, key: &str, start: F) -> LexicutResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = LexicutResult<T>> + Send + 'static,
    {
        let job = {
            let mut jobs = self.lock();
            match jobs.get(key) {
                Some(job) => {
                    tracing::debug!("Joining in-flight job");
                    job.clone()
                }
                None => {
                    tracing::debug!("Starting job");
                    let registry = Arc::clone(&self.jobs);
                    let owned_key = key.to_string();
                    let work = start();
                    let job = async move {
                        let result = work.await.map_err(|e| e.to_string());
                        registry
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .remove(&owned_key);
                        result
                    }
                    .boxed()
                    .shared();
                    jobs.insert(key.to_string(), job.clone());
                    job
                }
            }
        };

        job.await.map_err(|message| {
            tracing::warn!(error = %message, "Job failed");
            CacheError::new(CacheErrorKind::JobFailed {
                key: key.to_string(),
                message,
            })
            .into()
        })
    }

    /// Whether a job for `key` is running.
    pub fn is_running(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Number of jobs in flight.
    pub fn in_flight(&self) -> usize {
        self.lock().len()
    }
}

impl<T> Default for JobRegistry<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for JobRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            jobs: Arc::clone(&self.jobs),
        }
    }
}

impl<T: Clone> std::fmt::Debug for JobRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.jobs.lock().map(|jobs| jobs.len()).unwrap_or_default();
        f.debug_struct("JobRegistry").field("in_flight", &count).finish()
    }
}
