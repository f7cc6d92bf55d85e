use async_trait::async_trait;
use lexicut_error::{BackendError, HttpError, LexicutResult, ModelsError, ModelsErrorKind};
use lexicut_interface::{DescribeTarget, Describer, GroupDescription, RangeDescription};
use lexicut_models::{RetryPolicy, RetryingDescriber};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Copy)]
enum Failure {
    RateLimit,
    Transport,
    Unsupported,
}

/// Fails a fixed number of times before succeeding.
struct FlakyDescriber {
    failures: usize,
    failure: Failure,
    calls: AtomicUsize,
}

impl FlakyDescriber {
    fn new(failures: usize, failure: Failure) -> Self {
        Self {
            failures,
            failure,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next(&self) -> LexicutResult<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call >= self.failures {
            return Ok(());
        }
        match self.failure {
            Failure::Unsupported => Err(BackendError::new("unsupported media").into()),
            Failure::Transport => Err(HttpError::new("connection reset").into()),
            Failure::RateLimit => Err(ModelsError::new(ModelsErrorKind::Api {
                status: 429,
                message: "rate limited".to_string(),
            })
            .into()),
        }
    }
}

#[async_trait]
impl Describer for FlakyDescriber {
    async fn describe_ranges(
        &self,
        _file: &Path,
        _target: &DescribeTarget,
        _cache_key: Option<&str>,
    ) -> LexicutResult<Vec<RangeDescription>> {
        self.next()?;
        Ok(vec![RangeDescription {
            start: 0.0,
            end: 5.0,
            description: "Skyline at dusk".to_string(),
        }])
    }

    async fn describe_groups(
        &self,
        _file: &Path,
        _target: &DescribeTarget,
        _cache_key: Option<&str>,
    ) -> LexicutResult<Vec<GroupDescription>> {
        self.next()?;
        Ok(vec![GroupDescription {
            group_id: "g1".to_string(),
            description: "Two people talking".to_string(),
        }])
    }
}

fn fast_policy(max_retries: usize) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        initial_backoff_ms: 2,
        max_delay_secs: 1,
    }
}

fn target() -> DescribeTarget {
    DescribeTarget::Ranges(vec![(0.0, 5.0)])
}

#[tokio::test]
async fn test_rate_limits_are_retried_until_success() {
    let describer = RetryingDescriber::new(FlakyDescriber::new(2, Failure::RateLimit), fast_policy(3));

    let descriptions = describer
        .describe_ranges(Path::new("clip.mp4"), &target(), Some("cid-1"))
        .await
        .expect("never fails");

    assert_eq!(descriptions.len(), 1);
    assert_eq!(describer.inner().calls(), 3);
}

#[tokio::test]
async fn test_exhausted_retries_degrade_to_empty() {
    let describer = RetryingDescriber::new(FlakyDescriber::new(10, Failure::RateLimit), fast_policy(2));

    let descriptions = describer
        .describe_groups(Path::new("clip.mp4"), &target(), None)
        .await
        .expect("never fails");

    assert!(descriptions.is_empty());
    assert_eq!(describer.inner().calls(), 3);
}

#[tokio::test]
async fn test_permanent_errors_are_not_retried() {
    let describer = RetryingDescriber::new(FlakyDescriber::new(1, Failure::Unsupported), fast_policy(3));

    let descriptions = describer
        .describe_ranges(Path::new("clip.mp4"), &target(), None)
        .await
        .expect("never fails");

    assert!(descriptions.is_empty());
    assert_eq!(describer.inner().calls(), 1);
}

#[tokio::test]
async fn test_transport_failures_are_retried() {
    let describer = RetryingDescriber::new(FlakyDescriber::new(1, Failure::Transport), fast_policy(3));

    let descriptions = describer
        .describe_ranges(Path::new("clip.mp4"), &target(), None)
        .await
        .expect("never fails");

    assert_eq!(descriptions.len(), 1);
    assert_eq!(describer.inner().calls(), 2);
}

#[test]
fn test_default_policy_matches_documented_values() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_retries, 3);
    assert_eq!(policy.initial_backoff_ms, 1000);
    assert_eq!(policy.max_delay_secs, 30);
}
