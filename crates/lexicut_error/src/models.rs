//! Reasoning-service errors and retry classification.

/// Reasoning-service error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ModelsErrorKind {
    /// API key not found in environment
    #[display("ANTHROPIC_API_KEY environment variable not set")]
    MissingApiKey,
    /// Service answered with a non-success status
    #[display("API error {}: {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },
    /// Service is throttling requests
    #[display("Rate limited: {}", _0)]
    RateLimited(String),
    /// Response had no body to stream
    #[display("Response body absent")]
    MissingBody,
    /// Stream broke or carried an error event
    #[display("Stream error: {}", _0)]
    Stream(String),
    /// Response could not be parsed
    #[display("Failed to parse response: {}", _0)]
    Parse(String),
    /// Request builder rejected its inputs
    #[display("Builder error: {}", _0)]
    Builder(String),
}

impl ModelsErrorKind {
    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ModelsErrorKind::Api { status, .. } => {
                matches!(*status, 408 | 429 | 500 | 502 | 503 | 504 | 529)
            }
            ModelsErrorKind::RateLimited(_) => true,
            _ => false,
        }
    }
}

/// Reasoning-service error with location tracking.
///
/// # Examples
///
/// ```
/// use lexicut_error::{ModelsError, ModelsErrorKind, RetryableError};
///
/// let err = ModelsError::new(ModelsErrorKind::Api {
///     status: 429,
///     message: "slow down".to_string(),
/// });
/// assert!(err.is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Models Error: {} at {}:{}", kind, file, line)]
pub struct ModelsError {
    /// The specific error kind
    pub kind: ModelsErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// Source file where error occurred
    pub file: &'static str,
}

impl ModelsError {
    /// Create a new models error.
    #[track_caller]
    pub fn new(kind: ModelsErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Result type for model operations.
pub type ModelsResult<T> = Result<T, ModelsError>;

/// Trait for errors that support retry logic.
///
/// Backoff timing comes from the caller's retry policy; the error only
/// decides whether another attempt is worthwhile.
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    fn is_retryable(&self) -> bool;
}

impl RetryableError for ModelsError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
