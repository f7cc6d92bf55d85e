//! Job registry and cache errors.

/// Kinds of cache errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum CacheErrorKind {
    /// The shared job finished with an error
    #[display("Job '{}' failed: {}", key, message)]
    JobFailed {
        /// Content fingerprint the job was registered under
        key: String,
        /// Failure message from the job
        message: String,
    },
    /// Cached value could not be decoded into the requested type
    #[display("Cached value for '{}' is unreadable: {}", key, message)]
    Decode {
        /// Cache key
        key: String,
        /// Decode message
        message: String,
    },
    /// Cache file could not be written
    #[display("Failed to persist cache to {}: {}", path, message)]
    Persist {
        /// Cache file path
        path: String,
        /// I/O or encoding message
        message: String,
    },
}

/// Cache error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Cache Error: {} at line {} in {}", kind, line, file)]
pub struct CacheError {
    /// The kind of error that occurred
    pub kind: CacheErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CacheError {
    /// Create a new cache error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CacheErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
