//! Top-level error wrapper types.

use crate::{
    AgentError, BackendError, CacheError, ConfigError, HttpError, JsonError, ModelsError,
    StorageError, TimelineError,
};

/// All error conditions surfaced by Lexicut crates.
///
/// # Examples
///
/// ```
/// use lexicut_error::{HttpError, LexicutError};
///
/// let err: LexicutError = HttpError::new("Connection failed").into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum LexicutErrorKind {
    /// HTTP transport error
    #[from(HttpError)]
    Http(HttpError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Generic collaborator error
    #[from(BackendError)]
    Backend(BackendError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Edit validation error
    #[from(TimelineError)]
    Timeline(TimelineError),
    /// Persistence error
    #[from(StorageError)]
    Storage(StorageError),
    /// Reasoning-service error
    #[from(ModelsError)]
    Models(ModelsError),
    /// Tool dispatch error
    #[from(AgentError)]
    Agent(AgentError),
    /// Job registry or cache error
    #[from(CacheError)]
    Cache(CacheError),
}

/// Lexicut error with kind discrimination.
///
/// # Examples
///
/// ```
/// use lexicut_error::{ConfigError, LexicutResult};
///
/// fn might_fail() -> LexicutResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Lexicut Error: {}", _0)]
pub struct LexicutError(Box<LexicutErrorKind>);

impl LexicutError {
    /// Create a new error from a kind.
    pub fn new(kind: LexicutErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &LexicutErrorKind {
        &self.0
    }
}

impl<T> From<T> for LexicutError
where
    T: Into<LexicutErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Lexicut operations.
pub type LexicutResult<T> = std::result::Result<T, LexicutError>;
