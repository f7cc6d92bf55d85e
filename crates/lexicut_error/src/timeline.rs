//! Edit session validation errors.

/// Reasons an edit was refused by the session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum TimelineErrorKind {
    /// Override footage must come from a B-roll eligible source
    #[display("Source '{}' is not B-roll eligible", _0)]
    IneligibleSource(String),
    /// Source id is not part of the project
    #[display("Unknown source: {}", _0)]
    UnknownSource(String),
    /// Override window is empty, negative or outside the source
    #[display("Invalid override window: {}", _0)]
    InvalidWindow(String),
}

/// Edit session error with location tracking.
///
/// # Examples
///
/// ```
/// use lexicut_error::{TimelineError, TimelineErrorKind};
///
/// let err = TimelineError::new(TimelineErrorKind::IneligibleSource("a".to_string()));
/// assert!(format!("{}", err).contains("not B-roll eligible"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Timeline Error: {} at line {} in {}", kind, line, file)]
pub struct TimelineError {
    /// The kind of error that occurred
    pub kind: TimelineErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl TimelineError {
    /// Create a new timeline error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TimelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
