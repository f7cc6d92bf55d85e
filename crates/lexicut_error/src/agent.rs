//! Agent tool-dispatch errors.
//!
//! These never escape the tool loop: they are rendered into error tool
//! results and sent back to the reasoning service.

/// Specific error conditions for tool dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum AgentErrorKind {
    /// The reasoning service asked for a tool outside the fixed vocabulary
    #[display("Unknown tool: {}", _0)]
    UnknownTool(String),
    /// Tool arguments did not match the declared schema
    #[display("Invalid arguments for '{}': {}", tool, message)]
    InvalidArguments {
        /// Tool name
        tool: String,
        /// Deserialization or validation message
        message: String,
    },
    /// Arguments were well-formed but rejected by the session
    #[display("Rejected '{}': {}", tool, message)]
    Rejected {
        /// Tool name
        tool: String,
        /// Why the session refused the operation
        message: String,
    },
}

/// Error type for tool dispatch.
///
/// # Examples
///
/// ```
/// use lexicut_error::{AgentError, AgentErrorKind};
///
/// let err = AgentError::new(AgentErrorKind::UnknownTool("split_sentence".to_string()));
/// assert!(format!("{}", err).contains("split_sentence"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Agent Error: {} at line {} in {}", kind, line, file)]
pub struct AgentError {
    /// The specific error condition
    pub kind: AgentErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl AgentError {
    /// Create a new AgentError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: AgentErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Result type for tool dispatch.
pub type AgentResult<T> = Result<T, AgentError>;
