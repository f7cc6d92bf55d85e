//! Error types for the Lexicut edit session engine.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use lexicut_error::{HttpError, LexicutResult};
//!
//! fn fetch_order() -> LexicutResult<Vec<String>> {
//!     Err(HttpError::new("Connection refused"))?
//! }
//!
//! assert!(fetch_order().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod agent;
mod backend;
mod cache;
mod config;
mod error;
mod http;
mod json;
mod models;
mod storage;
mod timeline;

pub use agent::{AgentError, AgentErrorKind, AgentResult};
pub use backend::BackendError;
pub use cache::{CacheError, CacheErrorKind};
pub use config::ConfigError;
pub use error::{LexicutError, LexicutErrorKind, LexicutResult};
pub use http::HttpError;
pub use json::JsonError;
pub use models::{ModelsError, ModelsErrorKind, ModelsResult, RetryableError};
pub use storage::{StorageError, StorageErrorKind};
pub use timeline::{TimelineError, TimelineErrorKind};
