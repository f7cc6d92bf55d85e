//! Background-job sharing and result caching for Lexicut.
//!
//! Collaborator work (transcription, description) is keyed by the content
//! fingerprint of the source file. [`JobRegistry`] lets a second request for
//! the same fingerprint join the job already running, and [`ResultCache`]
//! keeps finished results for a while so re-opening a project does not repeat
//! the work.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod jobs;

pub use cache::{CacheEntry, ResultCache, ResultCacheConfig, ResultCacheConfigBuilder};
pub use jobs::JobRegistry;
