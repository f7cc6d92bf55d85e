//! Timeline model and edit history for Lexicut.
//!
//! The [`Timeline`] is the editable screenplay: one entry per sentence, held
//! in edit order, with exclusion and video-override state. Every user-undoable
//! mutation is recorded in the [`CommandHistory`] as an [`EditOperation`] that
//! carries its own pre-state, so any command can be undone regardless of its
//! position in the log.
//!
//! [`EditSession`] owns one project's sources, sentences, timeline and history
//! and is the only place that mutates them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod broll;
mod history;
mod session;
mod snapshot;
mod timeline;

pub use broll::{BrollClassification, BrollReason};
pub use history::{Command, CommandHistory, EditOperation};
pub use session::{EditReport, EditSession};
pub use snapshot::ProjectSnapshot;
pub use timeline::{SentenceCatalogue, Timeline, TimelineEntry, VideoOverride};
