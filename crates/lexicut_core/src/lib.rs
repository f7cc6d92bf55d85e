//! Core data types for the Lexicut edit session engine.
//!
//! This crate provides the transcript model (words, sentences, phrase groups,
//! sources) and the conversation types exchanged with the reasoning service.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod message;
mod role;
mod source;
mod transcript;

pub use message::{ContentBlock, Message, ToolCall};
pub use role::Role;
pub use source::{Source, SourceDescription};
pub use transcript::{PhraseGroup, Sentence, Word};
