//! Test utilities for facade tests.
//!
//! In-process collaborators standing in for transcription, description,
//! ordering and reasoning services.

pub mod collaborators;

#[allow(unused_imports)]
pub use collaborators::{
    MockDescriber, MockOrderer, MockTranscriber, ScriptedDriver, delete_then_summarize, word,
};
