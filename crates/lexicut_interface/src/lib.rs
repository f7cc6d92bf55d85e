//! Trait definitions for the external collaborators of the Lexicut engine.
//!
//! The engine talks to transcription, description, narrative-ordering and
//! reasoning services only through the narrow contracts defined here.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;
mod types;

pub use traits::{Describer, EventStream, NarrativeOrderer, ReasoningDriver, Transcriber};
pub use types::{
    DescribeTarget, DuplicateCluster, GroupDescription, OrderingGroup, OrderingResponse,
    RangeDescription, ReasoningRequest, StopReason, StreamEvent, ToolDefinition, ToolResult,
    Transcription,
};
