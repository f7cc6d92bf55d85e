//! Core type definitions for collaborator contracts.

use lexicut_core::{Message, Word};
use serde::{Deserialize, Serialize};

/// One decoded event from a streamed reasoning response.
///
/// Tool-argument fragments arrive as raw partial JSON and are only parsed
/// once their content block closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StreamEvent {
    /// Response started
    MessageStart {
        /// Response id assigned by the service
        id: String,
    },
    /// A text block opened at `index`
    TextStart {
        /// Content block index
        index: usize,
    },
    /// A tool-use block opened at `index`
    ToolUseStart {
        /// Content block index
        index: usize,
        /// Tool call id
        id: String,
        /// Tool name
        name: String,
    },
    /// Incremental text for the block at `index`
    TextDelta {
        /// Content block index
        index: usize,
        /// Text fragment
        text: String,
    },
    /// Incremental tool arguments for the block at `index`
    InputJsonDelta {
        /// Content block index
        index: usize,
        /// Partial JSON fragment
        partial_json: String,
    },
    /// The block at `index` is complete
    BlockStop {
        /// Content block index
        index: usize,
    },
    /// Response-level update carrying the stop reason
    MessageDelta {
        /// Why generation stopped
        stop_reason: Option<StopReason>,
    },
    /// Response finished
    MessageStop,
    /// Keep-alive
    Ping,
}

/// Why generation stopped.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Model completed naturally
    EndTurn,
    /// Hit the max token limit
    MaxTokens,
    /// Hit a stop sequence
    StopSequence,
    /// Model requested tool calls
    ToolUse,
    /// Model declined to continue
    Refusal,
    /// Anything else
    #[serde(other)]
    Other,
}

/// Definition of a tool the reasoning service may call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Name of the tool
    pub name: String,
    /// Human-readable description of what the tool does
    pub description: String,
    /// JSON Schema of the arguments
    pub input_schema: serde_json::Value,
}

/// Result of a tool execution to send back to the reasoning service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Id of the tool call this responds to
    pub id: String,
    /// Human-readable description of what happened
    pub content: String,
    /// Whether execution failed
    pub is_error: bool,
}

/// One request to the reasoning service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningRequest {
    /// System prompt
    pub system_prompt: String,
    /// Fixed tool schema
    pub tools: Vec<ToolDefinition>,
    /// Running message history
    pub messages: Vec<Message>,
    /// Output token cap
    pub max_tokens: u32,
}

/// Output of the transcription collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcription {
    /// Recognized words
    pub words: Vec<Word>,
    /// Detected language code
    pub language_code: String,
    /// Confidence of the language detection
    pub language_probability: f64,
}

/// What the description collaborator should describe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DescribeTarget {
    /// Explicit time ranges `(start, end)` in seconds
    Ranges(Vec<(f64, f64)>),
    /// Phrase groups `(group_id, start, end)`
    Groups(Vec<(String, f64, f64)>),
}

/// Description of one time range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeDescription {
    /// Range start in seconds
    pub start: f64,
    /// Range end in seconds
    pub end: f64,
    /// What the footage shows
    pub description: String,
}

/// Description of one phrase group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDescription {
    /// Phrase group id
    pub group_id: String,
    /// What the footage shows
    pub description: String,
}

/// A unit submitted to the narrative-ordering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderingGroup {
    /// Group id
    pub id: String,
    /// Source display name
    pub source: String,
    /// Spoken text
    pub text: String,
    /// Start time in seconds
    pub start_time: f64,
    /// End time in seconds
    pub end_time: f64,
    /// Mean word confidence
    pub confidence: f64,
    /// Visual description, when one is known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A cluster of retakes of the same content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateCluster {
    /// Group ids that repeat the same content
    pub group_ids: Vec<String>,
    /// The take to keep
    pub keeper_id: String,
    /// Why these were clustered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Raw response of the narrative-ordering collaborator, before repair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderingResponse {
    /// Proposed total ordering of group ids
    pub ordered_ids: Vec<String>,
    /// Detected retake clusters
    #[serde(default, alias = "duplicateGroups")]
    pub duplicates: Vec<DuplicateCluster>,
    /// One-paragraph narrative summary
    #[serde(default)]
    pub narrative_summary: String,
}
