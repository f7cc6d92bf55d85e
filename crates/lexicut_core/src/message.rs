//! Message types for the reasoning-service conversation history.

use crate::Role;
use serde::{Deserialize, Serialize};

/// One block of message content.
///
/// Serialized in the Messages API wire shape so histories can be sent as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text
    Text {
        /// The text
        text: String,
    },
    /// A tool invocation requested by the assistant
    ToolUse {
        /// Tool call id
        id: String,
        /// Tool name
        name: String,
        /// Parsed arguments
        input: serde_json::Value,
    },
    /// The result of executing a tool call
    ToolResult {
        /// Id of the tool call this answers
        tool_use_id: String,
        /// Human-readable outcome
        content: String,
        /// Whether execution failed
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
}

/// A message in the conversation.
///
/// # Examples
///
/// ```
/// use lexicut_core::{Message, Role};
///
/// let message = Message::user_text("Remove the filler words.");
/// assert_eq!(message.role, Role::User);
/// assert_eq!(message.content.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender
    pub role: Role,
    /// The content blocks of the message
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// A user message with a single text block.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    /// An assistant message with a single text block.
    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    /// Concatenated text of all text blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

/// A tool/function call made by the reasoning service.
///
/// # Examples
///
/// ```
/// use lexicut_core::ToolCall;
/// use serde_json::json;
///
/// let call = ToolCall {
///     id: "toolu_01".to_string(),
///     name: "delete_sentences".to_string(),
///     arguments: json!({"sentence_ids": ["s1"]}),
/// };
///
/// assert_eq!(call.name, "delete_sentences");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool to call
    pub name: String,
    /// Arguments to pass to the tool
    pub arguments: serde_json::Value,
}

impl From<&ToolCall> for ContentBlock {
    fn from(call: &ToolCall) -> Self {
        ContentBlock::ToolUse {
            id: call.id.clone(),
            name: call.name.clone(),
            input: call.arguments.clone(),
        }
    }
}
