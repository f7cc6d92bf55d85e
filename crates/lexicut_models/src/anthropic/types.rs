//! Wire types for the Messages API.

use derive_builder::Builder;
use derive_getters::Getters;
use lexicut_core::{ContentBlock, Message};
use lexicut_interface::{StopReason, ToolDefinition};
use serde::{Deserialize, Serialize};

/// Request body for `POST /v1/messages`.
///
/// # Examples
///
/// ```
/// use lexicut_core::Message;
/// use lexicut_models::AnthropicRequest;
///
/// let request = AnthropicRequest::builder()
///     .model("claude-sonnet-4-5")
///     .max_tokens(256u32)
///     .messages(vec![Message::user_text("Hello")])
///     .build()
///     .unwrap();
/// assert!(!request.stream());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Builder, Getters)]
#[builder(setter(into))]
pub struct AnthropicRequest {
    /// Model identifier
    model: String,
    /// Output token cap
    max_tokens: u32,
    /// System prompt
    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Conversation so far
    messages: Vec<Message>,
    /// Tools the model may call
    #[builder(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDefinition>,
    /// Whether to stream the response as server-sent events
    #[builder(default)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

impl AnthropicRequest {
    /// Start building a request.
    pub fn builder() -> AnthropicRequestBuilder {
        AnthropicRequestBuilder::default()
    }
}

/// Token usage reported with a response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct AnthropicUsage {
    /// Prompt tokens
    #[serde(default)]
    input_tokens: u64,
    /// Generated tokens
    #[serde(default)]
    output_tokens: u64,
}

/// Non-streamed response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct AnthropicResponse {
    /// Response id
    id: String,
    /// Generated content blocks
    content: Vec<ContentBlock>,
    /// Why generation stopped
    #[serde(default)]
    stop_reason: Option<StopReason>,
    /// Token usage
    #[serde(default)]
    usage: AnthropicUsage,
}

impl AnthropicResponse {
    /// Concatenated text of all text blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}
