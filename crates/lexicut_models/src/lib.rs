//! Reasoning-service integrations for Lexicut.
//!
//! - [`AnthropicClient`] implements [`ReasoningDriver`](lexicut_interface::ReasoningDriver)
//!   over the streamed Messages API.
//! - [`AnthropicOrderer`] implements [`NarrativeOrderer`](lexicut_interface::NarrativeOrderer)
//!   by asking for a JSON ordering.
//! - [`RetryingDescriber`] wraps any description collaborator with bounded
//!   exponential backoff and degrades to an empty result.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod anthropic;
mod extraction;
mod retry;
mod sse;

pub use anthropic::{
    AnthropicClient, AnthropicOrderer, AnthropicRequest, AnthropicRequestBuilder,
    AnthropicResponse, AnthropicUsage, DEFAULT_MODEL,
};
pub use extraction::extract_json;
pub use retry::{RetryPolicy, RetryingDescriber};
pub use sse::{SseDecoder, SseEvent, decode_event, decode_sse_stream};
