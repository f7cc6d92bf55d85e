//! Anthropic Messages API integration.

mod client;
mod orderer;
mod types;

pub use client::{AnthropicClient, DEFAULT_MODEL};
pub use orderer::AnthropicOrderer;
pub use types::{AnthropicRequest, AnthropicRequestBuilder, AnthropicResponse, AnthropicUsage};
