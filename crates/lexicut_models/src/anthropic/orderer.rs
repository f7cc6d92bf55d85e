//! Narrative ordering backed by the Messages API.

use crate::{AnthropicClient, extract_json};
use lexicut_core::Message;
use lexicut_error::{BackendError, JsonError, LexicutResult};
use lexicut_interface::{NarrativeOrderer, OrderingGroup, OrderingResponse, ReasoningRequest};
use std::collections::HashMap;
use std::fmt::Write;
use tracing::{debug, instrument};

const ORDERING_PROMPT: &str = "You are a documentary editor assembling a rough cut from \
several camera sources. You receive numbered phrase groups, each with its source, time range, \
transcription confidence and text. Decide the order that tells the clearest story, identify \
groups that are retakes of the same content and pick the best take of each, and summarize the \
narrative in one paragraph.

Respond with ONLY a JSON object of this shape:
{\"orderedIds\": [\"g1\", ...], \"duplicates\": [{\"groupIds\": [\"g2\", \"g5\"], \"keeperId\": \"g5\", \"reason\": \"...\"}], \"narrativeSummary\": \"...\"}

Every group id must appear exactly once in orderedIds.";

/// [`NarrativeOrderer`] that asks the model for a JSON ordering.
#[derive(Debug, Clone)]
pub struct AnthropicOrderer {
    client: AnthropicClient,
    max_tokens: u32,
}

impl AnthropicOrderer {
    /// Wrap a client.
    pub fn new(client: AnthropicClient, max_tokens: u32) -> Self {
        Self { client, max_tokens }
    }

    fn render(groups: &[OrderingGroup]) -> Result<String, std::fmt::Error> {
        let mut listing = String::new();
        for group in groups {
            writeln!(
                listing,
                "[{}] source={} {:.1}s-{:.1}s confidence={:.2}",
                group.id, group.source, group.start_time, group.end_time, group.confidence
            )?;
            if let Some(description) = &group.description {
                writeln!(listing, "visual: {description}")?;
            }
            writeln!(listing, "{}\n", group.text)?;
        }
        Ok(listing)
    }
}

#[async_trait::async_trait]
impl NarrativeOrderer for AnthropicOrderer {
    #[instrument(skip_all, fields(groups = groups.len()))]
    async fn order(
        &self,
        groups: &[OrderingGroup],
        source_names: &HashMap<String, String>,
    ) -> LexicutResult<OrderingResponse> {
        let mut sources: Vec<&String> = source_names.values().collect();
        sources.sort();
        let listing = Self::render(groups)
            .map_err(|e| BackendError::new(format!("Failed to render phrase groups: {e}")))?;
        let prompt = format!(
            "Sources: {}\n\nPhrase groups:\n\n{}",
            sources
                .iter()
                .map(|name| name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            listing
        );

        let request = ReasoningRequest {
            system_prompt: ORDERING_PROMPT.to_string(),
            tools: Vec::new(),
            messages: vec![Message::user_text(prompt)],
            max_tokens: self.max_tokens,
        };
        let wire = self.client.build_request(&request, false)?;
        let response = self.client.complete(&wire).await?;

        let json = extract_json(&response.text())?;
        let parsed: OrderingResponse = serde_json::from_str(&json)
            .map_err(|e| JsonError::new(format!("Invalid ordering response: {}", e)))?;
        debug!(
            ordered = parsed.ordered_ids.len(),
            duplicates = parsed.duplicates.len(),
            "Parsed ordering response"
        );
        Ok(parsed)
    }
}
