//! The bounded request, stream and execute loop.

use crate::{EDIT_SYSTEM_PROMPT, ResponseAccumulator, ToolRegistry, format_screenplay};
use derive_builder::Builder;
use futures_util::StreamExt;
use lexicut_core::{ContentBlock, Message, Role};
use lexicut_error::{LexicutError, LexicutResult};
use lexicut_interface::{ReasoningDriver, ReasoningRequest, StreamEvent};
use lexicut_timeline::EditSession;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Loop limits.
///
/// ```toml
/// [agent]
/// max_iterations = 20
/// max_tokens = 4096
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(default)]
pub struct AgentConfig {
    /// Request rounds before the loop stops on its own
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Output token cap per request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_max_iterations() -> usize {
    20
}

fn default_max_tokens() -> u32 {
    4096
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Loop states, for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum LoopState {
    /// Sending the history to the service
    Requesting,
    /// Consuming the event stream
    Streaming,
    /// Response parsed, tool calls waiting
    ToolsPending,
    /// Applying tool calls to the session
    Executing,
    /// Service stopped calling tools
    Done,
    /// Transport failure
    Error,
}

/// How a loop invocation ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentOutcome {
    /// False only when the loop could not finish normally
    pub success: bool,
    /// Final answer, or the iteration-limit notice
    pub message: String,
    /// Request rounds made
    pub iterations: usize,
    /// Tool calls executed, including failed ones
    pub tool_call_count: usize,
    /// Commands recorded, in execution order
    pub command_ids: Vec<Uuid>,
}

/// Drives one reasoning service against an [`EditSession`].
///
/// # Examples
///
/// ```rust,ignore
/// use lexicut_agent::{AgentConfig, AgentLoop};
///
/// let outcome = AgentLoop::new(&client)
///     .with_config(AgentConfig::default())
///     .run(&mut session, "Remove the filler words", |text| print!("{text}"))
///     .await?;
/// println!("{} tool calls in {} rounds", outcome.tool_call_count, outcome.iterations);
/// ```
pub struct AgentLoop<'a, D: ?Sized> {
    driver: &'a D,
    registry: ToolRegistry,
    config: AgentConfig,
    system_prompt: String,
}

impl<'a, D: ReasoningDriver + ?Sized> AgentLoop<'a, D> {
    /// A loop with the default tools, limits and editing prompt.
    pub fn new(driver: &'a D) -> Self {
        Self {
            driver,
            registry: ToolRegistry::default(),
            config: AgentConfig::default(),
            system_prompt: EDIT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Override the loop limits.
    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Offer a different tool set.
    pub fn with_registry(mut self, registry: ToolRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Run until the service stops calling tools or the round cap is hit.
    ///
    /// Text deltas are passed to `on_text` as they arrive. Tool failures go
    /// back to the service as error results and never end the loop.
    ///
    /// # Errors
    ///
    /// Returns the transport error if a request or its stream fails. Edits
    /// made in earlier rounds stay applied and stay individually undoable.
    #[instrument(
        skip(self, session, instruction, on_text),
        fields(provider = self.driver.provider_name(), model = self.driver.model_name())
    )]
    pub async fn run<F>(
        &self,
        session: &mut EditSession,
        instruction: &str,
        mut on_text: F,
    ) -> LexicutResult<AgentOutcome>
    where
        F: FnMut(&str) + Send,
    {
        let tools = self.registry.definitions();
        let mut messages = vec![Message::user_text(format!(
            "{}\nInstruction: {}",
            format_screenplay(session),
            instruction
        ))];
        let mut outcome = AgentOutcome {
            success: false,
            message: String::new(),
            iterations: 0,
            tool_call_count: 0,
            command_ids: Vec::new(),
        };

        loop {
            if outcome.iterations >= self.config.max_iterations {
                warn!(
                    rounds = outcome.iterations,
                    commands = outcome.command_ids.len(),
                    "Tool loop reached iteration limit"
                );
                outcome.success = true;
                outcome.message = format!(
                    "Reached iteration limit ({} rounds). {} edits were applied and can be undone individually.",
                    self.config.max_iterations,
                    outcome.command_ids.len()
                );
                return Ok(outcome);
            }
            outcome.iterations += 1;

            debug!(state = %LoopState::Requesting, round = outcome.iterations);
            let request = ReasoningRequest {
                system_prompt: self.system_prompt.clone(),
                tools: tools.clone(),
                messages: messages.clone(),
                max_tokens: self.config.max_tokens,
            };
            let mut stream = self
                .driver
                .stream(&request)
                .await
                .map_err(|e| self.abort(e))?;

            debug!(state = %LoopState::Streaming, round = outcome.iterations);
            let mut accumulator = ResponseAccumulator::default();
            while let Some(event) = stream.next().await {
                let event = event.map_err(|e| self.abort(e))?;
                if let StreamEvent::TextDelta { text, .. } = &event {
                    on_text(text);
                }
                accumulator.push(event);
            }
            let turn = accumulator.finish();

            if turn.tool_calls.is_empty() {
                debug!(state = %LoopState::Done, stop_reason = ?turn.stop_reason);
                outcome.success = true;
                outcome.message = if turn.text.trim().is_empty() {
                    "Done.".to_string()
                } else {
                    turn.text
                };
                info!(
                    rounds = outcome.iterations,
                    tool_calls = outcome.tool_call_count,
                    commands = outcome.command_ids.len(),
                    "Tool loop finished"
                );
                return Ok(outcome);
            }

            debug!(
                state = %LoopState::ToolsPending,
                calls = turn.tool_calls.len(),
                stop_reason = ?turn.stop_reason
            );
            messages.push(turn.message);

            debug!(state = %LoopState::Executing);
            let mut results = Vec::with_capacity(turn.tool_calls.len());
            for call in &turn.tool_calls {
                let execution = self.registry.execute(call, session);
                outcome.tool_call_count += 1;
                outcome.command_ids.extend(execution.command_id);
                results.push(ContentBlock::ToolResult {
                    tool_use_id: execution.result.id,
                    content: execution.result.content,
                    is_error: execution.result.is_error,
                });
            }
            messages.push(Message {
                role: Role::User,
                content: results,
            });
        }
    }

    fn abort(&self, e: LexicutError) -> LexicutError {
        debug!(state = %LoopState::Error);
        error!(
            provider = self.driver.provider_name(),
            error = %e,
            "Reasoning request failed, aborting tool loop"
        );
        e
    }
}
