//! The fixed vocabulary of timeline edits offered to the reasoning service.

mod broll;
mod sentences;
mod words;

pub use broll::{ClassifyBrollTool, ClearVideoOverrideTool, SetVideoOverrideTool};
pub use sentences::{DeleteSentencesTool, ReorderSentencesTool, RestoreSentencesTool};
pub use words::{DeleteWordsTool, RestoreWordsTool};

use lexicut_core::ToolCall;
use lexicut_error::{AgentError, AgentErrorKind, AgentResult};
use lexicut_interface::{ToolDefinition, ToolResult};
use lexicut_timeline::{EditReport, EditSession};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// What a tool did to the session.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    /// Result text returned to the reasoning service
    pub content: String,
    /// Command recorded by the edit, if it changed anything
    pub command_id: Option<Uuid>,
}

impl ToolOutput {
    fn from_report(verb: &str, report: &EditReport) -> Self {
        let mut content = if report.changed.is_empty() {
            format!("No change ({verb}).")
        } else {
            format!("{verb}: {}.", report.changed.join(", "))
        };
        if !report.ignored.is_empty() {
            content.push_str(&format!(" Ignored unknown ids: {}.", report.ignored.join(", ")));
        }
        Self {
            content,
            command_id: report.command_id,
        }
    }
}

/// One timeline-mutating tool.
///
/// Execution is synchronous: tools run between two streamed responses, never
/// concurrently with each other.
pub trait EditTool: Send + Sync {
    /// Tool name as seen by the reasoning service.
    fn name(&self) -> &'static str;

    /// Description for the reasoning service.
    fn description(&self) -> &'static str;

    /// JSON Schema of the arguments.
    fn input_schema(&self) -> Value;

    /// Validate the arguments and apply the edit.
    ///
    /// # Errors
    ///
    /// Fails when the arguments do not match the schema or the session
    /// refuses the edit.
    fn execute(&self, input: Value, session: &mut EditSession) -> AgentResult<ToolOutput>;

    /// Definition sent with every request.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Deserialize tool arguments into their typed form.
fn parse_args<T: DeserializeOwned>(tool: &str, input: Value) -> AgentResult<T> {
    serde_json::from_value(input).map_err(|e| {
        AgentError::new(AgentErrorKind::InvalidArguments {
            tool: tool.to_string(),
            message: e.to_string(),
        })
    })
}

/// Outcome of dispatching one tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolExecution {
    /// Result block for the next request
    pub result: ToolResult,
    /// Command recorded by the call, if any
    pub command_id: Option<Uuid>,
}

/// Registry of the tools offered to the reasoning service.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn EditTool>>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registers a tool, replacing any tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn EditTool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Gets a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn EditTool>> {
        self.tools.get(name).cloned()
    }

    /// Tool definitions, sorted by name so requests are stable.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> =
            self.tools.values().map(|tool| tool.definition()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Execute one call against the session.
    ///
    /// Never fails: unknown tools, malformed arguments and refused edits come
    /// back as error results for the reasoning service to read.
    #[instrument(skip(self, call, session), fields(tool = %call.name, id = %call.id))]
    pub fn execute(&self, call: &ToolCall, session: &mut EditSession) -> ToolExecution {
        let outcome = self
            .get(&call.name)
            .ok_or_else(|| AgentError::new(AgentErrorKind::UnknownTool(call.name.clone())))
            .and_then(|tool| tool.execute(call.arguments.clone(), session));

        match outcome {
            Ok(output) => {
                debug!(command = ?output.command_id, "Tool applied");
                ToolExecution {
                    result: ToolResult {
                        id: call.id.clone(),
                        content: output.content,
                        is_error: false,
                    },
                    command_id: output.command_id,
                }
            }
            Err(e) => {
                warn!(error = %e.kind, "Tool call failed");
                ToolExecution {
                    result: ToolResult {
                        id: call.id.clone(),
                        content: format!("Error: {}", e.kind),
                        is_error: true,
                    },
                    command_id: None,
                }
            }
        }
    }

    /// Gets the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns true if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    /// The eight timeline edit tools.
    fn default() -> Self {
        let mut registry = Self::new();

        registry.register(Arc::new(DeleteWordsTool));
        registry.register(Arc::new(RestoreWordsTool));
        registry.register(Arc::new(DeleteSentencesTool));
        registry.register(Arc::new(RestoreSentencesTool));
        registry.register(Arc::new(ReorderSentencesTool));
        registry.register(Arc::new(ClassifyBrollTool));
        registry.register(Arc::new(SetVideoOverrideTool));
        registry.register(Arc::new(ClearVideoOverrideTool));

        debug!(tools = registry.len(), "ToolRegistry initialized");
        registry
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.tools.keys().collect();
        names.sort();
        f.debug_struct("ToolRegistry").field("tools", &names).finish()
    }
}
