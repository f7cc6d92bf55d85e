//! Agentic tool loop for Lexicut.
//!
//! A reasoning service edits an [`EditSession`](lexicut_timeline::EditSession)
//! through a fixed vocabulary of tools. Each round streams one response,
//! applies the tool calls it contains in order, and feeds the results back,
//! until the service stops calling tools or the round cap is reached.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod accumulator;
mod assembly_cut;
mod prompts;
mod runner;
mod screenplay;
mod tools;

pub use accumulator::{AssistantTurn, ResponseAccumulator};
pub use assembly_cut::{AssemblyCutOutcome, run_assembly_cut};
pub use prompts::{ASSEMBLY_CUT_INSTRUCTION, ASSEMBLY_CUT_PROMPT, EDIT_SYSTEM_PROMPT};
pub use runner::{AgentConfig, AgentConfigBuilder, AgentLoop, AgentOutcome, LoopState};
pub use screenplay::format_screenplay;
pub use tools::{
    ClassifyBrollTool, ClearVideoOverrideTool, DeleteSentencesTool, DeleteWordsTool, EditTool,
    ReorderSentencesTool, RestoreSentencesTool, RestoreWordsTool, SetVideoOverrideTool,
    ToolExecution, ToolOutput, ToolRegistry,
};
