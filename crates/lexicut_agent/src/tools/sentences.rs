//! Whole-sentence edits.

use super::{EditTool, ToolOutput, parse_args};
use lexicut_error::AgentResult;
use lexicut_timeline::EditSession;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SentenceIdsArgs {
    sentence_ids: Vec<String>,
}

fn sentence_ids_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "sentence_ids": {
                "type": "array",
                "items": {"type": "string"},
                "description": description
            }
        },
        "required": ["sentence_ids"]
    })
}

/// Exclude whole sentences from the cut.
pub struct DeleteSentencesTool;

impl EditTool for DeleteSentencesTool {
    fn name(&self) -> &'static str {
        "delete_sentences"
    }

    fn description(&self) -> &'static str {
        "Remove whole sentences from the edit. Use for retakes, false starts and off-topic material. \
         Deleted sentences stay in the screenplay and can be restored."
    }

    fn input_schema(&self) -> Value {
        sentence_ids_schema("Ids of the sentences to delete, e.g. [\"s3\", \"s4\"]")
    }

    fn execute(&self, input: Value, session: &mut EditSession) -> AgentResult<ToolOutput> {
        let args: SentenceIdsArgs = parse_args(self.name(), input)?;
        let report = session.delete_sentences(&args.sentence_ids);
        Ok(ToolOutput::from_report("Deleted sentences", &report))
    }
}

/// Bring deleted sentences back.
pub struct RestoreSentencesTool;

impl EditTool for RestoreSentencesTool {
    fn name(&self) -> &'static str {
        "restore_sentences"
    }

    fn description(&self) -> &'static str {
        "Restore previously deleted sentences."
    }

    fn input_schema(&self) -> Value {
        sentence_ids_schema("Ids of the sentences to restore")
    }

    fn execute(&self, input: Value, session: &mut EditSession) -> AgentResult<ToolOutput> {
        let args: SentenceIdsArgs = parse_args(self.name(), input)?;
        let report = session.restore_sentences(&args.sentence_ids);
        Ok(ToolOutput::from_report("Restored sentences", &report))
    }
}

/// Change the running order.
pub struct ReorderSentencesTool;

impl EditTool for ReorderSentencesTool {
    fn name(&self) -> &'static str {
        "reorder_sentences"
    }

    fn description(&self) -> &'static str {
        "Set the playback order. List sentence ids in the desired order; any sentence you leave out \
         keeps its relative position after the listed ones."
    }

    fn input_schema(&self) -> Value {
        sentence_ids_schema("Sentence ids in the new playback order")
    }

    fn execute(&self, input: Value, session: &mut EditSession) -> AgentResult<ToolOutput> {
        let args: SentenceIdsArgs = parse_args(self.name(), input)?;
        let report = session.reorder(&args.sentence_ids);
        Ok(ToolOutput::from_report("Moved sentences", &report))
    }
}
