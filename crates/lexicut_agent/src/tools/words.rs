//! Word-level cuts inside one sentence.

use super::{EditTool, ToolOutput, parse_args};
use lexicut_error::AgentResult;
use lexicut_timeline::EditSession;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WordIdsArgs {
    sentence_id: String,
    word_ids: Vec<String>,
}

fn word_ids_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "sentence_id": {
                "type": "string",
                "description": "Sentence that owns the words"
            },
            "word_ids": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Word ids inside that sentence"
            }
        },
        "required": ["sentence_id", "word_ids"]
    })
}

/// Cut individual words, such as filler words.
pub struct DeleteWordsTool;

impl EditTool for DeleteWordsTool {
    fn name(&self) -> &'static str {
        "delete_words"
    }

    fn description(&self) -> &'static str {
        "Cut individual words out of one sentence, for filler words (um, uh, like) and stumbles. \
         Word ids must belong to the given sentence."
    }

    fn input_schema(&self) -> Value {
        word_ids_schema()
    }

    fn execute(&self, input: Value, session: &mut EditSession) -> AgentResult<ToolOutput> {
        let args: WordIdsArgs = parse_args(self.name(), input)?;
        let report = session.delete_words(&args.sentence_id, &args.word_ids);
        Ok(ToolOutput::from_report(
            &format!("Cut words in {}", args.sentence_id),
            &report,
        ))
    }
}

/// Undo word cuts.
pub struct RestoreWordsTool;

impl EditTool for RestoreWordsTool {
    fn name(&self) -> &'static str {
        "restore_words"
    }

    fn description(&self) -> &'static str {
        "Restore words previously cut from one sentence."
    }

    fn input_schema(&self) -> Value {
        word_ids_schema()
    }

    fn execute(&self, input: Value, session: &mut EditSession) -> AgentResult<ToolOutput> {
        let args: WordIdsArgs = parse_args(self.name(), input)?;
        let report = session.restore_words(&args.sentence_id, &args.word_ids);
        Ok(ToolOutput::from_report(
            &format!("Restored words in {}", args.sentence_id),
            &report,
        ))
    }
}
