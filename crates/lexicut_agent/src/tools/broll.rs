//! B-roll annotations and video overrides.

use super::{EditTool, ToolOutput, parse_args};
use lexicut_error::{AgentError, AgentErrorKind, AgentResult, LexicutErrorKind};
use lexicut_timeline::{BrollClassification, BrollReason, EditSession, VideoOverride};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClassificationArgs {
    sentence_id: String,
    is_broll: bool,
    reason: BrollReason,
    confidence: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClassifyArgs {
    classifications: Vec<ClassificationArgs>,
}

/// Mark sentences as better suited to B-roll.
pub struct ClassifyBrollTool;

impl EditTool for ClassifyBrollTool {
    fn name(&self) -> &'static str {
        "classify_broll"
    }

    fn description(&self) -> &'static str {
        "Annotate sentences whose audio is not worth keeping on camera, either because they are \
         irrelevant to the story or too short to stand alone. Annotations do not change the cut."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "classifications": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "sentence_id": {"type": "string"},
                            "is_broll": {"type": "boolean"},
                            "reason": {"type": "string", "enum": ["irrelevant", "too-short"]},
                            "confidence": {"type": "number", "minimum": 0, "maximum": 1}
                        },
                        "required": ["sentence_id", "is_broll", "reason", "confidence"]
                    }
                }
            },
            "required": ["classifications"]
        })
    }

    fn execute(&self, input: Value, session: &mut EditSession) -> AgentResult<ToolOutput> {
        let args: ClassifyArgs = parse_args(self.name(), input)?;
        let classifications = args
            .classifications
            .into_iter()
            .map(|c| BrollClassification {
                sentence_id: c.sentence_id,
                is_broll: c.is_broll,
                reason: c.reason,
                confidence: c.confidence,
            })
            .collect();
        let report = session.classify_broll(classifications);
        Ok(ToolOutput::from_report("Classified sentences", &report))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SetOverrideArgs {
    sentence_id: String,
    source_id: String,
    start: f64,
    end: f64,
}

/// Cover a sentence with footage from a B-roll source.
pub struct SetVideoOverrideTool;

impl EditTool for SetVideoOverrideTool {
    fn name(&self) -> &'static str {
        "set_video_override"
    }

    fn description(&self) -> &'static str {
        "Show footage from a B-roll eligible source while a sentence's audio plays. The window \
         [start, end) is in seconds of the B-roll source and must lie inside it."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "sentence_id": {"type": "string"},
                "source_id": {"type": "string", "description": "A B-roll eligible source"},
                "start": {"type": "number", "minimum": 0},
                "end": {"type": "number"}
            },
            "required": ["sentence_id", "source_id", "start", "end"]
        })
    }

    fn execute(&self, input: Value, session: &mut EditSession) -> AgentResult<ToolOutput> {
        let args: SetOverrideArgs = parse_args(self.name(), input)?;
        let video_override = VideoOverride::new(args.source_id, args.start, args.end);
        let report = session
            .set_video_override(&args.sentence_id, video_override)
            .map_err(|e| {
                let message = match e.kind() {
                    LexicutErrorKind::Timeline(refusal) => refusal.kind.to_string(),
                    other => other.to_string(),
                };
                AgentError::new(AgentErrorKind::Rejected {
                    tool: self.name().to_string(),
                    message,
                })
            })?;
        Ok(ToolOutput::from_report("Set B-roll on", &report))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClearOverrideArgs {
    sentence_id: String,
}

/// Remove a sentence's B-roll.
pub struct ClearVideoOverrideTool;

impl EditTool for ClearVideoOverrideTool {
    fn name(&self) -> &'static str {
        "clear_video_override"
    }

    fn description(&self) -> &'static str {
        "Remove the B-roll footage from a sentence so its own camera shows again."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "sentence_id": {"type": "string"}
            },
            "required": ["sentence_id"]
        })
    }

    fn execute(&self, input: Value, session: &mut EditSession) -> AgentResult<ToolOutput> {
        let args: ClearOverrideArgs = parse_args(self.name(), input)?;
        let report = session.clear_video_override(&args.sentence_id);
        Ok(ToolOutput::from_report("Cleared B-roll on", &report))
    }
}
