//! Reassembling one streamed response into text and tool calls.
//!
//! Tool arguments arrive as JSON fragments that are not valid on their own.
//! They are concatenated per block and parsed only when the block closes.

use lexicut_core::{ContentBlock, Message, Role, ToolCall};
use lexicut_interface::{StopReason, StreamEvent};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{trace, warn};

#[derive(Debug)]
enum PendingBlock {
    Text(String),
    ToolUse {
        id: String,
        name: String,
        partial_json: String,
        input: Option<Value>,
    },
}

/// A fully received assistant turn.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantTurn {
    /// Message id reported by the service
    pub message_id: Option<String>,
    /// All text, in block order
    pub text: String,
    /// Tool calls, in the order the service emitted them
    pub tool_calls: Vec<ToolCall>,
    /// Why generation stopped
    pub stop_reason: Option<StopReason>,
    /// The turn as it goes back into the history
    pub message: Message,
}

/// Accumulates [`StreamEvent`]s for one response.
///
/// # Examples
///
/// ```
/// use lexicut_agent::ResponseAccumulator;
/// use lexicut_interface::StreamEvent;
///
/// let mut acc = ResponseAccumulator::default();
/// acc.push(StreamEvent::ToolUseStart { index: 0, id: "t1".into(), name: "delete_sentences".into() });
/// acc.push(StreamEvent::InputJsonDelta { index: 0, partial_json: "{\"sentence_ids\":".into() });
/// acc.push(StreamEvent::InputJsonDelta { index: 0, partial_json: " [\"s1\"]}".into() });
/// acc.push(StreamEvent::BlockStop { index: 0 });
///
/// let turn = acc.finish();
/// assert_eq!(turn.tool_calls[0].arguments["sentence_ids"][0], "s1");
/// ```
#[derive(Debug, Default)]
pub struct ResponseAccumulator {
    message_id: Option<String>,
    blocks: BTreeMap<usize, PendingBlock>,
    stop_reason: Option<StopReason>,
}

impl ResponseAccumulator {
    /// Fold one event into the response.
    pub fn push(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::MessageStart { id } => self.message_id = Some(id),
            StreamEvent::TextStart { index } => {
                self.blocks.insert(index, PendingBlock::Text(String::new()));
            }
            StreamEvent::ToolUseStart { index, id, name } => {
                self.blocks.insert(
                    index,
                    PendingBlock::ToolUse {
                        id,
                        name,
                        partial_json: String::new(),
                        input: None,
                    },
                );
            }
            StreamEvent::TextDelta { index, text } => match self.blocks.get_mut(&index) {
                Some(PendingBlock::Text(buffer)) => buffer.push_str(&text),
                // Deltas without a start still count as text.
                _ => {
                    self.blocks.insert(index, PendingBlock::Text(text));
                }
            },
            StreamEvent::InputJsonDelta {
                index,
                partial_json,
            } => match self.blocks.get_mut(&index) {
                Some(PendingBlock::ToolUse {
                    partial_json: buffer,
                    ..
                }) => buffer.push_str(&partial_json),
                _ => warn!(index, "Argument fragment for a block that is not a tool call"),
            },
            StreamEvent::BlockStop { index } => {
                if let Some(block) = self.blocks.get_mut(&index) {
                    close(block);
                }
            }
            StreamEvent::MessageDelta { stop_reason } => {
                if stop_reason.is_some() {
                    self.stop_reason = stop_reason;
                }
            }
            StreamEvent::MessageStop | StreamEvent::Ping => trace!("Stream bookkeeping event"),
        }
    }

    /// Close any open blocks and produce the turn.
    pub fn finish(mut self) -> AssistantTurn {
        let mut text = String::new();
        let mut tool_calls = Vec::new();
        let mut content = Vec::new();

        for block in self.blocks.values_mut() {
            close(block);
        }

        for block in self.blocks.into_values() {
            match block {
                PendingBlock::Text(block_text) => {
                    if block_text.is_empty() {
                        continue;
                    }
                    text.push_str(&block_text);
                    content.push(ContentBlock::Text { text: block_text });
                }
                PendingBlock::ToolUse {
                    id, name, input, ..
                } => {
                    let arguments = input.unwrap_or(Value::Null);
                    // The history must carry an object even when parsing failed.
                    let echoed = if arguments.is_object() {
                        arguments.clone()
                    } else {
                        Value::Object(serde_json::Map::new())
                    };
                    content.push(ContentBlock::ToolUse {
                        id: id.clone(),
                        name: name.clone(),
                        input: echoed,
                    });
                    tool_calls.push(ToolCall {
                        id,
                        name,
                        arguments,
                    });
                }
            }
        }

        AssistantTurn {
            message_id: self.message_id,
            text,
            tool_calls,
            stop_reason: self.stop_reason,
            message: Message {
                role: Role::Assistant,
                content,
            },
        }
    }
}

fn close(block: &mut PendingBlock) {
    let PendingBlock::ToolUse {
        name,
        partial_json,
        input,
        ..
    } = block
    else {
        return;
    };
    if input.is_some() {
        return;
    }
    if partial_json.trim().is_empty() {
        *input = Some(Value::Object(serde_json::Map::new()));
        return;
    }
    match serde_json::from_str::<Value>(partial_json) {
        Ok(value) => *input = Some(value),
        Err(e) => {
            warn!(tool = %name, error = %e, "Tool arguments are not valid JSON");
            *input = Some(Value::Null);
        }
    }
}
