//! Mock collaborators.

use async_trait::async_trait;
use lexicut::{
    BackendError, DescribeTarget, Describer, EventStream, GroupDescription, LexicutResult,
    NarrativeOrderer, OrderingGroup, OrderingResponse, RangeDescription, ReasoningDriver,
    ReasoningRequest, StopReason, StreamEvent, Transcriber, Transcription, Word,
};
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn word(id: &str, text: &str, source: &str, start: f64, end: f64) -> Word {
    Word::new(id, text, source, start, end)
}

/// Transcriber returning the same words for every file, after a short delay.
pub struct MockTranscriber {
    words: Vec<(String, f64, f64)>,
    calls: Arc<AtomicUsize>,
}

impl MockTranscriber {
    pub fn new(words: &[(&str, f64, f64)]) -> Self {
        Self {
            words: words
                .iter()
                .map(|(text, start, end)| (text.to_string(), *start, *end))
                .collect(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared call counter, readable after the transcriber is moved into a
    /// pipeline.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, _file: &Path, _cache_key: Option<&str>) -> LexicutResult<Transcription> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok(Transcription {
            words: self
                .words
                .iter()
                .enumerate()
                .map(|(i, (text, start, end))| {
                    Word::new(format!("raw{i}"), text.clone(), "unknown", *start, *end)
                })
                .collect(),
            language_code: "en".to_string(),
            language_probability: 0.98,
        })
    }
}

/// Orderer with a fixed response, or a failure.
pub struct MockOrderer {
    response: Option<OrderingResponse>,
    pub seen: Arc<Mutex<Vec<OrderingGroup>>>,
}

impl MockOrderer {
    pub fn returning(ordered_ids: &[&str], summary: &str) -> Self {
        Self {
            response: Some(OrderingResponse {
                ordered_ids: ordered_ids.iter().map(|id| id.to_string()).collect(),
                duplicates: Vec::new(),
                narrative_summary: summary.to_string(),
            }),
            seen: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: None,
            seen: Arc::default(),
        }
    }
}

#[async_trait]
impl NarrativeOrderer for MockOrderer {
    async fn order(
        &self,
        groups: &[OrderingGroup],
        _source_names: &HashMap<String, String>,
    ) -> LexicutResult<OrderingResponse> {
        self.seen.lock().unwrap().extend(groups.iter().cloned());
        match &self.response {
            Some(response) => Ok(response.clone()),
            None => Err(BackendError::new("ordering service unavailable").into()),
        }
    }
}

/// Describer that labels every range and group it is asked about.
#[derive(Default)]
pub struct MockDescriber {
    pub requests: Arc<Mutex<Vec<DescribeTarget>>>,
    pub group_requests: Arc<Mutex<Vec<DescribeTarget>>>,
}

#[async_trait]
impl Describer for MockDescriber {
    async fn describe_ranges(
        &self,
        _file: &Path,
        target: &DescribeTarget,
        _cache_key: Option<&str>,
    ) -> LexicutResult<Vec<RangeDescription>> {
        self.requests.lock().unwrap().push(target.clone());
        let DescribeTarget::Ranges(ranges) = target else {
            return Ok(Vec::new());
        };
        Ok(ranges
            .iter()
            .map(|(start, end)| RangeDescription {
                start: *start,
                end: *end,
                description: format!("kitchen shot {start:.0}-{end:.0}"),
            })
            .collect())
    }

    async fn describe_groups(
        &self,
        _file: &Path,
        target: &DescribeTarget,
        _cache_key: Option<&str>,
    ) -> LexicutResult<Vec<GroupDescription>> {
        self.group_requests.lock().unwrap().push(target.clone());
        let DescribeTarget::Groups(groups) = target else {
            return Ok(Vec::new());
        };
        Ok(groups
            .iter()
            .map(|(group_id, _, _)| GroupDescription {
                group_id: group_id.clone(),
                description: format!("on screen during {group_id}"),
            })
            .collect())
    }
}

/// Driver replaying scripted event sequences, one per request.
pub struct ScriptedDriver {
    script: Mutex<VecDeque<Vec<StreamEvent>>>,
    pub requests: Arc<Mutex<Vec<ReasoningRequest>>>,
}

impl ScriptedDriver {
    pub fn new(script: Vec<Vec<StreamEvent>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Arc::default(),
        }
    }
}

#[async_trait]
impl ReasoningDriver for ScriptedDriver {
    async fn stream(&self, request: &ReasoningRequest) -> LexicutResult<EventStream> {
        self.requests.lock().unwrap().push(request.clone());
        let events = self.script.lock().unwrap().pop_front().unwrap_or_default();
        Ok(Box::pin(futures_util::stream::iter(
            events.into_iter().map(Ok),
        )))
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

/// One round deleting `sentence_id`, then a closing summary.
pub fn delete_then_summarize(sentence_id: &str) -> Vec<Vec<StreamEvent>> {
    let arguments = serde_json::json!({ "sentence_ids": [sentence_id] }).to_string();
    vec![
        vec![
            StreamEvent::MessageStart {
                id: "msg_1".to_string(),
            },
            StreamEvent::ToolUseStart {
                index: 0,
                id: "toolu_1".to_string(),
                name: "delete_sentences".to_string(),
            },
            StreamEvent::InputJsonDelta {
                index: 0,
                partial_json: arguments,
            },
            StreamEvent::BlockStop { index: 0 },
            StreamEvent::MessageDelta {
                stop_reason: Some(StopReason::ToolUse),
            },
            StreamEvent::MessageStop,
        ],
        vec![
            StreamEvent::MessageStart {
                id: "msg_2".to_string(),
            },
            StreamEvent::TextStart { index: 0 },
            StreamEvent::TextDelta {
                index: 0,
                text: "Removed the false start.".to_string(),
            },
            StreamEvent::BlockStop { index: 0 },
            StreamEvent::MessageDelta {
                stop_reason: Some(StopReason::EndTurn),
            },
            StreamEvent::MessageStop,
        ],
    ]
}
