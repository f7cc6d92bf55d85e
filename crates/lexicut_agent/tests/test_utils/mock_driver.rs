//! Scripted reasoning driver.

use async_trait::async_trait;
use lexicut_core::{Sentence, Source, Word};
use lexicut_error::{LexicutResult, ModelsError, ModelsErrorKind};
use lexicut_interface::{EventStream, ReasoningDriver, ReasoningRequest, StopReason, StreamEvent};
use lexicut_timeline::EditSession;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Stream these events
    Events(Vec<StreamEvent>),
    /// Fail the request before streaming
    Error(ModelsErrorKind),
}

/// Driver that replays scripted responses and records every request.
///
/// Once the script runs out it repeats the last response.
pub struct MockDriver {
    script: Mutex<VecDeque<MockResponse>>,
    last: Mutex<Option<MockResponse>>,
    requests: Mutex<Vec<ReasoningRequest>>,
}

impl MockDriver {
    pub fn new(script: Vec<MockResponse>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ReasoningRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ReasoningDriver for MockDriver {
    async fn stream(&self, request: &ReasoningRequest) -> LexicutResult<EventStream> {
        self.requests.lock().unwrap().push(request.clone());

        let next = self.script.lock().unwrap().pop_front();
        let response = match next {
            Some(response) => {
                *self.last.lock().unwrap() = Some(response.clone());
                response
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .expect("script is not empty"),
        };

        match response {
            MockResponse::Events(events) => {
                Ok(Box::pin(futures::stream::iter(events.into_iter().map(Ok))))
            }
            MockResponse::Error(kind) => Err(ModelsError::new(kind).into()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// A turn that only talks, streamed in two deltas.
pub fn text_turn(text: &str) -> MockResponse {
    let (head, tail) = text.split_at(text.len() / 2);
    MockResponse::Events(vec![
        StreamEvent::MessageStart {
            id: "msg_text".to_string(),
        },
        StreamEvent::TextStart { index: 0 },
        StreamEvent::TextDelta {
            index: 0,
            text: head.to_string(),
        },
        StreamEvent::TextDelta {
            index: 0,
            text: tail.to_string(),
        },
        StreamEvent::BlockStop { index: 0 },
        StreamEvent::MessageDelta {
            stop_reason: Some(StopReason::EndTurn),
        },
        StreamEvent::MessageStop,
    ])
}

/// A turn with a short text block and the given tool calls, each with its
/// arguments split into three fragments.
pub fn tool_turn(calls: &[(&str, Value)]) -> MockResponse {
    let mut events = vec![
        StreamEvent::MessageStart {
            id: "msg_tools".to_string(),
        },
        StreamEvent::TextStart { index: 0 },
        StreamEvent::TextDelta {
            index: 0,
            text: "Working on it. ".to_string(),
        },
        StreamEvent::BlockStop { index: 0 },
    ];
    for (i, (name, arguments)) in calls.iter().enumerate() {
        let index = i + 1;
        let json = arguments.to_string();
        let third = json.len() / 3;
        events.push(StreamEvent::ToolUseStart {
            index,
            id: format!("toolu_{index}"),
            name: name.to_string(),
        });
        for fragment in [&json[..third], &json[third..2 * third], &json[2 * third..]] {
            events.push(StreamEvent::InputJsonDelta {
                index,
                partial_json: fragment.to_string(),
            });
        }
        events.push(StreamEvent::BlockStop { index });
    }
    events.push(StreamEvent::MessageDelta {
        stop_reason: Some(StopReason::ToolUse),
    });
    events.push(StreamEvent::MessageStop);
    MockResponse::Events(events)
}

fn sentence(id: &str, source: &str, words: &[&Word]) -> Sentence {
    Sentence {
        sentence_id: id.to_string(),
        source_id: source.to_string(),
        word_ids: words.iter().map(|w| w.id.clone()).collect(),
        text: words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        start_time: words.first().map(|w| w.start_time).unwrap_or(0.0),
        end_time: words.last().map(|w| w.end_time).unwrap_or(0.0),
        origin_ordering_group_id: None,
    }
}

/// Three interview sentences on `cam` plus a transcript-less `broll` source.
///
/// s1 = "Um welcome back." (w1..w3), s2 = "Today we cook." (w4..w6),
/// s3 = "Let's begin." (w7..w8), s4 = B-roll fallback.
pub fn fixture_session() -> EditSession {
    let words = vec![
        Word::new("w1", "Um", "cam", 0.0, 0.4),
        Word::new("w2", "welcome", "cam", 0.5, 1.0),
        Word::new("w3", "back.", "cam", 1.1, 1.6),
        Word::new("w4", "Today", "cam", 2.0, 2.4),
        Word::new("w5", "we", "cam", 2.5, 2.7),
        Word::new("w6", "cook.", "cam", 2.8, 3.5),
        Word::new("w7", "Let's", "cam", 4.0, 4.4),
        Word::new("w8", "begin.", "cam", 4.5, 5.2),
    ];
    let sentences = vec![
        sentence("s1", "cam", &[&words[0], &words[1], &words[2]]),
        sentence("s2", "cam", &[&words[3], &words[4], &words[5]]),
        sentence("s3", "cam", &[&words[6], &words[7]]),
        Sentence {
            sentence_id: "s4".to_string(),
            source_id: "broll".to_string(),
            word_ids: Vec::new(),
            text: String::new(),
            start_time: 0.0,
            end_time: 30.0,
            origin_ordering_group_id: None,
        },
    ];
    let sources = vec![
        Source::new("cam", "Interview").with_duration(6.0),
        Source::new("broll", "Kitchen B-roll").with_duration(30.0),
    ];
    EditSession::new("project-1", "Cooking show", sources, words, sentences, Vec::new())
}
