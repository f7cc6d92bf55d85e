use futures::StreamExt;
use lexicut_error::{LexicutErrorKind, ModelsErrorKind};
use lexicut_interface::{StopReason, StreamEvent};
use lexicut_models::{SseDecoder, SseEvent, decode_event, decode_sse_stream};

/// A complete streamed turn: text, then one tool call with split arguments.
const TURN: &str = concat!(
    "event: message_start\n",
    "data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_01\",\"type\":\"message\",\"role\":\"assistant\",\"content\":[]}}\n\n",
    "event: content_block_start\n",
    "data: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"text\",\"text\":\"\"}}\n\n",
    "event: ping\n",
    "data: {\"type\":\"ping\"}\n\n",
    "event: content_block_delta\n",
    "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Cutting the ums… \"}}\n\n",
    "event: content_block_stop\n",
    "data: {\"type\":\"content_block_stop\",\"index\":0}\n\n",
    "event: content_block_start\n",
    "data: {\"type\":\"content_block_start\",\"index\":1,\"content_block\":{\"type\":\"tool_use\",\"id\":\"toolu_01\",\"name\":\"delete_words\",\"input\":{}}}\n\n",
    "event: content_block_delta\n",
    "data: {\"type\":\"content_block_delta\",\"index\":1,\"delta\":{\"type\":\"input_json_delta\",\"partial_json\":\"{\\\"sentence_id\\\": \\\"s1\\\", \"}}\n\n",
    "event: content_block_delta\n",
    "data: {\"type\":\"content_block_delta\",\"index\":1,\"delta\":{\"type\":\"input_json_delta\",\"partial_json\":\"\\\"word_ids\\\": [\\\"w2\\\"]}\"}}\n\n",
    "event: content_block_stop\n",
    "data: {\"type\":\"content_block_stop\",\"index\":1}\n\n",
    "event: message_delta\n",
    "data: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"tool_use\",\"stop_sequence\":null},\"usage\":{\"output_tokens\":42}}\n\n",
    "event: message_stop\n",
    "data: {\"type\":\"message_stop\"}\n\n",
);

fn expected_events() -> Vec<StreamEvent> {
    vec![
        StreamEvent::MessageStart {
            id: "msg_01".to_string(),
        },
        StreamEvent::TextStart { index: 0 },
        StreamEvent::Ping,
        StreamEvent::TextDelta {
            index: 0,
            text: "Cutting the ums… ".to_string(),
        },
        StreamEvent::BlockStop { index: 0 },
        StreamEvent::ToolUseStart {
            index: 1,
            id: "toolu_01".to_string(),
            name: "delete_words".to_string(),
        },
        StreamEvent::InputJsonDelta {
            index: 1,
            partial_json: "{\"sentence_id\": \"s1\", ".to_string(),
        },
        StreamEvent::InputJsonDelta {
            index: 1,
            partial_json: "\"word_ids\": [\"w2\"]}".to_string(),
        },
        StreamEvent::BlockStop { index: 1 },
        StreamEvent::MessageDelta {
            stop_reason: Some(StopReason::ToolUse),
        },
        StreamEvent::MessageStop,
    ]
}

async fn decode_chunks(chunks: Vec<Vec<u8>>) -> Vec<StreamEvent> {
    let bytes = futures::stream::iter(chunks.into_iter().map(Ok::<_, std::io::Error>));
    decode_sse_stream(bytes)
        .map(|item| item.expect("decodes"))
        .collect()
        .await
}

#[test]
fn test_decoder_carries_partial_lines_across_reads() {
    let mut decoder = SseDecoder::default();

    assert!(decoder.push(b"event: content_block_stop\nda").is_empty());
    assert!(decoder.push(b"ta: {\"type\":\"content_block_st").is_empty());
    let events = decoder.push(b"op\",\"index\":3}\n\n");

    assert_eq!(
        events,
        vec![SseEvent {
            event: "content_block_stop".to_string(),
            data: "{\"type\":\"content_block_stop\",\"index\":3}".to_string(),
        }]
    );
}

#[test]
fn test_decoder_waits_for_both_event_and_data_lines() {
    let mut decoder = SseDecoder::default();

    assert!(decoder.push(b": keep-alive comment\n\n").is_empty());
    assert!(decoder.push(b"data: {\"type\":\"ping\"}\n").is_empty());
    let events = decoder.push(b"event: ping\n");

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].data, "{\"type\":\"ping\"}");
}

#[test]
fn test_blank_line_discards_an_incomplete_record() {
    let mut decoder = SseDecoder::default();

    assert!(decoder.push(b"data: {\"type\":\"stray\"}\n\n").is_empty());
    assert!(decoder.push(b"event: orphan\n\n").is_empty());
    let events = decoder.push(b"event: ping\ndata: {\"type\":\"ping\"}\n\n");

    assert_eq!(
        events,
        vec![SseEvent {
            event: "ping".to_string(),
            data: "{\"type\":\"ping\"}".to_string(),
        }]
    );

    let events = decoder.push(b"event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n");
    assert_eq!(events[0].event, "message_stop");
}

#[test]
fn test_decoder_handles_crlf_and_unterminated_tail() {
    let mut decoder = SseDecoder::default();

    assert!(decoder.push(b"event: message_stop\r\ndata: {\"type\":\"message_stop\"}").is_empty());
    let events = decoder.finish();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event, "message_stop");
}

#[tokio::test]
async fn test_whole_turn_decodes_in_one_chunk() {
    let events = decode_chunks(vec![TURN.as_bytes().to_vec()]).await;
    assert_eq!(events, expected_events());
}

#[tokio::test]
async fn test_turn_decodes_identically_at_every_chunk_size() {
    let bytes = TURN.as_bytes();
    // Chunk sizes that split lines, JSON and the multi-byte ellipsis.
    for size in [1, 2, 3, 5, 7, 16, 61, 255] {
        let chunks: Vec<Vec<u8>> = bytes.chunks(size).map(<[u8]>::to_vec).collect();
        let events = decode_chunks(chunks).await;
        assert_eq!(events, expected_events(), "chunk size {size}");
    }
}

#[tokio::test]
async fn test_empty_body_is_reported() {
    let bytes = futures::stream::iter(Vec::<Result<Vec<u8>, std::io::Error>>::new());
    let results: Vec<_> = decode_sse_stream(bytes).collect().await;

    assert_eq!(results.len(), 1);
    let err = results[0].as_ref().expect_err("missing body");
    assert!(matches!(
        err.kind(),
        LexicutErrorKind::Models(e) if e.kind == ModelsErrorKind::MissingBody
    ));
}

#[tokio::test]
async fn test_transport_failure_mid_stream_is_an_error() {
    let chunks = vec![
        Ok(b"event: ping\ndata: {\"type\":\"ping\"}\n\n".to_vec()),
        Err(std::io::Error::other("connection reset")),
    ];
    let results: Vec<_> = decode_sse_stream(futures::stream::iter(chunks)).collect().await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().ok(), Some(&StreamEvent::Ping));
    assert!(results[1].is_err());
}

#[test]
fn test_error_events_map_to_models_errors() {
    let overloaded = SseEvent {
        event: "error".to_string(),
        data: "{\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}"
            .to_string(),
    };
    let err = decode_event(&overloaded).expect_err("error event");
    assert_eq!(err.kind, ModelsErrorKind::RateLimited("Overloaded".to_string()));

    let garbage = SseEvent {
        event: "content_block_delta".to_string(),
        data: "{not json".to_string(),
    };
    assert!(matches!(
        decode_event(&garbage).map_err(|e| e.kind),
        Err(ModelsErrorKind::Parse(_))
    ));
}

#[test]
fn test_unknown_events_and_blocks_are_skipped() {
    let future_event = SseEvent {
        event: "citation".to_string(),
        data: "{\"type\":\"citation_added\",\"index\":0}".to_string(),
    };
    assert_eq!(decode_event(&future_event).expect("skipped"), None);

    let thinking = SseEvent {
        event: "content_block_delta".to_string(),
        data: "{\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"thinking_delta\",\"thinking\":\"hm\"}}"
            .to_string(),
    };
    assert_eq!(decode_event(&thinking).expect("skipped"), None);
}
