mod test_utils;

use lexicut_agent::{AgentConfig, AgentLoop, EDIT_SYSTEM_PROMPT};
use lexicut_core::{ContentBlock, Role};
use lexicut_error::{LexicutErrorKind, ModelsErrorKind};
use serde_json::json;
use test_utils::{MockDriver, MockResponse, fixture_session, text_turn, tool_turn};

#[tokio::test]
async fn test_zero_tool_calls_finish_in_one_round() {
    let driver = MockDriver::new(vec![text_turn("Nothing to change here.")]);
    let mut session = fixture_session();
    let mut streamed = String::new();

    let outcome = AgentLoop::new(&driver)
        .run(&mut session, "Tighten the intro", |text| streamed.push_str(text))
        .await
        .expect("loop succeeds");

    assert!(outcome.success);
    assert_eq!(outcome.iterations, 1);
    assert_eq!(outcome.tool_call_count, 0);
    assert!(outcome.command_ids.is_empty());
    assert_eq!(outcome.message, "Nothing to change here.");
    assert_eq!(streamed, "Nothing to change here.");
    assert_eq!(driver.call_count(), 1);
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn test_first_request_carries_prompt_tools_and_screenplay() {
    let driver = MockDriver::new(vec![text_turn("ok")]);
    let mut session = fixture_session();

    AgentLoop::new(&driver)
        .with_config(AgentConfig {
            max_iterations: 5,
            max_tokens: 512,
        })
        .run(&mut session, "Cut the ums", |_| {})
        .await
        .expect("loop succeeds");

    let request = &driver.requests()[0];
    assert_eq!(request.system_prompt, EDIT_SYSTEM_PROMPT);
    assert_eq!(request.max_tokens, 512);
    let names: Vec<&str> = request.tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "classify_broll",
            "clear_video_override",
            "delete_sentences",
            "delete_words",
            "reorder_sentences",
            "restore_sentences",
            "restore_words",
            "set_video_override",
        ]
    );
    assert_eq!(request.messages.len(), 1);
    let opening = request.messages[0].text();
    assert!(opening.contains("[s1] cam"));
    assert!(opening.contains("w1 Um"));
    assert!(opening.ends_with("Instruction: Cut the ums"));
}

#[tokio::test]
async fn test_hallucinated_sentence_id_is_ignored() {
    let driver = MockDriver::new(vec![
        tool_turn(&[("delete_sentences", json!({"sentence_ids": ["s1", "s9999"]}))]),
        text_turn("Deleted the intro."),
    ]);
    let mut session = fixture_session();

    let outcome = AgentLoop::new(&driver)
        .run(&mut session, "Drop the intro", |_| {})
        .await
        .expect("no error reaches the caller");

    assert!(outcome.success);
    assert_eq!(outcome.iterations, 2);
    assert_eq!(outcome.tool_call_count, 1);
    assert_eq!(outcome.command_ids.len(), 1);

    let excluded: Vec<&str> = session
        .timeline()
        .entries()
        .iter()
        .filter(|e| e.excluded)
        .map(|e| e.sentence_id.as_str())
        .collect();
    assert_eq!(excluded, vec!["s1"]);

    // Second request carries the assistant turn and the tool result.
    let second = &driver.requests()[1];
    assert_eq!(second.messages.len(), 3);
    assert_eq!(second.messages[1].role, Role::Assistant);
    assert!(matches!(
        &second.messages[1].content[1],
        ContentBlock::ToolUse { name, input, .. }
            if name == "delete_sentences" && input["sentence_ids"][1] == "s9999"
    ));
    match &second.messages[2].content[0] {
        ContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => {
            assert_eq!(tool_use_id, "toolu_1");
            assert!(!is_error);
            assert!(content.contains("s1"));
            assert!(content.contains("s9999"));
        }
        other => panic!("expected tool result, got {other:?}"),
    }
}

#[tokio::test]
async fn test_tool_calls_run_in_emission_order() {
    let driver = MockDriver::new(vec![
        tool_turn(&[
            ("delete_sentences", json!({"sentence_ids": ["s2"]})),
            ("restore_sentences", json!({"sentence_ids": ["s2"]})),
            ("delete_words", json!({"sentence_id": "s1", "word_ids": ["w1"]})),
        ]),
        text_turn("Done."),
    ]);
    let mut session = fixture_session();

    let outcome = AgentLoop::new(&driver)
        .run(&mut session, "Edit", |_| {})
        .await
        .unwrap();

    assert_eq!(outcome.tool_call_count, 3);
    assert_eq!(outcome.command_ids.len(), 3);
    assert!(!session.timeline().entry("s2").unwrap().excluded);
    assert!(session.timeline().entry("s1").unwrap().excluded_word_ids.contains("w1"));

    let labels: Vec<&str> = session
        .history()
        .commands()
        .iter()
        .map(|c| c.label.as_str())
        .collect();
    assert_eq!(
        labels,
        vec!["Delete 1 sentence", "Restore 1 sentence", "Cut 1 word in s1"]
    );
}

#[tokio::test]
async fn test_bad_calls_become_error_results() {
    let driver = MockDriver::new(vec![
        tool_turn(&[
            ("split_sentence", json!({"sentence_id": "s1"})),
            ("delete_words", json!({"sentence_id": "s1"})),
            ("delete_sentences", json!({"sentence_ids": ["s3"], "force": true})),
            (
                "set_video_override",
                json!({"sentence_id": "s2", "source_id": "cam", "start": 0.0, "end": 1.0}),
            ),
        ]),
        text_turn("Sorry, some of that failed."),
    ]);
    let mut session = fixture_session();

    let outcome = AgentLoop::new(&driver)
        .run(&mut session, "Edit", |_| {})
        .await
        .expect("tool failures are not loop failures");

    assert!(outcome.success);
    assert_eq!(outcome.tool_call_count, 4);
    assert!(outcome.command_ids.is_empty());
    assert!(session.history().is_empty());

    let second = &driver.requests()[1];
    let results: Vec<(bool, String)> = second.messages[2]
        .content
        .iter()
        .map(|block| match block {
            ContentBlock::ToolResult {
                content, is_error, ..
            } => (*is_error, content.clone()),
            other => panic!("expected tool result, got {other:?}"),
        })
        .collect();

    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|(is_error, _)| *is_error));
    assert!(results[0].1.contains("Unknown tool: split_sentence"));
    assert!(results[1].1.contains("word_ids"));
    assert!(results[2].1.contains("force"));
    assert!(results[3].1.contains("not B-roll eligible"));
}

#[tokio::test]
async fn test_iteration_cap_keeps_edits_undoable() {
    let driver = MockDriver::new(vec![
        tool_turn(&[("delete_sentences", json!({"sentence_ids": ["s1"]}))]),
        tool_turn(&[("delete_sentences", json!({"sentence_ids": ["s2"]}))]),
        tool_turn(&[("delete_sentences", json!({"sentence_ids": ["s3"]}))]),
    ]);
    let mut session = fixture_session();

    let outcome = AgentLoop::new(&driver)
        .with_config(AgentConfig {
            max_iterations: 3,
            max_tokens: 1024,
        })
        .run(&mut session, "Keep going", |_| {})
        .await
        .expect("cap is not an error");

    assert!(outcome.success);
    assert!(outcome.message.contains("iteration limit"));
    assert_eq!(outcome.iterations, 3);
    assert_eq!(driver.call_count(), 3);
    assert_eq!(outcome.command_ids.len(), 3);
    assert_eq!(session.history().len(), 3);

    // Undo the middle edit only.
    session.undo(outcome.command_ids[1]).expect("recorded");
    assert!(session.timeline().entry("s1").unwrap().excluded);
    assert!(!session.timeline().entry("s2").unwrap().excluded);
    assert!(session.timeline().entry("s3").unwrap().excluded);
}

#[tokio::test]
async fn test_default_cap_is_twenty_rounds() {
    let driver = MockDriver::new(vec![tool_turn(&[(
        "reorder_sentences",
        json!({"sentence_ids": ["s2", "s1"]}),
    )])]);
    let mut session = fixture_session();

    let outcome = AgentLoop::new(&driver)
        .run(&mut session, "Loop forever", |_| {})
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.iterations, 20);
    assert_eq!(outcome.tool_call_count, 20);
    assert_eq!(driver.call_count(), 20);
}

#[tokio::test]
async fn test_transport_failure_aborts_but_keeps_earlier_edits() {
    let driver = MockDriver::new(vec![
        tool_turn(&[("delete_words", json!({"sentence_id": "s1", "word_ids": ["w1"]}))]),
        MockResponse::Error(ModelsErrorKind::Api {
            status: 500,
            message: "internal".to_string(),
        }),
    ]);
    let mut session = fixture_session();

    let err = AgentLoop::new(&driver)
        .run(&mut session, "Cut the ums", |_| {})
        .await
        .expect_err("transport errors surface");

    assert!(matches!(err.kind(), LexicutErrorKind::Models(_)));
    assert_eq!(session.history().len(), 1);
    assert!(session.timeline().entry("s1").unwrap().excluded_word_ids.contains("w1"));

    let id = session.history().commands()[0].id;
    session.undo(id).expect("still undoable");
    assert!(session.timeline().entry("s1").unwrap().excluded_word_ids.is_empty());
}

#[tokio::test]
async fn test_broken_argument_json_is_reported_not_raised() {
    use lexicut_interface::StreamEvent;

    let driver = MockDriver::new(vec![
        MockResponse::Events(vec![
            StreamEvent::ToolUseStart {
                index: 0,
                id: "toolu_bad".to_string(),
                name: "delete_sentences".to_string(),
            },
            StreamEvent::InputJsonDelta {
                index: 0,
                partial_json: "{\"sentence_ids\": [\"s1\"".to_string(),
            },
            StreamEvent::BlockStop { index: 0 },
            StreamEvent::MessageStop,
        ]),
        text_turn("Retrying later."),
    ]);
    let mut session = fixture_session();

    let outcome = AgentLoop::new(&driver)
        .run(&mut session, "Drop s1", |_| {})
        .await
        .unwrap();

    assert_eq!(outcome.tool_call_count, 1);
    assert!(session.history().is_empty());
    let second = &driver.requests()[1];
    assert!(matches!(
        &second.messages[1].content[0],
        ContentBlock::ToolUse { input, .. } if input.is_object()
    ));
    assert!(matches!(
        &second.messages[2].content[0],
        ContentBlock::ToolResult { is_error: true, .. }
    ));
}
