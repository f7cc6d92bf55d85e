use lexicut_core::{Sentence, Source, Word};
use lexicut_error::{LexicutErrorKind, TimelineErrorKind};
use lexicut_timeline::{
    BrollClassification, BrollReason, EditSession, ProjectSnapshot, TimelineEntry, VideoOverride,
};
use uuid::Uuid;

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn sentence(id: &str, source: &str, words: &[&str], start: f64, end: f64) -> Sentence {
    Sentence {
        sentence_id: id.to_string(),
        source_id: source.to_string(),
        word_ids: ids(words),
        text: format!("text of {id}"),
        start_time: start,
        end_time: end,
        origin_ordering_group_id: None,
    }
}

/// Source `a` has speech; source `b` is transcriptless footage.
fn session() -> EditSession {
    let sources = vec![
        Source::new("a", "interview.mp4").with_duration(20.0),
        Source::new("b", "skyline.mp4").with_duration(10.0),
    ];
    let words = (1..=6)
        .map(|i| {
            let start = i as f64;
            Word::new(format!("w{i}"), format!("word{i}"), "a", start, start + 0.5)
        })
        .collect();
    let sentences = vec![
        sentence("s1", "a", &["w1", "w2"], 1.0, 2.5),
        sentence("s2", "a", &["w3", "w4"], 3.0, 4.5),
        sentence("s3", "a", &["w5", "w6"], 5.0, 6.5),
        sentence("s4", "b", &[], 0.0, 10.0),
    ];
    EditSession::new("p1", "Demo", sources, words, sentences, Vec::new())
}

fn sorted_entries(session: &EditSession) -> Vec<TimelineEntry> {
    let mut entries = session.timeline().entries().to_vec();
    entries.sort_by(|a, b| a.sentence_id.cmp(&b.sentence_id));
    entries
}

fn permutations(items: &[Uuid]) -> Vec<Vec<Uuid>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut result = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head);
            result.push(tail);
        }
    }
    result
}

#[test]
fn test_new_session_exposes_broll_sources() {
    let session = session();

    assert_eq!(session.broll_sources(), &ids(&["b"]));
    assert!(session.is_broll_eligible("b"));
    assert!(!session.is_broll_eligible("a"));
    assert_eq!(session.timeline().len(), 4);
    assert_eq!(session.word("w3").map(|w| w.text.as_str()), Some("word3"));
}

#[test]
fn test_delete_sentences_ignores_unknown_ids() {
    let mut session = session();

    let report = session.delete_sentences(&ids(&["s1", "s9999"]));

    assert_eq!(report.changed, ids(&["s1"]));
    assert_eq!(report.ignored, ids(&["s9999"]));
    assert!(report.command_id.is_some());
    assert!(session.timeline().entry("s1").is_some_and(|e| e.excluded));
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_noop_edits_record_no_command() {
    let mut session = session();

    assert!(session.restore_sentences(&ids(&["s1"])).is_noop());
    assert!(session.reorder(&ids(&["s1", "s2"])).is_noop());
    assert!(session.swap("s1", "s1").is_noop());
    assert!(session.delete_words("s1", &ids(&["w3"])).is_noop());
    assert!(session.clear_video_override("s1").is_noop());

    assert!(session.history().is_empty());
}

#[test]
fn test_delete_words_reports_foreign_ids() {
    let mut session = session();

    let report = session.delete_words("s1", &ids(&["w1", "w5"]));

    assert_eq!(report.changed, ids(&["w1"]));
    assert_eq!(report.ignored, ids(&["w5"]));
    let entry = session.timeline().entry("s1").expect("s1");
    assert!(entry.excluded_word_ids.contains("w1"));
    assert!(!entry.excluded_word_ids.contains("w5"));
}

#[test]
fn test_override_requires_broll_source_and_valid_window() {
    let mut session = session();

    let err = session
        .set_video_override("s1", VideoOverride::new("a", 0.0, 1.0))
        .expect_err("spoken source is not eligible");
    assert!(matches!(
        err.kind(),
        LexicutErrorKind::Timeline(e) if matches!(e.kind, TimelineErrorKind::IneligibleSource(_))
    ));

    for (start, end) in [(2.0, 2.0), (-1.0, 1.0), (5.0, 11.0), (f64::NAN, 1.0)] {
        let err = session
            .set_video_override("s1", VideoOverride::new("b", start, end))
            .expect_err("window must be inside the source");
        assert!(matches!(
            err.kind(),
            LexicutErrorKind::Timeline(e) if matches!(e.kind, TimelineErrorKind::InvalidWindow(_))
        ));
    }

    assert!(session
        .set_video_override("s1", VideoOverride::new("zzz", 0.0, 1.0))
        .is_err());
    assert!(session.history().is_empty());

    let report = session
        .set_video_override("s1", VideoOverride::new("b", 2.0, 4.0))
        .expect("valid override");
    assert_eq!(report.changed, ids(&["s1"]));
}

#[test]
fn test_undoing_disjoint_commands_in_any_order_restores_initial_state() {
    let initial = sorted_entries(&session());

    let mut template = session();
    let delete = template.delete_sentences(&ids(&["s1"])).command_id;
    let words = template.delete_words("s2", &ids(&["w3", "w4"])).command_id;
    let broll = template
        .set_video_override("s3", VideoOverride::new("b", 1.0, 3.0))
        .expect("override")
        .command_id;
    let reorder = template.reorder(&ids(&["s4", "s3"])).command_id;
    let swap = template.swap("s1", "s2").command_id;
    let commands: Vec<Uuid> = [delete, words, broll, reorder, swap]
        .into_iter()
        .map(|id| id.expect("every edit changed state"))
        .collect();
    assert_ne!(sorted_entries(&template), initial);

    for order in permutations(&commands) {
        let mut session = template.clone();
        for id in &order {
            assert!(session.undo(*id).is_some(), "undo {id} in {order:?}");
        }
        assert!(session.history().is_empty());
        assert_eq!(sorted_entries(&session), initial, "order {order:?}");
    }
}

#[test]
fn test_undo_in_the_middle_leaves_later_edits_intact() {
    let mut session = session();
    let first = session.delete_sentences(&ids(&["s1"])).command_id.expect("first");
    let second = session.delete_words("s2", &ids(&["w4"])).command_id.expect("second");
    let third = session.delete_sentences(&ids(&["s3"])).command_id.expect("third");

    let undone = session.undo(second).expect("second is in the log");

    assert_eq!(undone.id, second);
    assert!(session.timeline().entry("s1").is_some_and(|e| e.excluded));
    assert!(session.timeline().entry("s2").is_some_and(|e| e.excluded_word_ids.is_empty()));
    assert!(session.timeline().entry("s3").is_some_and(|e| e.excluded));
    let remaining: Vec<Uuid> = session.history().commands().iter().map(|c| c.id).collect();
    assert_eq!(remaining, vec![first, third]);
    assert!(session.undo(second).is_none());
}

#[test]
fn test_overlapping_overrides_restore_their_own_prestate() {
    let mut session = session();
    let early = VideoOverride::new("b", 0.0, 2.0);
    let late = VideoOverride::new("b", 3.0, 5.0);
    let first = session
        .set_video_override("s1", early.clone())
        .expect("early")
        .command_id
        .expect("first");
    let second = session
        .set_video_override("s1", late)
        .expect("late")
        .command_id
        .expect("second");

    // The earlier command captured "no override", so undoing it clears the
    // later value too.
    session.undo(first);
    assert_eq!(session.timeline().entry("s1").expect("s1").video_override, None);

    // The later command captured the early override and restores it.
    session.undo(second);
    assert_eq!(
        session.timeline().entry("s1").expect("s1").video_override,
        Some(early)
    );
}

#[test]
fn test_undo_last_reverts_most_recent() {
    let mut session = session();
    session.delete_sentences(&ids(&["s1"]));
    session.swap("s2", "s3");

    let undone = session.undo_last().expect("swap");

    assert_eq!(undone.label, "Swap s2 and s3");
    assert_eq!(session.timeline().order(), ids(&["s1", "s2", "s3", "s4"]));
    assert!(session.timeline().entry("s1").is_some_and(|e| e.excluded));
}

#[test]
fn test_classify_broll_replaces_earlier_annotation() {
    let mut session = session();
    let classification = |id: &str, reason| BrollClassification {
        sentence_id: id.to_string(),
        is_broll: true,
        reason,
        confidence: 1.7,
    };

    session.classify_broll(vec![classification("s1", BrollReason::TooShort)]);
    let report = session.classify_broll(vec![
        classification("s1", BrollReason::Irrelevant),
        classification("s42", BrollReason::Irrelevant),
    ]);

    assert_eq!(report.changed, ids(&["s1"]));
    assert_eq!(report.ignored, ids(&["s42"]));
    assert_eq!(session.broll_classifications().len(), 1);
    assert_eq!(session.broll_classifications()[0].reason, BrollReason::Irrelevant);
    assert_eq!(session.broll_classifications()[0].confidence, 1.0);
    assert!(session.history().is_empty());
}

#[test]
fn test_snapshot_round_trip_keeps_history_undoable() {
    let mut session = session();
    let command = session
        .delete_sentences(&ids(&["s2"]))
        .command_id
        .expect("delete");
    session.set_narrative_summary("An interview.");

    let json = serde_json::to_string(&session.snapshot()).expect("serialize");
    assert!(!json.contains("orderedSentenceIds"));
    let snapshot: ProjectSnapshot = serde_json::from_str(&json).expect("deserialize");
    let mut restored = EditSession::from_snapshot(snapshot);

    assert_eq!(restored.timeline(), session.timeline());
    assert_eq!(restored.narrative_summary(), "An interview.");
    assert!(restored.undo(command).is_some());
    assert!(restored.timeline().entry("s2").is_some_and(|e| !e.excluded));
}

#[test]
fn test_legacy_snapshot_is_migrated() {
    let legacy = serde_json::json!({
        "id": "old",
        "name": "Old project",
        "sources": [{ "id": "a", "name": "a.mp4", "path": "/a.mp4", "duration": 9.0 }],
        "words": [
            { "id": "w1", "word": "Hi.", "start": 0.0, "end": 0.5, "confidence": 0.9, "sourceId": "a" },
            { "id": "w2", "word": "Bye.", "start": 1.0, "end": 1.5, "confidence": 0.9, "sourceId": "a" }
        ],
        "sentences": [
            { "sentenceId": "s1", "sourceId": "a", "wordIds": ["w1"], "text": "Hi.", "startTime": 0.0, "endTime": 0.5 },
            { "sentenceId": "s2", "sourceId": "a", "wordIds": ["w2"], "text": "Bye.", "startTime": 1.0, "endTime": 1.5 }
        ],
        "segmentGroups": [],
        "orderedSentenceIds": ["s2", "s1"],
        "excludedSentenceIds": ["s1"],
        "excludedWordIds": ["w2"],
        "transcriptlessSourceIds": [],
        "savedAt": 1700000000000u64
    });
    let snapshot: ProjectSnapshot = serde_json::from_value(legacy).expect("legacy snapshot");
    assert!(snapshot.is_legacy());

    let session = EditSession::from_snapshot(snapshot);

    assert_eq!(session.timeline().order(), ids(&["s2", "s1"]));
    assert!(session.timeline().entry("s1").is_some_and(|e| e.excluded));
    assert!(session
        .timeline()
        .entry("s2")
        .is_some_and(|e| e.excluded_word_ids.contains("w2")));
    assert_eq!(session.word("w1").map(|w| w.text.as_str()), Some("Hi."));
    assert!(session.history().is_empty());
}
