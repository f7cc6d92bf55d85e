use lexicut_assembly::{
    SegmenterConfig, assign_origin_groups, broll_eligible_sources, group_for_description,
    segment_into_sentences, segment_sources,
};
use lexicut_core::{Source, Word};

/// Build evenly spaced words for one source.
fn words(source: &str, texts: &[&str], spacing: f64) -> Vec<Word> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let start = i as f64 * spacing;
            Word::new(format!("{source}-w{i}"), *text, source, start, start + spacing * 0.8)
        })
        .collect()
}

fn concat_words(words: &[Word]) -> String {
    words
        .iter()
        .map(|w| w.text.trim())
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn test_short_terminated_fragment_yields_one_sentence() {
    let words = vec![
        Word::new("w1", "This", "a", 0.0, 0.05),
        Word::new("w2", "is", "a", 0.1, 0.15),
        Word::new("w3", "it.", "a", 0.2, 0.25),
    ];

    let sentences = segment_into_sentences(&words, 2.0);

    assert_eq!(sentences.len(), 1);
    assert_eq!(sentences[0].word_ids, vec!["w1", "w2", "w3"]);
    assert_eq!(sentences[0].text, "This is it.");
    assert_eq!(sentences[0].start_time, 0.0);
    assert_eq!(sentences[0].end_time, 0.25);
}

#[test]
fn test_splits_at_terminal_punctuation() {
    let words = words(
        "a",
        &["Hello", "there.", "How", "are", "you?", "Great", "thanks!"],
        1.0,
    );

    let sentences = segment_into_sentences(&words, 1.0);

    let texts: Vec<&str> = sentences.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["Hello there.", "How are you?", "Great thanks!"]);
    let ids: Vec<&str> = sentences.iter().map(|s| s.sentence_id.as_str()).collect();
    assert_eq!(ids, vec!["s1", "s2", "s3"]);
}

#[test]
fn test_short_sentence_is_not_flushed_early() {
    // "Yes." spans under a second, so it runs on into the next sentence.
    let words = vec![
        Word::new("w1", "Yes.", "a", 0.0, 0.3),
        Word::new("w2", "Absolutely", "a", 0.5, 1.0),
        Word::new("w3", "right.", "a", 1.1, 1.6),
    ];

    let sentences = segment_into_sentences(&words, 1.0);

    assert_eq!(sentences.len(), 1);
    assert_eq!(sentences[0].text, "Yes. Absolutely right.");
}

#[test]
fn test_trailing_fragment_merges_into_previous_sentence() {
    let mut words = words("a", &["One", "two", "three."], 1.0);
    words.push(Word::new("tail", "um", "a", 3.0, 3.2));

    let sentences = segment_into_sentences(&words, 1.0);

    assert_eq!(sentences.len(), 1);
    assert_eq!(sentences[0].text, "One two three. um");
    assert_eq!(sentences[0].end_time, 3.2);
}

#[test]
fn test_unterminated_source_is_one_sentence() {
    let words = words("a", &["no", "punctuation", "at", "all"], 2.0);

    let sentences = segment_into_sentences(&words, 1.0);

    assert_eq!(sentences.len(), 1);
    assert_eq!(sentences[0].word_ids.len(), 4);
}

#[test]
fn test_concatenated_sentence_text_matches_input_words() {
    let texts = [
        "So", "we", "started.", "Then", "it", "rained!", "Why?", "Nobody", "knows.", "Anyway",
        "onwards",
    ];
    for spacing in [0.1, 0.4, 1.0, 3.0] {
        for min in [0.0, 1.0, 2.0, 5.0] {
            let mut input = words("a", &texts, spacing);
            input.extend(words("b", &["Second", "source.", "More", "words."], spacing));
            let sentences = segment_into_sentences(&input, min);

            let joined = sentences
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            assert_eq!(joined, concat_words(&input), "spacing={spacing} min={min}");

            let ids: Vec<String> = sentences.iter().flat_map(|s| s.word_ids.clone()).collect();
            let expected: Vec<String> = input.iter().map(|w| w.id.clone()).collect();
            assert_eq!(ids, expected);
        }
    }
}

#[test]
fn test_words_are_sorted_per_source() {
    let words = vec![
        Word::new("w2", "world.", "a", 1.0, 1.5),
        Word::new("w1", "Hello", "a", 0.0, 0.5),
    ];

    let sentences = segment_into_sentences(&words, 0.5);

    assert_eq!(sentences[0].text, "Hello world.");
}

#[test]
fn test_wordless_source_gets_fallback_sentence() {
    let sources = vec![
        Source::new("a", "interview.mp4").with_duration(10.0),
        Source::new("b", "skyline.mp4").with_duration(42.5),
    ];
    let words = words("a", &["Hello", "world."], 1.0);

    let sentences = segment_sources(&sources, &words, &SegmenterConfig::default());

    assert_eq!(sentences.len(), 2);
    let fallback = &sentences[1];
    assert_eq!(fallback.sentence_id, "s2");
    assert_eq!(fallback.source_id, "b");
    assert!(fallback.word_ids.is_empty());
    assert!(fallback.text.is_empty());
    assert_eq!(fallback.start_time, 0.0);
    assert_eq!(fallback.end_time, 42.5);

    assert_eq!(broll_eligible_sources(&sources, &sentences), vec!["b"]);
}

#[test]
fn test_duplicate_source_id_is_segmented_once() {
    let sources = vec![
        Source::new("a", "interview.mp4").with_duration(10.0),
        Source::new("a", "interview-copy.mp4").with_duration(10.0),
        Source::new("b", "skyline.mp4").with_duration(42.5),
        Source::new("b", "skyline-copy.mp4").with_duration(42.5),
    ];
    let words = words("a", &["Hello", "world."], 1.0);

    let sentences = segment_sources(&sources, &words, &SegmenterConfig::default());

    let ids: Vec<(&str, &str)> = sentences
        .iter()
        .map(|s| (s.sentence_id.as_str(), s.source_id.as_str()))
        .collect();
    assert_eq!(ids, vec![("s1", "a"), ("s2", "b")]);
    assert_eq!(sentences[0].word_ids.len(), 2);
}

#[test]
fn test_phrase_groups_respect_duration_cap() {
    // Sixty one-second words, no punctuation: capped at 30s per group.
    let texts: Vec<String> = (0..60).map(|i| format!("w{i}")).collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let words = words("a", &refs, 1.0);

    let groups = group_for_description(&words, 30.0, 5.0);

    assert_eq!(groups.len(), 2);
    assert!(groups.iter().all(|g| g.end_time - g.start_time <= 30.0));
    assert_eq!(groups[0].group_id, "g1");
    assert_eq!(groups[1].group_id, "g2");
}

#[test]
fn test_merged_group_confidence_is_word_weighted() {
    let words = vec![
        Word::new("w1", "A", "a", 0.0, 1.0).with_confidence(1.0),
        Word::new("w2", "long", "a", 1.0, 3.0).with_confidence(1.0),
        Word::new("w3", "clip.", "a", 3.0, 6.0).with_confidence(1.0),
        Word::new("w4", "ok", "a", 6.0, 6.5).with_confidence(0.2),
    ];

    let groups = group_for_description(&words, 30.0, 5.0);

    assert_eq!(groups.len(), 1);
    assert!((groups[0].avg_confidence - 0.8).abs() < 1e-9);
}

#[test]
fn test_origin_group_is_group_of_first_word() {
    let words = words("a", &["First", "one.", "Second", "one."], 3.0);
    let mut sentences = segment_into_sentences(&words, 1.0);
    let groups = group_for_description(&words, 6.0, 1.0);

    assign_origin_groups(&mut sentences, &groups);

    assert_eq!(sentences.len(), 2);
    assert_eq!(sentences[0].origin_ordering_group_id.as_deref(), Some("g1"));
    assert_eq!(sentences[1].origin_ordering_group_id.as_deref(), Some("g2"));
}
