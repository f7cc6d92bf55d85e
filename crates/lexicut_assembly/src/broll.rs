//! B-roll eligibility.

use lexicut_core::{Sentence, Source};
use std::collections::HashSet;

/// Ids of sources that produced no sentence with words.
///
/// These transcriptless sources are offered as override footage. They still
/// carry their own fallback sentence in the timeline.
///
/// # Examples
///
/// ```
/// use lexicut_assembly::broll_eligible_sources;
/// use lexicut_core::{Sentence, Source};
///
/// let sources = vec![Source::new("a", "interview.mp4"), Source::new("b", "city.mp4")];
/// let sentences = vec![Sentence {
///     sentence_id: "s1".into(),
///     source_id: "a".into(),
///     word_ids: vec!["w1".into()],
///     text: "Hi.".into(),
///     start_time: 0.0,
///     end_time: 0.5,
///     origin_ordering_group_id: None,
/// }];
/// assert_eq!(broll_eligible_sources(&sources, &sentences), vec!["b".to_string()]);
/// ```
pub fn broll_eligible_sources(sources: &[Source], sentences: &[Sentence]) -> Vec<String> {
    let spoken: HashSet<&str> = sentences
        .iter()
        .filter(|sentence| sentence.has_words())
        .map(|sentence| sentence.source_id.as_str())
        .collect();

    sources
        .iter()
        .filter(|source| !spoken.contains(source.id.as_str()))
        .map(|source| source.id.clone())
        .collect()
}
