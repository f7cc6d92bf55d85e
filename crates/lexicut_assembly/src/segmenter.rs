//! Word segmentation into sentences and phrase groups.

use lexicut_core::{PhraseGroup, Sentence, Source, Word};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument, warn};

/// Duration thresholds for segmentation, in seconds.
///
/// ```toml
/// [segmenter]
/// min_sentence_duration = 1.0
/// max_group_duration = 30.0
/// min_group_duration = 5.0
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Sentences shorter than this are not flushed at terminal punctuation
    #[serde(default = "default_min_sentence_duration")]
    pub min_sentence_duration: f64,
    /// A word that would stretch a phrase group past this starts a new group
    #[serde(default = "default_max_group_duration")]
    pub max_group_duration: f64,
    /// Phrase groups shorter than this are not flushed at terminal punctuation
    #[serde(default = "default_min_group_duration")]
    pub min_group_duration: f64,
}

fn default_min_sentence_duration() -> f64 {
    1.0
}

fn default_max_group_duration() -> f64 {
    30.0
}

fn default_min_group_duration() -> f64 {
    5.0
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            min_sentence_duration: default_min_sentence_duration(),
            max_group_duration: default_max_group_duration(),
            min_group_duration: default_min_group_duration(),
        }
    }
}

/// When the accumulator closes the current buffer.
#[derive(Debug, Clone, Copy)]
struct FlushRule {
    min_duration: f64,
    max_duration: Option<f64>,
}

/// Words accumulated into one unit before it is emitted.
#[derive(Debug)]
struct Unit {
    source_id: String,
    word_ids: Vec<String>,
    texts: Vec<String>,
    start_time: f64,
    end_time: f64,
    confidence_sum: f64,
}

impl Unit {
    fn start(word: &Word) -> Self {
        Self {
            source_id: word.source_id.clone(),
            word_ids: Vec::new(),
            texts: Vec::new(),
            start_time: word.start_time,
            end_time: word.end_time,
            confidence_sum: 0.0,
        }
    }

    fn push(&mut self, word: &Word) {
        self.word_ids.push(word.id.clone());
        let text = word.text.trim();
        if !text.is_empty() {
            self.texts.push(text.to_string());
        }
        self.end_time = self.end_time.max(word.end_time);
        self.confidence_sum += word.confidence;
    }

    fn absorb(&mut self, other: Unit) {
        self.word_ids.extend(other.word_ids);
        self.texts.extend(other.texts);
        self.end_time = self.end_time.max(other.end_time);
        self.confidence_sum += other.confidence_sum;
    }

    fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    fn text(&self) -> String {
        self.texts.join(" ")
    }

    /// Mean confidence; summing before dividing weights merged units by word count.
    fn avg_confidence(&self) -> f64 {
        if self.word_ids.is_empty() {
            0.0
        } else {
            self.confidence_sum / self.word_ids.len() as f64
        }
    }
}

fn is_terminal(text: &str) -> bool {
    text.trim_end().ends_with(['.', '!', '?'])
}

/// Split one source's time-ordered words into units.
fn accumulate(words: &[&Word], rule: FlushRule) -> Vec<Unit> {
    let mut units: Vec<Unit> = Vec::new();
    let mut buffer: Option<Unit> = None;

    for word in words {
        // Close the buffer before a word would push it past the cap.
        let over_cap = match (rule.max_duration, buffer.as_ref()) {
            (Some(max), Some(unit)) => word.end_time - unit.start_time > max,
            _ => false,
        };
        if over_cap {
            units.extend(buffer.take());
        }

        let unit = buffer.get_or_insert_with(|| Unit::start(word));
        unit.push(word);

        if is_terminal(&word.text) && unit.duration() >= rule.min_duration {
            units.extend(buffer.take());
        }
    }

    if let Some(tail) = buffer {
        match units.last_mut() {
            Some(previous) if tail.duration() < rule.min_duration => {
                debug!(
                    words = tail.word_ids.len(),
                    "Merging short trailing buffer into previous unit"
                );
                previous.absorb(tail);
            }
            _ => units.push(tail),
        }
    }

    units
}

/// Group words by source in first-appearance order, each sorted by start time.
fn by_source(words: &[Word]) -> Vec<(String, Vec<&Word>)> {
    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<&str, Vec<&Word>> = HashMap::new();
    for word in words {
        let entry = grouped.entry(word.source_id.as_str()).or_default();
        if entry.is_empty() {
            order.push(word.source_id.clone());
        }
        entry.push(word);
    }

    order
        .into_iter()
        .map(|source_id| {
            let mut source_words = grouped.remove(source_id.as_str()).unwrap_or_default();
            source_words.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
            (source_id, source_words)
        })
        .collect()
}

fn to_sentence(unit: Unit, id: usize) -> Sentence {
    Sentence {
        sentence_id: format!("s{id}"),
        text: unit.text(),
        source_id: unit.source_id,
        word_ids: unit.word_ids,
        start_time: unit.start_time,
        end_time: unit.end_time,
        origin_ordering_group_id: None,
    }
}

fn sentence_rule(min_sentence_duration: f64) -> FlushRule {
    FlushRule {
        min_duration: min_sentence_duration,
        max_duration: None,
    }
}

/// Split words into sentences at terminal punctuation.
///
/// Words are processed per source in time order. A sentence is closed when a
/// word ends in `.`, `!` or `?` and the sentence spans at least
/// `min_sentence_duration`; a short trailing fragment joins the previous
/// sentence of the same source. Ids are `s1`, `s2`, ... in emission order.
///
/// # Examples
///
/// ```
/// use lexicut_assembly::segment_into_sentences;
/// use lexicut_core::Word;
///
/// let words = vec![
///     Word::new("w1", "This", "a", 0.0, 0.1),
///     Word::new("w2", "is", "a", 0.2, 0.3),
///     Word::new("w3", "it.", "a", 0.4, 0.5),
/// ];
/// let sentences = segment_into_sentences(&words, 2.0);
/// assert_eq!(sentences.len(), 1);
/// assert_eq!(sentences[0].text, "This is it.");
/// ```
#[instrument(skip(words), fields(words = words.len()))]
pub fn segment_into_sentences(words: &[Word], min_sentence_duration: f64) -> Vec<Sentence> {
    let rule = sentence_rule(min_sentence_duration);
    let sentences: Vec<Sentence> = by_source(words)
        .into_iter()
        .flat_map(|(_, source_words)| accumulate(&source_words, rule))
        .enumerate()
        .map(|(index, unit)| to_sentence(unit, index + 1))
        .collect();
    debug!(sentences = sentences.len(), "Segmented sentences");
    sentences
}

/// Segment every source, giving word-less sources one fallback sentence.
///
/// Sources are emitted in `sources` order; a source without words yields a
/// sentence spanning `[0, duration]` with no words and empty text. Words whose
/// source is not listed are segmented after the listed sources.
#[instrument(skip_all, fields(sources = sources.len(), words = words.len()))]
pub fn segment_sources(
    sources: &[Source],
    words: &[Word],
    config: &SegmenterConfig,
) -> Vec<Sentence> {
    let rule = sentence_rule(config.min_sentence_duration);
    let mut spoken: HashMap<String, Vec<&Word>> = by_source(words).into_iter().collect();
    let mut units: Vec<Unit> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for source in sources {
        if !seen.insert(source.id.as_str()) {
            warn!(source = %source.id, "Duplicate source id; segmenting it once");
            continue;
        }
        match spoken.remove(&source.id) {
            Some(source_words) => units.extend(accumulate(&source_words, rule)),
            None => {
                debug!(source = %source.id, "No words; adding fallback sentence");
                units.push(Unit {
                    source_id: source.id.clone(),
                    word_ids: Vec::new(),
                    texts: Vec::new(),
                    start_time: 0.0,
                    end_time: source.duration.unwrap_or(0.0),
                    confidence_sum: 0.0,
                });
            }
        }
    }

    for (source_id, source_words) in by_source(words) {
        if spoken.remove(&source_id).is_some() {
            units.extend(accumulate(&source_words, rule));
        }
    }

    units
        .into_iter()
        .enumerate()
        .map(|(index, unit)| to_sentence(unit, index + 1))
        .collect()
}

/// Batch words into bounded-duration phrase groups.
///
/// Groups close at terminal punctuation once they span `min_group_duration`,
/// and a word that would stretch a group past `max_group_duration` starts a
/// new one. Ids are `g1`,
/// `g2`, ... in emission order.
#[instrument(skip(words), fields(words = words.len()))]
pub fn group_for_description(
    words: &[Word],
    max_group_duration: f64,
    min_group_duration: f64,
) -> Vec<PhraseGroup> {
    let rule = FlushRule {
        min_duration: min_group_duration,
        max_duration: Some(max_group_duration),
    };
    by_source(words)
        .into_iter()
        .flat_map(|(_, source_words)| accumulate(&source_words, rule))
        .enumerate()
        .map(|(index, unit)| PhraseGroup {
            group_id: format!("g{}", index + 1),
            text: unit.text(),
            avg_confidence: unit.avg_confidence(),
            source_id: unit.source_id,
            word_ids: unit.word_ids,
            start_time: unit.start_time,
            end_time: unit.end_time,
            description: None,
        })
        .collect()
}

/// Tag each sentence with the phrase group containing its first word.
pub fn assign_origin_groups(sentences: &mut [Sentence], groups: &[PhraseGroup]) {
    let owner: HashMap<&str, &str> = groups
        .iter()
        .flat_map(|group| {
            group
                .word_ids
                .iter()
                .map(move |word_id| (word_id.as_str(), group.group_id.as_str()))
        })
        .collect();

    for sentence in sentences.iter_mut() {
        sentence.origin_ordering_group_id = sentence
            .word_ids
            .first()
            .and_then(|first| owner.get(first.as_str()))
            .map(|group_id| group_id.to_string());
    }
}
