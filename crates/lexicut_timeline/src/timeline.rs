//! The editable screenplay and its mutation operations.
//!
//! All operations are total: ids that are not in the timeline (or words that
//! do not belong to the named sentence) are ignored rather than rejected, so a
//! stale reference from the reasoning service can never corrupt state.

use lexicut_core::Sentence;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, warn};

/// Footage from another source shown while a sentence's own audio plays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoOverride {
    /// Source supplying the footage
    pub source_id: String,
    /// Window start in seconds (inclusive)
    pub start: f64,
    /// Window end in seconds (exclusive)
    pub end: f64,
}

impl VideoOverride {
    /// Create an override for `[start, end)` of a source.
    pub fn new(source_id: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            source_id: source_id.into(),
            start,
            end,
        }
    }
}

/// Editable wrapper around one sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    /// Sentence this entry wraps
    pub sentence_id: String,
    /// Sentence text
    pub text: String,
    /// Source the sentence was spoken in
    pub source_id: String,
    /// Removed from output, kept for restore
    #[serde(default)]
    pub excluded: bool,
    /// Words cut from an otherwise active sentence
    #[serde(default)]
    pub excluded_word_ids: BTreeSet<String>,
    /// Replacement footage, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_override: Option<VideoOverride>,
}

impl TimelineEntry {
    /// Fresh, active entry for a sentence.
    pub fn from_sentence(sentence: &Sentence) -> Self {
        Self {
            sentence_id: sentence.sentence_id.clone(),
            text: sentence.text.clone(),
            source_id: sentence.source_id.clone(),
            excluded: false,
            excluded_word_ids: BTreeSet::new(),
            video_override: None,
        }
    }
}

/// Sentences indexed by id.
///
/// Bounds what a timeline may reference; the first sentence wins when ids
/// repeat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SentenceCatalogue {
    sentences: Vec<Sentence>,
    index: HashMap<String, usize>,
}

impl SentenceCatalogue {
    /// Index a list of sentences.
    pub fn new(sentences: Vec<Sentence>) -> Self {
        let mut kept: Vec<Sentence> = Vec::with_capacity(sentences.len());
        let mut index: HashMap<String, usize> = HashMap::with_capacity(sentences.len());
        for sentence in sentences {
            if index.contains_key(&sentence.sentence_id) {
                warn!(id = %sentence.sentence_id, "Dropping duplicate sentence id");
                continue;
            }
            index.insert(sentence.sentence_id.clone(), kept.len());
            kept.push(sentence);
        }
        Self {
            sentences: kept,
            index,
        }
    }

    /// Look up a sentence.
    pub fn get(&self, sentence_id: &str) -> Option<&Sentence> {
        self.index.get(sentence_id).map(|&i| &self.sentences[i])
    }

    /// Whether a sentence id is known.
    pub fn contains(&self, sentence_id: &str) -> bool {
        self.index.contains_key(sentence_id)
    }

    /// Sentence owning a word id.
    pub fn sentence_of_word(&self, word_id: &str) -> Option<&Sentence> {
        self.sentences
            .iter()
            .find(|sentence| sentence.contains_word(word_id))
    }

    /// Sentences in catalogue order.
    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    /// Number of sentences.
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    /// Whether the catalogue is empty.
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

/// Ordered screenplay; entry order is edit order.
///
/// # Examples
///
/// ```
/// use lexicut_core::Sentence;
/// use lexicut_timeline::Timeline;
///
/// let sentence = |id: &str| Sentence {
///     sentence_id: id.to_string(),
///     source_id: "a".to_string(),
///     word_ids: vec![],
///     text: String::new(),
///     start_time: 0.0,
///     end_time: 1.0,
///     origin_ordering_group_id: None,
/// };
/// let mut timeline = Timeline::from_sentences(&[sentence("s1"), sentence("s2"), sentence("s3")]);
///
/// timeline.reorder(&["s3".to_string()]);
/// assert_eq!(timeline.order(), vec!["s3", "s1", "s2"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    version: u32,
    entries: Vec<TimelineEntry>,
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: Vec::new(),
        }
    }
}

impl Timeline {
    /// Schema version written by this crate.
    pub const CURRENT_VERSION: u32 = 1;

    /// One active entry per sentence, in input order.
    pub fn from_sentences(sentences: &[Sentence]) -> Self {
        let mut timeline = Self::default();
        timeline.initialize(sentences);
        timeline
    }

    /// Rebuild a timeline from the legacy flat representation.
    ///
    /// Ids in `ordered` come first; catalogue sentences it misses follow in
    /// catalogue order. Excluded word ids attach to their owning sentence.
    pub fn from_legacy(
        catalogue: &SentenceCatalogue,
        ordered: &[String],
        excluded_sentences: &[String],
        excluded_words: &[String],
    ) -> Self {
        let mut timeline = Self::from_sentences(catalogue.sentences());
        timeline.reorder(ordered);
        timeline.set_excluded(excluded_sentences, true);

        let mut by_sentence: HashMap<&str, Vec<String>> = HashMap::new();
        for word_id in excluded_words {
            match catalogue.sentence_of_word(word_id) {
                Some(sentence) => by_sentence
                    .entry(sentence.sentence_id.as_str())
                    .or_default()
                    .push(word_id.clone()),
                None => debug!(word = %word_id, "Legacy excluded word has no sentence"),
            }
        }
        for (sentence_id, word_ids) in by_sentence {
            timeline.toggle_words(sentence_id, &word_ids, true);
        }

        timeline
    }

    /// Replace all entries with fresh ones for `sentences`.
    pub fn initialize(&mut self, sentences: &[Sentence]) {
        let mut seen: HashSet<&str> = HashSet::new();
        self.entries = sentences
            .iter()
            .filter(|sentence| seen.insert(sentence.sentence_id.as_str()))
            .map(TimelineEntry::from_sentence)
            .collect();
    }

    /// Drop entries outside the catalogue and repeated ids.
    pub(crate) fn retain_known(&mut self, catalogue: &SentenceCatalogue) {
        let before = self.entries.len();
        let mut seen: HashSet<String> = HashSet::new();
        self.entries.retain(|entry| {
            catalogue.contains(&entry.sentence_id) && seen.insert(entry.sentence_id.clone())
        });
        if self.entries.len() != before {
            warn!(
                dropped = before - self.entries.len(),
                "Dropped timeline entries with unknown or repeated sentence ids"
            );
        }
    }

    /// Schema version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Entries in edit order.
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    /// Entries that are not excluded, in edit order.
    pub fn active_entries(&self) -> impl Iterator<Item = &TimelineEntry> {
        self.entries.iter().filter(|entry| !entry.excluded)
    }

    /// Look up an entry.
    pub fn entry(&self, sentence_id: &str) -> Option<&TimelineEntry> {
        self.entries
            .iter()
            .find(|entry| entry.sentence_id == sentence_id)
    }

    fn entry_mut(&mut self, sentence_id: &str) -> Option<&mut TimelineEntry> {
        self.entries
            .iter_mut()
            .find(|entry| entry.sentence_id == sentence_id)
    }

    /// Position of an entry in edit order.
    pub fn position(&self, sentence_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.sentence_id == sentence_id)
    }

    /// Sentence ids in edit order.
    pub fn order(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.sentence_id.clone())
            .collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move the named entries to the front in the given order.
    ///
    /// Unknown and repeated ids are ignored; entries not named keep their
    /// previous relative order after the named ones. Returns the previous
    /// order.
    pub fn reorder(&mut self, new_order: &[String]) -> Vec<String> {
        let previous = self.order();
        let mut remaining: Vec<Option<TimelineEntry>> =
            std::mem::take(&mut self.entries).into_iter().map(Some).collect();
        let positions: HashMap<String, usize> = previous
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        let mut reordered: Vec<TimelineEntry> = Vec::with_capacity(remaining.len());
        for id in new_order {
            match positions.get(id) {
                Some(&i) => reordered.extend(remaining[i].take()),
                None => debug!(id = %id, "Ignoring unknown id in reorder"),
            }
        }
        reordered.extend(remaining.into_iter().flatten());

        self.entries = reordered;
        previous
    }

    /// Set `excluded` on the named entries.
    ///
    /// Returns the ids whose state actually changed.
    pub fn set_excluded(&mut self, sentence_ids: &[String], excluded: bool) -> Vec<String> {
        let mut changed = Vec::new();
        for id in sentence_ids {
            match self.entry_mut(id) {
                Some(entry) if entry.excluded != excluded => {
                    entry.excluded = excluded;
                    changed.push(id.clone());
                }
                Some(_) => {}
                None => debug!(id = %id, "Ignoring unknown sentence"),
            }
        }
        changed
    }

    /// Add or remove word ids from an entry's exclusion set.
    ///
    /// Word ids that do not belong to the sentence are dropped. Returns the
    /// word ids whose state actually changed.
    pub fn set_excluded_words(
        &mut self,
        sentence_id: &str,
        word_ids: &[String],
        excluded: bool,
        catalogue: &SentenceCatalogue,
    ) -> Vec<String> {
        let Some(sentence) = catalogue.get(sentence_id) else {
            debug!(id = %sentence_id, "Ignoring word edit on unknown sentence");
            return Vec::new();
        };

        let owned: Vec<String> = word_ids
            .iter()
            .filter(|word_id| {
                let belongs = sentence.contains_word(word_id);
                if !belongs {
                    warn!(sentence = %sentence_id, word = %word_id, "Dropping foreign word id");
                }
                belongs
            })
            .cloned()
            .collect();

        self.toggle_words(sentence_id, &owned, excluded)
    }

    /// Word exclusion without the ownership filter, for replaying recorded edits.
    pub(crate) fn toggle_words(
        &mut self,
        sentence_id: &str,
        word_ids: &[String],
        excluded: bool,
    ) -> Vec<String> {
        let Some(entry) = self.entry_mut(sentence_id) else {
            return Vec::new();
        };

        word_ids
            .iter()
            .filter(|word_id| {
                if excluded {
                    entry.excluded_word_ids.insert((*word_id).clone())
                } else {
                    entry.excluded_word_ids.remove(*word_id)
                }
            })
            .cloned()
            .collect()
    }

    /// Set or clear an entry's override.
    ///
    /// Returns the previous value, or `None` when the entry does not exist.
    pub fn set_video_override(
        &mut self,
        sentence_id: &str,
        video_override: Option<VideoOverride>,
    ) -> Option<Option<VideoOverride>> {
        match self.entry_mut(sentence_id) {
            Some(entry) => Some(std::mem::replace(&mut entry.video_override, video_override)),
            None => {
                debug!(id = %sentence_id, "Ignoring override on unknown sentence");
                None
            }
        }
    }

    /// Exchange two entries' positions.
    ///
    /// Returns false (and does nothing) if either id is absent.
    pub fn swap(&mut self, a: &str, b: &str) -> bool {
        match (self.position(a), self.position(b)) {
            (Some(i), Some(j)) => {
                self.entries.swap(i, j);
                true
            }
            _ => {
                debug!(a = %a, b = %b, "Ignoring swap with unknown id");
                false
            }
        }
    }
}
