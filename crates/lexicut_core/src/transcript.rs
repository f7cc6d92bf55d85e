//! Transcript units: words, sentences and phrase groups.

use serde::{Deserialize, Serialize};

/// A single transcribed word.
///
/// Produced once per transcription and immutable thereafter.
///
/// # Examples
///
/// ```
/// use lexicut_core::Word;
///
/// let word = Word::new("w1", "Hello", "src-a", 0.0, 0.4);
/// assert_eq!(word.confidence, 1.0);
/// assert!((word.duration() - 0.4).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    /// Unique word id
    pub id: String,
    /// Word text as transcribed (may carry punctuation)
    #[serde(alias = "word")]
    pub text: String,
    /// Recognition confidence in `[0, 1]`
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    /// Source the word was spoken in
    pub source_id: String,
    /// Start time in seconds, relative to the source
    #[serde(alias = "start")]
    pub start_time: f64,
    /// End time in seconds, relative to the source
    #[serde(alias = "end")]
    pub end_time: f64,
}

fn default_confidence() -> f64 {
    1.0
}

impl Word {
    /// Create a word with full confidence.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        source_id: impl Into<String>,
        start_time: f64,
        end_time: f64,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            confidence: 1.0,
            source_id: source_id.into(),
            start_time,
            end_time,
        }
    }

    /// Set the confidence, clamped to `[0, 1]`.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Derive a confidence from a transcription log-probability.
    ///
    /// `exp(logprob)` when a log-probability is available, else 1.
    ///
    /// ```
    /// use lexicut_core::Word;
    ///
    /// assert_eq!(Word::confidence_from_logprob(None), 1.0);
    /// assert_eq!(Word::confidence_from_logprob(Some(0.0)), 1.0);
    /// assert!(Word::confidence_from_logprob(Some(-0.7)) < 0.5);
    /// ```
    pub fn confidence_from_logprob(logprob: Option<f64>) -> f64 {
        match logprob {
            Some(lp) if lp.is_finite() => lp.exp().clamp(0.0, 1.0),
            Some(_) => 0.0,
            None => 1.0,
        }
    }

    /// Word duration in seconds.
    pub fn duration(&self) -> f64 {
        (self.end_time - self.start_time).max(0.0)
    }
}

/// Addressable unit of speech: one or more words ending in sentence punctuation.
///
/// A sentence with no words is the fallback for a transcriptless source and
/// spans that source's full duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentence {
    /// Unique sentence id
    pub sentence_id: String,
    /// Source the sentence was spoken in
    pub source_id: String,
    /// Ordered ids of the words in this sentence
    pub word_ids: Vec<String>,
    /// Words joined by a single space
    pub text: String,
    /// Start time of the first word
    pub start_time: f64,
    /// End time of the last word
    pub end_time: f64,
    /// Phrase group this sentence started in, if any
    #[serde(
        default,
        alias = "originalGroupId",
        skip_serializing_if = "Option::is_none"
    )]
    pub origin_ordering_group_id: Option<String>,
}

impl Sentence {
    /// Whether the sentence carries transcript content.
    pub fn has_words(&self) -> bool {
        !self.word_ids.is_empty()
    }

    /// Whether a word id belongs to this sentence.
    pub fn contains_word(&self, word_id: &str) -> bool {
        self.word_ids.iter().any(|id| id == word_id)
    }
}

/// Bounded-duration batch of words used for description and ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhraseGroup {
    /// Unique group id
    pub group_id: String,
    /// Source the group was spoken in
    pub source_id: String,
    /// Ordered ids of the words in this group
    #[serde(alias = "segmentIds")]
    pub word_ids: Vec<String>,
    /// Words joined by a single space
    pub text: String,
    /// Start time of the first word
    pub start_time: f64,
    /// End time of the last word
    pub end_time: f64,
    /// Mean word confidence
    pub avg_confidence: f64,
    /// What the footage shows while the group is spoken
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
