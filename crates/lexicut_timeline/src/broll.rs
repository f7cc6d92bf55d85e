//! B-roll annotations.

use serde::{Deserialize, Serialize};

/// Why a sentence was judged B-roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BrollReason {
    /// Off-topic for the narrative
    Irrelevant,
    /// Too short to stand alone
    TooShort,
}

/// Side annotation on a sentence; not a timeline mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrollClassification {
    /// Annotated sentence
    pub sentence_id: String,
    /// Whether the sentence is better used as B-roll
    pub is_broll: bool,
    /// Why
    pub reason: BrollReason,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
}
