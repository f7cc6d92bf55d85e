//! Persisted project state.

use crate::{BrollClassification, CommandHistory, SentenceCatalogue, Timeline};
use lexicut_core::{PhraseGroup, Sentence, Source, Word};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Everything saved for one project.
///
/// Snapshots written before the timeline existed carry the flat
/// `orderedSentenceIds`/`excludedSentenceIds`/`excludedWordIds` fields
/// instead; those are read for migration and never written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    /// Project id
    pub id: String,
    /// Display name
    pub name: String,
    /// Source media
    #[serde(default)]
    pub sources: Vec<Source>,
    /// All transcribed words
    #[serde(default)]
    pub words: Vec<Word>,
    /// Sentence catalogue
    #[serde(default)]
    pub sentences: Vec<Sentence>,
    /// Description and ordering groups
    #[serde(default, alias = "segmentGroups")]
    pub phrase_groups: Vec<PhraseGroup>,
    /// Current timeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Timeline>,
    /// Legacy edit order
    #[serde(default, skip_serializing)]
    pub ordered_sentence_ids: Option<Vec<String>>,
    /// Legacy sentence exclusions
    #[serde(default, skip_serializing)]
    pub excluded_sentence_ids: Option<Vec<String>>,
    /// Legacy word exclusions
    #[serde(default, skip_serializing)]
    pub excluded_word_ids: Option<Vec<String>>,
    /// Sources without speech, offered as override footage
    #[serde(default)]
    pub transcriptless_source_ids: Vec<String>,
    /// B-roll annotations
    #[serde(default)]
    pub broll_classifications: Vec<BrollClassification>,
    /// Undoable commands
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_history: Option<CommandHistory>,
    /// Narrative summary from assembly ordering
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub narrative_summary: String,
    /// Save time in milliseconds since the Unix epoch
    #[serde(default)]
    pub saved_at: u64,
}

impl ProjectSnapshot {
    /// Whether this snapshot predates the timeline field.
    pub fn is_legacy(&self) -> bool {
        self.timeline.is_none()
    }

    /// The stored timeline, or one rebuilt from the legacy fields.
    ///
    /// Entries naming sentences outside `catalogue` are dropped so the
    /// result never references an unknown sentence.
    pub fn resolve_timeline(&self, catalogue: &SentenceCatalogue) -> Timeline {
        match &self.timeline {
            Some(timeline) => {
                let mut resolved = timeline.clone();
                resolved.retain_known(catalogue);
                resolved
            }
            None => {
                info!(project = %self.id, "Migrating legacy project to timeline");
                Timeline::from_legacy(
                    catalogue,
                    self.ordered_sentence_ids.as_deref().unwrap_or_default(),
                    self.excluded_sentence_ids.as_deref().unwrap_or_default(),
                    self.excluded_word_ids.as_deref().unwrap_or_default(),
                )
            }
        }
    }
}
