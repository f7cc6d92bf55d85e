//! Edit session aggregate.
//!
//! Owns one project's sources, transcript, timeline and command history.
//! Both the agent and human callers mutate the timeline only through the
//! methods here, which record a command for every edit that changed state.

use crate::{
    BrollClassification, Command, CommandHistory, EditOperation, ProjectSnapshot,
    SentenceCatalogue, Timeline, VideoOverride,
};
use derive_getters::Getters;
use lexicut_assembly::broll_eligible_sources;
use lexicut_core::{PhraseGroup, Sentence, Source, Word};
use lexicut_error::{LexicutResult, TimelineError, TimelineErrorKind};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// What one session mutation did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EditReport {
    /// Ids whose state changed
    pub changed: Vec<String>,
    /// Ids that were ignored as unknown or foreign
    pub ignored: Vec<String>,
    /// Command recorded for the edit, if anything changed
    pub command_id: Option<Uuid>,
}

impl EditReport {
    /// Whether nothing changed.
    pub fn is_noop(&self) -> bool {
        self.changed.is_empty()
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// One project's editable state.
#[derive(Debug, Clone, Getters)]
pub struct EditSession {
    /// Project id
    id: String,
    /// Display name
    name: String,
    /// Source media
    sources: Vec<Source>,
    /// All transcribed words
    words: Vec<Word>,
    /// Sentences the timeline may reference
    catalogue: SentenceCatalogue,
    /// Description and ordering groups
    phrase_groups: Vec<PhraseGroup>,
    /// Current screenplay
    timeline: Timeline,
    /// Undoable commands
    history: CommandHistory,
    /// B-roll annotations
    broll_classifications: Vec<BrollClassification>,
    /// Ids of sources usable as override footage
    broll_sources: Vec<String>,
    /// Narrative summary from assembly ordering
    narrative_summary: String,
    #[getter(skip)]
    word_index: HashMap<String, usize>,
}

impl EditSession {
    /// Build a session whose timeline holds one active entry per sentence,
    /// in the given order.
    #[instrument(skip_all, fields(sentences = sentences.len()))]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        sources: Vec<Source>,
        words: Vec<Word>,
        sentences: Vec<Sentence>,
        phrase_groups: Vec<PhraseGroup>,
    ) -> Self {
        let broll_sources = broll_eligible_sources(&sources, &sentences);
        let catalogue = SentenceCatalogue::new(sentences);
        let timeline = Timeline::from_sentences(catalogue.sentences());
        info!(
            entries = timeline.len(),
            broll_sources = broll_sources.len(),
            "Edit session initialized"
        );
        Self {
            id: id.into(),
            name: name.into(),
            word_index: index_words(&words),
            sources,
            words,
            catalogue,
            phrase_groups,
            timeline,
            history: CommandHistory::default(),
            broll_classifications: Vec::new(),
            broll_sources,
            narrative_summary: String::new(),
        }
    }

    /// Restore a session from a snapshot, migrating legacy timelines.
    #[instrument(skip_all, fields(id = %snapshot.id))]
    pub fn from_snapshot(snapshot: ProjectSnapshot) -> Self {
        let catalogue = SentenceCatalogue::new(snapshot.sentences.clone());
        let timeline = snapshot.resolve_timeline(&catalogue);
        let broll_sources = if snapshot.transcriptless_source_ids.is_empty() {
            broll_eligible_sources(&snapshot.sources, catalogue.sentences())
        } else {
            snapshot.transcriptless_source_ids
        };
        let history = snapshot.command_history.unwrap_or_default();
        debug!(
            entries = timeline.len(),
            commands = history.len(),
            "Restored edit session"
        );

        Self {
            id: snapshot.id,
            name: snapshot.name,
            word_index: index_words(&snapshot.words),
            sources: snapshot.sources,
            words: snapshot.words,
            catalogue,
            phrase_groups: snapshot.phrase_groups,
            timeline,
            history,
            broll_classifications: snapshot.broll_classifications,
            broll_sources,
            narrative_summary: snapshot.narrative_summary,
        }
    }

    /// Capture the persisted form of this session.
    pub fn snapshot(&self) -> ProjectSnapshot {
        ProjectSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            sources: self.sources.clone(),
            words: self.words.clone(),
            sentences: self.catalogue.sentences().to_vec(),
            phrase_groups: self.phrase_groups.clone(),
            timeline: Some(self.timeline.clone()),
            ordered_sentence_ids: None,
            excluded_sentence_ids: None,
            excluded_word_ids: None,
            transcriptless_source_ids: self.broll_sources.clone(),
            broll_classifications: self.broll_classifications.clone(),
            command_history: Some(self.history.clone()),
            narrative_summary: self.narrative_summary.clone(),
            saved_at: u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default(),
        }
    }

    /// Set the narrative summary.
    pub fn set_narrative_summary(&mut self, summary: impl Into<String>) {
        self.narrative_summary = summary.into();
    }

    /// Look up a sentence.
    pub fn sentence(&self, sentence_id: &str) -> Option<&Sentence> {
        self.catalogue.get(sentence_id)
    }

    /// Look up a source.
    pub fn source(&self, source_id: &str) -> Option<&Source> {
        self.sources.iter().find(|source| source.id == source_id)
    }

    /// Look up a phrase group.
    pub fn phrase_group(&self, group_id: &str) -> Option<&PhraseGroup> {
        self.phrase_groups
            .iter()
            .find(|group| group.group_id == group_id)
    }

    /// Look up a word.
    pub fn word(&self, word_id: &str) -> Option<&Word> {
        self.word_index.get(word_id).map(|&i| &self.words[i])
    }

    /// Whether a source may supply override footage.
    pub fn is_broll_eligible(&self, source_id: &str) -> bool {
        self.broll_sources.iter().any(|id| id == source_id)
    }

    fn unknown_sentences(&self, sentence_ids: &[String]) -> Vec<String> {
        sentence_ids
            .iter()
            .filter(|id| self.timeline.entry(id).is_none())
            .cloned()
            .collect()
    }

    fn record(&mut self, label: String, operation: EditOperation) -> Uuid {
        self.history.push(label, operation)
    }

    fn set_sentences_excluded(&mut self, sentence_ids: &[String], excluded: bool) -> EditReport {
        let ignored = self.unknown_sentences(sentence_ids);
        let changed = self.timeline.set_excluded(sentence_ids, excluded);
        let command_id = (!changed.is_empty()).then(|| {
            let verb = if excluded { "Delete" } else { "Restore" };
            let label = format!("{verb} {}", plural(changed.len(), "sentence"));
            self.record(
                label,
                EditOperation::SetExcluded {
                    sentence_ids: changed.clone(),
                    excluded,
                },
            )
        });
        EditReport {
            changed,
            ignored,
            command_id,
        }
    }

    /// Exclude sentences. Unknown ids are ignored.
    #[instrument(skip(self))]
    pub fn delete_sentences(&mut self, sentence_ids: &[String]) -> EditReport {
        self.set_sentences_excluded(sentence_ids, true)
    }

    /// Restore excluded sentences. Unknown ids are ignored.
    #[instrument(skip(self))]
    pub fn restore_sentences(&mut self, sentence_ids: &[String]) -> EditReport {
        self.set_sentences_excluded(sentence_ids, false)
    }

    fn set_words_excluded(
        &mut self,
        sentence_id: &str,
        word_ids: &[String],
        excluded: bool,
    ) -> EditReport {
        let ignored: Vec<String> = match self.catalogue.get(sentence_id) {
            Some(sentence) => word_ids
                .iter()
                .filter(|word_id| !sentence.contains_word(word_id))
                .cloned()
                .collect(),
            None => word_ids.to_vec(),
        };
        let changed =
            self.timeline
                .set_excluded_words(sentence_id, word_ids, excluded, &self.catalogue);
        let command_id = (!changed.is_empty()).then(|| {
            let verb = if excluded { "Cut" } else { "Restore" };
            let label = format!("{verb} {} in {sentence_id}", plural(changed.len(), "word"));
            self.record(
                label,
                EditOperation::SetExcludedWords {
                    sentence_id: sentence_id.to_string(),
                    word_ids: changed.clone(),
                    excluded,
                },
            )
        });
        EditReport {
            changed,
            ignored,
            command_id,
        }
    }

    /// Cut words from a sentence. Words outside the sentence are ignored.
    #[instrument(skip(self))]
    pub fn delete_words(&mut self, sentence_id: &str, word_ids: &[String]) -> EditReport {
        self.set_words_excluded(sentence_id, word_ids, true)
    }

    /// Restore cut words. Words outside the sentence are ignored.
    #[instrument(skip(self))]
    pub fn restore_words(&mut self, sentence_id: &str, word_ids: &[String]) -> EditReport {
        self.set_words_excluded(sentence_id, word_ids, false)
    }

    /// Move the named sentences to the front in the given order.
    ///
    /// Entries not named follow in their previous relative order.
    #[instrument(skip(self), fields(count = order.len()))]
    pub fn reorder(&mut self, order: &[String]) -> EditReport {
        let ignored = self.unknown_sentences(order);
        let previous = self.timeline.reorder(order);
        let next = self.timeline.order();
        let changed: Vec<String> = next
            .iter()
            .zip(previous.iter())
            .filter(|(now, before)| now != before)
            .map(|(now, _)| now.clone())
            .collect();
        let command_id = (!changed.is_empty()).then(|| {
            let label = format!("Reorder {}", plural(changed.len(), "sentence"));
            self.record(label, EditOperation::Reorder { previous, next })
        });
        EditReport {
            changed,
            ignored,
            command_id,
        }
    }

    /// Exchange two sentences' positions.
    #[instrument(skip(self))]
    pub fn swap(&mut self, a: &str, b: &str) -> EditReport {
        let ignored = self.unknown_sentences(&[a.to_string(), b.to_string()]);
        if a == b || !self.timeline.swap(a, b) {
            return EditReport {
                ignored,
                ..EditReport::default()
            };
        }
        let command_id = self.record(
            format!("Swap {a} and {b}"),
            EditOperation::Swap {
                a: a.to_string(),
                b: b.to_string(),
            },
        );
        EditReport {
            changed: vec![a.to_string(), b.to_string()],
            ignored,
            command_id: Some(command_id),
        }
    }

    fn validate_override(&self, video_override: &VideoOverride) -> LexicutResult<()> {
        let source = self.source(&video_override.source_id).ok_or_else(|| {
            TimelineError::new(TimelineErrorKind::UnknownSource(
                video_override.source_id.clone(),
            ))
        })?;

        if !self.is_broll_eligible(&source.id) {
            return Err(
                TimelineError::new(TimelineErrorKind::IneligibleSource(source.id.clone())).into(),
            );
        }

        let VideoOverride { start, end, .. } = *video_override;
        let within_source = source.duration.is_none_or(|duration| end <= duration);
        if !(start.is_finite() && end.is_finite() && start >= 0.0 && start < end && within_source)
        {
            let window = format!(
                "[{start}, {end}) in source '{}' (duration {:?})",
                source.id, source.duration
            );
            return Err(TimelineError::new(TimelineErrorKind::InvalidWindow(window)).into());
        }

        Ok(())
    }

    /// Show footage from a B-roll source during a sentence.
    ///
    /// # Errors
    ///
    /// Fails if the source is unknown, not B-roll eligible, or the window is
    /// not inside it. An unknown sentence is ignored.
    #[instrument(skip(self))]
    pub fn set_video_override(
        &mut self,
        sentence_id: &str,
        video_override: VideoOverride,
    ) -> LexicutResult<EditReport> {
        self.validate_override(&video_override)?;
        Ok(self.replace_override(sentence_id, Some(video_override)))
    }

    /// Remove a sentence's override.
    #[instrument(skip(self))]
    pub fn clear_video_override(&mut self, sentence_id: &str) -> EditReport {
        self.replace_override(sentence_id, None)
    }

    fn replace_override(
        &mut self,
        sentence_id: &str,
        next: Option<VideoOverride>,
    ) -> EditReport {
        let Some(previous) = self.timeline.set_video_override(sentence_id, next.clone()) else {
            return EditReport {
                ignored: vec![sentence_id.to_string()],
                ..EditReport::default()
            };
        };
        if previous == next {
            return EditReport::default();
        }

        let label = match &next {
            Some(video_override) => format!(
                "B-roll {} on {sentence_id}",
                video_override.source_id
            ),
            None => format!("Clear B-roll on {sentence_id}"),
        };
        let command_id = self.record(
            label,
            EditOperation::SetVideoOverride {
                sentence_id: sentence_id.to_string(),
                previous,
                next,
            },
        );
        EditReport {
            changed: vec![sentence_id.to_string()],
            ignored: Vec::new(),
            command_id: Some(command_id),
        }
    }

    /// Record B-roll annotations. Not undoable.
    ///
    /// A new annotation replaces any earlier one for the same sentence.
    #[instrument(skip_all, fields(count = classifications.len()))]
    pub fn classify_broll(&mut self, classifications: Vec<BrollClassification>) -> EditReport {
        let mut report = EditReport::default();
        let mut seen: HashSet<String> = HashSet::new();
        for mut classification in classifications {
            if !self.catalogue.contains(&classification.sentence_id) {
                report.ignored.push(classification.sentence_id);
                continue;
            }
            classification.confidence = classification.confidence.clamp(0.0, 1.0);
            self.broll_classifications
                .retain(|existing| existing.sentence_id != classification.sentence_id);
            if seen.insert(classification.sentence_id.clone()) {
                report.changed.push(classification.sentence_id.clone());
            }
            self.broll_classifications.push(classification);
        }
        report
    }

    /// Revert one command, wherever it sits in the log.
    #[instrument(skip(self))]
    pub fn undo(&mut self, command_id: Uuid) -> Option<Command> {
        self.history.undo(command_id, &mut self.timeline)
    }

    /// Revert the most recent command.
    pub fn undo_last(&mut self) -> Option<Command> {
        self.history.undo_last(&mut self.timeline)
    }

    /// Forget all commands without reverting them.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

fn index_words(words: &[Word]) -> HashMap<String, usize> {
    words
        .iter()
        .enumerate()
        .map(|(i, word)| (word.id.clone(), i))
        .collect()
}
