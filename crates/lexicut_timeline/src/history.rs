//! Selective-undo command history.
//!
//! Commands are stored as data. Each [`EditOperation`] carries the values it
//! replaced, so reverting it does not depend on anything recorded after it.
//! Any command can be undone independently of its position in the log.

use crate::{Timeline, VideoOverride};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// A recorded timeline mutation with its captured pre-state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, strum::AsRefStr)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EditOperation {
    /// Entry order changed
    #[serde(rename_all = "camelCase")]
    Reorder {
        /// Full order before the edit
        previous: Vec<String>,
        /// Full order after the edit
        next: Vec<String>,
    },
    /// Sentences excluded or restored; only ids that changed
    #[serde(rename_all = "camelCase")]
    SetExcluded {
        /// Sentences whose state changed
        sentence_ids: Vec<String>,
        /// New state
        excluded: bool,
    },
    /// Words excluded or restored within one sentence; only ids that changed
    #[serde(rename_all = "camelCase")]
    SetExcludedWords {
        /// Owning sentence
        sentence_id: String,
        /// Words whose state changed
        word_ids: Vec<String>,
        /// New state
        excluded: bool,
    },
    /// Override set or cleared
    #[serde(rename_all = "camelCase")]
    SetVideoOverride {
        /// Target sentence
        sentence_id: String,
        /// Value before the edit
        previous: Option<VideoOverride>,
        /// Value after the edit
        next: Option<VideoOverride>,
    },
    /// Two entries exchanged positions
    Swap {
        /// First sentence id
        a: String,
        /// Second sentence id
        b: String,
    },
}

impl EditOperation {
    /// Re-run the edit.
    pub fn apply(&self, timeline: &mut Timeline) {
        match self {
            EditOperation::Reorder { next, .. } => {
                timeline.reorder(next);
            }
            EditOperation::SetExcluded {
                sentence_ids,
                excluded,
            } => {
                timeline.set_excluded(sentence_ids, *excluded);
            }
            EditOperation::SetExcludedWords {
                sentence_id,
                word_ids,
                excluded,
            } => {
                timeline.toggle_words(sentence_id, word_ids, *excluded);
            }
            EditOperation::SetVideoOverride {
                sentence_id, next, ..
            } => {
                timeline.set_video_override(sentence_id, next.clone());
            }
            EditOperation::Swap { a, b } => {
                timeline.swap(a, b);
            }
        }
    }

    /// Apply the exact inverse using the captured pre-state.
    pub fn revert(&self, timeline: &mut Timeline) {
        match self {
            EditOperation::Reorder { previous, .. } => {
                timeline.reorder(previous);
            }
            EditOperation::SetExcluded {
                sentence_ids,
                excluded,
            } => {
                timeline.set_excluded(sentence_ids, !*excluded);
            }
            EditOperation::SetExcludedWords {
                sentence_id,
                word_ids,
                excluded,
            } => {
                timeline.toggle_words(sentence_id, word_ids, !*excluded);
            }
            EditOperation::SetVideoOverride {
                sentence_id,
                previous,
                ..
            } => {
                timeline.set_video_override(sentence_id, previous.clone());
            }
            EditOperation::Swap { a, b } => {
                timeline.swap(a, b);
            }
        }
    }
}

/// One entry in the command log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Stable identifier
    pub id: Uuid,
    /// Human-readable label
    pub label: String,
    /// When the command was recorded
    pub timestamp: DateTime<Utc>,
    /// What was done
    pub operation: EditOperation,
}

/// Ordered command log supporting out-of-order undo.
///
/// Pushing records an edit that has already been applied; it does not run
/// the operation again.
///
/// # Examples
///
/// ```
/// use lexicut_timeline::{CommandHistory, EditOperation, Timeline};
///
/// let mut timeline = Timeline::default();
/// let mut history = CommandHistory::default();
/// let id = history.push(
///     "Swap",
///     EditOperation::Swap { a: "s1".into(), b: "s2".into() },
/// );
/// assert_eq!(history.len(), 1);
/// assert!(history.undo(id, &mut timeline).is_some());
/// assert!(history.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandHistory {
    commands: Vec<Command>,
}

impl CommandHistory {
    /// Record an applied edit and return its id.
    pub fn push(&mut self, label: impl Into<String>, operation: EditOperation) -> Uuid {
        let command = Command {
            id: Uuid::new_v4(),
            label: label.into(),
            timestamp: Utc::now(),
            operation,
        };
        let id = command.id;
        debug!(id = %id, label = %command.label, kind = command.operation.as_ref(), "Recorded command");
        self.commands.push(command);
        id
    }

    /// Revert one command and remove it from the log.
    ///
    /// Later commands are not replayed. Returns the removed command, or
    /// `None` if the id is unknown.
    pub fn undo(&mut self, id: Uuid, timeline: &mut Timeline) -> Option<Command> {
        let index = self.commands.iter().position(|command| command.id == id)?;
        let command = self.commands.remove(index);
        command.operation.revert(timeline);
        info!(id = %id, label = %command.label, "Undid command");
        Some(command)
    }

    /// Revert the most recent command.
    pub fn undo_last(&mut self, timeline: &mut Timeline) -> Option<Command> {
        let id = self.commands.last()?.id;
        self.undo(id, timeline)
    }

    /// Forget every command without reverting.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Commands oldest first.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Look up a command.
    pub fn get(&self, id: Uuid) -> Option<&Command> {
        self.commands.iter().find(|command| command.id == id)
    }

    /// Number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
