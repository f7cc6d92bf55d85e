//! Source media files.

use serde::{Deserialize, Serialize};

/// Description of a time range within a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescription {
    /// Range start in seconds
    pub start: f64,
    /// Range end in seconds
    pub end: f64,
    /// What the footage shows
    pub description: String,
}

/// A source video file in the project.
///
/// `cid` is the opaque content fingerprint threaded through collaborator
/// caches; the engine never computes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Unique source id
    pub id: String,
    /// Content fingerprint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    /// Display name
    pub name: String,
    /// Path on disk
    #[serde(default)]
    pub path: String,
    /// Duration in seconds, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Visual descriptions of time ranges
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptions: Option<Vec<SourceDescription>>,
}

impl Source {
    /// Create a source with only an id and name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cid: None,
            name: name.into(),
            path: String::new(),
            duration: None,
            descriptions: None,
        }
    }

    /// Set the duration in seconds.
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Set the content fingerprint.
    pub fn with_cid(mut self, cid: impl Into<String>) -> Self {
        self.cid = Some(cid.into());
        self
    }
}
