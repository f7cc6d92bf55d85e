//! Project index entries.

use lexicut_timeline::ProjectSnapshot;
use serde::{Deserialize, Serialize};

/// Summary of a saved project, listed without loading its snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMeta {
    /// Project id
    pub id: String,
    /// Display name
    pub name: String,
    /// First save, in milliseconds since the Unix epoch
    pub created_at: u64,
    /// Latest save, in milliseconds since the Unix epoch
    pub updated_at: u64,
}

impl ProjectMeta {
    /// Index entry for `snapshot`, keeping the creation time of an earlier
    /// save of the same project.
    pub fn for_snapshot(snapshot: &ProjectSnapshot, previous: Option<&ProjectMeta>) -> Self {
        Self {
            id: snapshot.id.clone(),
            name: snapshot.name.clone(),
            created_at: previous
                .map(|meta| meta.created_at)
                .unwrap_or(snapshot.saved_at),
            updated_at: snapshot.saved_at,
        }
    }
}
