//! Project persistence for Lexicut.
//!
//! Projects are saved as [`ProjectSnapshot`] JSON documents, one per project,
//! each with a [`ProjectMeta`] index entry for listing.
//! The [`ProjectStore`] trait separates the engine from where snapshots live;
//! [`FileSystemProjectStore`] is the on-disk backend and
//! [`InMemoryProjectStore`] serves tests.
//!
//! # Example
//!
//! ```rust
//! use lexicut_storage::{InMemoryProjectStore, ProjectStore};
//! use lexicut_timeline::EditSession;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryProjectStore::new();
//! let session = EditSession::new("p1", "Demo", vec![], vec![], vec![], vec![]);
//!
//! store.save(&session.snapshot()).await?;
//! let restored = store.load("p1").await?.expect("saved above");
//! assert_eq!(restored.name, "Demo");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod fingerprint;
mod filesystem;
mod memory;
mod meta;

pub use fingerprint::{compute_cid, compute_cid_blocking};
pub use filesystem::FileSystemProjectStore;
pub use lexicut_error::{StorageError, StorageErrorKind};
pub use memory::InMemoryProjectStore;
pub use meta::ProjectMeta;

use lexicut_error::LexicutResult;
use lexicut_timeline::ProjectSnapshot;

/// Trait for pluggable project storage backends.
#[async_trait::async_trait]
pub trait ProjectStore: Send + Sync {
    /// Save a snapshot, replacing any earlier save of the same project.
    async fn save(&self, snapshot: &ProjectSnapshot) -> LexicutResult<()>;

    /// Load a project. Returns `None` if it was never saved.
    async fn load(&self, project_id: &str) -> LexicutResult<Option<ProjectSnapshot>>;

    /// Index entries of all saved projects, sorted by id.
    async fn list(&self) -> LexicutResult<Vec<ProjectMeta>>;

    /// Delete a project.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the project does not exist.
    async fn delete(&self, project_id: &str) -> LexicutResult<()>;
}

/// Reject ids that would escape the store directory.
pub(crate) fn validate_project_id(project_id: &str) -> Result<(), StorageError> {
    let valid = !project_id.is_empty()
        && project_id != "."
        && project_id != ".."
        && !project_id.contains(['/', '\\', '\0']);
    if valid {
        Ok(())
    } else {
        Err(StorageError::new(StorageErrorKind::InvalidPath(format!(
            "Invalid project id: {:?}",
            project_id
        ))))
    }
}
