//! Opening and saving sessions through a [`ProjectStore`].

use lexicut_error::{LexicutResult, StorageError, StorageErrorKind};
use lexicut_storage::ProjectStore;
use lexicut_timeline::EditSession;
use tracing::{debug, instrument};

/// Load a saved project as an editable session.
///
/// # Errors
///
/// Returns `NotFound` when the project was never saved, plus any store error.
#[instrument(skip(store))]
pub async fn open_session(store: &dyn ProjectStore, project_id: &str) -> LexicutResult<EditSession> {
    let snapshot = store.load(project_id).await?.ok_or_else(|| {
        StorageError::new(StorageErrorKind::NotFound(format!(
            "Project '{}'",
            project_id
        )))
    })?;
    if snapshot.is_legacy() {
        debug!("Migrating legacy timeline");
    }
    Ok(EditSession::from_snapshot(snapshot))
}

/// Persist a session, replacing its previous save.
#[instrument(skip_all, fields(project = %session.id()))]
pub async fn save_session(store: &dyn ProjectStore, session: &EditSession) -> LexicutResult<()> {
    store.save(&session.snapshot()).await
}
