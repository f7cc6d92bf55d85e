//! In-memory project storage for tests.

use crate::{ProjectMeta, ProjectStore, StorageError, StorageErrorKind, validate_project_id};
use lexicut_error::LexicutResult;
use lexicut_timeline::ProjectSnapshot;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Snapshots kept in a map behind an `RwLock`. Lost when dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProjectStore {
    projects: Arc<RwLock<BTreeMap<String, (ProjectSnapshot, ProjectMeta)>>>,
}

impl InMemoryProjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored projects.
    pub async fn len(&self) -> usize {
        self.projects.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.projects.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn save(&self, snapshot: &ProjectSnapshot) -> LexicutResult<()> {
        validate_project_id(&snapshot.id)?;
        let mut projects = self.projects.write().await;
        let previous = projects.get(&snapshot.id).map(|(_, meta)| meta);
        let meta = ProjectMeta::for_snapshot(snapshot, previous);
        projects.insert(snapshot.id.clone(), (snapshot.clone(), meta));
        Ok(())
    }

    async fn load(&self, project_id: &str) -> LexicutResult<Option<ProjectSnapshot>> {
        Ok(self
            .projects
            .read()
            .await
            .get(project_id)
            .map(|(snapshot, _)| snapshot.clone()))
    }

    async fn list(&self) -> LexicutResult<Vec<ProjectMeta>> {
        Ok(self
            .projects
            .read()
            .await
            .values()
            .map(|(_, meta)| meta.clone())
            .collect())
    }

    async fn delete(&self, project_id: &str) -> LexicutResult<()> {
        match self.projects.write().await.remove(project_id) {
            Some(_) => Ok(()),
            None => Err(StorageError::new(StorageErrorKind::NotFound(project_id.to_string())).into()),
        }
    }
}
