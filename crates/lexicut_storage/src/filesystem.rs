//! Filesystem-based project storage.

use crate::{ProjectMeta, ProjectStore, validate_project_id};
use lexicut_error::{LexicutResult, StorageError, StorageErrorKind};
use lexicut_timeline::ProjectSnapshot;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

const PROJECT_FILE: &str = "project.json";
const META_FILE: &str = "meta.json";

/// Stores each project as `{base_path}/{project_id}/project.json`, with its
/// index entry in `meta.json` beside it.
///
/// # Example Structure
///
/// ```text
/// ~/.local/share/lexicut/projects/
/// ├── 3f2a9c/
/// │   ├── meta.json
/// │   └── project.json
/// └── interview-cut/
///     ├── meta.json
///     └── project.json
/// ```
///
/// Writes go to a temp file in the same directory and are renamed into place,
/// so a crash mid-save never leaves a truncated project.
#[derive(Debug, Clone)]
pub struct FileSystemProjectStore {
    base_path: PathBuf,
}

impl FileSystemProjectStore {
    /// Create a store rooted at `base_path`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> LexicutResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Opened project store");
        Ok(Self { base_path })
    }

    /// Root directory of the store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn project_path(&self, project_id: &str) -> Result<PathBuf, StorageError> {
        validate_project_id(project_id)?;
        Ok(self.base_path.join(project_id).join(PROJECT_FILE))
    }

    /// Index entry for one project directory. Projects saved without one
    /// are indexed from their snapshot.
    async fn read_meta(&self, dir: &Path) -> LexicutResult<Option<ProjectMeta>> {
        match read_json::<ProjectMeta>(&dir.join(META_FILE)).await {
            Ok(Some(meta)) => return Ok(Some(meta)),
            Ok(None) => {}
            Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "Unreadable project index entry"),
        }
        let snapshot = read_json::<ProjectSnapshot>(&dir.join(PROJECT_FILE)).await?;
        Ok(snapshot.map(|snapshot| ProjectMeta::for_snapshot(&snapshot, None)))
    }
}

/// Read and decode a JSON file; `None` if it does not exist.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            ))));
        }
    };
    serde_json::from_slice(&data).map(Some).map_err(|e| {
        StorageError::new(StorageErrorKind::InvalidSnapshot(format!(
            "{}: {}",
            path.display(),
            e
        )))
    })
}

/// Encode `value` and write it to a temp file renamed over `path`.
async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<usize, StorageError> {
    let json = serde_json::to_vec_pretty(value).map_err(|e| {
        StorageError::new(StorageErrorKind::InvalidSnapshot(format!(
            "{}: {}",
            path.display(),
            e
        )))
    })?;

    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, &json).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "{}: {}",
            temp_path.display(),
            e
        )))
    })?;

    tokio::fs::rename(&temp_path, path).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "rename {} to {}: {}",
            temp_path.display(),
            path.display(),
            e
        )))
    })?;
    Ok(json.len())
}

#[async_trait::async_trait]
impl ProjectStore for FileSystemProjectStore {
    #[tracing::instrument(skip(self, snapshot), fields(project = %snapshot.id))]
    async fn save(&self, snapshot: &ProjectSnapshot) -> LexicutResult<()> {
        let path = self.project_path(&snapshot.id)?;
        let dir = path.parent().unwrap_or(self.base_path.as_path());

        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                dir.display(),
                e
            )))
        })?;

        let previous = match read_json::<ProjectMeta>(&dir.join(META_FILE)).await {
            Ok(previous) => previous,
            Err(e) => {
                tracing::warn!(error = %e, "Replacing unreadable project index entry");
                None
            }
        };

        let size = write_json(&path, snapshot).await?;
        let meta = ProjectMeta::for_snapshot(snapshot, previous.as_ref());
        write_json(&dir.join(META_FILE), &meta).await?;

        tracing::info!(
            path = %path.display(),
            size,
            entries = snapshot.timeline.as_ref().map(|t| t.len()).unwrap_or(0),
            "Saved project"
        );
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn load(&self, project_id: &str) -> LexicutResult<Option<ProjectSnapshot>> {
        let path = self.project_path(project_id)?;

        let Some(snapshot) = read_json::<ProjectSnapshot>(&path).await? else {
            tracing::debug!(path = %path.display(), "Project not saved yet");
            return Ok(None);
        };

        tracing::debug!(
            path = %path.display(),
            legacy = snapshot.is_legacy(),
            "Loaded project"
        );
        Ok(Some(snapshot))
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self) -> LexicutResult<Vec<ProjectMeta>> {
        let mut dir = tokio::fs::read_dir(&self.base_path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                self.base_path.display(),
                e
            )))
        })?;

        let mut projects = Vec::new();
        loop {
            let entry = dir.next_entry().await.map_err(|e| {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    self.base_path.display(),
                    e
                )))
            })?;
            let Some(entry) = entry else {
                break;
            };
            let has_project = tokio::fs::try_exists(entry.path().join(PROJECT_FILE))
                .await
                .unwrap_or(false);
            if !has_project {
                continue;
            }
            match self.read_meta(&entry.path()).await {
                Ok(Some(meta)) => projects.push(meta),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(path = %entry.path().display(), error = %e, "Skipping unreadable project")
                }
            }
        }

        projects.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(projects)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, project_id: &str) -> LexicutResult<()> {
        let path = self.project_path(project_id)?;
        let dir = path.parent().unwrap_or(self.base_path.as_path());

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::new(StorageErrorKind::NotFound(
                path.display().to_string(),
            ))
            .into());
        }

        tokio::fs::remove_dir_all(dir).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "delete {}: {}",
                dir.display(),
                e
            )))
        })?;

        tracing::info!(project = project_id, "Deleted project");
        Ok(())
    }
}
