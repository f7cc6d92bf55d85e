//! Content fingerprints for source media.

use lexicut_error::{LexicutResult, StorageError, StorageErrorKind};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::{Path, PathBuf};

const READ_BUFFER: usize = 64 * 1024;

/// SHA-256 of a file's contents as lowercase hex, read in fixed-size chunks.
///
/// # Errors
///
/// Returns `NotFound` for a missing file and `FileRead` for other I/O errors.
pub fn compute_cid_blocking(path: &Path) -> LexicutResult<String> {
    let file = std::fs::File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StorageError::new(StorageErrorKind::NotFound(path.display().to_string()))
        } else {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
        }
    })?;

    let mut reader = std::io::BufReader::with_capacity(1024 * 1024, file);
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; READ_BUFFER];
    loop {
        let read = reader.read(&mut buffer).map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// [`compute_cid_blocking`] on the blocking thread pool.
#[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
pub async fn compute_cid(path: impl AsRef<Path>) -> LexicutResult<String> {
    let path: PathBuf = path.as_ref().to_path_buf();
    let cid = tokio::task::spawn_blocking(move || compute_cid_blocking(&path))
        .await
        .map_err(|e| StorageError::new(StorageErrorKind::Task(e.to_string())))??;
    tracing::debug!(cid = %cid, "Computed content fingerprint");
    Ok(cid)
}
