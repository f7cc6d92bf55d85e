//! Tests for content fingerprints.

use lexicut_error::{LexicutErrorKind, StorageErrorKind};
use lexicut_storage::{compute_cid, compute_cid_blocking};
use std::io::Write;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_known_digest() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"abc").unwrap();

    let cid = compute_cid(file.path()).await.unwrap();
    assert_eq!(
        cid,
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[tokio::test]
async fn test_large_file_matches_blocking() {
    let mut file = NamedTempFile::new().unwrap();
    // Several read buffers plus a partial one.
    let chunk: Vec<u8> = (0..=255u8).cycle().take(200_003).collect();
    file.write_all(&chunk).unwrap();

    let async_cid = compute_cid(file.path()).await.unwrap();
    let blocking_cid = compute_cid_blocking(file.path()).unwrap();
    assert_eq!(async_cid, blocking_cid);
    assert_eq!(async_cid.len(), 64);
}

#[tokio::test]
async fn test_missing_file() {
    let err = compute_cid("/definitely/not/here.mp4").await.unwrap_err();
    assert!(matches!(
        err.kind(),
        LexicutErrorKind::Storage(e) if matches!(e.kind, StorageErrorKind::NotFound(_))
    ));
}
