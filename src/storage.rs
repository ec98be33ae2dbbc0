//! Uploaded-file store — one write to local disk, a public URL path out.
//!
//! Payloads arrive as base64 data URLs inside JSON bodies. The extension
//! is sniffed from magic bytes rather than trusted from the client; files
//! land under `uploads/<event-id>/` and are served statically at
//! `/files/<event-id>/<file>`.

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use thiserror::Error;
use uuid::Uuid;

/// Maximum decoded upload size in bytes (8 MB).
pub const MAX_FILE_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid file data: {0}")]
    InvalidData(String),

    #[error("File of {0} bytes exceeds the {MAX_FILE_BYTES} byte limit")]
    TooLarge(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A file written to the store.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub file_name: String,
    /// Public path under the static `/files` mount.
    pub url: String,
}

/// Decode a base64 data URL to raw bytes.
///
/// Handles both `data:application/pdf;base64,...` and raw base64 strings.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, String> {
    let base64_data = match data_url.find(',') {
        Some(idx) => &data_url[idx + 1..],
        None => data_url,
    };

    base64::engine::general_purpose::STANDARD
        .decode(base64_data)
        .map_err(|e| format!("Base64 decode failed: {e}"))
}

/// Detect file extension from magic bytes.
pub fn detect_extension(bytes: &[u8]) -> &'static str {
    if bytes.len() >= 3 && bytes[0..3] == [0xFF, 0xD8, 0xFF] {
        "jpg"
    } else if bytes.len() >= 8 && bytes[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
        "png"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "webp"
    } else if bytes.len() >= 5 && &bytes[0..5] == b"%PDF-" {
        "pdf"
    } else {
        "bin"
    }
}

/// Decode, cap, and write an uploaded payload into the event's directory.
pub fn store_event_file(
    uploads_dir: &Path,
    event_id: &Uuid,
    data_url: &str,
) -> Result<StoredFile, StorageError> {
    let bytes = decode_data_url(data_url).map_err(StorageError::InvalidData)?;
    if bytes.is_empty() {
        return Err(StorageError::InvalidData("empty payload".into()));
    }
    if bytes.len() > MAX_FILE_BYTES {
        return Err(StorageError::TooLarge(bytes.len()));
    }

    let ext = detect_extension(&bytes);
    let file_name = format!("{}.{}", Uuid::new_v4(), ext);
    let dir = uploads_dir.join(event_id.to_string());
    fs::create_dir_all(&dir)?;
    fs::write(dir.join(&file_name), &bytes)?;

    Ok(StoredFile {
        url: format!("/files/{event_id}/{file_name}"),
        file_name,
    })
}

/// Resolve a public `/files/...` URL back to its on-disk path, refusing
/// anything that would escape the event's directory.
fn file_path_from_url(uploads_dir: &Path, event_id: &Uuid, url: &str) -> Option<PathBuf> {
    let prefix = format!("/files/{event_id}/");
    let file_name = url.strip_prefix(&prefix)?;
    if file_name.is_empty() || file_name.contains('/') || file_name.contains("..") {
        return None;
    }
    Some(uploads_dir.join(event_id.to_string()).join(file_name))
}

/// Best-effort removal of a stored file. The detached record is already
/// gone from the event row; a missing file on disk is not an error.
pub fn remove_event_file(uploads_dir: &Path, event_id: &Uuid, url: &str) {
    let Some(path) = file_path_from_url(uploads_dir, event_id, url) else {
        tracing::warn!(url, "refusing to remove file outside the event directory");
        return;
    };
    if let Err(e) = fs::remove_file(&path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), "failed to remove stored file: {e}");
        }
    }
}

/// Best-effort removal of an event's whole directory (event deletion).
pub fn remove_event_dir(uploads_dir: &Path, event_id: &Uuid) {
    let dir = uploads_dir.join(event_id.to_string());
    if let Err(e) = fs::remove_dir_all(&dir) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(dir = %dir.display(), "failed to remove upload directory: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PDF: &[u8] = b"%PDF-1.4 minimal";

    fn data_url(bytes: &[u8]) -> String {
        format!(
            "data:application/octet-stream;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(bytes)
        )
    }

    #[test]
    fn decode_data_url_strips_prefix() {
        let bytes = decode_data_url(&data_url(b"hello")).unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn decode_data_url_accepts_raw_base64() {
        let raw = base64::engine::general_purpose::STANDARD.encode(b"hello");
        assert_eq!(decode_data_url(&raw).unwrap(), b"hello");
    }

    #[test]
    fn decode_data_url_rejects_garbage() {
        assert!(decode_data_url("not-valid-base64!!!").is_err());
    }

    #[test]
    fn detect_extension_known_formats() {
        assert_eq!(detect_extension(&[0xFF, 0xD8, 0xFF, 0xE0]), "jpg");
        assert_eq!(
            detect_extension(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            "png"
        );
        assert_eq!(detect_extension(b"%PDF-1.4"), "pdf");
        assert_eq!(detect_extension(&[0x00, 0x01, 0x02]), "bin");
    }

    #[test]
    fn store_writes_file_and_builds_url() {
        let tmp = tempfile::tempdir().unwrap();
        let event_id = Uuid::new_v4();

        let stored = store_event_file(tmp.path(), &event_id, &data_url(PDF)).unwrap();
        assert!(stored.url.starts_with(&format!("/files/{event_id}/")));
        assert!(stored.file_name.ends_with(".pdf"));

        let on_disk = tmp.path().join(event_id.to_string()).join(&stored.file_name);
        assert_eq!(fs::read(on_disk).unwrap(), PDF);
    }

    #[test]
    fn store_rejects_empty_and_oversized_payloads() {
        let tmp = tempfile::tempdir().unwrap();
        let event_id = Uuid::new_v4();

        let empty = data_url(b"");
        assert!(matches!(
            store_event_file(tmp.path(), &event_id, &empty),
            Err(StorageError::InvalidData(_))
        ));

        let oversized = data_url(&vec![0u8; MAX_FILE_BYTES + 1]);
        assert!(matches!(
            store_event_file(tmp.path(), &event_id, &oversized),
            Err(StorageError::TooLarge(_))
        ));
    }

    #[test]
    fn remove_event_file_deletes_only_inside_event_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let event_id = Uuid::new_v4();
        let stored = store_event_file(tmp.path(), &event_id, &data_url(PDF)).unwrap();
        let on_disk = tmp.path().join(event_id.to_string()).join(&stored.file_name);

        // A traversal-looking URL is ignored.
        remove_event_file(tmp.path(), &event_id, &format!("/files/{event_id}/../escape.pdf"));
        assert!(on_disk.exists());

        remove_event_file(tmp.path(), &event_id, &stored.url);
        assert!(!on_disk.exists());

        // Second removal is a no-op, not an error.
        remove_event_file(tmp.path(), &event_id, &stored.url);
    }

    #[test]
    fn remove_event_dir_clears_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let event_id = Uuid::new_v4();
        store_event_file(tmp.path(), &event_id, &data_url(PDF)).unwrap();

        remove_event_dir(tmp.path(), &event_id);
        assert!(!tmp.path().join(event_id.to_string()).exists());
    }
}
