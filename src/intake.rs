//! File intake: validate the client filename, write the bytes under the
//! upload directory, and record the file in the document store.
//!
//! Filenames are never trusted as paths. [`SafeFilename::parse`] rejects
//! anything that could resolve outside the upload directory, and
//! [`store_upload`] only accepts a `SafeFilename`, so an unchecked name
//! cannot reach the filesystem.
//!
//! A second upload with the same name overwrites the file on disk and adds a
//! second record; both records then point at the newest bytes. If the store
//! call fails after the write, the file is left in place.

use anyhow::{bail, Context, Result};
use std::fmt;
use std::path::{Component, Path};

use crate::models::DocumentRecord;
use crate::store::DocumentStore;

/// A filename that is a single, plain path component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeFilename(String);

impl SafeFilename {
    /// Accept `raw` only if it names a file directly inside a directory.
    ///
    /// Rejected: empty names, `.` and `..`, anything containing `/`, `\`, or
    /// NUL, and absolute or prefixed paths.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            bail!("invalid filename: must not be empty");
        }
        if raw.contains(['/', '\\', '\0']) {
            bail!("invalid filename '{}': path separators are not allowed", raw);
        }

        let mut components = Path::new(raw).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(Self(raw.to_string())),
            _ => bail!("invalid filename '{}': must be a plain file name", raw),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SafeFilename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Write `bytes` to `upload_dir/filename` and record it.
///
/// The upload directory is created if it does not exist yet. Returns the
/// record that was stored.
pub async fn store_upload(
    store: &dyn DocumentStore,
    upload_dir: &Path,
    filename: &SafeFilename,
    bytes: &[u8],
) -> Result<DocumentRecord> {
    tokio::fs::create_dir_all(upload_dir)
        .await
        .with_context(|| format!("Failed to create upload directory: {}", upload_dir.display()))?;

    let dest = upload_dir.join(filename.as_str());
    tokio::fs::write(&dest, bytes)
        .await
        .with_context(|| format!("Failed to write upload: {}", dest.display()))?;

    let path = dest.to_string_lossy().to_string();
    store.create_document(filename.as_str(), &path).await?;

    tracing::info!(filename = %filename, path = %path, bytes = bytes.len(), "stored upload");
    Ok(DocumentRecord::new(filename.as_str(), path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use tempfile::TempDir;

    #[test]
    fn test_plain_names_accepted() {
        for name in ["report.txt", "notes", ".hidden", "a..b.pdf", "résumé final.docx"] {
            let parsed = SafeFilename::parse(name).unwrap();
            assert_eq!(parsed.as_str(), name);
        }
    }

    #[test]
    fn test_traversal_rejected() {
        for name in [
            "",
            ".",
            "..",
            "../etc/passwd",
            "sub/dir.txt",
            "/abs.txt",
            "..\\win.ini",
            "nul\0byte",
        ] {
            assert!(
                SafeFilename::parse(name).is_err(),
                "expected '{}' to be rejected",
                name.escape_debug()
            );
        }
    }

    #[tokio::test]
    async fn test_store_upload_writes_and_records() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("uploads");
        let store = InMemoryStore::new();
        let name = SafeFilename::parse("report.txt").unwrap();

        let record = store_upload(&store, &dir, &name, b"hello").await.unwrap();

        assert_eq!(std::fs::read(dir.join("report.txt")).unwrap(), b"hello");
        assert_eq!(record.name, "report.txt");
        assert_eq!(
            record.path,
            dir.join("report.txt").to_string_lossy().to_string()
        );
        assert_eq!(store.list_documents().await.unwrap(), vec![record]);
    }

    #[tokio::test]
    async fn test_reupload_overwrites_file_and_duplicates_record() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("uploads");
        let store = InMemoryStore::new();
        let name = SafeFilename::parse("report.txt").unwrap();

        store_upload(&store, &dir, &name, b"first").await.unwrap();
        store_upload(&store, &dir, &name, b"second").await.unwrap();

        assert_eq!(std::fs::read(dir.join("report.txt")).unwrap(), b"second");
        let records = store.list_documents().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], records[1]);
    }
}
