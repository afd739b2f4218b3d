//! On-disk representations of a list.

use super::pdf::PdfDocumentInfo;
use super::StoreEntity;
use crate::error::{Error, Result};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::ffi::OsStr;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Where a list's entries live.
///
/// Every method is called synchronously from the owning store, right after
/// the in-memory change, so disk and memory agree when it returns.
pub trait StoreBackend<T> {
    /// Read every persisted entry.
    fn load_all(&self) -> Result<Vec<T>>;

    /// Write `changed`; `entries` is the whole list after the change.
    fn persist(&self, entries: &[T], changed: &T) -> Result<()>;

    /// Drop `removed`; `remaining` is the whole list after the removal.
    ///
    /// Returns an error only when the persisted listing still holds
    /// `removed`, so a later load would bring it back.
    fn remove(&self, remaining: &[T], removed: &T) -> Result<()>;

    /// Whether the file backing `entry` is still on disk.
    fn backing_exists(&self, entry: &T) -> bool;
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Read and parse one JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `value` as pretty JSON, creating parent directories.
///
/// The JSON goes to a sibling `.tmp` file which is then renamed over `path`,
/// so readers see either the old or the new file, never a torn one.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| Error::FileWrite {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let json = serde_json::to_string_pretty(value).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, json).map_err(|source| Error::FileWrite {
        path: temp_path.clone(),
        source,
    })?;
    fs::rename(&temp_path, path).map_err(|source| Error::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Wrote {}", path.display());
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// One File Per Entry
// ─────────────────────────────────────────────────────────────────────────────

/// Each entry stored as `<dir>/<id>.json`.
#[derive(Debug, Clone)]
pub struct EntryFiles<T> {
    dir: PathBuf,
    _entity: PhantomData<fn() -> T>,
}

impl<T> EntryFiles<T> {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            _entity: PhantomData,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }
}

impl<T> StoreBackend<T> for EntryFiles<T>
where
    T: StoreEntity + Serialize + DeserializeOwned,
{
    fn load_all(&self) -> Result<Vec<T>> {
        if !self.dir.exists() {
            debug!("No entries yet at {}", self.dir.display());
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.dir).map_err(|source| Error::FileRead {
            path: self.dir.clone(),
            source,
        })?;

        let mut loaded = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension() != Some(OsStr::new("json")) {
                continue;
            }
            match read_json::<T>(&path) {
                Ok(item) => loaded.push(item),
                Err(e) => warn!("Skipping unreadable entry: {}", e),
            }
        }
        Ok(loaded)
    }

    fn persist(&self, _entries: &[T], changed: &T) -> Result<()> {
        write_json_atomic(&self.path_for(changed.id()), changed)
    }

    fn remove(&self, _remaining: &[T], removed: &T) -> Result<()> {
        let path = self.path_for(removed.id());
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(Error::FileDelete { path, source }),
        }
    }

    fn backing_exists(&self, entry: &T) -> bool {
        self.path_for(entry.id()).exists()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PDF Index
// ─────────────────────────────────────────────────────────────────────────────

/// Name of the PDF metadata index inside the PDF directory.
const PDF_INDEX_FILE: &str = "_metadata.json";

/// All PDF metadata in one `_metadata.json`; the PDFs themselves sit next to
/// it and are the backing files of their entries.
#[derive(Debug, Clone)]
pub struct PdfIndex {
    dir: PathBuf,
}

impl PdfIndex {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(PDF_INDEX_FILE)
    }

    /// Managed location of an entry's PDF.
    pub fn file_path(&self, info: &PdfDocumentInfo) -> PathBuf {
        self.dir.join(&info.file_name)
    }
}

impl StoreBackend<PdfDocumentInfo> for PdfIndex {
    fn load_all(&self) -> Result<Vec<PdfDocumentInfo>> {
        let path = self.index_path();
        if !path.exists() {
            debug!("No PDF index at {}", path.display());
            return Ok(Vec::new());
        }
        read_json(&path)
    }

    fn persist(&self, entries: &[PdfDocumentInfo], _changed: &PdfDocumentInfo) -> Result<()> {
        write_json_atomic(&self.index_path(), entries)
    }

    /// Rewrites the index first so the entry cannot come back, then deletes
    /// the PDF. A PDF that cannot be deleted is only logged.
    fn remove(&self, remaining: &[PdfDocumentInfo], removed: &PdfDocumentInfo) -> Result<()> {
        write_json_atomic(&self.index_path(), remaining)?;

        let file = self.file_path(removed);
        if let Err(e) = fs::remove_file(&file) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to delete {}: {}", file.display(), e);
            }
        }
        Ok(())
    }

    fn backing_exists(&self, entry: &PdfDocumentInfo) -> bool {
        self.file_path(entry).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::WorkspaceDocument;
    use tempfile::TempDir;

    #[test]
    fn test_write_json_atomic_creates_dirs_and_leaves_no_temp() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a").join("b").join("value.json");
        write_json_atomic(&path, &vec![1, 2, 3]).unwrap();

        let back: Vec<i32> = read_json(&path).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
        assert!(!path.with_file_name("value.json.tmp").exists());
    }

    #[test]
    fn test_read_json_errors() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.json");
        assert!(matches!(
            read_json::<Vec<i32>>(&missing),
            Err(Error::FileRead { .. })
        ));

        let broken = temp.path().join("broken.json");
        fs::write(&broken, "[1,").unwrap();
        assert!(matches!(read_json::<Vec<i32>>(&broken), Err(Error::Json { .. })));
    }

    #[test]
    fn test_entry_files_skip_corrupt_and_foreign_files() {
        let temp = TempDir::new().unwrap();
        let backend: EntryFiles<WorkspaceDocument> = EntryFiles::new(temp.path());
        let doc = WorkspaceDocument::new("Kept", "body");
        backend.persist(&[], &doc).unwrap();
        fs::write(temp.path().join("junk.json"), "not json").unwrap();
        fs::write(temp.path().join("readme.txt"), "hello").unwrap();

        let loaded = backend.load_all().unwrap();
        assert_eq!(loaded, vec![doc]);
    }

    #[test]
    fn test_entry_files_remove_missing_is_ok() {
        let temp = TempDir::new().unwrap();
        let backend: EntryFiles<WorkspaceDocument> = EntryFiles::new(temp.path());
        let doc = WorkspaceDocument::new("Gone", "");
        assert!(backend.remove(&[], &doc).is_ok());
        assert!(!backend.backing_exists(&doc));
    }

    #[test]
    fn test_pdf_index_missing_is_empty() {
        let temp = TempDir::new().unwrap();
        let index = PdfIndex::new(temp.path().join("pdfs"));
        assert!(index.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_pdf_index_remove_rewrites_index_and_file() {
        let temp = TempDir::new().unwrap();
        let index = PdfIndex::new(temp.path());
        let a = PdfDocumentInfo::new("a.pdf", 1, 10);
        let b = PdfDocumentInfo::new("b.pdf", 2, 20);
        fs::write(index.file_path(&a), b"%PDF").unwrap();
        index.persist(&[a.clone(), b.clone()], &b).unwrap();

        index.remove(&[b.clone()], &a).unwrap();

        assert!(!index.file_path(&a).exists());
        assert_eq!(index.load_all().unwrap(), vec![b]);
    }
}
