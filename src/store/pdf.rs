//! Imported PDFs.

use super::backend::{PdfIndex, StoreBackend};
use super::list::ListStore;
use super::StoreEntity;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Metadata of a PDF copied into managed storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfDocumentInfo {
    pub id: Uuid,
    pub title: String,
    /// File name inside the managed PDF directory
    pub file_name: String,
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub file_size: u64,
    pub imported_at: DateTime<Utc>,
    #[serde(default)]
    pub last_opened_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_starred: bool,
}

impl PdfDocumentInfo {
    /// New entry titled after the file stem.
    pub fn new(file_name: &str, page_count: u32, file_size: u64) -> Self {
        let title = Path::new(file_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.to_string());
        Self {
            id: Uuid::new_v4(),
            title,
            file_name: file_name.to_string(),
            page_count,
            file_size,
            imported_at: Utc::now(),
            last_opened_at: None,
            is_starred: false,
        }
    }
}

impl StoreEntity for PdfDocumentInfo {
    fn id(&self) -> Uuid {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn set_title(&mut self, title: String) {
        self.title = title;
    }

    fn is_starred(&self) -> bool {
        self.is_starred
    }

    fn set_starred(&mut self, starred: bool) {
        self.is_starred = starred;
    }

    fn recency(&self) -> DateTime<Utc> {
        self.last_opened_at.unwrap_or(self.imported_at)
    }

    fn matches(&self, needle: &str, include_body: bool) -> bool {
        self.title.to_lowercase().contains(needle)
            || (include_body && self.file_name.to_lowercase().contains(needle))
    }
}

fn is_pdf_name(name: &OsStr) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Whether both paths name the same existing file, however they are spelled.
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn invalid_input(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message.to_string())
}

fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!("Failed to clean up {}: {}", path.display(), e);
        }
    }
}

/// Page count of a PDF, or 0 if lopdf cannot read it.
fn count_pages(path: &Path) -> u32 {
    match lopdf::Document::load(path) {
        Ok(doc) => doc.get_pages().len() as u32,
        Err(e) => {
            warn!("Could not read pages of {}: {}", path.display(), e);
            0
        }
    }
}

/// The PDF list of the viewer panel.
pub type PdfLibrary = ListStore<PdfDocumentInfo, PdfIndex>;

impl ListStore<PdfDocumentInfo, PdfIndex> {
    /// Library over `pdfs_dir`, still in `Loading`.
    pub fn open(pdfs_dir: impl Into<PathBuf>) -> Self {
        Self::new(PdfIndex::new(pdfs_dir))
    }

    /// Managed path of an entry's PDF.
    pub fn file_path(&self, info: &PdfDocumentInfo) -> PathBuf {
        self.backend().file_path(info)
    }

    /// Copy `source` into managed storage and list it.
    ///
    /// Only `.pdf` files are accepted. The copy is staged next to the managed
    /// file and renamed over it once the index is written, so a failed import
    /// leaves the index and any same-named managed file untouched. A
    /// same-named entry is refreshed instead of duplicated.
    pub fn import(&mut self, source: &Path) -> Result<Uuid> {
        self.ensure_ready()?;

        let file_name = match source.file_name() {
            Some(name) if is_pdf_name(name) => name.to_string_lossy().into_owned(),
            Some(_) => return Err(self.import_failed(source, invalid_input("not a PDF file"))),
            None => return Err(self.import_failed(source, invalid_input("path has no file name"))),
        };

        let dir = self.backend().dir().to_path_buf();
        let target = dir.join(&file_name);
        let staging = if is_same_file(source, &target) {
            debug!("{} is already in managed storage", target.display());
            None
        } else {
            let staging = dir.join(format!("{}.tmp", file_name));
            if let Err(e) = fs::create_dir_all(&dir).and_then(|_| fs::copy(source, &staging)) {
                discard(&staging);
                return Err(self.import_failed(source, e));
            }
            Some(staging)
        };
        let copied = staging.as_deref().unwrap_or(target.as_path());

        let page_count = count_pages(copied);
        let file_size = fs::metadata(copied).map(|m| m.len()).unwrap_or(0);

        let previous = self
            .entries()
            .iter()
            .find(|info| info.file_name == file_name)
            .cloned();

        let listed = match &previous {
            Some(info) => {
                let id = info.id;
                self.update(id, |info| {
                    info.page_count = page_count;
                    info.file_size = file_size;
                    info.imported_at = Utc::now();
                })
                .map(|_| id)
            }
            None => self.insert(PdfDocumentInfo::new(&file_name, page_count, file_size)),
        };
        let id = match listed {
            Ok(id) => id,
            Err(e) => {
                if let Some(staging) = &staging {
                    discard(staging);
                }
                return Err(e);
            }
        };

        if let Some(staging) = &staging {
            if let Err(e) = fs::rename(staging, &target) {
                discard(staging);
                self.unlist(id, previous);
                return Err(self.import_failed(source, e));
            }
        }

        self.select(id);
        info!("Imported {} ({} pages)", file_name, page_count);
        Ok(id)
    }

    fn import_failed(&mut self, source: &Path, err: io::Error) -> Error {
        let err = Error::Import {
            path: source.to_path_buf(),
            source: err,
        };
        self.fail("Failed to import PDF", err)
    }

    /// Undo the listing of an import whose file never reached its place.
    fn unlist(&mut self, id: Uuid, previous: Option<PdfDocumentInfo>) {
        let rollback = match previous {
            Some(previous) => self.update(id, move |info| *info = previous).map(|_| ()),
            None => self.delete(id).map(|_| ()),
        };
        if let Err(e) = rollback {
            warn!("Failed to roll back import of {}: {}", id, e);
        }
    }

    /// Record that the PDF was opened in the viewer.
    pub fn mark_opened(&mut self, id: Uuid) -> Result<bool> {
        self.update(id, |info| info.last_opened_at = Some(Utc::now()))
    }

    /// Whether an entry's file is still present.
    pub fn is_available(&self, info: &PdfDocumentInfo) -> bool {
        self.backend().backing_exists(info)
    }
}
