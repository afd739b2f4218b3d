//! Persisted entity lists for the workspace panels
//!
//! Documents and imported PDFs share one list pattern: load once from
//! managed storage, then create / update / star / delete with every mutation
//! written through immediately. The on-disk layout differs per entity and is
//! hidden behind [`StoreBackend`]:
//!
//! ```text
//! <root>/workspace/docs/<id>.json        one file per document
//! <root>/workspace/pdfs/_metadata.json   index of imported PDFs
//! <root>/workspace/pdfs/<name>.pdf       copied PDF files
//! <root>/workspace/templates/*.json      user templates
//! ```

mod backend;
mod document;
mod list;
mod pdf;
mod view;

pub use backend::{read_json, write_json_atomic, EntryFiles, PdfIndex, StoreBackend};
pub use document::{DocumentStore, WorkspaceDocument};
pub use list::{ListStore, LoadPhase};
pub use pdf::{PdfDocumentInfo, PdfLibrary};
pub use view::{filtered, sorted};

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use uuid::Uuid;

// ─────────────────────────────────────────────────────────────────────────────
// Entity Contract
// ─────────────────────────────────────────────────────────────────────────────

/// What a list needs to know about the entries it holds.
pub trait StoreEntity: Clone {
    fn id(&self) -> Uuid;

    fn title(&self) -> &str;

    fn set_title(&mut self, title: String);

    fn is_starred(&self) -> bool;

    fn set_starred(&mut self, starred: bool);

    /// Timestamp used for "most recent first" ordering.
    fn recency(&self) -> DateTime<Utc>;

    /// Record a user edit. Entities without an edit timestamp ignore it.
    fn touch(&mut self) {}

    /// Whether the entry matches an already-lowercased search needle.
    ///
    /// `include_body` extends the match beyond the title (document content,
    /// PDF file name).
    fn matches(&self, needle: &str, include_body: bool) -> bool;

    /// Entry created when a list loads empty, if the entity has one.
    fn seed() -> Option<Self> {
        None
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Managed Storage Layout
// ─────────────────────────────────────────────────────────────────────────────

/// Directory names inside the managed storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn docs_dir(&self) -> PathBuf {
        self.root.join("workspace").join("docs")
    }

    pub fn pdfs_dir(&self) -> PathBuf {
        self.root.join("workspace").join("pdfs")
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root.join("workspace").join("templates")
    }
}
