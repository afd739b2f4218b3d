//! Workspace documents.

use super::backend::EntryFiles;
use super::list::ListStore;
use super::StoreEntity;
use crate::error::Result;
use crate::templates::{render, Template, TemplateFillResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

const WELCOME_TITLE: &str = "Welcome";

const WELCOME_CONTENT: &str = "# Welcome\n\n\
Documents you create appear in the sidebar, newest first. Star a document to \
keep it at the top.\n\n\
Use **New from template** to start from meeting notes, a project brief or a \
spreadsheet, and ask the assistant to write or explain formulas.\n";

/// A document in the workspace, stored as `docs/<id>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceDocument {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_starred: bool,
}

impl WorkspaceDocument {
    pub fn new(title: &str, content: &str) -> Self {
        let now = Utc::now();
        let title = match title.trim() {
            "" => "Untitled".to_string(),
            trimmed => trimmed.to_string(),
        };
        Self {
            id: Uuid::new_v4(),
            title,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
            is_starred: false,
        }
    }

    pub fn welcome() -> Self {
        Self::new(WELCOME_TITLE, WELCOME_CONTENT)
    }

    /// First non-empty content line without markdown heading marks, cut to
    /// `max_chars`, for list rows.
    pub fn preview(&self, max_chars: usize) -> String {
        let line = self
            .content
            .lines()
            .map(|line| line.trim_start_matches('#').trim())
            .find(|line| !line.is_empty())
            .unwrap_or("");

        if line.chars().count() <= max_chars {
            line.to_string()
        } else {
            let cut: String = line.chars().take(max_chars).collect();
            format!("{}…", cut.trim_end())
        }
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

impl StoreEntity for WorkspaceDocument {
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
        self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn matches(&self, needle: &str, include_body: bool) -> bool {
        self.title.to_lowercase().contains(needle)
            || (include_body && self.content.to_lowercase().contains(needle))
    }

    fn seed() -> Option<Self> {
        Some(Self::welcome())
    }
}

/// The document list of the workspace panel.
pub type DocumentStore = ListStore<WorkspaceDocument, EntryFiles<WorkspaceDocument>>;

impl ListStore<WorkspaceDocument, EntryFiles<WorkspaceDocument>> {
    /// Store over `docs_dir`, still in `Loading`.
    pub fn open(docs_dir: impl Into<PathBuf>) -> Self {
        Self::new(EntryFiles::new(docs_dir))
    }

    /// "New document": create, persist and select.
    pub fn create_document(&mut self, title: &str, content: &str) -> Result<Uuid> {
        self.insert(WorkspaceDocument::new(title, content))
    }

    /// Create a document from a confirmed template fill.
    pub fn create_from_template(
        &mut self,
        template: &Template,
        fill: &TemplateFillResult,
    ) -> Result<Uuid> {
        self.create_document(&fill.title, &render(template, fill))
    }

    /// Replace a document's content.
    pub fn set_content(&mut self, id: Uuid, content: &str) -> Result<bool> {
        self.edit(id, |doc| doc.content = content.to_string())
    }
}
