//! The observable list state owned by a panel.

use super::backend::StoreBackend;
use super::view;
use super::StoreEntity;
use crate::error::{Error, Result};
use log::{debug, info, warn};
use uuid::Uuid;

/// Lifecycle of a list. `Ready` lasts until the panel goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Loading,
    Ready,
}

/// A persisted list of entities with a selection.
///
/// All state changes go through methods; each mutation writes through to the
/// backend before returning and bumps [`ListStore::revision`] so an observer
/// knows to redraw. A failed write rolls the in-memory change back and leaves
/// a message for [`ListStore::take_alert`].
pub struct ListStore<T, B> {
    backend: B,
    entries: Vec<T>,
    phase: LoadPhase,
    selected: Option<Uuid>,
    alert: Option<String>,
    revision: u64,
    seed_when_empty: bool,
    search_body: bool,
}

impl<T, B> ListStore<T, B>
where
    T: StoreEntity,
    B: StoreBackend<T>,
{
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            entries: Vec::new(),
            phase: LoadPhase::Loading,
            selected: None,
            alert: None,
            revision: 0,
            seed_when_empty: false,
            search_body: true,
        }
    }

    /// Create the entity's seed entry when the list loads empty.
    pub fn with_seeding(mut self, seed_when_empty: bool) -> Self {
        self.seed_when_empty = seed_when_empty;
        self
    }

    /// Whether searches look past the title.
    pub fn with_body_search(mut self, search_body: bool) -> Self {
        self.search_body = search_body;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────────────────

    /// Read the persisted entries and move to `Ready`.
    ///
    /// Entries whose backing file has disappeared are dropped. A read failure
    /// is logged and yields an empty list. Calling this again once `Ready`
    /// does nothing.
    pub fn load(&mut self) -> &[T] {
        if self.phase == LoadPhase::Ready {
            debug!("List already loaded");
            return &self.entries;
        }

        let mut entries = match self.backend.load_all() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to load list: {}. Starting empty.", e);
                Vec::new()
            }
        };

        let before = entries.len();
        entries.retain(|entry| self.backend.backing_exists(entry));
        if entries.len() < before {
            info!(
                "Dropped {} entries whose files no longer exist",
                before - entries.len()
            );
        }

        entries.sort_by(|a, b| b.recency().cmp(&a.recency()));

        if entries.is_empty() && self.seed_when_empty {
            if let Some(seed) = T::seed() {
                if let Err(e) = self.backend.persist(std::slice::from_ref(&seed), &seed) {
                    warn!("Failed to persist seed entry: {}", e);
                }
                entries.push(seed);
            }
        }

        info!("Loaded {} entries", entries.len());
        self.entries = entries;
        self.phase = LoadPhase::Ready;
        self.revision += 1;
        &self.entries
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub(crate) fn ensure_ready(&self) -> Result<()> {
        match self.phase {
            LoadPhase::Ready => Ok(()),
            LoadPhase::Loading => Err(Error::StoreNotReady),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a new entry at the front, persist it and select it.
    pub fn insert(&mut self, entry: T) -> Result<Uuid> {
        self.ensure_ready()?;
        let id = entry.id();

        self.entries.insert(0, entry);
        if let Err(e) = self.backend.persist(&self.entries, &self.entries[0]) {
            self.entries.remove(0);
            return Err(self.fail("Failed to save new entry", e));
        }

        self.selected = Some(id);
        self.revision += 1;
        debug!("Created entry {}", id);
        Ok(id)
    }

    /// Apply `mutation` to the entry with `id` and persist it.
    ///
    /// Returns `Ok(false)` when no such entry exists.
    pub fn update<F>(&mut self, id: Uuid, mutation: F) -> Result<bool>
    where
        F: FnOnce(&mut T),
    {
        self.ensure_ready()?;
        let Some(index) = self.position(id) else {
            return Ok(false);
        };

        let previous = self.entries[index].clone();
        mutation(&mut self.entries[index]);

        if let Err(e) = self.backend.persist(&self.entries, &self.entries[index]) {
            self.entries[index] = previous;
            return Err(self.fail("Failed to save changes", e));
        }

        self.revision += 1;
        Ok(true)
    }

    /// Like [`ListStore::update`], and records the change as a user edit.
    pub fn edit<F>(&mut self, id: Uuid, mutation: F) -> Result<bool>
    where
        F: FnOnce(&mut T),
    {
        self.update(id, |entry| {
            mutation(entry);
            entry.touch();
        })
    }

    /// Rename an entry; a blank title becomes "Untitled".
    pub fn rename(&mut self, id: Uuid, title: &str) -> Result<bool> {
        let title = match title.trim() {
            "" => "Untitled".to_string(),
            trimmed => trimmed.to_string(),
        };
        self.edit(id, |entry| entry.set_title(title))
    }

    pub fn toggle_star(&mut self, id: Uuid) -> Result<bool> {
        self.update(id, |entry| {
            let starred = entry.is_starred();
            entry.set_starred(!starred);
        })
    }

    /// Remove an entry and its backing file.
    ///
    /// On success the entry is gone from memory and from the persisted
    /// listing. If the listing cannot be updated the entry is put back where
    /// it was, selection included, and the error is returned.
    pub fn delete(&mut self, id: Uuid) -> Result<bool> {
        self.ensure_ready()?;
        let Some(index) = self.position(id) else {
            return Ok(false);
        };

        let removed = self.entries.remove(index);
        let was_selected = self.selected == Some(id);
        if was_selected {
            self.selected = None;
        }

        if let Err(e) = self.backend.remove(&self.entries, &removed) {
            self.entries.insert(index, removed);
            if was_selected {
                self.selected = Some(id);
            }
            return Err(self.fail("Failed to delete entry", e));
        }

        self.revision += 1;
        debug!("Deleted entry {}", id);
        Ok(true)
    }

    pub(crate) fn fail(&mut self, context: &str, err: Error) -> Error {
        warn!("{}: {}", context, err);
        self.alert = Some(err.user_message());
        self.revision += 1;
        err
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────────

    /// Select an entry; returns false (and keeps the selection) if unknown.
    pub fn select(&mut self, id: Uuid) -> bool {
        if self.position(id).is_none() {
            return false;
        }
        if self.selected != Some(id) {
            self.selected = Some(id);
            self.revision += 1;
        }
        true
    }

    pub fn clear_selection(&mut self) {
        if self.selected.take().is_some() {
            self.revision += 1;
        }
    }

    pub fn selected_id(&self) -> Option<Uuid> {
        self.selected
    }

    pub fn selected(&self) -> Option<&T> {
        self.selected.and_then(|id| self.get(id))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    fn position(&self, id: Uuid) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id() == id)
    }

    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    /// Entries in storage order (newest insert first).
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted view filtered by `query`; see [`view::filtered`].
    pub fn view(&self, query: &str) -> Vec<&T> {
        view::filtered(&self.entries, query, self.search_body)
    }

    /// Counter bumped on every observable change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Take the pending user-facing message, dismissing it.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
