//! Ordered set of tracked files with unique identities.

use std::collections::HashSet;

use crate::error::StoreError;
use crate::id::IdGenerator;
use crate::types::{EntryId, FileEntry};

/// Upper bound on generator calls while looking for a free placeholder.
const MAX_ID_ATTEMPTS: usize = 1024;

/// The files currently known to the widget, in insertion order.
///
/// No two entries ever share an identity: every mutating operation
/// validates first and leaves the store untouched on error. Identities
/// that were replaced or removed are retired and never handed out again
/// as placeholders.
///
/// The retired set is never pruned. It grows by one identity per
/// removal or reconciled upload, so it stays bounded by the number of
/// files the widget has ever tracked.
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    entries: Vec<FileEntry>,
    retired: HashSet<EntryId>,
}

impl SelectionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the store holds no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by identity.
    #[must_use]
    pub fn get(&self, id: &EntryId) -> Option<&FileEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    /// Returns `true` if an entry has this identity.
    #[must_use]
    pub fn contains(&self, id: &EntryId) -> bool {
        self.get(id).is_some()
    }

    /// Entries not yet stored on the server, in insertion order.
    pub fn pending(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.iter().filter(|e| !e.uploaded)
    }

    /// Returns `true` if every entry is uploaded (vacuously for an
    /// empty store).
    #[must_use]
    pub fn all_uploaded(&self) -> bool {
        self.entries.iter().all(|e| e.uploaded)
    }

    /// Returns `true` if the identity is in use or was retired.
    #[must_use]
    pub fn is_taken(&self, id: &EntryId) -> bool {
        self.retired.contains(id) || self.contains(id)
    }

    /// Draw placeholder identities from `ids` until one is free.
    ///
    /// `reserved` holds identities handed out for a batch that has not
    /// been appended yet. Returns `None` if the generator keeps
    /// producing taken values.
    pub fn fresh_id(
        &self,
        ids: &mut dyn IdGenerator,
        reserved: &HashSet<EntryId>,
    ) -> Option<EntryId> {
        (0..MAX_ID_ATTEMPTS)
            .map(|_| ids.next_id())
            .find(|id| !self.is_taken(id) && !reserved.contains(id))
    }

    /// Add entries at the end, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateIdentity`] if any identity is
    /// already present or repeated within `entries`; nothing is added.
    pub fn append(&mut self, entries: Vec<FileEntry>) -> Result<(), StoreError> {
        let mut incoming = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if self.contains(&entry.id) || !incoming.insert(&entry.id) {
                return Err(StoreError::DuplicateIdentity(entry.id.clone()));
            }
        }
        self.entries.extend(entries);
        Ok(())
    }

    /// Remove the entry with this identity and return it.
    ///
    /// The identity is retired so it is never reused as a placeholder.
    pub fn remove(&mut self, id: &EntryId) -> Option<FileEntry> {
        let index = self.entries.iter().position(|e| &e.id == id)?;
        let removed = self.entries.remove(index);
        self.retired.insert(removed.id.clone());
        Some(removed)
    }

    /// Give an entry a new identity, typically the server's.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownIdentity`] if `old` is not present
    /// and [`StoreError::DuplicateIdentity`] if another entry already
    /// uses `new`.
    pub fn replace_identity(&mut self, old: &EntryId, new: EntryId) -> Result<(), StoreError> {
        let index = self
            .entries
            .iter()
            .position(|e| &e.id == old)
            .ok_or_else(|| StoreError::UnknownIdentity(old.clone()))?;
        if &new == old {
            return Ok(());
        }
        if self.contains(&new) {
            return Err(StoreError::DuplicateIdentity(new));
        }
        let previous = std::mem::replace(&mut self.entries[index].id, new);
        self.retired.insert(previous);
        Ok(())
    }

    /// Flag an entry as stored on the server.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownIdentity`] if no entry has `id`.
    pub fn mark_uploaded(&mut self, id: &EntryId) -> Result<(), StoreError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| StoreError::UnknownIdentity(id.clone()))?;
        entry.uploaded = true;
        Ok(())
    }

    /// Assign server identities to a batch of entries at once and mark
    /// them uploaded.
    ///
    /// `sent[i]` receives `returned[i]`. Because the whole batch is
    /// renamed together, a returned identity may equal the old identity
    /// of another entry in the same batch; it may not equal the
    /// identity of an entry outside it.
    ///
    /// Returns clones of the updated entries in batch order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownIdentity`] if a sent entry is gone
    /// and [`StoreError::DuplicateIdentity`] if the returned identities
    /// repeat or collide with an entry outside the batch. The store is
    /// unchanged on error. Callers check that both slices have the same
    /// length; extra elements of the longer one are ignored.
    pub fn assign_identities(
        &mut self,
        sent: &[EntryId],
        returned: &[EntryId],
    ) -> Result<Vec<FileEntry>, StoreError> {
        let mut indices = Vec::with_capacity(sent.len());
        for id in sent {
            let index = self
                .entries
                .iter()
                .position(|e| &e.id == id)
                .ok_or_else(|| StoreError::UnknownIdentity(id.clone()))?;
            indices.push(index);
        }

        let batch: HashSet<&EntryId> = sent.iter().collect();
        let mut seen = HashSet::with_capacity(returned.len());
        for id in returned {
            let collides_outside = self.contains(id) && !batch.contains(id);
            if collides_outside || !seen.insert(id) {
                return Err(StoreError::DuplicateIdentity(id.clone()));
            }
        }

        let mut updated = Vec::with_capacity(indices.len());
        for (&index, new_id) in indices.iter().zip(returned) {
            let entry = &mut self.entries[index];
            let previous = std::mem::replace(&mut entry.id, new_id.clone());
            entry.uploaded = true;
            if previous != *new_id {
                self.retired.insert(previous);
            }
            updated.push(entry.clone());
        }
        Ok(updated)
    }
}
