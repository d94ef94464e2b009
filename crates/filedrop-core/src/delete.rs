//! Deletion coordinator: confirm-then-delete for one entry at a time.

use std::collections::BTreeMap;

use crate::config::UploaderConfig;
use crate::error::DeleteRejected;
use crate::store::SelectionStore;
use crate::types::{EntryId, FileEntry};

/// Content type declared for delete requests.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A `DELETE` for the browser layer to send. It has no body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    /// Delete URL with the identity substituted.
    pub url: String,
    /// Fixed content type merged with the caller's headers.
    pub headers: BTreeMap<String, String>,
}

/// Result of a confirmed deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// The entry taken out of the store.
    pub removed: FileEntry,
    /// Server request to send, present only for uploaded entries with a
    /// delete URL configured.
    pub request: Option<DeleteRequest>,
}

/// Tracks which entry, if any, is awaiting delete confirmation.
#[derive(Debug, Clone, Default)]
pub struct DeletionCoordinator {
    confirming: Option<EntryId>,
}

impl DeletionCoordinator {
    /// Create a coordinator with no open confirmation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry whose confirmation is open.
    #[must_use]
    pub const fn confirming(&self) -> Option<&EntryId> {
        self.confirming.as_ref()
    }

    /// Open the confirmation for `id`, replacing any other open one.
    ///
    /// # Errors
    ///
    /// [`DeleteRejected::InProgress`] while uploading,
    /// [`DeleteRejected::UnknownIdentity`] if no entry has `id`.
    pub fn open(
        &mut self,
        store: &SelectionStore,
        id: &EntryId,
        uploading: bool,
    ) -> Result<(), DeleteRejected> {
        if uploading {
            return Err(DeleteRejected::InProgress);
        }
        if !store.contains(id) {
            return Err(DeleteRejected::UnknownIdentity(id.clone()));
        }
        self.confirming = Some(id.clone());
        Ok(())
    }

    /// Close the confirmation without touching the store.
    pub fn cancel(&mut self) {
        self.confirming = None;
    }

    /// Delete the entry awaiting confirmation.
    ///
    /// `before_remove` sees the entry while it is still in the store.
    /// A rejected confirm keeps the confirmation open.
    ///
    /// # Errors
    ///
    /// [`DeleteRejected::InProgress`] while uploading,
    /// [`DeleteRejected::NotConfirming`] with no open confirmation, and
    /// [`DeleteRejected::UnknownIdentity`] if the entry vanished.
    pub fn confirm(
        &mut self,
        store: &mut SelectionStore,
        config: &UploaderConfig,
        uploading: bool,
        before_remove: impl FnOnce(&FileEntry),
    ) -> Result<DeleteOutcome, DeleteRejected> {
        if uploading {
            return Err(DeleteRejected::InProgress);
        }
        let id = self.confirming.take().ok_or(DeleteRejected::NotConfirming)?;
        let entry = store
            .get(&id)
            .ok_or_else(|| DeleteRejected::UnknownIdentity(id.clone()))?;

        before_remove(entry);

        let request = if entry.uploaded {
            let url = config.delete_url_for(&id);
            if url.is_none() {
                tracing::warn!(%id, "no delete URL configured; removing uploaded file locally only");
            }
            url.map(|url| DeleteRequest {
                url,
                headers: config.headers_with_content_type(JSON_CONTENT_TYPE),
            })
        } else {
            None
        };

        let removed = store
            .remove(&id)
            .ok_or(DeleteRejected::UnknownIdentity(id))?;
        tracing::debug!(id = %removed.id, remote = request.is_some(), "file deleted");
        Ok(DeleteOutcome { removed, request })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::preview::{PlaceholderKind, Preview};
    use crate::types::SourceFile;

    fn entry(id: u64, uploaded: bool) -> FileEntry {
        FileEntry {
            id: EntryId::Number(id),
            source: SourceFile::new(format!("f{id}.pdf"), vec![1u8; 4]),
            preview: Preview::Placeholder(PlaceholderKind::Pdf),
            uploaded,
        }
    }

    fn setup() -> (SelectionStore, UploaderConfig) {
        let mut store = SelectionStore::new();
        store
            .append(vec![entry(1, true), entry(2, false), entry(3, true)])
            .unwrap();
        let config = UploaderConfig {
            delete_url: Some("/media/:id".into()),
            ..UploaderConfig::default()
        };
        (store, config)
    }

    fn ids(store: &SelectionStore) -> Vec<EntryId> {
        store.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn uploaded_entry_produces_one_request() {
        let (mut store, config) = setup();
        let mut deletions = DeletionCoordinator::new();
        deletions.open(&store, &EntryId::Number(1), false).unwrap();

        let outcome = deletions.confirm(&mut store, &config, false, |_| {}).unwrap();
        let request = outcome.request.unwrap();
        assert_eq!(request.url, "/media/1");
        assert_eq!(
            request.headers.get("Content-Type").map(String::as_str),
            Some(JSON_CONTENT_TYPE)
        );
        assert_eq!(ids(&store), vec![EntryId::Number(2), EntryId::Number(3)]);
        assert_eq!(deletions.confirming(), None);
    }

    #[test]
    fn pending_entry_is_removed_locally() {
        let (mut store, config) = setup();
        let mut deletions = DeletionCoordinator::new();
        deletions.open(&store, &EntryId::Number(2), false).unwrap();
        let outcome = deletions.confirm(&mut store, &config, false, |_| {}).unwrap();
        assert_eq!(outcome.request, None);
        assert_eq!(outcome.removed.id, EntryId::Number(2));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn uploaded_without_delete_url_skips_request() {
        let (mut store, _) = setup();
        let config = UploaderConfig::default();
        let mut deletions = DeletionCoordinator::new();
        deletions.open(&store, &EntryId::Number(3), false).unwrap();
        let outcome = deletions.confirm(&mut store, &config, false, |_| {}).unwrap();
        assert_eq!(outcome.request, None);
        assert!(!store.contains(&EntryId::Number(3)));
    }

    #[test]
    fn hook_sees_entry_before_removal() {
        let (mut store, config) = setup();
        let mut deletions = DeletionCoordinator::new();
        deletions.open(&store, &EntryId::Number(3), false).unwrap();
        let mut seen = None;
        deletions
            .confirm(&mut store, &config, false, |e| {
                seen = Some((e.id.clone(), e.source.name().to_owned()));
            })
            .unwrap();
        assert_eq!(seen, Some((EntryId::Number(3), "f3.pdf".to_owned())));
    }

    #[test]
    fn cancel_leaves_store_unchanged() {
        let (mut store, config) = setup();
        let mut deletions = DeletionCoordinator::new();
        deletions.open(&store, &EntryId::Number(1), false).unwrap();
        deletions.cancel();
        assert_eq!(
            deletions.confirm(&mut store, &config, false, |_| {}),
            Err(DeleteRejected::NotConfirming)
        );
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn rejected_while_uploading() {
        let (mut store, config) = setup();
        let mut deletions = DeletionCoordinator::new();
        assert_eq!(
            deletions.open(&store, &EntryId::Number(1), true),
            Err(DeleteRejected::InProgress)
        );
        deletions.open(&store, &EntryId::Number(1), false).unwrap();
        assert_eq!(
            deletions.confirm(&mut store, &config, true, |_| {}),
            Err(DeleteRejected::InProgress)
        );
        assert_eq!(deletions.confirming(), Some(&EntryId::Number(1)));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn unknown_identity() {
        let (store, _) = setup();
        let mut deletions = DeletionCoordinator::new();
        assert_eq!(
            deletions.open(&store, &EntryId::from("nope"), false),
            Err(DeleteRejected::UnknownIdentity(EntryId::from("nope")))
        );
    }
}
