//! The widget state a view layer drives.
//!
//! [`Uploader`] owns the selection, both coordinators, and the small
//! amount of UI state (alert visibility, the open preview) that the
//! component renders. Every method runs synchronously; network work is
//! described by the values it returns and reported back by the caller.

use std::collections::HashSet;
use std::fmt;

use serde_json::Value;

use crate::accept::{AcceptanceFilter, Rejection};
use crate::config::UploaderConfig;
use crate::delete::{DeleteOutcome, DeletionCoordinator};
use crate::error::{
    DeleteRejected, ExtractError, StoreError, TransportError, UploadError, UploadRejected,
};
use crate::id::{IdGenerator, SequentialIds};
use crate::preview::{PlaceholderPreviews, PreviewMaker};
use crate::store::SelectionStore;
use crate::types::{EntryId, FileEntry, SourceFile};
use crate::upload::{
    IdExtractor, Settlement, UploadAction, UploadCoordinator, UploadState,
    UploadTicket, bare_id_list,
};

/// Receives every file when the page handles uploads itself.
pub type UploadHandler = Box<dyn FnMut(Vec<SourceFile>)>;

/// Called with an entry's file and identity just before it is deleted.
pub type DeleteHook = Box<dyn FnMut(&SourceFile, &EntryId)>;

/// Called with the updated entries after a successful upload.
pub type SuccessHook = Box<dyn FnMut(Vec<FileEntry>)>;

/// File upload widget state.
pub struct Uploader {
    config: UploaderConfig,
    store: SelectionStore,
    uploads: UploadCoordinator,
    deletions: DeletionCoordinator,
    ids: Box<dyn IdGenerator>,
    previews: Box<dyn PreviewMaker>,
    extractor: IdExtractor,
    upload_handler: Option<UploadHandler>,
    delete_hook: Option<DeleteHook>,
    success_hook: Option<SuccessHook>,
    rejections: Vec<Rejection>,
    alert_visible: bool,
    active_preview: Option<EntryId>,
}

impl fmt::Debug for Uploader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Uploader")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("uploads", &self.uploads)
            .field("deletions", &self.deletions)
            .field("rejections", &self.rejections)
            .field("alert_visible", &self.alert_visible)
            .field("active_preview", &self.active_preview)
            .finish_non_exhaustive()
    }
}

impl Uploader {
    /// Create the widget state, seeded with `config.default_files`.
    ///
    /// Seeds whose identity repeats an earlier one are skipped with a
    /// warning.
    #[must_use]
    pub fn new(config: UploaderConfig) -> Self {
        let mut store = SelectionStore::new();
        for remote in config.default_files.iter().cloned() {
            let id = remote.id.clone();
            if let Err(err) = store.append(vec![remote.into_entry()]) {
                tracing::warn!(%id, %err, "skipping default file");
            }
        }
        if let Err(err) = config.validate() {
            tracing::warn!(%err, "uploader configuration is invalid");
        }

        Self {
            config,
            store,
            uploads: UploadCoordinator::new(),
            deletions: DeletionCoordinator::new(),
            ids: Box::new(SequentialIds::default()),
            previews: Box::new(PlaceholderPreviews),
            extractor: Box::new(bare_id_list),
            upload_handler: None,
            delete_hook: None,
            success_hook: None,
            rejections: Vec::new(),
            alert_visible: false,
            active_preview: None,
        }
    }

    /// Use `ids` for placeholder identities.
    #[must_use]
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Use `previews` to build thumbnails for accepted files.
    #[must_use]
    pub fn with_preview_maker(mut self, previews: impl PreviewMaker + 'static) -> Self {
        self.previews = Box::new(previews);
        self
    }

    /// Read server identities out of upload responses with `extract`.
    #[must_use]
    pub fn with_id_extractor(
        mut self,
        extract: impl Fn(&Value) -> Result<Vec<EntryId>, ExtractError> + 'static,
    ) -> Self {
        self.extractor = Box::new(extract);
        self
    }

    /// Hand uploads to `handler` instead of sending requests.
    #[must_use]
    pub fn with_upload_handler(mut self, handler: impl FnMut(Vec<SourceFile>) + 'static) -> Self {
        self.upload_handler = Some(Box::new(handler));
        self
    }

    /// Call `hook` before each confirmed deletion.
    #[must_use]
    pub fn with_delete_hook(mut self, hook: impl FnMut(&SourceFile, &EntryId) + 'static) -> Self {
        self.delete_hook = Some(Box::new(hook));
        self
    }

    /// Call `hook` after each successful upload.
    #[must_use]
    pub fn with_success_hook(mut self, hook: impl FnMut(Vec<FileEntry>) + 'static) -> Self {
        self.success_hook = Some(Box::new(hook));
        self
    }

    // ---- selection ----

    /// Filter a chosen or dropped batch and add what passes.
    ///
    /// Replaces the stored rejections with this batch's, and shows the
    /// alert if there are any. Returns the identities of the new
    /// entries in order.
    ///
    /// # Errors
    ///
    /// [`StoreError::UploadInProgress`] while a request is in flight, or
    /// [`StoreError::IdentitiesExhausted`] if no free placeholder could
    /// be found. Nothing is added and the stored rejections are kept in
    /// both cases.
    pub fn add_files(&mut self, batch: Vec<SourceFile>) -> Result<Vec<EntryId>, StoreError> {
        if self.uploads.is_in_flight() {
            tracing::debug!(files = batch.len(), "batch refused during upload");
            return Err(StoreError::UploadInProgress);
        }
        let partition = AcceptanceFilter::new(&self.config).partition(batch, self.store.len());
        self.rejections = partition.rejected;
        if !self.rejections.is_empty() {
            self.alert_visible = true;
            tracing::debug!(rejected = self.rejections.len(), "files rejected");
        }

        let mut reserved = HashSet::with_capacity(partition.accepted.len());
        let mut entries = Vec::with_capacity(partition.accepted.len());
        for source in partition.accepted {
            let id = self
                .store
                .fresh_id(self.ids.as_mut(), &reserved)
                .ok_or(StoreError::IdentitiesExhausted)?;
            reserved.insert(id.clone());
            entries.push((id, source));
        }

        let entries: Vec<FileEntry> = entries
            .into_iter()
            .map(|(id, source)| FileEntry {
                preview: self.previews.make_preview(&source),
                id,
                source,
                uploaded: false,
            })
            .collect();
        let added: Vec<EntryId> = entries.iter().map(|e| e.id.clone()).collect();

        if let Err(err) = self.store.append(entries.clone()) {
            for entry in &entries {
                self.previews.release(&entry.preview);
            }
            return Err(err);
        }
        if !added.is_empty() {
            tracing::debug!(added = added.len(), total = self.store.len(), "files added");
        }
        Ok(added)
    }

    // ---- upload ----

    /// Start an upload cycle.
    ///
    /// With an upload handler every file, uploaded or not, goes to the
    /// handler and [`UploadAction::Delegated`] is returned. Both paths
    /// need at least one pending file. Otherwise the pending
    /// files are packed into a request for the caller to send.
    ///
    /// # Errors
    ///
    /// See [`UploadCoordinator::begin`].
    pub fn start_upload(&mut self) -> Result<UploadAction, UploadRejected> {
        if let Some(handler) = self.upload_handler.as_mut() {
            self.uploads.admit(&self.store)?;
            let files = self.store.iter().map(|e| e.source.clone()).collect();
            handler(files);
            tracing::debug!("upload delegated to handler");
            return Ok(UploadAction::Delegated);
        }
        self.uploads
            .begin(&self.store, &self.config)
            .map(UploadAction::Send)
    }

    /// Record transport progress. See [`UploadCoordinator::record_progress`].
    pub fn record_progress(&mut self, sent: u64, total: u64) -> Option<u8> {
        self.uploads.record_progress(sent, total)
    }

    /// Settle an upload started by [`start_upload`](Self::start_upload).
    ///
    /// Success fires the success hook with the updated entries; failure
    /// records the error and shows the alert.
    pub fn finish_upload(
        &mut self,
        ticket: &UploadTicket,
        outcome: Result<Value, TransportError>,
    ) -> Settlement {
        let settlement =
            self.uploads
                .finish(&mut self.store, ticket, outcome, self.extractor.as_ref());
        match &settlement {
            Settlement::Uploaded(updated) => {
                if let Some(hook) = self.success_hook.as_mut() {
                    hook(updated.clone());
                }
            }
            Settlement::Failed(_) => self.alert_visible = true,
            Settlement::Stale => {}
        }
        settlement
    }

    // ---- delete ----

    /// Open the delete confirmation for `id`.
    ///
    /// # Errors
    ///
    /// See [`DeletionCoordinator::open`].
    pub fn request_delete(&mut self, id: &EntryId) -> Result<(), DeleteRejected> {
        self.deletions
            .open(&self.store, id, self.uploads.is_in_flight())
    }

    /// Close the delete confirmation.
    pub fn cancel_delete(&mut self) {
        self.deletions.cancel();
    }

    /// Delete the entry awaiting confirmation.
    ///
    /// The delete hook runs first. The entry's preview is released and
    /// closed if it was open.
    ///
    /// # Errors
    ///
    /// See [`DeletionCoordinator::confirm`].
    pub fn confirm_delete(&mut self) -> Result<DeleteOutcome, DeleteRejected> {
        let hook = &mut self.delete_hook;
        let outcome = self.deletions.confirm(
            &mut self.store,
            &self.config,
            self.uploads.is_in_flight(),
            |entry| {
                if let Some(hook) = hook.as_mut() {
                    hook(&entry.source, &entry.id);
                }
            },
        )?;
        self.previews.release(&outcome.removed.preview);
        if self.active_preview.as_ref() == Some(&outcome.removed.id) {
            self.active_preview = None;
        }
        Ok(outcome)
    }

    // ---- alerts and preview ----

    /// Hide the alert. Rejections and the upload error stay readable.
    pub const fn dismiss_alert(&mut self) {
        self.alert_visible = false;
    }

    /// Show `id` in the preview modal. Returns `false` if no entry has it.
    pub fn open_preview(&mut self, id: &EntryId) -> bool {
        if !self.store.contains(id) {
            return false;
        }
        self.active_preview = Some(id.clone());
        true
    }

    /// Close the preview modal.
    pub fn close_preview(&mut self) {
        self.active_preview = None;
    }

    // ---- queries ----

    /// The configuration this widget was built with.
    #[must_use]
    pub const fn config(&self) -> &UploaderConfig {
        &self.config
    }

    /// Tracked files in order.
    #[must_use]
    pub fn entries(&self) -> &[FileEntry] {
        self.store.entries()
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &SelectionStore {
        &self.store
    }

    /// Rejections from the last batch.
    #[must_use]
    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    /// Whether the alert is showing.
    #[must_use]
    pub const fn alert_visible(&self) -> bool {
        self.alert_visible
    }

    /// State of the current or last upload.
    #[must_use]
    pub fn upload_state(&self) -> UploadState {
        self.uploads.state()
    }

    /// Percent of the current or last upload sent.
    #[must_use]
    pub const fn progress(&self) -> u8 {
        self.uploads.progress()
    }

    /// Error from the last failed upload.
    #[must_use]
    pub const fn upload_error(&self) -> Option<&UploadError> {
        self.uploads.error()
    }

    /// Whether a request is in flight.
    #[must_use]
    pub const fn is_uploading(&self) -> bool {
        self.uploads.is_in_flight()
    }

    /// Entry awaiting delete confirmation.
    #[must_use]
    pub const fn confirming_delete(&self) -> Option<&EntryId> {
        self.deletions.confirming()
    }

    /// Entry shown in the preview modal.
    #[must_use]
    pub fn active_preview(&self) -> Option<&FileEntry> {
        self.active_preview.as_ref().and_then(|id| self.store.get(id))
    }

    /// Whether the picker and drop zone accept more files.
    #[must_use]
    pub const fn can_choose(&self) -> bool {
        !self.uploads.is_in_flight() && self.config.fits_count(self.store.len(), 1)
    }

    /// Whether [`start_upload`](Self::start_upload) would be admitted.
    #[must_use]
    pub fn can_upload(&self) -> bool {
        self.uploads.admit(&self.store).is_ok()
    }

    /// Whether delete buttons are enabled.
    #[must_use]
    pub const fn can_delete(&self) -> bool {
        !self.uploads.is_in_flight()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::accept::RejectionCode;
    use crate::preview::Preview;
    use crate::types::RemoteFile;

    fn config() -> UploaderConfig {
        UploaderConfig {
            upload_url: Some("/upload".into()),
            delete_url: Some("/upload/:id".into()),
            max_count: 0,
            ..UploaderConfig::default()
        }
    }

    fn png(name: &str, size: usize) -> SourceFile {
        SourceFile::new(name, vec![0u8; size])
    }

    fn remote(id: u64) -> RemoteFile {
        RemoteFile {
            url: format!("https://cdn.example.com/{id}.png"),
            file_name: format!("{id}.png"),
            file_size: 1234,
            id: EntryId::Number(id),
        }
    }

    /// Preview maker that records releases.
    #[derive(Clone, Default)]
    struct Recording {
        released: Rc<RefCell<Vec<Preview>>>,
    }

    impl PreviewMaker for Recording {
        fn make_preview(&mut self, file: &SourceFile) -> Preview {
            Preview::ObjectUrl(format!("blob:{}", file.name()))
        }

        fn release(&mut self, preview: &Preview) {
            self.released.borrow_mut().push(preview.clone());
        }
    }

    #[test]
    fn seeds_default_files_as_uploaded() {
        let uploader = Uploader::new(UploaderConfig {
            default_files: vec![remote(7), remote(8), remote(7)],
            ..config()
        });
        let ids: Vec<_> = uploader.entries().iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec![EntryId::Number(7), EntryId::Number(8)]);
        assert!(uploader.store().all_uploaded());
        assert!(!uploader.can_upload());
    }

    #[test]
    fn added_files_get_fresh_placeholders() {
        let mut uploader = Uploader::new(UploaderConfig {
            default_files: vec![remote(1_000_000)],
            ..config()
        });
        let added = uploader
            .add_files(vec![png("a.png", 10), png("b.png", 10)])
            .unwrap();
        assert_eq!(added, vec![EntryId::Number(1_000_001), EntryId::Number(1_000_002)]);
        assert!(uploader.entries()[1..].iter().all(|e| !e.uploaded));
        assert!(!uploader.alert_visible());
    }

    #[test]
    fn rejections_show_alert_until_dismissed() {
        let mut uploader = Uploader::new(config());
        uploader
            .add_files(vec![png("ok.png", 10), png("big.png", 300_000)])
            .unwrap();
        assert_eq!(uploader.entries().len(), 1);
        assert_eq!(uploader.rejections()[0].codes, vec![RejectionCode::TooLarge]);
        assert!(uploader.alert_visible());

        uploader.add_files(vec![png("ok2.png", 10)]).unwrap();
        assert!(uploader.alert_visible());
        assert!(uploader.rejections().is_empty());

        uploader.dismiss_alert();
        assert!(!uploader.alert_visible());
    }

    #[test]
    fn exhausted_generator_adds_nothing() {
        let mut uploader = Uploader::new(UploaderConfig {
            default_files: vec![remote(5)],
            ..config()
        })
        .with_id_generator(|| EntryId::Number(5));
        assert_eq!(
            uploader.add_files(vec![png("a.png", 1)]),
            Err(StoreError::IdentitiesExhausted)
        );
        assert_eq!(uploader.entries().len(), 1);
    }

    #[test]
    fn upload_cycle_fires_success_hook() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut uploader = Uploader::new(config()).with_success_hook(move |entries| {
            sink.borrow_mut().extend(entries.into_iter().map(|e| e.id));
        });
        uploader.add_files(vec![png("a.png", 5000)]).unwrap();

        let pending = uploader.start_upload().unwrap().into_pending().unwrap();
        assert!(uploader.is_uploading());
        assert!(!uploader.can_choose());
        assert!(!uploader.can_delete());
        assert_eq!(uploader.record_progress(2500, 5000), Some(50));

        let settlement = uploader.finish_upload(&pending.ticket, Ok(json!(["abc123"])));
        assert!(matches!(settlement, Settlement::Uploaded(_)));
        assert_eq!(*seen.borrow(), vec![EntryId::from("abc123")]);
        assert_eq!(uploader.progress(), 100);
        assert_eq!(uploader.upload_state(), UploadState::Complete);
    }

    #[test]
    fn failed_upload_shows_alert() {
        let mut uploader = Uploader::new(config());
        uploader.add_files(vec![png("a.png", 10)]).unwrap();
        let pending = uploader.start_upload().unwrap().into_pending().unwrap();
        uploader.finish_upload(
            &pending.ticket,
            Err(TransportError::from_status(500).unwrap()),
        );
        assert!(uploader.alert_visible());
        assert_eq!(
            uploader.upload_error().map(|e| e.code.as_str()),
            Some(TransportError::BAD_RESPONSE)
        );
        assert!(uploader.can_upload());
    }

    #[test]
    fn handler_receives_every_file() {
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&received);
        let mut uploader = Uploader::new(UploaderConfig {
            upload_url: None,
            default_files: vec![remote(3)],
            ..config()
        })
        .with_upload_handler(move |files| {
            sink.borrow_mut()
                .extend(files.iter().map(|f| f.name().to_owned()));
        });
        uploader.add_files(vec![png("new.png", 10)]).unwrap();

        assert_eq!(uploader.start_upload(), Ok(UploadAction::Delegated));
        assert_eq!(*received.borrow(), vec!["3.png".to_owned(), "new.png".to_owned()]);
        assert!(!uploader.is_uploading());
    }

    #[test]
    fn handler_needs_a_pending_file() {
        let calls = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&calls);
        let mut uploader = Uploader::new(UploaderConfig {
            default_files: vec![remote(3)],
            ..config()
        })
        .with_upload_handler(move |_| *sink.borrow_mut() += 1);

        assert!(!uploader.can_upload());
        assert_eq!(uploader.start_upload(), Err(UploadRejected::NothingPending));
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn batch_refused_while_uploading() {
        let mut uploader = Uploader::new(config());
        uploader.add_files(vec![png("a.png", 10)]).unwrap();
        uploader.add_files(vec![png("big.png", 300_000)]).unwrap();
        let pending = uploader.start_upload().unwrap().into_pending().unwrap();

        assert!(!uploader.can_choose());
        assert_eq!(
            uploader.add_files(vec![png("late.png", 10)]),
            Err(StoreError::UploadInProgress)
        );
        assert_eq!(uploader.entries().len(), 1);
        assert_eq!(uploader.rejections().len(), 1);

        uploader.finish_upload(&pending.ticket, Ok(json!([9])));
        assert_eq!(uploader.add_files(vec![png("late.png", 10)]).unwrap().len(), 1);
    }

    #[test]
    fn custom_extractor_is_used() {
        let mut uploader = Uploader::new(config())
            .with_id_extractor(|body| bare_id_list(&body["ids"]));
        uploader.add_files(vec![png("a.png", 10)]).unwrap();
        let pending = uploader.start_upload().unwrap().into_pending().unwrap();
        uploader.finish_upload(&pending.ticket, Ok(json!({"ids": [42]})));
        assert_eq!(uploader.entries()[0].id, EntryId::Number(42));
    }

    #[test]
    fn delete_runs_hook_releases_preview_and_closes_modal() {
        let previews = Recording::default();
        let released = Rc::clone(&previews.released);
        let hooked = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&hooked);
        let mut uploader = Uploader::new(config())
            .with_preview_maker(previews)
            .with_delete_hook(move |file, id| {
                *sink.borrow_mut() = Some((file.name().to_owned(), id.clone()));
            });
        let id = uploader.add_files(vec![png("a.png", 10)]).unwrap().remove(0);

        assert!(uploader.open_preview(&id));
        assert!(uploader.active_preview().is_some());
        uploader.request_delete(&id).unwrap();
        assert_eq!(uploader.confirming_delete(), Some(&id));

        let outcome = uploader.confirm_delete().unwrap();
        assert_eq!(outcome.request, None);
        assert_eq!(*hooked.borrow(), Some(("a.png".to_owned(), id)));
        assert_eq!(*released.borrow(), vec![Preview::ObjectUrl("blob:a.png".into())]);
        assert!(uploader.active_preview().is_none());
        assert!(uploader.entries().is_empty());
    }

    #[test]
    fn delete_blocked_during_upload() {
        let mut uploader = Uploader::new(config());
        let id = uploader.add_files(vec![png("a.png", 10)]).unwrap().remove(0);
        uploader.start_upload().unwrap();
        assert_eq!(uploader.request_delete(&id), Err(DeleteRejected::InProgress));
    }

    #[test]
    fn can_choose_respects_max_count() {
        let mut uploader = Uploader::new(UploaderConfig {
            max_count: 1,
            ..config()
        });
        assert!(uploader.can_choose());
        uploader.add_files(vec![png("a.png", 10)]).unwrap();
        assert!(!uploader.can_choose());
        assert!(!uploader.open_preview(&EntryId::from("missing")));
    }
}
