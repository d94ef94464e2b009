//! Upload coordinator: one multipart request per cycle, byte-level
//! progress, and reconciliation of server identities.
//!
//! The coordinator never performs I/O. [`UploadCoordinator::begin`]
//! hands out an [`UploadRequest`] for the browser layer to send, and the
//! outcome comes back through [`UploadCoordinator::finish`] together
//! with the [`UploadTicket`] issued at the start. Tickets carry a
//! generation number so a completion that does not belong to the
//! current cycle is recognised and dropped.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::config::UploaderConfig;
use crate::error::{ExtractError, TransportError, UploadError, UploadRejected};
use crate::store::SelectionStore;
use crate::types::{EntryId, FileEntry, SourceFile};

/// Content type declared for upload requests.
pub const MULTIPART_CONTENT_TYPE: &str = "multipart/form-data";

/// Maps a parsed upload response to identities, one per file sent.
pub type IdExtractor = Box<dyn Fn(&Value) -> Result<Vec<EntryId>, ExtractError>>;

/// Default extractor: the response body is itself the identity list,
/// e.g. `[17, 18]` or `["abc123"]`.
///
/// # Errors
///
/// Returns [`ExtractError::NotAList`] if the body is not an array and
/// [`ExtractError::InvalidIdentity`] for elements that are neither
/// non-negative integers nor strings.
pub fn bare_id_list(body: &Value) -> Result<Vec<EntryId>, ExtractError> {
    let items = body.as_array().ok_or(ExtractError::NotAList)?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::String(s) => Ok(EntryId::Text(s.clone())),
            Value::Number(n) => n
                .as_u64()
                .map(EntryId::Number)
                .ok_or(ExtractError::InvalidIdentity { index }),
            _ => Err(ExtractError::InvalidIdentity { index }),
        })
        .collect()
}

/// Parse a response body as JSON. An empty body is `null`.
///
/// # Errors
///
/// Returns a [`TransportError::BAD_RESPONSE`] error for malformed JSON.
pub fn parse_response_body(body: &str) -> Result<Value, TransportError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| {
        TransportError::new(
            TransportError::BAD_RESPONSE,
            format!("invalid JSON in upload response: {e}"),
        )
    })
}

/// `floor(100 * sent / total)`, clamped to 100. `None` when the total
/// is unknown (zero).
#[must_use]
pub fn percent(sent: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let pct = u128::from(sent.min(total)) * 100 / u128::from(total);
    Some(u8::try_from(pct).unwrap_or(100))
}

/// Observable state of the current or last upload cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    /// No upload has been started.
    Idle,
    /// A request is in flight; the value is the percent sent (0–100).
    InProgress(u8),
    /// The last request succeeded and identities were reconciled.
    Complete,
    /// The last request failed; nothing in the store changed.
    Failed(UploadError),
}

/// Handle tying a completion to the request that started it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    generation: u64,
    ids: Vec<EntryId>,
}

impl UploadTicket {
    /// Identities of the files sent, in request order.
    #[must_use]
    pub fn ids(&self) -> &[EntryId] {
        &self.ids
    }

    /// Cycle number this ticket belongs to.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Everything the browser layer needs to send one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Target of the `POST`.
    pub url: String,
    /// Fixed content type merged with the caller's headers.
    pub headers: BTreeMap<String, String>,
    /// Multipart field every file is appended under.
    pub field_name: String,
    /// Pending files in store order, one multipart part each.
    pub files: Vec<SourceFile>,
}

impl UploadRequest {
    /// Sum of the file sizes.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(SourceFile::size).sum()
    }
}

/// A started upload: the ticket to settle it with and the request to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    /// Pass back to `finish_upload` with the outcome.
    pub ticket: UploadTicket,
    /// Send this.
    pub request: UploadRequest,
}

/// What `start_upload` decided to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadAction {
    /// The caller's upload handler received the files; nothing to send.
    Delegated,
    /// Send the request and report back.
    Send(PendingUpload),
}

impl UploadAction {
    /// The upload to send, if one was produced.
    #[must_use]
    pub fn into_pending(self) -> Option<PendingUpload> {
        match self {
            Self::Send(pending) => Some(pending),
            Self::Delegated => None,
        }
    }
}

/// How an upload cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// Identities were assigned; the updated entries in request order.
    Uploaded(Vec<FileEntry>),
    /// The cycle failed and the error was recorded.
    Failed(UploadError),
    /// The ticket does not belong to the in-flight cycle; ignored.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Idle,
    InFlight(u64),
    Settled,
}

/// Tracks one upload cycle at a time.
#[derive(Debug, Clone, Default)]
pub struct UploadCoordinator {
    phase: Phase,
    generation: u64,
    progress: u8,
    error: Option<UploadError>,
}

impl UploadCoordinator {
    /// Create an idle coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while a request is outstanding.
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(self.phase, Phase::InFlight(_))
    }

    /// Percent of the current (or last) request sent.
    #[must_use]
    pub const fn progress(&self) -> u8 {
        self.progress
    }

    /// Error recorded by the last failed cycle, cleared when a new
    /// cycle begins.
    #[must_use]
    pub const fn error(&self) -> Option<&UploadError> {
        self.error.as_ref()
    }

    /// Current state, derived from the phase, progress, and last error.
    #[must_use]
    pub fn state(&self) -> UploadState {
        match (self.phase, &self.error) {
            (Phase::Idle, _) => UploadState::Idle,
            (Phase::InFlight(_), _) => UploadState::InProgress(self.progress),
            (Phase::Settled, Some(err)) => UploadState::Failed(err.clone()),
            (Phase::Settled, None) => UploadState::Complete,
        }
    }

    /// Admission checks for a new cycle, shared by the request and
    /// caller-handler paths.
    ///
    /// # Errors
    ///
    /// [`UploadRejected::InProgress`], [`UploadRejected::Empty`], or
    /// [`UploadRejected::NothingPending`].
    pub fn admit(&self, store: &SelectionStore) -> Result<(), UploadRejected> {
        if self.is_in_flight() {
            return Err(UploadRejected::InProgress);
        }
        if store.is_empty() {
            return Err(UploadRejected::Empty);
        }
        if store.all_uploaded() {
            return Err(UploadRejected::NothingPending);
        }
        Ok(())
    }

    /// Start a cycle covering every pending entry.
    ///
    /// Resets progress to 0 and clears the previous error.
    ///
    /// # Errors
    ///
    /// Any [`admit`](Self::admit) rejection, or
    /// [`UploadRejected::MissingUrl`] if no upload URL is configured.
    pub fn begin(
        &mut self,
        store: &SelectionStore,
        config: &UploaderConfig,
    ) -> Result<PendingUpload, UploadRejected> {
        self.admit(store)?;
        let url = config
            .upload_url
            .clone()
            .ok_or(UploadRejected::MissingUrl)?;

        let (ids, files): (Vec<_>, Vec<_>) = store
            .pending()
            .map(|e| (e.id.clone(), e.source.clone()))
            .unzip();

        self.generation += 1;
        self.phase = Phase::InFlight(self.generation);
        self.progress = 0;
        self.error = None;

        tracing::debug!(
            generation = self.generation,
            files = ids.len(),
            %url,
            "upload started"
        );

        Ok(PendingUpload {
            ticket: UploadTicket {
                generation: self.generation,
                ids,
            },
            request: UploadRequest {
                url,
                headers: config.headers_with_content_type(MULTIPART_CONTENT_TYPE),
                field_name: config.field_name.clone(),
                files,
            },
        })
    }

    /// Record a transport progress notification.
    ///
    /// Returns the new percentage, or `None` if the notification was
    /// ignored (no request in flight, or unknown total).
    pub fn record_progress(&mut self, sent: u64, total: u64) -> Option<u8> {
        if !self.is_in_flight() {
            return None;
        }
        let pct = percent(sent, total)?;
        self.progress = pct;
        Some(pct)
    }

    /// Settle the in-flight cycle.
    ///
    /// On success the response is mapped through `extract` and the i-th
    /// sent entry receives the i-th identity. A transport error, an
    /// unreadable response, or an identity list that does not match the
    /// files sent fails the whole batch and leaves the store untouched.
    pub fn finish(
        &mut self,
        store: &mut SelectionStore,
        ticket: &UploadTicket,
        outcome: Result<Value, TransportError>,
        extract: &dyn Fn(&Value) -> Result<Vec<EntryId>, ExtractError>,
    ) -> Settlement {
        if self.phase != Phase::InFlight(ticket.generation) {
            tracing::warn!(
                generation = ticket.generation,
                "ignoring completion of a stale upload"
            );
            return Settlement::Stale;
        }
        self.phase = Phase::Settled;

        let result = outcome
            .map_err(UploadError::from)
            .and_then(|body| reconcile(store, &ticket.ids, &body, extract));

        match result {
            Ok(updated) => {
                self.progress = 100;
                tracing::info!(files = updated.len(), "upload complete");
                Settlement::Uploaded(updated)
            }
            Err(err) => {
                tracing::warn!(code = %err.code, message = %err.message, "upload failed");
                self.error = Some(err.clone());
                Settlement::Failed(err)
            }
        }
    }
}

fn reconcile(
    store: &mut SelectionStore,
    sent: &[EntryId],
    body: &Value,
    extract: &dyn Fn(&Value) -> Result<Vec<EntryId>, ExtractError>,
) -> Result<Vec<FileEntry>, UploadError> {
    let returned = extract(body)?;
    if returned.len() != sent.len() {
        return Err(UploadError::new(
            UploadError::ID_MISMATCH,
            format!(
                "server returned {} identities for {} files",
                returned.len(),
                sent.len()
            ),
        ));
    }
    Ok(store.assign_identities(sent, &returned)?)
}
