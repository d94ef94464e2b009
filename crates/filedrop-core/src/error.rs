//! Error types for the filedrop state machine.

use serde::{Deserialize, Serialize};

use crate::types::EntryId;

/// A [`SelectionStore`](crate::SelectionStore) operation would have
/// broken an invariant or referenced a missing entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Another entry already uses this identity.
    #[error("identity {0} is already in use")]
    DuplicateIdentity(EntryId),

    /// No entry has this identity.
    #[error("no entry with identity {0}")]
    UnknownIdentity(EntryId),

    /// The identity generator kept producing identities already in use.
    #[error("could not find a free placeholder identity")]
    IdentitiesExhausted,

    /// Files cannot be added while an upload is in flight.
    #[error("cannot add files while an upload is in progress")]
    UploadInProgress,
}

/// Why `start_upload` refused to begin a new cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UploadRejected {
    /// A previous upload has not settled yet.
    #[error("an upload is already in progress")]
    InProgress,

    /// There are no files to upload.
    #[error("no files selected")]
    Empty,

    /// Every file is already stored on the server.
    #[error("all files are already uploaded")]
    NothingPending,

    /// No upload endpoint is configured and no upload handler was given.
    #[error("no upload URL configured")]
    MissingUrl,
}

/// Why a delete could not be opened or confirmed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeleteRejected {
    /// Deleting is disabled while an upload is in flight.
    #[error("cannot delete while an upload is in progress")]
    InProgress,

    /// No entry has this identity.
    #[error("no entry with identity {0}")]
    UnknownIdentity(EntryId),

    /// `confirm_delete` was called without an open confirmation.
    #[error("no deletion is awaiting confirmation")]
    NotConfirming,
}

/// The upload response could not be turned into an identity list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// The response is not a JSON array.
    #[error("upload response is not a list of identities")]
    NotAList,

    /// An element of the array is neither a number nor a string.
    #[error("identity at index {index} is neither a non-negative integer nor a string")]
    InvalidIdentity {
        /// Position of the offending element.
        index: usize,
    },

    /// Reported by a caller-supplied extractor.
    #[error("{0}")]
    Custom(String),
}

/// Invalid [`UploaderConfig`](crate::UploaderConfig) values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// `min_size` is larger than `max_size`, so nothing could ever pass.
    #[error("min_size ({min}) exceeds max_size ({max})")]
    SizeRange {
        /// Configured minimum.
        min: u64,
        /// Configured maximum.
        max: u64,
    },

    /// The delete URL template has no `:id` placeholder.
    #[error("delete URL {0:?} has no :id placeholder")]
    DeleteUrlWithoutPlaceholder(String),

    /// The multipart field name is empty.
    #[error("form field name must not be empty")]
    EmptyFieldName,
}

/// An HTTP request failed before a usable response arrived.
///
/// Codes follow the conventional browser HTTP client names so callers
/// can switch on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct TransportError {
    /// Machine-readable code, e.g. [`TransportError::NETWORK`].
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

impl TransportError {
    /// The request never produced a response.
    pub const NETWORK: &'static str = "ERR_NETWORK";
    /// The server answered with a 4xx status.
    pub const BAD_REQUEST: &'static str = "ERR_BAD_REQUEST";
    /// The server answered with a non-2xx, non-4xx status or an
    /// unreadable body.
    pub const BAD_RESPONSE: &'static str = "ERR_BAD_RESPONSE";
    /// A browser API refused to build or send the request.
    pub const CLIENT: &'static str = "ERR_CLIENT";

    /// Create an error with an explicit code.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Connection refused, DNS failure, CORS rejection and the like.
    #[must_use]
    pub fn network() -> Self {
        Self::new(Self::NETWORK, "Network Error")
    }

    /// Classify an HTTP status. Returns `None` for 2xx.
    ///
    /// Status 0 is what `XMLHttpRequest` reports when no response was
    /// received, so it maps to [`TransportError::network`].
    #[must_use]
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            0 => Some(Self::network()),
            200..=299 => None,
            400..=499 => Some(Self::new(
                Self::BAD_REQUEST,
                format!("Request failed with status code {status}"),
            )),
            _ => Some(Self::new(
                Self::BAD_RESPONSE,
                format!("Request failed with status code {status}"),
            )),
        }
    }
}

/// Error descriptor recorded when an upload cycle fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct UploadError {
    /// Machine-readable code.
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

impl UploadError {
    /// The response's identity list does not line up with the files sent.
    pub const ID_MISMATCH: &'static str = "ERR_ID_MISMATCH";

    /// Create an error with an explicit code.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<TransportError> for UploadError {
    fn from(err: TransportError) -> Self {
        Self {
            code: err.code,
            message: err.message,
        }
    }
}

impl From<ExtractError> for UploadError {
    fn from(err: ExtractError) -> Self {
        Self::new(TransportError::BAD_RESPONSE, err.to_string())
    }
}

impl From<StoreError> for UploadError {
    fn from(err: StoreError) -> Self {
        Self::new(Self::ID_MISMATCH, err.to_string())
    }
}
