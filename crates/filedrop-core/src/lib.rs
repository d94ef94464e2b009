//! filedrop-core: File upload widget state machine (sans-IO).
//!
//! Tracks the files a user has chosen, decides which ones are admitted,
//! and drives upload and delete cycles against a server:
//! accept -> store -> upload (one multipart request) -> reconcile
//! identities, and confirm -> delete for any single entry.
//!
//! This crate has **no I/O dependencies**. Requests are returned as
//! plain values and their outcomes are fed back in; all browser
//! interaction lives in `filedrop-io`.

pub mod accept;
pub mod config;
pub mod delete;
pub mod error;
pub mod id;
pub mod mime;
pub mod preview;
pub mod store;
pub mod types;
pub mod upload;
pub mod uploader;

pub use accept::{AcceptanceFilter, Partition, Rejection, RejectionCode};
pub use config::UploaderConfig;
pub use delete::{DeleteOutcome, DeleteRequest, DeletionCoordinator};
pub use error::{
    ConfigError, DeleteRejected, ExtractError, StoreError, TransportError, UploadError,
    UploadRejected,
};
pub use id::{IdGenerator, SequentialIds};
pub use preview::{PlaceholderKind, PlaceholderPreviews, Preview, PreviewMaker};
pub use store::SelectionStore;
pub use types::{EntryId, FileEntry, RemoteFile, SourceFile};
pub use upload::{
    IdExtractor, PendingUpload, Settlement, UploadAction, UploadCoordinator, UploadRequest,
    UploadState, UploadTicket, bare_id_list, parse_response_body,
};
pub use uploader::Uploader;
