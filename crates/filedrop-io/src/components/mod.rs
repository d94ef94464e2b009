//! Dioxus UI components for filedrop.
//!
//! Provides the drop zone with file picker, the file list with delete
//! confirmation, the alert panel, the preview modal, and the
//! [`FileUploader`] widget that composes them.

mod alerts;
mod drop_zone;
mod file_list;
mod file_uploader;
mod preview_modal;

pub use alerts::Alerts;
pub use drop_zone::DropZone;
pub use file_list::{FileList, Thumbnail};
pub use file_uploader::FileUploader;
pub use preview_modal::PreviewModal;
