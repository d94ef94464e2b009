//! filedrop-io: Browser I/O and Dioxus component library.
//!
//! Sends upload and delete requests with `XMLHttpRequest`, creates
//! object URL previews, and provides the [`FileUploader`] widget built
//! on the `filedrop-core` state machine.

pub mod blob;
pub mod components;
pub mod preview;
pub mod transport;

pub use blob::BrowserError;
pub use components::FileUploader;
pub use preview::ObjectUrlPreviews;
