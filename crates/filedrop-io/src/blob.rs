//! Blobs and object URLs built from in-memory files.
//!
//! All functions in this module require a browser environment
//! (`wasm32-unknown-unknown` target).

use filedrop_core::{SourceFile, TransportError};
use wasm_bindgen::JsValue;
use web_sys::BlobPropertyBag;

/// Errors that can occur when calling into browser APIs.
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for BrowserError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

impl From<BrowserError> for TransportError {
    fn from(err: BrowserError) -> Self {
        Self::new(Self::CLIENT, err.to_string())
    }
}

/// Copy a file's bytes into a `Blob` typed with its MIME type.
///
/// # Errors
///
/// Returns [`BrowserError::JsError`] if the `Blob` constructor fails.
pub fn to_blob(file: &SourceFile) -> Result<web_sys::Blob, BrowserError> {
    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(file.bytes()));

    let opts = BlobPropertyBag::new();
    opts.set_type(file.mime_type());

    Ok(web_sys::Blob::new_with_u8_array_sequence_and_options(
        &parts, &opts,
    )?)
}

/// Create an object URL for a file. The caller owns the URL and must
/// revoke it with [`revoke_object_url`].
///
/// # Errors
///
/// Returns [`BrowserError::JsError`] if `Blob` creation or
/// `URL.createObjectURL` fails.
pub fn object_url(file: &SourceFile) -> Result<String, BrowserError> {
    let blob = to_blob(file)?;
    Ok(web_sys::Url::create_object_url_with_blob(&blob)?)
}

/// Release an object URL created by [`object_url`].
///
/// # Errors
///
/// Returns [`BrowserError::JsError`] if `URL.revokeObjectURL` fails.
pub fn revoke_object_url(url: &str) -> Result<(), BrowserError> {
    Ok(web_sys::Url::revoke_object_url(url)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browser_errors_become_client_transport_errors() {
        let err = TransportError::from(BrowserError::JsError("SecurityError".into()));
        assert_eq!(err.code, TransportError::CLIENT);
        assert_eq!(err.message, "browser API error: SecurityError");
    }
}
