//! HTTP transport for upload and delete requests.
//!
//! Uses `XMLHttpRequest` rather than `fetch` because only XHR reports
//! upload progress. Each call waits on `loadend`, which fires exactly
//! once whether the request succeeded, failed, or was aborted, and then
//! classifies the status with [`TransportError::from_status`].

use std::collections::BTreeMap;

use filedrop_core::config::CONTENT_TYPE;
use filedrop_core::upload::MULTIPART_CONTENT_TYPE;
use filedrop_core::{DeleteRequest, TransportError, UploadRequest, parse_response_body};
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{FormData, ProgressEvent, XmlHttpRequest};

use crate::blob::{self, BrowserError};

/// Send a multipart upload and return the parsed JSON response.
///
/// `on_progress` receives `(bytes_sent, bytes_total)` whenever the
/// browser reports upload progress with a known total.
///
/// # Errors
///
/// Returns a [`TransportError`] with code `ERR_NETWORK` when no
/// response arrived, `ERR_BAD_REQUEST` / `ERR_BAD_RESPONSE` for non-2xx
/// statuses or an unreadable body, and `ERR_CLIENT` if a browser API
/// refused to build the request.
#[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
pub async fn send_upload(
    request: &UploadRequest,
    mut on_progress: impl FnMut(u64, u64) + 'static,
) -> Result<Value, TransportError> {
    let form = FormData::new().map_err(BrowserError::from)?;
    for file in &request.files {
        let part = blob::to_blob(file)?;
        form.append_with_blob_and_filename(&request.field_name, &part, file.name())
            .map_err(BrowserError::from)?;
    }

    let xhr = open("POST", &request.url, &request.headers)?;

    // Progress events report doubles; byte counts fit in u64.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let onprogress = Closure::<dyn FnMut(ProgressEvent)>::new(move |event: ProgressEvent| {
        if event.length_computable() {
            on_progress(event.loaded() as u64, event.total() as u64);
        }
    });
    let target = xhr.upload().map_err(BrowserError::from)?;
    target.set_onprogress(Some(onprogress.as_ref().unchecked_ref()));

    let body = settle(&xhr, Some(&form)).await;

    // Detach before dropping so a late event never reaches a freed closure.
    target.set_onprogress(None);
    drop(onprogress);
    parse_response_body(&body?)
}

/// Send a `DELETE` and wait for it to complete.
///
/// # Errors
///
/// Same classification as [`send_upload`].
#[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
pub async fn send_delete(request: &DeleteRequest) -> Result<(), TransportError> {
    let xhr = open("DELETE", &request.url, &request.headers)?;
    settle(&xhr, None).await.map(drop)
}

/// Open a request and apply headers.
///
/// A bare `multipart/form-data` content type is skipped: the browser
/// must generate it with the boundary parameter.
fn open(
    method: &str,
    url: &str,
    headers: &BTreeMap<String, String>,
) -> Result<XmlHttpRequest, BrowserError> {
    let xhr = XmlHttpRequest::new()?;
    xhr.open_with_async(method, url, true)?;
    for (name, value) in headers {
        if name.eq_ignore_ascii_case(CONTENT_TYPE)
            && value.trim().eq_ignore_ascii_case(MULTIPART_CONTENT_TYPE)
        {
            continue;
        }
        xhr.set_request_header(name, value)?;
    }
    Ok(xhr)
}

/// Send and wait for `loadend`, then return the body of a 2xx response.
#[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
async fn settle(xhr: &XmlHttpRequest, form: Option<&FormData>) -> Result<String, TransportError> {
    let done = js_sys::Promise::new(&mut |resolve, _reject| {
        xhr.set_onloadend(Some(&resolve));
    });

    xhr.send_with_opt_form_data(form)
        .map_err(BrowserError::from)?;

    // `loadend` never rejects; a failed request shows up as status 0.
    let _ = wasm_bindgen_futures::JsFuture::from(done).await;
    xhr.set_onloadend(None);

    let status = xhr.status().map_err(BrowserError::from)?;
    if let Some(err) = TransportError::from_status(status) {
        return Err(err);
    }
    Ok(xhr
        .response_text()
        .map_err(BrowserError::from)?
        .unwrap_or_default())
}
