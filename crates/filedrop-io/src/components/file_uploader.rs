//! The complete upload widget.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdUpload;
use filedrop_core::{
    DeleteOutcome, EntryId, ExtractError, FileEntry, SourceFile, StoreError, UploadAction,
    Uploader, UploaderConfig,
};
use serde_json::Value;

use super::alerts::Alerts;
use super::drop_zone::DropZone;
use super::file_list::FileList;
use super::preview_modal::PreviewModal;
use crate::preview::ObjectUrlPreviews;
use crate::transport;

/// Props for the [`FileUploader`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FileUploaderProps {
    /// Endpoints, limits, seeds, and labels. Read once on mount.
    config: UploaderConfig,
    /// Handle uploads in the page instead of sending a request. Receives
    /// every file, uploaded or not.
    on_upload: Option<EventHandler<Vec<SourceFile>>>,
    /// Called with a file and its identity before it is deleted.
    on_delete: Option<EventHandler<(SourceFile, EntryId)>>,
    /// Called with the updated entries after a successful upload.
    on_upload_success: Option<EventHandler<Vec<FileEntry>>>,
    /// Reads server identities out of the upload response. Defaults to
    /// treating the body as a bare list.
    id_extractor: Option<Callback<Value, Result<Vec<EntryId>, ExtractError>>>,
}

/// Wire the page's callbacks into a fresh [`Uploader`].
fn build_uploader(props: &FileUploaderProps) -> Uploader {
    let mut uploader =
        Uploader::new(props.config.clone()).with_preview_maker(ObjectUrlPreviews);
    if let Some(handler) = props.on_upload {
        uploader = uploader.with_upload_handler(move |files| handler.call(files));
    }
    if let Some(hook) = props.on_delete {
        uploader = uploader.with_delete_hook(move |file, id| hook.call((file.clone(), id.clone())));
    }
    if let Some(hook) = props.on_upload_success {
        uploader = uploader.with_success_hook(move |entries| hook.call(entries));
    }
    if let Some(extract) = props.id_extractor {
        uploader = uploader.with_id_extractor(move |body| extract.call(body.clone()));
    }
    uploader
}

/// Drop zone, file list, upload button with progress, alerts, and a
/// preview modal around one [`Uploader`].
///
/// Uploads run as a spawned task that reports progress back into the
/// widget state. Delete requests are fire-and-forget; their outcome is
/// only logged.
#[component]
pub fn FileUploader(props: FileUploaderProps) -> Element {
    let mut uploader = use_signal(|| build_uploader(&props));

    // --- Selection ---
    let on_files = move |batch: Vec<SourceFile>| {
        match uploader.write().add_files(batch) {
            Ok(_) => {}
            Err(StoreError::UploadInProgress) => tracing::debug!("files dropped during upload"),
            Err(e) => tracing::error!(error = %e, "failed to add files"),
        }
    };

    // --- Upload ---
    let on_upload_click = move |_| {
        let action = uploader.write().start_upload();
        match action {
            Ok(UploadAction::Send(pending)) => {
                spawn(async move {
                    let outcome = transport::send_upload(&pending.request, move |sent, total| {
                        uploader.write().record_progress(sent, total);
                    })
                    .await;
                    uploader.write().finish_upload(&pending.ticket, outcome);
                });
            }
            Ok(UploadAction::Delegated) => {}
            Err(reason) => tracing::debug!(%reason, "upload not started"),
        }
    };

    // --- Delete ---
    let on_confirm_delete = move |()| {
        let outcome = uploader.write().confirm_delete();
        match outcome {
            Ok(DeleteOutcome {
                request: Some(request),
                ..
            }) => {
                spawn(async move {
                    match transport::send_delete(&request).await {
                        Ok(()) => tracing::debug!(url = %request.url, "delete request completed"),
                        Err(e) => tracing::warn!(url = %request.url, error = %e, "delete request failed"),
                    }
                });
            }
            Ok(_) => {}
            Err(reason) => tracing::debug!(%reason, "delete not performed"),
        }
    };

    let state = uploader.read();
    let config = state.config();
    let hint = format!(
        "{} (max {})",
        config.accepted_extensions_label(),
        config.max_size_label()
    );
    let can_upload = state.can_upload();
    let uploading = state.is_uploading();

    rsx! {
        div { class: "fd-uploader",
            Alerts {
                rejections: state.rejections().to_vec(),
                upload_error: state.upload_error().cloned(),
                visible: state.alert_visible(),
                on_dismiss: move |()| uploader.write().dismiss_alert(),
            }

            DropZone {
                accept: config.accept_attribute(),
                choose_text: config.choose_text.clone(),
                hint,
                disabled: !state.can_choose(),
                on_files,
            }

            FileList {
                entries: state.entries().to_vec(),
                confirming: state.confirming_delete().cloned(),
                remove_message: config.remove_message().to_owned(),
                can_delete: state.can_delete(),
                on_preview: move |id: EntryId| {
                    uploader.write().open_preview(&id);
                },
                on_request_delete: move |id: EntryId| {
                    if let Err(reason) = uploader.write().request_delete(&id) {
                        tracing::debug!(%reason, "delete not opened");
                    }
                },
                on_confirm_delete,
                on_cancel_delete: move |()| uploader.write().cancel_delete(),
            }

            if let Some(progress) = visible_progress(&state) {
                div { class: "fd-progress",
                    div { class: "fd-progress-bar", width: "{progress}%" }
                    span { class: "fd-progress-label", "{progress}%" }
                }
            }

            button {
                class: if can_upload { "fd-button fd-button--primary" } else { "fd-button fd-button--disabled" },
                disabled: !can_upload,
                onclick: on_upload_click,
                Icon { width: 16, height: 16, icon: LdUpload }
                span { if uploading { "Uploading..." } else { "{config.upload_text}" } }
            }

            PreviewModal {
                entry: state.active_preview().cloned(),
                on_close: move |()| uploader.write().close_preview(),
            }
        }
    }
}

/// Percent to show on the progress bar. The bar is only shown while a
/// request is in flight.
fn visible_progress(uploader: &Uploader) -> Option<u8> {
    uploader.is_uploading().then(|| uploader.progress())
}
