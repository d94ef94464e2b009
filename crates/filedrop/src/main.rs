use std::collections::BTreeMap;

use dioxus::prelude::*;
use filedrop_core::{EntryId, ExtractError, FileEntry, RemoteFile, SourceFile, UploaderConfig};
use filedrop_io::FileUploader;
use serde_json::Value;

const STYLE: Asset = asset!("/assets/filedrop.css");

fn main() {
    dioxus::logger::init(tracing::Level::DEBUG).ok();
    dioxus::launch(app);
}

/// Accept either a bare identity list or `{"ids": [...]}`.
fn envelope_ids(body: &Value) -> Result<Vec<EntryId>, ExtractError> {
    match body.get("ids") {
        Some(ids) => filedrop_core::bare_id_list(ids),
        None => filedrop_core::bare_id_list(body),
    }
}

/// Configuration for the widget that talks to the demo server.
fn server_config() -> UploaderConfig {
    UploaderConfig {
        upload_url: Some("/api/files".into()),
        delete_url: Some("/api/files/:id".into()),
        max_count: 5,
        max_size: 2_000_000,
        default_files: vec![RemoteFile {
            url: "/media/welcome.png".into(),
            file_name: "welcome.png".into(),
            file_size: 48_213,
            id: EntryId::Number(1),
        }],
        remove_confirm_message: Some("Remove this file from the server?".into()),
        ..UploaderConfig::default()
    }
}

/// Root application component.
///
/// Shows one widget that uploads to the demo server and one whose
/// uploads are handled by the page.
fn app() -> Element {
    let mut handled = use_signal(Vec::<String>::new);
    let mut last_uploaded = use_signal(|| 0usize);

    let extract = use_callback(|body: Value| envelope_ids(&body));

    let on_upload = move |files: Vec<SourceFile>| {
        tracing::info!(count = files.len(), "page received files");
        handled.set(files.iter().map(|f| f.name().to_owned()).collect());
    };

    rsx! {
        document::Stylesheet { href: STYLE }

        div { class: "fd-page",
            header { class: "fd-page-header",
                h1 { "filedrop" }
                p { class: "fd-hint", "Drag-and-drop file uploads with progress and previews" }
            }

            section { class: "fd-section",
                h2 { "Server upload" }
                FileUploader {
                    config: server_config(),
                    id_extractor: extract,
                    on_upload_success: move |entries: Vec<FileEntry>| {
                        last_uploaded.set(entries.len());
                    },
                    on_delete: move |(file, id): (SourceFile, EntryId)| {
                        tracing::info!(name = file.name(), %id, "file deleted");
                    },
                }
                if last_uploaded() > 0 {
                    p { class: "fd-hint", "Last upload stored {last_uploaded} file(s)." }
                }
            }

            section { class: "fd-section",
                h2 { "Handled by the page" }
                FileUploader {
                    config: UploaderConfig {
                        max_count: 0,
                        accepted_types: BTreeMap::new(),
                        ..UploaderConfig::default()
                    },
                    on_upload,
                }
                if !handled.read().is_empty() {
                    ul { class: "fd-list",
                        for name in handled.read().iter() {
                            li { key: "{name}", class: "fd-item", "{name}" }
                        }
                    }
                }
            }
        }
    }
}
