//! Drag-and-drop zone with a file picker button.

use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdPaperclip;
use filedrop_core::SourceFile;

/// Props for the [`DropZone`] component.
#[derive(Props, Clone, PartialEq)]
pub struct DropZoneProps {
    /// Value for the file input's `accept` attribute.
    accept: String,
    /// Label of the picker button.
    choose_text: String,
    /// Hint line under the button, e.g. accepted extensions and size.
    hint: String,
    /// Whether the picker and drop target ignore input.
    disabled: bool,
    /// Called with every file that could be read, in selection order.
    on_files: EventHandler<Vec<SourceFile>>,
}

/// A drop target with a picker button.
///
/// Reads each chosen or dropped file into memory and forwards the batch
/// through `on_files`. Files that cannot be read are logged and left
/// out of the batch.
#[component]
pub fn DropZone(props: DropZoneProps) -> Element {
    let mut dragging = use_signal(|| false);
    let disabled = props.disabled;

    // Shared by the picker and drop paths.
    let read_files = move |files: Vec<FileData>| async move {
        let mut batch = Vec::with_capacity(files.len());
        for file in files {
            let name = file.name();
            match file.read_bytes().await {
                Ok(bytes) => batch.push(SourceFile::new(name, bytes.to_vec())),
                Err(e) => tracing::warn!(%name, error = %e, "failed to read file"),
            }
        }
        if !batch.is_empty() {
            props.on_files.call(batch);
        }
    };

    let handle_files = move |evt: FormEvent| async move {
        if !disabled {
            read_files(evt.files()).await;
        }
    };

    let handle_drop = move |evt: DragEvent| async move {
        evt.prevent_default();
        dragging.set(false);
        if !disabled {
            read_files(evt.files()).await;
        }
    };

    let state_class = if disabled {
        "fd-dropzone--disabled"
    } else if dragging() {
        "fd-dropzone--active"
    } else {
        ""
    };

    rsx! {
        div {
            class: "fd-dropzone {state_class}",
            ondragover: move |evt| {
                evt.prevent_default();
                if !disabled {
                    dragging.set(true);
                }
            },
            ondragleave: move |_| {
                dragging.set(false);
            },
            ondrop: handle_drop,

            p { class: "fd-dropzone-title", "Drop files here or" }

            label { class: if disabled { "fd-button fd-button--disabled" } else { "fd-button fd-button--primary" },
                input {
                    r#type: "file",
                    accept: "{props.accept}",
                    multiple: true,
                    disabled,
                    class: "fd-hidden",
                    onchange: handle_files,
                }
                Icon { width: 16, height: 16, icon: LdPaperclip }
                span { "{props.choose_text}" }
            }

            p { class: "fd-hint", "{props.hint}" }
        }
    }
}
