//! List of tracked files with thumbnails and delete confirmation.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdCheck, LdTrash2, LdX};
use filedrop_core::{EntryId, FileEntry, Preview};

/// Props for the [`FileList`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FileListProps {
    /// Entries in display order.
    entries: Vec<FileEntry>,
    /// Entry whose delete confirmation is open.
    confirming: Option<EntryId>,
    /// Prompt shown in the confirmation popover.
    remove_message: String,
    /// Whether delete buttons are enabled.
    can_delete: bool,
    /// Thumbnail clicked.
    on_preview: EventHandler<EntryId>,
    /// Delete button clicked.
    on_request_delete: EventHandler<EntryId>,
    /// Confirmation accepted.
    on_confirm_delete: EventHandler<()>,
    /// Confirmation dismissed.
    on_cancel_delete: EventHandler<()>,
}

#[component]
pub fn FileList(props: FileListProps) -> Element {
    if props.entries.is_empty() {
        return rsx! {};
    }

    rsx! {
        ul { class: "fd-list",
            for entry in props.entries.iter() {
                li {
                    key: "{entry.id}",
                    class: if entry.uploaded { "fd-item fd-item--uploaded" } else { "fd-item" },

                    button {
                        class: "fd-thumb",
                        title: "Preview",
                        onclick: {
                            let id = entry.id.clone();
                            move |_| props.on_preview.call(id.clone())
                        },
                        Thumbnail { preview: entry.preview.clone(), name: entry.source.name().to_owned() }
                    }

                    div { class: "fd-item-meta",
                        span { class: "fd-item-name", "{entry.source.name()}" }
                        span { class: "fd-badge", "{entry.size_label()}" }
                        if entry.uploaded {
                            span { class: "fd-badge fd-badge--success", "uploaded" }
                        }
                    }

                    div { class: "fd-item-actions",
                        button {
                            class: if props.can_delete { "fd-icon-button" } else { "fd-icon-button fd-button--disabled" },
                            disabled: !props.can_delete,
                            title: "Delete",
                            onclick: {
                                let id = entry.id.clone();
                                move |_| props.on_request_delete.call(id.clone())
                            },
                            Icon { width: 16, height: 16, icon: LdTrash2 }
                        }

                        if props.confirming.as_ref() == Some(&entry.id) {
                            div { class: "fd-popover", role: "dialog",
                                p { "{props.remove_message}" }
                                div { class: "fd-popover-actions",
                                    button {
                                        class: "fd-button",
                                        onclick: move |_| props.on_cancel_delete.call(()),
                                        Icon { width: 14, height: 14, icon: LdX }
                                        span { "Cancel" }
                                    }
                                    button {
                                        class: "fd-button fd-button--danger",
                                        disabled: !props.can_delete,
                                        onclick: move |_| props.on_confirm_delete.call(()),
                                        Icon { width: 14, height: 14, icon: LdCheck }
                                        span { "Delete" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Props for the [`Thumbnail`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ThumbnailProps {
    preview: Preview,
    name: String,
}

/// Image for URL-backed previews, a labelled tile otherwise.
#[component]
pub fn Thumbnail(props: ThumbnailProps) -> Element {
    match &props.preview {
        Preview::Placeholder(kind) => rsx! {
            div { class: "fd-placeholder", "{kind.label()}" }
        },
        preview => {
            let src = preview.src().unwrap_or_default().to_owned();
            rsx! {
                img { class: "fd-thumb-image", src: "{src}", alt: "{props.name}" }
            }
        }
    }
}
