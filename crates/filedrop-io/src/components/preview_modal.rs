//! Full-size preview of one entry.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdX;
use filedrop_core::FileEntry;

use super::file_list::Thumbnail;

/// Props for the [`PreviewModal`] component.
#[derive(Props, Clone, PartialEq)]
pub struct PreviewModalProps {
    /// Entry to show. `None` renders nothing.
    entry: Option<FileEntry>,
    /// Called when the backdrop or close button is clicked.
    on_close: EventHandler<()>,
}

#[component]
pub fn PreviewModal(props: PreviewModalProps) -> Element {
    let Some(entry) = props.entry else {
        return rsx! {};
    };

    rsx! {
        div {
            class: "fd-modal-backdrop",
            onclick: move |_| props.on_close.call(()),

            div {
                class: "fd-modal",
                role: "dialog",
                onclick: move |evt| evt.stop_propagation(),

                div { class: "fd-modal-header",
                    span { class: "fd-item-name", "{entry.source.name()}" }
                    button {
                        class: "fd-icon-button",
                        title: "Close",
                        onclick: move |_| props.on_close.call(()),
                        Icon { width: 16, height: 16, icon: LdX }
                    }
                }

                div { class: "fd-modal-body",
                    Thumbnail { preview: entry.preview.clone(), name: entry.source.name().to_owned() }
                }

                div { class: "fd-modal-footer",
                    span { class: "fd-badge", "{entry.size_label()}" }
                    span { class: "fd-badge", "{entry.source.mime_type()}" }
                }
            }
        }
    }
}
