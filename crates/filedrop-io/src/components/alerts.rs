//! Dismissible alert listing rejected files and upload failures.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdX;
use filedrop_core::{Rejection, RejectionCode, UploadError};

/// Props for the [`Alerts`] component.
#[derive(Props, Clone, PartialEq)]
pub struct AlertsProps {
    /// Rejections from the last batch.
    rejections: Vec<Rejection>,
    /// Error from the last failed upload.
    upload_error: Option<UploadError>,
    /// Whether the alert is showing.
    visible: bool,
    /// Called when the close button is clicked.
    on_dismiss: EventHandler<()>,
}

/// Alert panel. Renders nothing when hidden or when there is nothing
/// to report.
#[component]
pub fn Alerts(props: AlertsProps) -> Element {
    if !props.visible || (props.rejections.is_empty() && props.upload_error.is_none()) {
        return rsx! {};
    }

    rsx! {
        div { class: "fd-alert", role: "alert",
            button {
                class: "fd-alert-close",
                title: "Dismiss",
                onclick: move |_| props.on_dismiss.call(()),
                Icon { width: 14, height: 14, icon: LdX }
            }

            if let Some(ref err) = props.upload_error {
                p { class: "fd-alert-line",
                    strong { "Upload failed: " }
                    "{err.message} ({err.code})"
                }
            }

            for rejection in props.rejections.iter() {
                p { class: "fd-alert-line",
                    strong { "{rejection.file.name()}: " }
                    "{describe(&rejection.codes)}"
                }
            }
        }
    }
}

/// Human-readable reasons, comma separated.
fn describe(codes: &[RejectionCode]) -> String {
    codes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_joins_every_reason() {
        assert_eq!(
            describe(&[RejectionCode::InvalidType, RejectionCode::TooLarge]),
            "file type is not accepted, file is larger than the allowed size"
        );
        assert_eq!(describe(&[]), "");
    }
}
