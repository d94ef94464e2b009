//! Thumbnail previews backed by object URLs.

use filedrop_core::mime;
use filedrop_core::{PlaceholderKind, Preview, PreviewMaker, SourceFile};

use crate::blob;

/// Builds object URL previews for images and placeholders for
/// everything else. URLs are revoked when their entry is deleted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectUrlPreviews;

impl PreviewMaker for ObjectUrlPreviews {
    fn make_preview(&mut self, file: &SourceFile) -> Preview {
        if mime::is_image(file.mime_type()) && !file.bytes().is_empty() {
            match blob::object_url(file) {
                Ok(url) => return Preview::ObjectUrl(url),
                Err(err) => {
                    tracing::warn!(name = file.name(), %err, "falling back to placeholder preview");
                }
            }
        }
        Preview::Placeholder(PlaceholderKind::from_mime(file.mime_type()))
    }

    fn release(&mut self, preview: &Preview) {
        if let Preview::ObjectUrl(url) = preview
            && let Err(err) = blob::revoke_object_url(url)
        {
            tracing::warn!(%url, %err, "failed to revoke preview URL");
        }
    }
}
