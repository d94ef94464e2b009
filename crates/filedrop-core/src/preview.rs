//! Thumbnail references for tracked files.
//!
//! Creating a displayable URL for local bytes is a browser concern
//! (`URL.createObjectURL`), so it sits behind the [`PreviewMaker`]
//! trait. The core ships [`PlaceholderPreviews`], which never touches
//! the bytes and is what host-side tests use.

use serde::{Deserialize, Serialize};

use crate::mime;
use crate::types::SourceFile;

/// Icon category shown for files that have no image thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaceholderKind {
    /// An image whose thumbnail could not be created.
    Image,
    /// PDF documents.
    Pdf,
    /// Word-processor documents.
    Document,
    /// Spreadsheets and CSV.
    Spreadsheet,
    /// Compressed archives.
    Archive,
    /// Audio files.
    Audio,
    /// Video files.
    Video,
    /// Plain text.
    Text,
    /// Anything else.
    Generic,
}

impl PlaceholderKind {
    /// Pick the placeholder for a MIME type.
    #[must_use]
    pub fn from_mime(mime_type: &str) -> Self {
        let mime_type = mime_type.to_ascii_lowercase();
        let (top, sub) = mime_type
            .split_once('/')
            .unwrap_or((mime_type.as_str(), ""));
        match (top, sub) {
            ("image", _) => Self::Image,
            ("audio", _) => Self::Audio,
            ("video", _) => Self::Video,
            ("text", "csv") => Self::Spreadsheet,
            ("text", _) => Self::Text,
            (_, "pdf") => Self::Pdf,
            (_, "zip" | "vnd.rar" | "x-7z-compressed" | "gzip" | "x-tar") => Self::Archive,
            (_, s) if s.contains("spreadsheet") || s.contains("excel") || s == "xlsx" || s == "xls" => {
                Self::Spreadsheet
            }
            (_, s) if s.contains("word") || s == "docx" || s == "doc" => {
                Self::Document
            }
            _ => Self::Generic,
        }
    }

    /// Short label rendered inside the placeholder tile.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Image => "IMG",
            Self::Pdf => "PDF",
            Self::Document => "DOC",
            Self::Spreadsheet => "XLS",
            Self::Archive => "ZIP",
            Self::Audio => "AUD",
            Self::Video => "VID",
            Self::Text => "TXT",
            Self::Generic => "FILE",
        }
    }
}

/// What the widget shows as a file's thumbnail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preview {
    /// A `blob:` URL created from the file's bytes. Must be released
    /// when the entry goes away.
    ObjectUrl(String),
    /// A URL of an image already stored on the server.
    Remote(String),
    /// No image; render an icon for this category.
    Placeholder(PlaceholderKind),
}

impl Preview {
    /// Preview for a file seeded from a remote URL.
    ///
    /// Image extensions show the URL itself; anything else gets the
    /// placeholder for `application/<ext>`.
    #[must_use]
    pub fn for_remote(url: &str) -> Self {
        let ext = mime::extension_of(url).unwrap_or_default();
        match mime::from_extension(ext) {
            Some(m) if mime::is_image(m) => Self::Remote(url.to_owned()),
            _ => Self::Placeholder(PlaceholderKind::from_mime(&format!(
                "application/{}",
                ext.to_ascii_lowercase()
            ))),
        }
    }

    /// Image source URL, if this preview has one.
    #[must_use]
    pub fn src(&self) -> Option<&str> {
        match self {
            Self::ObjectUrl(url) | Self::Remote(url) => Some(url),
            Self::Placeholder(_) => None,
        }
    }
}

/// Creates and releases previews for newly admitted files.
pub trait PreviewMaker {
    /// Build the preview for a file that was just accepted.
    fn make_preview(&mut self, file: &SourceFile) -> Preview;

    /// Release resources held by a preview whose entry was removed.
    fn release(&mut self, _preview: &Preview) {}
}

/// Preview maker that only ever produces placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderPreviews;

impl PreviewMaker for PlaceholderPreviews {
    fn make_preview(&mut self, file: &SourceFile) -> Preview {
        Preview::Placeholder(PlaceholderKind::from_mime(file.mime_type()))
    }
}
