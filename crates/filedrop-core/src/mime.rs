//! MIME type lookup by file extension.
//!
//! Browsers derive `File.type` from the extension as well, so a small
//! table covering the formats the widget is typically configured for is
//! enough. Anything unknown is `application/octet-stream`.

/// Fallback MIME type for unrecognized extensions.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Extension → MIME type table (extensions lower-case, no dot).
const TABLE: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("svg", "image/svg+xml"),
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("csv", "text/csv"),
    ("txt", "text/plain"),
    ("zip", "application/zip"),
    ("rar", "application/vnd.rar"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
];

/// Extension of a file name or URL path, without the dot.
///
/// Query strings and fragments are ignored so that remote URLs such as
/// `https://cdn/x.png?v=2` resolve to `png`.
#[must_use]
pub fn extension_of(name: &str) -> Option<&str> {
    let path = name.split(['?', '#']).next().unwrap_or(name);
    let file = path.rsplit('/').next().unwrap_or(path);
    file.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

/// Look up the MIME type for an extension (case-insensitive).
#[must_use]
pub fn from_extension(ext: &str) -> Option<&'static str> {
    TABLE
        .iter()
        .find(|(e, _)| e.eq_ignore_ascii_case(ext))
        .map(|&(_, mime)| mime)
}

/// Guess the MIME type of a file from its name.
#[must_use]
pub fn guess_from_name(name: &str) -> &'static str {
    extension_of(name)
        .and_then(from_extension)
        .unwrap_or(OCTET_STREAM)
}

/// Whether a MIME type denotes an image the browser can display.
#[must_use]
pub fn is_image(mime: &str) -> bool {
    mime.get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}
