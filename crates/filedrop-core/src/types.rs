//! Shared types for the filedrop selection state machine.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::mime;
use crate::preview::Preview;

/// Identity of a tracked file.
///
/// Servers hand back either numeric or string identifiers, so both
/// shapes are accepted. Locally generated placeholders are numeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
    /// Numeric identifier (placeholders, and most database keys).
    Number(u64),
    /// Opaque string identifier (UUIDs, object keys).
    Text(String),
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for EntryId {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// The file a user picked or dropped, or a stand-in for one that
/// already lives on the server.
///
/// Bytes are shared so that cloning an entry (for rendering, or for
/// handing the batch to an upload request) never copies file contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    name: String,
    mime_type: String,
    size: u64,
    bytes: Arc<[u8]>,
}

impl SourceFile {
    /// Create a source file from its name and contents.
    ///
    /// The MIME type is derived from the file extension and the size
    /// from the byte length.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let name = name.into();
        let bytes = bytes.into();
        Self {
            mime_type: mime::guess_from_name(&name).to_owned(),
            size: bytes.len() as u64,
            name,
            bytes,
        }
    }

    /// Create a content-less stand-in for a file already stored remotely.
    #[must_use]
    pub fn remote(name: impl Into<String>, size: u64) -> Self {
        let name = name.into();
        Self {
            mime_type: mime::guess_from_name(&name).to_owned(),
            size,
            name,
            bytes: Arc::from(Vec::new()),
        }
    }

    /// Override the MIME type derived from the extension.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// File name as reported by the browser, including extension.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// MIME type, e.g. `image/png`.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Size in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// File contents. Empty for remote stand-ins.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lower-case extension without the dot, if the name has one.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        mime::extension_of(&self.name).map(str::to_ascii_lowercase)
    }
}

/// One file tracked by the widget, uploaded or pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Server id once uploaded, placeholder id before that.
    pub id: EntryId,
    /// The underlying file.
    pub source: SourceFile,
    /// What to show as the thumbnail.
    pub preview: Preview,
    /// `true` once the server has confirmed the file is stored.
    pub uploaded: bool,
}

impl FileEntry {
    /// Size of the entry's file in kilobytes, formatted with two
    /// decimals for the size badge (e.g. `"5.00kb"`).
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // display only
    pub fn size_label(&self) -> String {
        format!("{:.2}kb", self.source.size() as f64 / 1000.0)
    }
}

/// A file that already exists on the server, used to seed the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Where the stored file can be fetched from.
    pub url: String,
    /// Display name.
    pub file_name: String,
    /// Size in bytes.
    pub file_size: u64,
    /// Server-assigned identity.
    pub id: EntryId,
}

impl RemoteFile {
    /// Convert into an already-uploaded entry.
    #[must_use]
    pub fn into_entry(self) -> FileEntry {
        let preview = Preview::for_remote(&self.url);
        FileEntry {
            id: self.id,
            source: SourceFile::remote(self.file_name, self.file_size),
            preview,
            uploaded: true,
        }
    }
}
