//! Widget configuration supplied by the embedding page.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{EntryId, RemoteFile};

/// Placeholder replaced by the entry identity in [`UploaderConfig::delete_url`].
pub const ID_PLACEHOLDER: &str = ":id";

/// Header name used for the fixed content type of each request.
pub const CONTENT_TYPE: &str = "Content-Type";

/// Configuration for one uploader widget.
///
/// Every field has a default, so a page only needs to set what it
/// changes:
///
/// ```
/// use filedrop_core::UploaderConfig;
///
/// let config = UploaderConfig {
///     upload_url: Some("/api/media".into()),
///     max_count: 5,
///     ..UploaderConfig::default()
/// };
/// assert_eq!(config.max_size, 200_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploaderConfig {
    /// Endpoint receiving the multipart `POST`. Not needed when the page
    /// handles uploads itself.
    pub upload_url: Option<String>,

    /// Endpoint template for `DELETE`, with [`ID_PLACEHOLDER`] standing
    /// for the entry identity, e.g. `/api/media/:id`.
    pub delete_url: Option<String>,

    /// Extra headers sent with both requests. They override the fixed
    /// content type on a name clash.
    pub request_headers: BTreeMap<String, String>,

    /// Accepted files: MIME type (or `type/*` wildcard) mapped to the
    /// extensions accepted for it, each with a leading dot.
    pub accepted_types: BTreeMap<String, Vec<String>>,

    /// Largest accepted file, in bytes.
    pub max_size: u64,

    /// Smallest accepted file, in bytes.
    pub min_size: u64,

    /// Maximum number of files the widget holds. `0` means unlimited.
    pub max_count: usize,

    /// Files already stored on the server, shown as uploaded.
    pub default_files: Vec<RemoteFile>,

    /// Multipart form field each file is sent under.
    pub field_name: String,

    /// Text of the delete confirmation prompt.
    pub remove_confirm_message: Option<String>,

    /// Label of the file picker button.
    pub choose_text: String,

    /// Label of the upload button.
    pub upload_text: String,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            upload_url: None,
            delete_url: None,
            request_headers: BTreeMap::new(),
            accepted_types: default_accepted_types(),
            max_size: 200_000,
            min_size: 0,
            max_count: 1,
            default_files: Vec::new(),
            field_name: "files".to_owned(),
            remove_confirm_message: None,
            choose_text: "Choose".to_owned(),
            upload_text: "Upload".to_owned(),
        }
    }
}

/// Images and PDF documents.
#[must_use]
pub fn default_accepted_types() -> BTreeMap<String, Vec<String>> {
    let group = |exts: &[&str]| exts.iter().map(|&e| e.to_owned()).collect::<Vec<_>>();
    BTreeMap::from([
        (
            "image/*".to_owned(),
            group(&[".png", ".jpg", ".jpeg", ".gif", ".webp"]),
        ),
        ("application/pdf".to_owned(), group(&[".pdf"])),
    ])
}

impl UploaderConfig {
    /// Default text of the delete confirmation prompt.
    pub const DEFAULT_REMOVE_MESSAGE: &'static str = "Are you sure you want to delete this file?";

    /// Check the configuration for values that can never work.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SizeRange`] if `min_size > max_size`,
    /// [`ConfigError::DeleteUrlWithoutPlaceholder`] if a delete URL is
    /// set without `:id`, and [`ConfigError::EmptyFieldName`] if the
    /// multipart field name is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_size > self.max_size {
            return Err(ConfigError::SizeRange {
                min: self.min_size,
                max: self.max_size,
            });
        }
        if let Some(url) = &self.delete_url
            && !url.contains(ID_PLACEHOLDER)
        {
            return Err(ConfigError::DeleteUrlWithoutPlaceholder(url.clone()));
        }
        if self.field_name.is_empty() {
            return Err(ConfigError::EmptyFieldName);
        }
        Ok(())
    }

    /// Prompt shown in the delete confirmation.
    #[must_use]
    pub fn remove_message(&self) -> &str {
        self.remove_confirm_message
            .as_deref()
            .unwrap_or(Self::DEFAULT_REMOVE_MESSAGE)
    }

    /// Delete endpoint for one entry, or `None` when no template is set.
    ///
    /// Only the first `:id` is substituted.
    #[must_use]
    pub fn delete_url_for(&self, id: &EntryId) -> Option<String> {
        self.delete_url
            .as_ref()
            .map(|template| template.replacen(ID_PLACEHOLDER, &id.to_string(), 1))
    }

    /// Fixed content type, then the caller's headers on top.
    #[must_use]
    pub fn headers_with_content_type(&self, content_type: &str) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::from([(CONTENT_TYPE.to_owned(), content_type.to_owned())]);
        headers.extend(
            self.request_headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        headers
    }

    /// All accepted extensions, space separated, for the hint badge.
    #[must_use]
    pub fn accepted_extensions_label(&self) -> String {
        self.accepted_types
            .values()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Value for the file input's `accept` attribute.
    #[must_use]
    pub fn accept_attribute(&self) -> String {
        self.accepted_types
            .iter()
            .flat_map(|(mime, exts)| std::iter::once(mime).chain(exts))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Maximum size in kilobytes for the hint badge, e.g. `"200kb"`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // display only
    pub fn max_size_label(&self) -> String {
        format!("{}kb", self.max_size as f64 / 1000.0)
    }

    /// Whether the widget may hold `count` more files after `existing`.
    #[must_use]
    pub const fn fits_count(&self, existing: usize, count: usize) -> bool {
        self.max_count == 0 || existing.saturating_add(count) <= self.max_count
    }
}
