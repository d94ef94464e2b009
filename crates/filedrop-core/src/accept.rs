//! Acceptance filter: decides which chosen files become entries.
//!
//! Follows the usual drop-zone rules. Each file is checked against the
//! accepted types and the size bounds on its own; the count limit is
//! then applied to the files that passed, and if they would overflow
//! the widget every one of them is rejected as `too-many-files`.

use serde::{Deserialize, Serialize};

use crate::config::UploaderConfig;
use crate::types::SourceFile;

/// Why a file was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum RejectionCode {
    /// Neither the MIME type nor the extension is accepted.
    #[serde(rename = "file-invalid-type")]
    #[error("file type is not accepted")]
    InvalidType,

    /// Larger than `max_size`.
    #[serde(rename = "file-too-large")]
    #[error("file is larger than the allowed size")]
    TooLarge,

    /// Smaller than `min_size`.
    #[serde(rename = "file-too-small")]
    #[error("file is smaller than the allowed size")]
    TooSmall,

    /// Admitting it would exceed `max_count`.
    #[serde(rename = "too-many-files")]
    #[error("too many files")]
    TooManyFiles,
}

impl RejectionCode {
    /// Stable string code, matching the serialized form.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidType => "file-invalid-type",
            Self::TooLarge => "file-too-large",
            Self::TooSmall => "file-too-small",
            Self::TooManyFiles => "too-many-files",
        }
    }
}

/// A file that was not admitted, with every reason that applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// The rejected file.
    pub file: SourceFile,
    /// Non-empty list of reasons, in check order.
    pub codes: Vec<RejectionCode>,
}

/// Result of filtering one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Files that passed every check, in batch order.
    pub accepted: Vec<SourceFile>,
    /// Files that failed at least one check: type and size rejections
    /// in batch order, followed by any count rejections.
    pub rejected: Vec<Rejection>,
}

/// Type, size, and count constraints borrowed from an [`UploaderConfig`].
#[derive(Debug, Clone, Copy)]
pub struct AcceptanceFilter<'a> {
    config: &'a UploaderConfig,
}

impl<'a> AcceptanceFilter<'a> {
    /// Build a filter from the widget configuration.
    #[must_use]
    pub const fn new(config: &'a UploaderConfig) -> Self {
        Self { config }
    }

    /// Whether the file's MIME type or extension is accepted.
    ///
    /// An empty accept map accepts everything.
    #[must_use]
    pub fn is_type_accepted(&self, file: &SourceFile) -> bool {
        let accepted = &self.config.accepted_types;
        if accepted.is_empty() {
            return true;
        }
        let name = file.name().to_ascii_lowercase();
        accepted.iter().any(|(pattern, extensions)| {
            mime_matches(pattern, file.mime_type())
                || extensions
                    .iter()
                    .any(|ext| name.ends_with(&ext.to_ascii_lowercase()))
        })
    }

    /// Size and type reasons for one file, without the count check.
    #[must_use]
    pub fn check(&self, file: &SourceFile) -> Vec<RejectionCode> {
        let mut codes = Vec::new();
        if !self.is_type_accepted(file) {
            codes.push(RejectionCode::InvalidType);
        }
        if file.size() > self.config.max_size {
            codes.push(RejectionCode::TooLarge);
        }
        if file.size() < self.config.min_size {
            codes.push(RejectionCode::TooSmall);
        }
        codes
    }

    /// Split a batch into accepted and rejected files.
    ///
    /// `existing` is the number of entries already in the widget.
    #[must_use]
    pub fn partition(&self, batch: Vec<SourceFile>, existing: usize) -> Partition {
        let mut passed = Vec::with_capacity(batch.len());
        let mut rejected = Vec::new();
        for file in batch {
            let codes = self.check(&file);
            if codes.is_empty() {
                passed.push(file);
            } else {
                rejected.push((file, codes));
            }
        }

        if !self.config.fits_count(existing, passed.len()) {
            tracing::debug!(
                existing,
                incoming = passed.len(),
                max = self.config.max_count,
                "batch exceeds file count limit"
            );
            rejected.extend(
                passed
                    .drain(..)
                    .map(|file| (file, vec![RejectionCode::TooManyFiles])),
            );
        }

        Partition {
            accepted: passed,
            rejected: rejected
                .into_iter()
                .map(|(file, codes)| Rejection { file, codes })
                .collect(),
        }
    }
}

/// Match a MIME type against an exact type or a `type/*` wildcard.
fn mime_matches(pattern: &str, mime_type: &str) -> bool {
    pattern.strip_suffix("/*").map_or_else(
        || pattern.eq_ignore_ascii_case(mime_type),
        |top| {
            mime_type
                .split_once('/')
                .is_some_and(|(t, _)| t.eq_ignore_ascii_case(top))
        },
    ) || (pattern == "*/*")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn file(name: &str, size: usize) -> SourceFile {
        SourceFile::new(name, vec![0u8; size])
    }

    fn codes_of(partition: &Partition) -> Vec<Vec<RejectionCode>> {
        partition.rejected.iter().map(|r| r.codes.clone()).collect()
    }

    #[test]
    fn accepts_valid_batch_in_order() {
        let config = UploaderConfig {
            max_count: 3,
            ..UploaderConfig::default()
        };
        let result = AcceptanceFilter::new(&config)
            .partition(vec![file("a.png", 10), file("b.pdf", 20)], 0);
        let names: Vec<_> = result.accepted.iter().map(SourceFile::name).collect();
        assert_eq!(names, vec!["a.png", "b.pdf"]);
        assert!(result.rejected.is_empty());
    }

    #[test]
    fn invalid_type() {
        let config = UploaderConfig::default();
        let result = AcceptanceFilter::new(&config).partition(vec![file("run.exe", 10)], 0);
        assert!(result.accepted.is_empty());
        assert_eq!(codes_of(&result), vec![vec![RejectionCode::InvalidType]]);
    }

    #[test]
    fn size_bounds() {
        let config = UploaderConfig {
            min_size: 100,
            max_size: 1000,
            max_count: 0,
            ..UploaderConfig::default()
        };
        let result = AcceptanceFilter::new(&config).partition(
            vec![file("big.png", 1001), file("small.png", 99), file("ok.png", 1000)],
            0,
        );
        assert_eq!(result.accepted.len(), 1);
        assert_eq!(
            codes_of(&result),
            vec![vec![RejectionCode::TooLarge], vec![RejectionCode::TooSmall]]
        );
    }

    #[test]
    fn multiple_reasons_for_one_file() {
        let config = UploaderConfig::default();
        let result = AcceptanceFilter::new(&config).partition(vec![file("huge.exe", 300_000)], 0);
        assert_eq!(
            codes_of(&result),
            vec![vec![RejectionCode::InvalidType, RejectionCode::TooLarge]]
        );
    }

    #[test]
    fn too_many_rejects_every_otherwise_valid_file() {
        let config = UploaderConfig {
            max_count: 2,
            ..UploaderConfig::default()
        };
        let result = AcceptanceFilter::new(&config)
            .partition(vec![file("a.png", 1), file("b.png", 1), file("c.exe", 1)], 1);
        assert!(result.accepted.is_empty());
        assert_eq!(
            codes_of(&result),
            vec![
                vec![RejectionCode::InvalidType],
                vec![RejectionCode::TooManyFiles],
                vec![RejectionCode::TooManyFiles],
            ]
        );
    }

    #[test]
    fn count_limit_ignores_files_rejected_for_other_reasons() {
        // Default max_count is 1: one good file plus one oversized file
        // still fits.
        let config = UploaderConfig::default();
        let result = AcceptanceFilter::new(&config)
            .partition(vec![file("a.png", 5000), file("b.png", 250_000)], 0);
        assert_eq!(result.accepted.len(), 1);
        assert_eq!(codes_of(&result), vec![vec![RejectionCode::TooLarge]]);
    }

    #[test]
    fn wildcard_exact_and_extension_matching() {
        let config = UploaderConfig {
            accepted_types: BTreeMap::from([
                ("image/*".to_owned(), vec![]),
                ("application/x-custom".to_owned(), vec![".CST".to_owned()]),
            ]),
            ..UploaderConfig::default()
        };
        let filter = AcceptanceFilter::new(&config);
        assert!(filter.is_type_accepted(&file("x.gif", 1)));
        assert!(filter.is_type_accepted(&file("model.cst", 1)));
        assert!(filter.is_type_accepted(&file("blob", 1).with_mime_type("application/x-custom")));
        assert!(!filter.is_type_accepted(&file("a.pdf", 1)));
    }

    #[test]
    fn empty_accept_map_accepts_anything() {
        let config = UploaderConfig {
            accepted_types: BTreeMap::new(),
            ..UploaderConfig::default()
        };
        assert!(AcceptanceFilter::new(&config).is_type_accepted(&file("x.bin", 1)));
        assert!(AcceptanceFilter::new(&config).is_type_accepted(&file("whatever", 1)));
    }

    #[test]
    fn codes_serialize_as_drop_zone_strings() {
        for code in [
            RejectionCode::InvalidType,
            RejectionCode::TooLarge,
            RejectionCode::TooSmall,
            RejectionCode::TooManyFiles,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.code()));
        }
    }
}
