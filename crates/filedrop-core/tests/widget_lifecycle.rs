//! Integration test: drive an uploader through select, upload, and
//! delete cycles the way the browser component does.

#![allow(clippy::unwrap_used, clippy::panic)]

use filedrop_core::{
    EntryId, RejectionCode, RemoteFile, Settlement, SourceFile, TransportError, UploadAction,
    UploadState, Uploader, UploaderConfig,
};
use serde_json::json;

fn config() -> UploaderConfig {
    UploaderConfig {
        upload_url: Some("https://example.com/api/files".into()),
        delete_url: Some("https://example.com/api/files/:id".into()),
        max_count: 10,
        ..UploaderConfig::default()
    }
}

fn file(name: &str, size: usize) -> SourceFile {
    SourceFile::new(name, vec![7u8; size])
}

fn ids(uploader: &Uploader) -> Vec<EntryId> {
    uploader.entries().iter().map(|e| e.id.clone()).collect()
}

#[test]
fn accepted_files_become_unique_pending_entries() {
    let mut uploader = Uploader::new(UploaderConfig {
        default_files: vec![RemoteFile {
            url: "https://example.com/media/cat.png".into(),
            file_name: "cat.png".into(),
            file_size: 4000,
            id: EntryId::Number(1),
        }],
        ..config()
    });

    let added = uploader
        .add_files(vec![file("a.png", 10), file("b.pdf", 10), file("c.jpg", 10)])
        .unwrap();
    assert_eq!(added.len(), 3);

    let all = ids(&uploader);
    let unique: std::collections::HashSet<_> = all.iter().collect();
    assert_eq!(unique.len(), all.len());
    for id in &added {
        let entry = uploader.store().get(id).unwrap();
        assert!(!entry.uploaded);
    }
}

#[test]
fn fully_rejected_batch_leaves_store_unchanged() {
    let mut uploader = Uploader::new(config());
    uploader.add_files(vec![file("keep.png", 10)]).unwrap();
    let before = uploader.entries().to_vec();

    let added = uploader
        .add_files(vec![file("virus.exe", 10), file("huge.png", 500_000)])
        .unwrap();
    assert!(added.is_empty());
    assert_eq!(uploader.entries(), before.as_slice());

    let codes: Vec<_> = uploader
        .rejections()
        .iter()
        .map(|r| r.codes.clone())
        .collect();
    assert_eq!(
        codes,
        vec![vec![RejectionCode::InvalidType], vec![RejectionCode::TooLarge]]
    );
}

#[test]
fn successful_upload_assigns_server_ids_in_order() {
    let mut uploader = Uploader::new(UploaderConfig {
        default_files: vec![RemoteFile {
            url: "https://example.com/media/old.pdf".into(),
            file_name: "old.pdf".into(),
            file_size: 100,
            id: EntryId::Number(5),
        }],
        ..config()
    });
    uploader
        .add_files(vec![file("a.png", 100), file("b.png", 200)])
        .unwrap();

    let UploadAction::Send(pending) = uploader.start_upload().unwrap() else {
        panic!("expected a request to send");
    };
    assert_eq!(pending.request.files.len(), 2);
    assert_eq!(pending.request.total_bytes(), 300);

    uploader.finish_upload(&pending.ticket, Ok(json!([41, "b-42"])));

    assert_eq!(
        ids(&uploader),
        vec![EntryId::Number(5), EntryId::Number(41), EntryId::from("b-42")]
    );
    assert!(uploader.entries().iter().all(|e| e.uploaded));
    assert_eq!(uploader.entries()[0].source.name(), "old.pdf");
}

#[test]
fn failed_upload_changes_nothing_and_keeps_transport_error() {
    let mut uploader = Uploader::new(config());
    uploader.add_files(vec![file("a.png", 10)]).unwrap();
    let before = uploader.entries().to_vec();

    let pending = uploader.start_upload().unwrap().into_pending().unwrap();
    let error = TransportError::from_status(413).unwrap();
    let settlement = uploader.finish_upload(&pending.ticket, Err(error.clone()));

    assert!(matches!(settlement, Settlement::Failed(_)));
    assert_eq!(uploader.entries(), before.as_slice());
    let recorded = uploader.upload_error().unwrap();
    assert_eq!(recorded.code, error.code);
    assert_eq!(recorded.message, "Request failed with status code 413");
    assert!(uploader.alert_visible());
}

#[test]
fn delete_issues_request_only_for_uploaded_entries() {
    let mut uploader = Uploader::new(config());
    uploader
        .add_files(vec![file("a.png", 10), file("b.png", 10)])
        .unwrap();
    let pending = uploader.start_upload().unwrap().into_pending().unwrap();
    uploader.finish_upload(&pending.ticket, Ok(json!([100, 200])));
    let local = uploader.add_files(vec![file("c.png", 10)]).unwrap().remove(0);

    uploader.request_delete(&EntryId::Number(200)).unwrap();
    let outcome = uploader.confirm_delete().unwrap();
    assert_eq!(
        outcome.request.map(|r| r.url).as_deref(),
        Some("https://example.com/api/files/200")
    );
    assert_eq!(ids(&uploader), vec![EntryId::Number(100), local.clone()]);

    uploader.request_delete(&local).unwrap();
    let outcome = uploader.confirm_delete().unwrap();
    assert_eq!(outcome.request, None);
    assert_eq!(ids(&uploader), vec![EntryId::Number(100)]);
}

#[test]
fn single_file_round_trip_with_string_id() {
    let mut uploader = Uploader::new(config());
    uploader.add_files(vec![file("photo.png", 5000)]).unwrap();

    let pending = uploader.start_upload().unwrap().into_pending().unwrap();
    assert_eq!(uploader.upload_state(), UploadState::InProgress(0));
    uploader.record_progress(1000, 5000);
    assert_eq!(uploader.upload_state(), UploadState::InProgress(20));

    uploader.finish_upload(&pending.ticket, Ok(json!(["abc123"])));
    let entry = &uploader.entries()[0];
    assert_eq!(entry.id, EntryId::from("abc123"));
    assert!(entry.uploaded);
    assert_eq!(uploader.progress(), 100);
}

#[test]
fn oversized_file_is_rejected_alongside_accepted_one() {
    let mut uploader = Uploader::new(config());
    uploader
        .add_files(vec![file("small.png", 1000), file("large.png", 200_001)])
        .unwrap();

    assert_eq!(uploader.entries().len(), 1);
    assert_eq!(uploader.rejections().len(), 1);
    assert_eq!(uploader.rejections()[0].codes, vec![RejectionCode::TooLarge]);
    assert_eq!(uploader.rejections()[0].codes[0].code(), "file-too-large");
    assert!(uploader.alert_visible());
}
