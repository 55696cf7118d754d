//! Integration tests for remote folder listing

use std::time::Duration;

use chrono::{TimeZone, Utc};
use diskmirror_core::{
    domain::FileSnapshot,
    ports::{EntryKind, IRemoteStore, StoreError},
};
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use crate::common::{self, RESOURCES};

#[tokio::test]
async fn test_list_files_single_page() {
    let (server, store) = common::setup_store().await;

    common::mount_listing_page(
        &server,
        "/Backup",
        0,
        vec![
            common::item("a.txt", "file", "2024-03-01T10:00:00+00:00"),
            common::item("photos", "dir", "2024-03-02T10:00:00+00:00"),
        ],
        2,
    )
    .await;

    let entries = store.list_files(&common::remote("/Backup")).await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "a.txt");
    assert_eq!(entries[0].kind, EntryKind::File);
    assert_eq!(
        entries[0].modified,
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    );
    assert_eq!(entries[1].kind, EntryKind::Directory);

    let snapshot = FileSnapshot::from_remote_listing(entries);
    assert_eq!(snapshot.len(), 1);
    assert!(snapshot.contains("a.txt"));
}

#[tokio::test]
async fn test_list_files_follows_pages() {
    let server = MockServer::start().await;
    let store = common::store_for(&server, 2, Duration::from_secs(5));

    common::mount_listing_page(
        &server,
        "/Backup",
        0,
        vec![
            common::item("1.txt", "file", "2024-01-01T00:00:00+00:00"),
            common::item("2.txt", "file", "2024-01-01T00:00:00+00:00"),
        ],
        5,
    )
    .await;
    common::mount_listing_page(
        &server,
        "/Backup",
        2,
        vec![
            common::item("3.txt", "file", "2024-01-01T00:00:00+00:00"),
            common::item("4.txt", "file", "2024-01-01T00:00:00+00:00"),
        ],
        5,
    )
    .await;
    common::mount_listing_page(
        &server,
        "/Backup",
        4,
        vec![common::item("5.txt", "file", "2024-01-01T00:00:00+00:00")],
        5,
    )
    .await;

    let entries = store.list_files(&common::remote("/Backup")).await.unwrap();

    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["1.txt", "2.txt", "3.txt", "4.txt", "5.txt"]);
}

#[tokio::test]
async fn test_list_files_empty_folder() {
    let (server, store) = common::setup_store().await;

    common::mount_listing_page(&server, "/Backup", 0, vec![], 0).await;

    let entries = store.list_files(&common::remote("/Backup")).await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_list_files_not_found_is_rejected() {
    let (server, store) = common::setup_store().await;

    Mock::given(method("GET"))
        .and(path(RESOURCES))
        .and(query_param("path", "/Missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(common::api_error("Resource not found.", "DiskNotFoundError")),
        )
        .mount(&server)
        .await;

    let err = store
        .list_files(&common::remote("/Missing"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        StoreError::Rejected {
            status: 404,
            message: "Resource not found.".to_string()
        }
    );
}

#[tokio::test]
async fn test_list_files_on_a_file_is_invalid_response() {
    let (server, store) = common::setup_store().await;

    Mock::given(method("GET"))
        .and(path(RESOURCES))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "path": "disk:/Backup",
            "type": "file",
            "name": "Backup"
        })))
        .mount(&server)
        .await;

    let err = store
        .list_files(&common::remote("/Backup"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidResponse(_)), "got {err:?}");
}

#[tokio::test]
async fn test_list_files_timeout() {
    let server = MockServer::start().await;
    let store = common::store_for(&server, 100, Duration::from_millis(200));

    Mock::given(method("GET"))
        .and(path(RESOURCES))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"_embedded": {"items": [], "total": 0}}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = store
        .list_files(&common::remote("/Backup"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Timeout(_)), "got {err:?}");
}

#[tokio::test]
async fn test_list_files_connection_refused_is_network_error() {
    let client = diskmirror_yadisk::client::YadiskClient::with_base_url(
        common::TOKEN,
        "http://127.0.0.1:1/v1/disk/resources",
    );
    let store = diskmirror_yadisk::store::YadiskRemoteStore::new(client);

    let err = store
        .list_files(&common::remote("/Backup"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Network(_)), "got {err:?}");
}
