//! Integration tests for remote folder preparation

use diskmirror_core::ports::{FolderStatus, IRemoteStore, StoreError};
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, ResponseTemplate,
};

use crate::common::{self, RESOURCES};

#[tokio::test]
async fn test_ensure_folder_existing() {
    let (server, store) = common::setup_store().await;

    Mock::given(method("GET"))
        .and(path(RESOURCES))
        .and(query_param("path", "/Backup"))
        .and(header("Authorization", "OAuth test-oauth-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "path": "disk:/Backup",
            "type": "dir"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(RESOURCES))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let status = store.ensure_folder(&common::remote("/Backup")).await.unwrap();
    assert_eq!(status, FolderStatus::Existed);
}

#[tokio::test]
async fn test_ensure_folder_creates_missing() {
    let (server, store) = common::setup_store().await;

    Mock::given(method("GET"))
        .and(path(RESOURCES))
        .and(query_param("path", "/Backup"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(common::api_error("Resource not found.", "DiskNotFoundError")),
        )
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(RESOURCES))
        .and(query_param("path", "/Backup"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "href": "https://cloud-api.yandex.net/v1/disk/resources?path=disk%3A%2FBackup",
            "method": "GET",
            "templated": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let status = store.ensure_folder(&common::remote("Backup")).await.unwrap();
    assert_eq!(status, FolderStatus::Created);
}

#[tokio::test]
async fn test_ensure_folder_creation_rejected() {
    let (server, store) = common::setup_store().await;

    Mock::given(method("GET"))
        .and(path(RESOURCES))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(RESOURCES))
        .respond_with(
            ResponseTemplate::new(507)
                .set_body_json(common::api_error("Not enough space.", "DiskQuotaExceeded")),
        )
        .mount(&server)
        .await;

    let err = store
        .ensure_folder(&common::remote("/Backup"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        StoreError::Rejected {
            status: 507,
            message: "Not enough space.".to_string()
        }
    );
}

#[tokio::test]
async fn test_unauthorized_is_rejected_with_401() {
    let (server, store) = common::setup_store().await;

    Mock::given(method("GET"))
        .and(path(RESOURCES))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(common::api_error("Не авторизован.", "UnauthorizedError")),
        )
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(RESOURCES))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(common::api_error("Не авторизован.", "UnauthorizedError")),
        )
        .mount(&server)
        .await;

    let err = store
        .ensure_folder(&common::remote("/Backup"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert_eq!(err.reason(), "Не авторизован.");
}
