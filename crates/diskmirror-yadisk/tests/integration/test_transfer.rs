//! Integration tests for uploads and deletions

use diskmirror_core::ports::{IRemoteStore, StoreError, UploadTarget};
use wiremock::{
    matchers::{body_bytes, header, method, path, query_param},
    Mock, ResponseTemplate,
};

use crate::common::{self, RESOURCES};

// ============================================================================
// Upload tests
// ============================================================================

#[tokio::test]
async fn test_request_upload_target_returns_href() {
    let (server, store) = common::setup_store().await;

    Mock::given(method("GET"))
        .and(path(format!("{RESOURCES}/upload")))
        .and(query_param("path", "/Backup/a.txt"))
        .and(query_param("overwrite", "true"))
        .and(header("Authorization", "OAuth test-oauth-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "operation_id": "op-1",
            "href": format!("{}/upload-target/abc", server.uri()),
            "method": "PUT",
            "templated": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let target = store
        .request_upload_target(&common::remote("/Backup/a.txt"), true)
        .await
        .unwrap();

    assert_eq!(target.href, format!("{}/upload-target/abc", server.uri()));
    assert_eq!(target.method, "PUT");
}

#[tokio::test]
async fn test_request_upload_target_declined() {
    let (server, store) = common::setup_store().await;

    Mock::given(method("GET"))
        .and(path(format!("{RESOURCES}/upload")))
        .respond_with(ResponseTemplate::new(409).set_body_json(common::api_error(
            "Resource \"disk:/Backup/a.txt\" already exists.",
            "DiskResourceAlreadyExistsError",
        )))
        .mount(&server)
        .await;

    let err = store
        .request_upload_target(&common::remote("/Backup/a.txt"), false)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(409));
    assert!(err.reason().contains("already exists"));
}

#[tokio::test]
async fn test_transfer_puts_raw_bytes_without_auth() {
    let (server, store) = common::setup_store().await;

    Mock::given(method("PUT"))
        .and(path("/upload-target/abc"))
        .and(body_bytes(b"hello world".to_vec()))
        .and(|req: &wiremock::Request| !req.headers.contains_key("authorization"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let target = UploadTarget {
        href: format!("{}/upload-target/abc", server.uri()),
        method: "PUT".to_string(),
    };
    store.transfer(&target, b"hello world".to_vec()).await.unwrap();
}

#[tokio::test]
async fn test_transfer_accepted_counts_as_success() {
    let (server, store) = common::setup_store().await;

    Mock::given(method("PUT"))
        .and(path("/upload-target/slow"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    let target = UploadTarget {
        href: format!("{}/upload-target/slow", server.uri()),
        method: "PUT".to_string(),
    };
    assert!(store.transfer(&target, vec![0u8; 16]).await.is_ok());
}

#[tokio::test]
async fn test_transfer_rejected() {
    let (server, store) = common::setup_store().await;

    Mock::given(method("PUT"))
        .and(path("/upload-target/big"))
        .respond_with(ResponseTemplate::new(413))
        .mount(&server)
        .await;

    let target = UploadTarget {
        href: format!("{}/upload-target/big", server.uri()),
        method: "PUT".to_string(),
    };
    let err = store.transfer(&target, vec![1, 2, 3]).await.unwrap_err();

    assert_eq!(
        err,
        StoreError::Rejected {
            status: 413,
            message: "Payload Too Large".to_string()
        }
    );
}

// ============================================================================
// Delete tests
// ============================================================================

#[tokio::test]
async fn test_delete_no_content_is_success() {
    let (server, store) = common::setup_store().await;

    Mock::given(method("DELETE"))
        .and(path(RESOURCES))
        .and(query_param("path", "/Backup/old.txt"))
        .and(header("Authorization", "OAuth test-oauth-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    store.delete(&common::remote("/Backup/old.txt")).await.unwrap();
}

#[tokio::test]
async fn test_delete_other_status_carries_api_message() {
    let (server, store) = common::setup_store().await;

    Mock::given(method("DELETE"))
        .and(path(RESOURCES))
        .respond_with(
            ResponseTemplate::new(423)
                .set_body_json(common::api_error("Resource is locked.", "DiskResourceLockedError")),
        )
        .mount(&server)
        .await;

    let err = store
        .delete(&common::remote("/Backup/old.txt"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        StoreError::Rejected {
            status: 423,
            message: "Resource is locked.".to_string()
        }
    );
}

#[tokio::test]
async fn test_delete_async_operation_is_not_success() {
    let (server, store) = common::setup_store().await;

    Mock::given(method("DELETE"))
        .and(path(RESOURCES))
        .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({
            "href": "https://cloud-api.yandex.net/v1/disk/operations/abc",
            "method": "GET"
        })))
        .mount(&server)
        .await;

    let err = store
        .delete(&common::remote("/Backup/folder"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(202));
}
