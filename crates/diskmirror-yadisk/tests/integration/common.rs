//! Shared test helpers for Yandex Disk API integration tests
//!
//! Provides wiremock-based mock server setup. Each helper mounts the
//! endpoints a test needs and returns a store pointing at the mock server.

use std::time::Duration;

use diskmirror_core::domain::RemotePath;
use diskmirror_yadisk::{client::YadiskClient, store::YadiskRemoteStore};
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

/// Path of the resources endpoint on the mock server
pub const RESOURCES: &str = "/v1/disk/resources";

/// Token the mocks expect in the `Authorization` header
pub const TOKEN: &str = "test-oauth-token";

/// Starts a mock server and returns a store pointing at it
pub async fn setup_store() -> (MockServer, YadiskRemoteStore) {
    let server = MockServer::start().await;
    let store = store_for(&server, 100, Duration::from_secs(5));
    (server, store)
}

/// Builds a store for `server` with the given page size and timeout
pub fn store_for(server: &MockServer, page_size: u32, timeout: Duration) -> YadiskRemoteStore {
    let client = YadiskClient::with_base_url(TOKEN, format!("{}{}", server.uri(), RESOURCES))
        .with_timeout(timeout);
    YadiskRemoteStore::new(client).with_page_size(page_size)
}

/// Parses a remote path, panicking on invalid input
pub fn remote(path: &str) -> RemotePath {
    RemotePath::normalize(path).expect("valid remote path")
}

/// JSON for a single listing item
pub fn item(name: &str, kind: &str, modified: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "type": kind,
        "modified": modified,
        "path": format!("disk:/Backup/{name}"),
    })
}

/// Mounts a listing page for `folder` answering `offset`
pub async fn mount_listing_page(
    server: &MockServer,
    folder: &str,
    offset: u64,
    items: Vec<serde_json::Value>,
    total: u64,
) {
    Mock::given(method("GET"))
        .and(path(RESOURCES))
        .and(query_param("path", folder))
        .and(query_param("offset", offset.to_string()))
        .and(header("Authorization", format!("OAuth {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "path": format!("disk:{folder}"),
            "type": "dir",
            "_embedded": {
                "items": items,
                "offset": offset,
                "total": total,
            }
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// Body of an API error response
pub fn api_error(message: &str, error: &str) -> serde_json::Value {
    serde_json::json!({
        "message": message,
        "description": message,
        "error": error,
    })
}
