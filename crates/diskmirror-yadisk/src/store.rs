//! YadiskRemoteStore - IRemoteStore implementation for the Yandex Disk API
//!
//! Maps the five remote store operations onto the resources endpoint:
//!
//! | Operation               | Request                               | Success      |
//! |-------------------------|---------------------------------------|--------------|
//! | `ensure_folder`         | `GET ?path=`, then `PUT ?path=`       | 200 / 201    |
//! | `list_files`            | `GET ?path=&limit=&offset=` (paged)   | 200          |
//! | `request_upload_target` | `GET /upload?path=&overwrite=`        | 200          |
//! | `transfer`              | `PUT <href>` with the raw bytes       | 201 / 202    |
//! | `delete`                | `DELETE ?path=`                       | 204          |
//!
//! Any other status becomes [`StoreError::Rejected`] carrying the API's
//! own message.

use chrono::{DateTime, Utc};
use diskmirror_core::{
    config::Config,
    domain::RemotePath,
    ports::{EntryKind, FolderStatus, IRemoteStore, RemoteEntry, StoreError, UploadTarget},
};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{client::YadiskClient, YadiskError};

/// Default number of entries requested per listing page
pub const DEFAULT_PAGE_SIZE: u32 = 100;

// ============================================================================
// API response types
// ============================================================================

/// Resource metadata returned by `GET ?path=`
#[derive(Debug, Deserialize)]
struct ResourceResponse {
    /// Listing of the folder; absent when `path` is a file
    #[serde(rename = "_embedded")]
    embedded: Option<ResourceList>,
}

/// One page of a folder listing
#[derive(Debug, Deserialize)]
struct ResourceList {
    items: Vec<ResourceItem>,
    /// Total number of entries in the folder
    total: Option<u64>,
}

/// A single listing entry
#[derive(Debug, Deserialize)]
struct ResourceItem {
    name: String,
    #[serde(rename = "type")]
    kind: EntryKind,
    modified: DateTime<Utc>,
}

/// Response of `GET /upload`
#[derive(Debug, Deserialize)]
struct UploadLinkResponse {
    href: String,
    #[serde(default = "default_upload_method")]
    method: String,
}

fn default_upload_method() -> String {
    "PUT".to_string()
}

// ============================================================================
// YadiskRemoteStore
// ============================================================================

/// Remote store backed by a Yandex Disk account
pub struct YadiskRemoteStore {
    client: YadiskClient,
    page_size: u32,
}

impl YadiskRemoteStore {
    /// Creates a new store on top of `client`
    pub fn new(client: YadiskClient) -> Self {
        Self {
            client,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Creates a store from the application configuration
    ///
    /// # Errors
    /// Returns [`YadiskError::MissingToken`] if no token is configured.
    pub fn from_config(config: &Config) -> Result<Self, YadiskError> {
        Ok(Self::new(YadiskClient::from_config(config)?).with_page_size(config.remote.page_size))
    }

    /// Sets the number of entries requested per listing page
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// The underlying client
    pub fn client(&self) -> &YadiskClient {
        &self.client
    }

    async fn get_resource(&self, path: &RemotePath) -> Result<reqwest::Response, YadiskError> {
        self.client
            .send(
                self.client
                    .request(Method::GET, "")
                    .query(&[("path", path.as_str()), ("limit", "0")]),
            )
            .await
    }

    async fn create_folder(&self, path: &RemotePath) -> Result<FolderStatus, YadiskError> {
        let response = self
            .client
            .send(
                self.client
                    .request(Method::PUT, "")
                    .query(&[("path", path.as_str())]),
            )
            .await?;

        if response.status() == StatusCode::CREATED {
            Ok(FolderStatus::Created)
        } else {
            Err(YadiskClient::error_from_response(response).await)
        }
    }

    async fn list_page(
        &self,
        path: &RemotePath,
        offset: u64,
    ) -> Result<ResourceList, YadiskError> {
        let limit = self.page_size.to_string();
        let offset_param = offset.to_string();
        let response = self
            .client
            .send(self.client.request(Method::GET, "").query(&[
                ("path", path.as_str()),
                ("limit", limit.as_str()),
                ("offset", offset_param.as_str()),
            ]))
            .await?;

        if response.status() != StatusCode::OK {
            return Err(YadiskClient::error_from_response(response).await);
        }

        let resource: ResourceResponse = response.json().await?;
        resource.embedded.ok_or_else(|| {
            YadiskError::InvalidResponse(format!("{path} is not a folder (no _embedded listing)"))
        })
    }
}

#[async_trait::async_trait]
impl IRemoteStore for YadiskRemoteStore {
    #[tracing::instrument(skip(self, path), fields(path = %path))]
    async fn ensure_folder(&self, path: &RemotePath) -> Result<FolderStatus, StoreError> {
        let response = self.get_resource(path).await?;
        if response.status() == StatusCode::OK {
            debug!("Remote folder exists");
            return Ok(FolderStatus::Existed);
        }

        debug!(status = response.status().as_u16(), "Remote folder missing, creating");
        let status = self.create_folder(path).await?;
        info!("Created remote folder");
        Ok(status)
    }

    #[tracing::instrument(skip(self, path), fields(path = %path))]
    async fn list_files(&self, path: &RemotePath) -> Result<Vec<RemoteEntry>, StoreError> {
        let mut entries = Vec::new();
        let mut offset: u64 = 0;

        loop {
            let page = self.list_page(path, offset).await?;
            let fetched = page.items.len() as u64;

            entries.extend(page.items.into_iter().map(|item| RemoteEntry {
                name: item.name,
                kind: item.kind,
                modified: item.modified,
            }));
            offset += fetched;

            let total = page.total.unwrap_or(offset);
            if fetched == 0 || offset >= total {
                break;
            }
            debug!(offset, total, "Fetching next listing page");
        }

        debug!(entries = entries.len(), "Listed remote folder");
        Ok(entries)
    }

    #[tracing::instrument(skip(self, path), fields(path = %path))]
    async fn request_upload_target(
        &self,
        path: &RemotePath,
        overwrite: bool,
    ) -> Result<UploadTarget, StoreError> {
        let response = self
            .client
            .send(self.client.request(Method::GET, "/upload").query(&[
                ("path", path.as_str()),
                ("overwrite", if overwrite { "true" } else { "false" }),
            ]))
            .await?;

        if response.status() != StatusCode::OK {
            return Err(YadiskClient::error_from_response(response).await.into());
        }

        let link: UploadLinkResponse = response.json().await.map_err(YadiskError::from)?;
        Ok(UploadTarget {
            href: link.href,
            method: link.method,
        })
    }

    #[tracing::instrument(skip(self, target, data), fields(bytes = data.len()))]
    async fn transfer(&self, target: &UploadTarget, data: Vec<u8>) -> Result<(), StoreError> {
        let method = Method::from_bytes(target.method.as_bytes())
            .map_err(|_| StoreError::InvalidResponse(format!("bad method {}", target.method)))?;

        let response = self
            .client
            .send(self.client.request_absolute(method, &target.href).body(data))
            .await?;

        match response.status() {
            StatusCode::CREATED | StatusCode::ACCEPTED => Ok(()),
            _ => Err(YadiskClient::error_from_response(response).await.into()),
        }
    }

    #[tracing::instrument(skip(self, path), fields(path = %path))]
    async fn delete(&self, path: &RemotePath) -> Result<(), StoreError> {
        let response = self
            .client
            .send(
                self.client
                    .request(Method::DELETE, "")
                    .query(&[("path", path.as_str())]),
            )
            .await?;

        if response.status() == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            Err(YadiskClient::error_from_response(response).await.into())
        }
    }
}
