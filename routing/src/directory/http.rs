use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{parse_listing, FolderDirectory, FolderId, FolderMap};
use crate::error::{DirectoryError, DirectoryResult};

/// Folder listings from the document service's REST API.
pub struct HttpFolderDirectory {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl HttpFolderDirectory {
    /// `base_url` is the service root, e.g. `https://api.cailun.com.br`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Self {
        Self::with_client(
            base_url,
            token,
            reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
        )
    }

    pub fn with_client(
        base_url: impl Into<String>,
        token: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client,
        }
    }

    fn listing_url(&self, parent: FolderId) -> String {
        format!("{}/storage/folder/{}/folders", self.base_url, parent)
    }
}

#[async_trait]
impl FolderDirectory for HttpFolderDirectory {
    async fn try_list_folders(&self, parent: FolderId) -> DirectoryResult<FolderMap> {
        let response = self
            .client
            .get(self.listing_url(parent))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| DirectoryError::Transport {
                parent,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Status {
                parent,
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| DirectoryError::Payload {
                    parent,
                    message: e.to_string(),
                })?;

        let map = parse_listing(&body).ok_or_else(|| DirectoryError::Payload {
            parent,
            message: "missing `data` array".to_string(),
        })?;

        debug!(parent = %parent, children = map.len(), "Listed folders");
        Ok(map)
    }
}
