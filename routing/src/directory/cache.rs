use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::trace;

use super::{FolderDirectory, FolderId, FolderMap};
use crate::error::DirectoryResult;

/// Memoizes successful listings per parent id for the lifetime of a run.
///
/// Failed listings are not stored, so a later request for the same parent
/// goes back to the inner directory.
pub struct CachedDirectory<D> {
    inner: D,
    listings: Mutex<HashMap<FolderId, FolderMap>>,
}

impl<D: FolderDirectory> CachedDirectory<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            listings: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub async fn cached_parents(&self) -> usize {
        self.listings.lock().await.len()
    }
}

#[async_trait]
impl<D: FolderDirectory> FolderDirectory for CachedDirectory<D> {
    async fn try_list_folders(&self, parent: FolderId) -> DirectoryResult<FolderMap> {
        if let Some(hit) = self.listings.lock().await.get(&parent) {
            trace!(parent = %parent, "Folder listing cache hit");
            return Ok(hit.clone());
        }

        let map = self.inner.try_list_folders(parent).await?;
        self.listings.lock().await.insert(parent, map.clone());
        Ok(map)
    }
}
