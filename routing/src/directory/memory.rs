use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{FolderDirectory, FolderId, FolderMap};
use crate::error::{DirectoryError, DirectoryResult};

/// A fixed folder tree held in memory.
///
/// Parents can be marked as failing with an HTTP status to mimic an outage,
/// and every listing request is recorded in call order.
#[derive(Default)]
pub struct InMemoryDirectory {
    children: HashMap<FolderId, Vec<(String, FolderId)>>,
    failures: HashMap<FolderId, u16>,
    calls: Mutex<Vec<FolderId>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a child folder `label` with id `id` under `parent`.
    pub fn with_folder(mut self, parent: FolderId, label: &str, id: FolderId) -> Self {
        self.children
            .entry(parent)
            .or_default()
            .push((label.to_string(), id));
        self
    }

    /// Make every listing of `parent` fail with `status`.
    pub fn with_failure(mut self, parent: FolderId, status: u16) -> Self {
        self.failures.insert(parent, status);
        self
    }

    /// Parents listed so far, in request order.
    pub fn calls(&self) -> Vec<FolderId> {
        self.call_log().clone()
    }

    pub fn calls_for(&self, parent: FolderId) -> usize {
        self.call_log().iter().filter(|&&p| p == parent).count()
    }

    fn call_log(&self) -> MutexGuard<'_, Vec<FolderId>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl FolderDirectory for InMemoryDirectory {
    async fn try_list_folders(&self, parent: FolderId) -> DirectoryResult<FolderMap> {
        self.call_log().push(parent);

        if let Some(&status) = self.failures.get(&parent) {
            return Err(DirectoryError::Status { parent, status });
        }

        Ok(self
            .children
            .get(&parent)
            .map(|kids| kids.iter().map(|(label, id)| (label.as_str(), *id)).collect())
            .unwrap_or_default())
    }
}
