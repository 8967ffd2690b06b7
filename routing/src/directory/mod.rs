//! Remote folder directory.
//!
//! A read-only view of the document service's folder tree, one parent at a
//! time. `try_list_folders` reports why a listing failed; `list_folders` is
//! the fail-soft contract the rest of the system uses, where any failure is
//! simply "no children".
//!
//! Implementations:
//! - [`HttpFolderDirectory`]: the live `GET /storage/folder/{id}/folders` endpoint
//! - [`CachedDirectory`]: per-run memo over any other directory
//! - [`InMemoryDirectory`]: fixed tree with injectable failures

mod cache;
mod http;
mod memory;

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::DirectoryResult;

pub use cache::CachedDirectory;
pub use http::HttpFolderDirectory;
pub use memory::InMemoryDirectory;

/// Identifier of a folder in the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(pub i64);

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trim, then uppercase. Idempotent.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_uppercase()
}

/// Children of one folder, keyed by normalized label, in listing order.
///
/// A repeated label overwrites the earlier id (last wins) and keeps the
/// earlier position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderMap {
    entries: Vec<(String, FolderId)>,
    index: HashMap<String, usize>,
}

impl FolderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: &str, id: FolderId) {
        let key = normalize_label(label);
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1 = id,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, id));
            }
        }
    }

    /// Case-insensitive lookup.
    pub fn get(&self, label: &str) -> Option<FolderId> {
        self.index
            .get(&normalize_label(label))
            .map(|&slot| self.entries[slot].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, FolderId)> {
        self.entries.iter().map(|(label, id)| (label.as_str(), *id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, FolderId)> for FolderMap {
    fn from_iter<I: IntoIterator<Item = (&'a str, FolderId)>>(iter: I) -> Self {
        let mut map = FolderMap::new();
        for (label, id) in iter {
            map.insert(label, id);
        }
        map
    }
}

/// Read access to the remote folder tree.
#[async_trait]
pub trait FolderDirectory: Send + Sync {
    /// List the child folders of `parent`, reporting failures.
    async fn try_list_folders(&self, parent: FolderId) -> DirectoryResult<FolderMap>;

    /// List the child folders of `parent`; any failure yields an empty map.
    async fn list_folders(&self, parent: FolderId) -> FolderMap {
        match self.try_list_folders(parent).await {
            Ok(map) => map,
            Err(e) => {
                warn!(parent = %parent, error = %e, "Folder listing failed, treating as empty");
                FolderMap::new()
            }
        }
    }
}

/// Build a map from a listing payload's `data` array.
///
/// Items lacking an integer `id` or a string `label` are skipped. Returns
/// `None` when `data` is absent or not an array.
pub fn parse_listing(body: &serde_json::Value) -> Option<FolderMap> {
    let items = body.get("data")?.as_array()?;
    let mut map = FolderMap::new();
    for item in items {
        let id = item.get("id").and_then(|v| {
            v.as_i64()
                .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
        });
        let label = item.get("label").and_then(|v| v.as_str());
        if let (Some(id), Some(label)) = (id, label) {
            map.insert(label, FolderId(id));
        }
    }
    Some(map)
}
