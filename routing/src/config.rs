//! Routing configuration.
//!
//! Every value the resolver and extractor depend on is carried here and
//! passed in explicitly; nothing in the crate reads globals.

use serde::{Deserialize, Serialize};

use crate::directory::FolderId;

/// Default label of the third-level folder that receives documents.
pub const DEFAULT_TARGET_SUBFOLDER: &str = "RECIBOS";

/// Default filename markers removed before fragment extraction.
pub const DEFAULT_SUFFIX_MARKERS: &[&str] = &["_AVISO", "_RECIBO", "_13º", "_13"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Folder that holds the sector folders (MATRIZ, FILIAL, TELE, ...).
    pub system_root_id: FolderId,
    /// Label of the folder under each employee folder that receives documents.
    pub target_subfolder: String,
    /// Markers stripped from filenames before tokenizing. Empty disables stripping.
    pub suffix_markers: Vec<String>,
    /// Memoize folder listings per parent id for the lifetime of a run.
    pub cache_listings: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            system_root_id: FolderId(0),
            target_subfolder: DEFAULT_TARGET_SUBFOLDER.to_string(),
            suffix_markers: DEFAULT_SUFFIX_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            cache_listings: true,
        }
    }
}
