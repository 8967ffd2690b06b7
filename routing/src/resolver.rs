//! Hierarchical folder resolution.
//!
//! The remote tree is three levels deep below the system root:
//!
//! ```text
//! root ─► SECTOR (MATRIZ, FILIAL, TELE) ─► EMPLOYEE FULL NAME ─► RECIBOS
//! ```
//!
//! The share a document came from suggests a sector, but the remote tree
//! drifts from the roster's assignment. When the suggested sector does not
//! yield the target folder, every sibling sector is tried in listing order and
//! the first one holding both the employee folder and its target subfolder
//! wins. A sibling that only holds the employee folder is passed over.

use std::fmt;

use tracing::{debug, info, warn};

use crate::config::RoutingConfig;
use crate::directory::{normalize_label, FolderDirectory, FolderId, FolderMap};
use crate::error::DirectoryError;

/// Outcome of a resolution attempt.
///
/// `NotFound` and `Unreachable` are both "skip this document" for the
/// caller; `Unreachable` additionally says a listing failed along the way, so
/// the absence may not be real.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(FolderId),
    NotFound,
    Unreachable { parent: FolderId, reason: String },
}

impl Resolution {
    pub fn folder_id(&self) -> Option<FolderId> {
        match self {
            Self::Found(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Combine two absences, keeping the first listing failure seen.
    fn merge_absence(self, other: Resolution) -> Resolution {
        match (self, other) {
            (Self::Found(id), _) | (_, Self::Found(id)) => Self::Found(id),
            (Self::Unreachable { parent, reason }, _) => Self::Unreachable { parent, reason },
            (Self::NotFound, other) => other,
        }
    }
}

impl From<DirectoryError> for Resolution {
    fn from(err: DirectoryError) -> Self {
        Self::Unreachable {
            parent: err.parent(),
            reason: err.to_string(),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found(id) => write!(f, "found {}", id),
            Self::NotFound => write!(f, "not found"),
            Self::Unreachable { parent, .. } => write!(f, "unreachable (folder {})", parent),
        }
    }
}

/// Walks the sector → employee → target subfolder hierarchy.
///
/// Read-only: the resolver only issues listings.
pub struct FolderResolver<'a> {
    directory: &'a dyn FolderDirectory,
    target_label: String,
}

impl<'a> FolderResolver<'a> {
    pub fn new(directory: &'a dyn FolderDirectory, config: &RoutingConfig) -> Self {
        Self::with_target(directory, &config.target_subfolder)
    }

    pub fn with_target(directory: &'a dyn FolderDirectory, target_label: &str) -> Self {
        Self {
            directory,
            target_label: normalize_label(target_label),
        }
    }

    async fn list(&self, parent: FolderId) -> Result<FolderMap, Resolution> {
        self.directory.try_list_folders(parent).await.map_err(|e| {
            warn!(parent = %parent, error = %e, "Folder listing failed");
            Resolution::from(e)
        })
    }

    /// Resolve the target subfolder of `employee_full_name` inside one sector.
    pub async fn resolve_target_folder(
        &self,
        sector_id: FolderId,
        employee_full_name: &str,
    ) -> Resolution {
        let employees = match self.list(sector_id).await {
            Ok(map) => map,
            Err(unreachable) => return unreachable,
        };

        let Some(employee_id) = employees.get(employee_full_name) else {
            debug!(sector = %sector_id, employee = employee_full_name, "Employee folder absent");
            return Resolution::NotFound;
        };

        let subfolders = match self.list(employee_id).await {
            Ok(map) => map,
            Err(unreachable) => return unreachable,
        };

        match subfolders.get(&self.target_label) {
            Some(id) => Resolution::Found(id),
            None => {
                debug!(
                    employee_folder = %employee_id,
                    target = %self.target_label,
                    "Target subfolder absent"
                );
                Resolution::NotFound
            }
        }
    }

    /// Resolve in the suggested sector, then in every sibling sector under
    /// `system_root_id`.
    ///
    /// The suggested sector is never listed a second time.
    pub async fn resolve_with_fallback(
        &self,
        suggested_sector_id: FolderId,
        employee_full_name: &str,
        system_root_id: FolderId,
    ) -> Resolution {
        let primary = self
            .resolve_target_folder(suggested_sector_id, employee_full_name)
            .await;
        if primary.is_found() {
            return primary;
        }

        info!(
            employee = employee_full_name,
            suggested = %suggested_sector_id,
            "Searching other sectors"
        );
        let fallback = self
            .search_sectors(system_root_id, employee_full_name, Some(suggested_sector_id))
            .await;
        primary.merge_absence(fallback)
    }

    /// Try every sector under `system_root_id` in listing order, except `skip`.
    pub async fn search_sectors(
        &self,
        system_root_id: FolderId,
        employee_full_name: &str,
        skip: Option<FolderId>,
    ) -> Resolution {
        let sectors = match self.list(system_root_id).await {
            Ok(map) => map,
            Err(unreachable) => return unreachable,
        };

        let mut outcome = Resolution::NotFound;
        for (sector_name, sector_id) in sectors.iter() {
            if Some(sector_id) == skip {
                continue;
            }

            let attempt = self
                .resolve_target_folder(sector_id, employee_full_name)
                .await;
            if attempt.is_found() {
                info!(
                    employee = employee_full_name,
                    sector = sector_name,
                    "Found employee in sector"
                );
                return attempt;
            }
            outcome = outcome.merge_absence(attempt);
        }
        outcome
    }
}
