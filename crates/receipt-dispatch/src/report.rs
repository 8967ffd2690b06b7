//! Per-run outcome report.
//!
//! Every document the orchestrator touches gets one `FileRecord`. The report
//! is logged as a summary at the end of the run and, when requested, written
//! as pretty JSON for later inspection.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use routing::FolderId;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::flow::FlowKind;

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Signature flow started; `archived` is false when the move to ENVIADOS failed.
    Sent {
        employee: String,
        folder: FolderId,
        archived: bool,
    },
    /// Resolved but not submitted (`--dry-run`).
    Resolved { employee: String, folder: FolderId },
    /// No roster entry contains every token of the fragment.
    NoRosterMatch { fragment: String },
    /// No sector holds the employee's target subfolder. `unreachable` is set
    /// when a folder listing failed during the search.
    FolderNotFound { employee: String, unreachable: bool },
    /// The service refused the signature flow or could not be reached.
    DispatchFailed {
        employee: String,
        folder: FolderId,
        error: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Share path the document was scanned from.
    pub share: String,
    /// Sector suggested by the share.
    pub sector: String,
    pub document: String,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTotals {
    pub sent: usize,
    pub resolved: usize,
    pub no_roster_match: usize,
    pub folder_not_found: usize,
    pub dispatch_failed: usize,
    pub archive_failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub flow: FlowKind,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Shares that were skipped entirely, with the reason.
    pub skipped_shares: Vec<(String, String)>,
    pub files: Vec<FileRecord>,
}

impl RunReport {
    pub fn new(flow: FlowKind, dry_run: bool) -> Self {
        Self {
            flow,
            dry_run,
            started_at: Utc::now(),
            finished_at: None,
            skipped_shares: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn record(&mut self, share: &str, sector: &str, document: &str, outcome: FileOutcome) {
        self.files.push(FileRecord {
            share: share.to_string(),
            sector: sector.to_string(),
            document: document.to_string(),
            outcome,
        });
    }

    pub fn skip_share(&mut self, share: &str, reason: impl Into<String>) {
        self.skipped_shares.push((share.to_string(), reason.into()));
    }

    pub fn totals(&self) -> RunTotals {
        let mut totals = RunTotals::default();
        for file in &self.files {
            match &file.outcome {
                FileOutcome::Sent { archived, .. } => {
                    totals.sent += 1;
                    if !archived {
                        totals.archive_failed += 1;
                    }
                }
                FileOutcome::Resolved { .. } => totals.resolved += 1,
                FileOutcome::NoRosterMatch { .. } => totals.no_roster_match += 1,
                FileOutcome::FolderNotFound { .. } => totals.folder_not_found += 1,
                FileOutcome::DispatchFailed { .. } => totals.dispatch_failed += 1,
            }
        }
        totals
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
        let t = self.totals();
        info!(
            flow = %self.flow,
            documents = self.files.len(),
            sent = t.sent,
            resolved = t.resolved,
            no_roster_match = t.no_roster_match,
            folder_not_found = t.folder_not_found,
            dispatch_failed = t.dispatch_failed,
            archive_failed = t.archive_failed,
            skipped_shares = self.skipped_shares.len(),
            "Run finished"
        );
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize run report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write run report {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RunReport {
        let mut report = RunReport::new(FlowKind::Payroll, false);
        report.record(
            "/fs/FOLHA MATRIZ",
            "MATRIZ",
            "ANA_LIMA.pdf",
            FileOutcome::Sent {
                employee: "ANA LIMA".into(),
                folder: FolderId(99),
                archived: false,
            },
        );
        report.record(
            "/fs/DISK - MATRIZ",
            "MATRIZ",
            "XX.pdf",
            FileOutcome::NoRosterMatch {
                fragment: "XX".into(),
            },
        );
        report.record(
            "/fs/TELE",
            "TELE",
            "BRUNO_DIAS.pdf",
            FileOutcome::FolderNotFound {
                employee: "BRUNO DIAS".into(),
                unreachable: true,
            },
        );
        report
    }

    #[test]
    fn test_totals() {
        let totals = sample().totals();
        assert_eq!(
            totals,
            RunTotals {
                sent: 1,
                no_roster_match: 1,
                folder_not_found: 1,
                archive_failed: 1,
                ..RunTotals::default()
            }
        );
    }

    #[test]
    fn test_json_record_is_flat() {
        let mut report = sample();
        report.finish();
        let value = serde_json::to_value(&report).unwrap();
        let first = &value["files"][0];
        assert_eq!(first["status"], "sent");
        assert_eq!(first["folder"], 99);
        assert_eq!(first["document"], "ANA_LIMA.pdf");
        assert_eq!(first["share"], "/fs/FOLHA MATRIZ");
        assert_eq!(first["sector"], "MATRIZ");
        assert_eq!(value["files"][1]["share"], "/fs/DISK - MATRIZ");
        assert!(value["finished_at"].is_string());
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        sample().write_json(&path).unwrap();
        let back: RunReport = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.files.len(), 3);
    }
}
