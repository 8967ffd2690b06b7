//! Routing orchestrator.
//!
//! For each configured share: pick the current period directory, derive the
//! suggested sector, then push every PDF through
//! extract → match → resolve → dispatch → archive. A document that fails any
//! step is recorded and skipped; only setup failures (login, roster, sector
//! listing) abort the run.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use routing::{
    match_fragment, CachedDirectory, FolderDirectory, FolderId, FolderMap, FolderResolver,
    FragmentExtractor, HttpFolderDirectory, Resolution, Roster, RoutingConfig,
};
use tracing::{info, warn};

use crate::archive;
use crate::auth::{self, BearerToken};
use crate::config::{DispatchConfig, ShareConfig};
use crate::flow::FlowKind;
use crate::report::{FileOutcome, RunReport};
use crate::roster_loader;
use crate::signing::{HttpSigningDispatcher, SignatureRequest, SigningDispatcher};
use crate::source;

pub struct Pipeline<'a> {
    roster: &'a Roster,
    resolver: FolderResolver<'a>,
    dispatcher: &'a dyn SigningDispatcher,
    extractor: FragmentExtractor,
    system_root_id: FolderId,
    flow: FlowKind,
    dry_run: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        roster: &'a Roster,
        directory: &'a dyn FolderDirectory,
        dispatcher: &'a dyn SigningDispatcher,
        routing: &RoutingConfig,
        flow: FlowKind,
        dry_run: bool,
    ) -> Self {
        Self {
            roster,
            resolver: FolderResolver::new(directory, routing),
            dispatcher,
            extractor: FragmentExtractor::new(&routing.suffix_markers),
            system_root_id: routing.system_root_id,
            flow,
            dry_run,
        }
    }

    /// Process every document of every share, in order.
    pub async fn run_shares<'s>(
        &self,
        shares: impl IntoIterator<Item = &'s ShareConfig>,
        sectors: &FolderMap,
        sector_prefixes: &[String],
        report: &mut RunReport,
    ) {
        for share in shares {
            let share_label = share.path.display().to_string();

            let scan_dir = match source::latest_period_dir(&share.path) {
                Ok(Some(dir)) => dir,
                Ok(None) if self.flow.scans_base_when_undated() => share.path.clone(),
                Ok(None) => {
                    warn!(share = %share_label, "No dated period directory, skipping share");
                    report.skip_share(&share_label, "no dated period directory");
                    continue;
                }
                Err(e) => {
                    warn!(share = %share_label, error = %e, "Share unreachable, skipping");
                    report.skip_share(&share_label, format!("{e:#}"));
                    continue;
                }
            };

            let sector = source::sector_name(share, sector_prefixes);
            let suggested = sectors.get(&sector);
            if suggested.is_none() {
                warn!(sector = %sector, "Sector not found under root; every sector will be searched");
            }

            let documents = match source::list_documents(&scan_dir) {
                Ok(docs) => docs,
                Err(e) => {
                    warn!(dir = %scan_dir.display(), error = %e, "Failed to list documents");
                    report.skip_share(&share_label, format!("{e:#}"));
                    continue;
                }
            };
            info!(dir = %scan_dir.display(), sector = %sector, documents = documents.len(), "Scanning share");

            for document in &documents {
                let outcome = self.process_document(document, suggested).await;
                let name = document
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                report.record(&share_label, &sector, &name, outcome);
            }
        }
    }

    /// Route one document and, unless this is a dry run, start its signature flow.
    pub async fn process_document(
        &self,
        document: &Path,
        suggested_sector: Option<FolderId>,
    ) -> FileOutcome {
        let file_name = document
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let fragment = self.extractor.extract(&file_name);

        let Some((full_name, employee)) = match_fragment(self.roster, &fragment) else {
            warn!(document = %file_name, fragment = %fragment, "No roster entry matches");
            return FileOutcome::NoRosterMatch { fragment };
        };
        info!(document = %file_name, employee = full_name, "Matched employee");

        let resolution = match suggested_sector {
            Some(sector) => {
                self.resolver
                    .resolve_with_fallback(sector, full_name, self.system_root_id)
                    .await
            }
            None => {
                self.resolver
                    .search_sectors(self.system_root_id, full_name, None)
                    .await
            }
        };

        let folder = match resolution {
            Resolution::Found(folder) => folder,
            Resolution::NotFound => {
                warn!(employee = full_name, "Target folder not found in any sector");
                return FileOutcome::FolderNotFound {
                    employee: full_name.to_string(),
                    unreachable: false,
                };
            }
            Resolution::Unreachable { parent, reason } => {
                warn!(employee = full_name, parent = %parent, reason = %reason, "Target folder not found; a listing failed");
                return FileOutcome::FolderNotFound {
                    employee: full_name.to_string(),
                    unreachable: true,
                };
            }
        };

        if self.dry_run {
            info!(employee = full_name, folder = %folder, "Dry run, not dispatching");
            return FileOutcome::Resolved {
                employee: full_name.to_string(),
                folder,
            };
        }

        let request = SignatureRequest {
            document,
            employee,
            folder,
        };
        if let Err(e) = self.dispatcher.dispatch(request).await {
            warn!(document = %file_name, error = %e, "Signature dispatch failed");
            return FileOutcome::DispatchFailed {
                employee: full_name.to_string(),
                folder,
                error: format!("{e:#}"),
            };
        }
        info!(employee = full_name, phone = %employee.phone, "Signature flow started");

        let archived = match archive::move_to_sent(document) {
            Ok(_) => true,
            Err(e) => {
                warn!(document = %file_name, error = %e, "Failed to archive document");
                false
            }
        };

        FileOutcome::Sent {
            employee: full_name.to_string(),
            folder,
            archived,
        }
    }
}

/// Full run against the live service.
pub async fn run(config: &DispatchConfig, flow: FlowKind, dry_run: bool) -> Result<RunReport> {
    config.validate(flow)?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.api.timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    let token = auth::login(&client, &config.api)
        .await
        .context("Authentication failed")?;

    let roster = roster_loader::load_roster(&config.roster.path)?;
    run_with_roster(config, flow, dry_run, client, token, &roster).await
}

/// Everything after login and roster loading: map sectors, then process shares.
///
/// An empty roster, a failed root listing or a root without sectors aborts
/// before any document is touched.
pub async fn run_with_roster(
    config: &DispatchConfig,
    flow: FlowKind,
    dry_run: bool,
    client: reqwest::Client,
    token: BearerToken,
    roster: &Roster,
) -> Result<RunReport> {
    if roster.is_empty() {
        anyhow::bail!("Roster {} has no employees", config.roster.path.display());
    }

    let http = HttpFolderDirectory::with_client(&config.api.base_url, token.as_str(), client.clone());
    let directory: Box<dyn FolderDirectory> = if config.routing.cache_listings {
        Box::new(CachedDirectory::new(http))
    } else {
        Box::new(http)
    };

    let root = config.routing.system_root_id;
    let sectors = directory
        .try_list_folders(root)
        .await
        .with_context(|| format!("Failed to list sectors under root folder {root}"))?;
    if sectors.is_empty() {
        anyhow::bail!("Root folder {root} has no sector folders");
    }
    info!(
        sectors = ?sectors.iter().map(|(name, _)| name).collect::<Vec<_>>(),
        "Mapped sectors"
    );

    let dispatcher = HttpSigningDispatcher::new(
        &config.api.base_url,
        token,
        client,
        flow,
        config.signing.clone(),
    );
    let pipeline = Pipeline::new(
        roster,
        directory.as_ref(),
        &dispatcher,
        &config.routing,
        flow,
        dry_run,
    );

    let mut report = RunReport::new(flow, dry_run);
    pipeline
        .run_shares(
            config.shares_for(flow),
            &sectors,
            &config.sector_prefixes,
            &mut report,
        )
        .await;
    report.finish();
    Ok(report)
}
