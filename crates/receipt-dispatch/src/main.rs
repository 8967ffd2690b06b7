use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use receipt_dispatch::{DispatchConfig, FlowKind};
use tracing::info;

/// Route scanned receipts to employee folders and start their signature flows.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration (overrides RECEIPT_DISPATCH_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Document family to process
    #[arg(long, value_enum, default_value_t = FlowKind::Payroll)]
    flow: FlowKind,

    /// Resolve destinations without submitting or moving anything
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Write the run report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let config = DispatchConfig::load(args.config.as_deref())?;
    info!(
        flow = %args.flow,
        dry_run = args.dry_run,
        service = %config.api.base_url,
        root = %config.routing.system_root_id,
        "Receipt dispatch starting"
    );

    let report = receipt_dispatch::run(&config, args.flow, args.dry_run).await?;

    if let Some(path) = &args.report {
        report.write_json(path)?;
        info!(path = %path.display(), "Wrote run report");
    }

    Ok(())
}
