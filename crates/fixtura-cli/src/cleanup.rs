//! `fixtura cleanup` - discover and delete leftover synthetic records.

use anyhow::bail;
use clap::Args;

use fixtura_api::ResourceKind;
use fixtura_core::{cleanup, connect, CleanupFilter, DiscoveryConfig, LifecycleConfig, LifecycleManager};

use crate::config::TargetArgs;

/// Arguments for `fixtura cleanup`.
#[derive(Args, Debug)]
pub struct CleanupArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Resource collection to clean.
    #[arg(long, default_value = "contacts")]
    pub resource: ResourceKind,

    /// Only delete records carrying this run id in their name.
    #[arg(long, conflicts_with = "phone_marked")]
    pub match_run: Option<String>,

    /// Select legacy seeded records by their generated phone fields
    /// instead of the name marker.
    #[arg(long)]
    pub phone_marked: bool,

    /// Page size for discovery listing calls.
    #[arg(long, default_value_t = 100)]
    pub page_size: u64,

    /// Maximum pages fetched during discovery.
    #[arg(long, default_value_t = 100)]
    pub page_cap: usize,

    /// Upper bound on in-flight delete requests.
    #[arg(long, default_value_t = 10)]
    pub batch_size: usize,

    /// Delete attempts per record before giving up.
    #[arg(long, default_value_t = 3)]
    pub delete_retries: u32,

    /// Print the report as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: CleanupArgs) -> anyhow::Result<()> {
    let credentials = args.target.credentials();
    let (client, _session) = connect(&args.target.api_base, &credentials).await?;

    let manager = LifecycleManager::with_config(
        client,
        args.resource,
        LifecycleConfig {
            batch_size: args.batch_size,
            max_delete_attempts: args.delete_retries,
            ..LifecycleConfig::default()
        },
    );
    let filter = if args.phone_marked {
        CleanupFilter::PhoneMarked
    } else {
        CleanupFilter::Marker(args.match_run.clone())
    };
    let discovery = DiscoveryConfig {
        page_size: args.page_size,
        page_cap: args.page_cap,
    };

    let report = cleanup(&manager, &filter, &discovery).await?;

    if args.json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!(
            "discovered {}, matched {}, deleted {}, errors {} ({} ms)",
            report.discovered, report.matched, report.deleted, report.errors, report.duration_ms,
        );
        if !report.failed_ids.is_empty() {
            println!("failed ids: {}", report.failed_ids.join(", "));
        }
    }

    if report.errors > 0 {
        bail!(
            "{} record(s) could not be deleted after retries: {}",
            report.errors,
            report.failed_ids.join(", ")
        );
    }
    Ok(())
}
