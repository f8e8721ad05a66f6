//! `fixtura cycle` - full create/verify/delete/verify-deleted cycle.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Args;

use fixtura_api::ResourceKind;
use fixtura_core::{connect, LifecycleConfig, LifecycleManager, RunId};

use crate::config::TargetArgs;

/// Arguments for `fixtura cycle`.
#[derive(Args, Debug)]
pub struct CycleArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Resource collection to exercise.
    #[arg(long, default_value = "contacts")]
    pub resource: ResourceKind,

    /// Number of records to cycle through.
    #[arg(long, default_value_t = 10)]
    pub count: usize,

    /// Upper bound on in-flight requests.
    #[arg(long, default_value_t = 10)]
    pub batch_size: usize,

    /// Delete attempts per record before giving up.
    #[arg(long, default_value_t = 3)]
    pub delete_retries: u32,

    /// Reuse a specific run id instead of generating one.
    #[arg(long)]
    pub run_id: Option<RunId>,

    /// Print the report as JSON on stdout.
    #[arg(long)]
    pub json: bool,

    /// Also write the report as a JSON line to this file.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

pub async fn run(args: CycleArgs) -> anyhow::Result<()> {
    let credentials = args.target.credentials();
    let (client, _session) = connect(&args.target.api_base, &credentials).await?;

    let run_id = args.run_id.unwrap_or_else(RunId::generate);
    let manager = LifecycleManager::with_config(
        client,
        args.resource,
        LifecycleConfig {
            batch_size: args.batch_size,
            max_delete_attempts: args.delete_retries,
            chunk_pause: Duration::from_millis(500),
            ..LifecycleConfig::default()
        },
    );

    let report = manager.run_cycle(args.count, run_id).await;

    if let Some(path) = &args.report {
        report
            .write_json(path)
            .with_context(|| format!("writing report to {}", path.display()))?;
    }
    if args.json {
        println!("{}", report.to_json()?);
    } else {
        println!(
            "run {}: created {}/{}, verified {}, deleted {}, delete errors {}, \
             still existing {}, took {} ms",
            report.run_id,
            report.created,
            report.requested,
            report.verified_found,
            report.deleted,
            report.delete_errors,
            report.still_existing.len(),
            report.duration_ms,
        );
    }

    if !report.still_existing.is_empty() {
        bail!(
            "data integrity violation: {} record(s) still exist after deletion: {}",
            report.still_existing.len(),
            report.still_existing.join(", ")
        );
    }
    if !report.is_clean() {
        bail!(
            "cycle incomplete: created {}/{}, deleted {}, delete errors {}",
            report.created,
            report.requested,
            report.deleted,
            report.delete_errors
        );
    }
    Ok(())
}
