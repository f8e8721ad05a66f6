//! `fixtura seed` - create synthetic records and verify they exist.

use std::time::Duration;

use anyhow::bail;
use clap::Args;
use tracing::info;

use fixtura_api::ResourceKind;
use fixtura_core::{
    connect, payloads, ExistOutcome, LifecycleConfig, LifecycleManager, RunId,
};

use crate::config::TargetArgs;

/// Arguments for `fixtura seed`.
#[derive(Args, Debug)]
pub struct SeedArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Resource collection to seed.
    #[arg(long, default_value = "contacts")]
    pub resource: ResourceKind,

    /// Number of records to create.
    #[arg(long, default_value_t = 10)]
    pub count: usize,

    /// Upper bound on in-flight requests.
    #[arg(long, default_value_t = 10)]
    pub batch_size: usize,

    /// Reuse a specific run id instead of generating one.
    #[arg(long)]
    pub run_id: Option<RunId>,

    /// Print the summary as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: SeedArgs) -> anyhow::Result<()> {
    let credentials = args.target.credentials();
    let (client, _session) = connect(&args.target.api_base, &credentials).await?;

    let run_id = args.run_id.unwrap_or_else(RunId::generate);
    let manager = LifecycleManager::with_config(
        client,
        args.resource,
        LifecycleConfig {
            batch_size: args.batch_size,
            chunk_pause: Duration::from_millis(500),
            ..LifecycleConfig::default()
        },
    );

    info!(run = %run_id, resource = %args.resource, count = args.count, "seeding");
    let create = manager
        .create_batch(payloads(args.resource, args.count, run_id))
        .await;
    let checks = manager.verify_exist(&create.handles).await;
    let found = checks
        .iter()
        .filter(|check| check.outcome == ExistOutcome::Found)
        .count();

    if args.json {
        let summary = serde_json::json!({
            "run_id": run_id.to_string(),
            "resource": args.resource.to_string(),
            "requested": args.count,
            "created": create.succeeded(),
            "failed": create.failed(),
            "verified_found": found,
        });
        println!("{summary}");
    } else {
        println!(
            "run {run_id}: created {}/{} {} ({} verified present)",
            create.succeeded(),
            args.count,
            args.resource,
            found,
        );
        println!("cleanup later with: fixtura cleanup --resource {} --match-run {run_id}", args.resource);
    }

    if create.failed() > 0 {
        bail!(
            "created {} of {} records ({} failures)",
            create.succeeded(),
            args.count,
            create.failed()
        );
    }
    if found < create.succeeded() {
        bail!(
            "only {found} of {} created records were verified present",
            create.succeeded()
        );
    }
    Ok(())
}
