//! `fixtura verify` - existence check for explicit record ids.

use anyhow::bail;
use clap::Args;

use fixtura_api::ResourceKind;
use fixtura_core::connect;

use crate::config::TargetArgs;

/// Arguments for `fixtura verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Resource collection the ids belong to.
    #[arg(long, default_value = "contacts")]
    pub resource: ResourceKind,

    /// Record ids to check.
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Print results as JSON lines on stdout.
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: VerifyArgs) -> anyhow::Result<()> {
    let credentials = args.target.credentials();
    let (client, _session) = connect(&args.target.api_base, &credentials).await?;

    let mut inconclusive = 0_usize;
    for id in &args.ids {
        let line = match client.get(args.resource, id).await {
            Ok(Some(_)) => (id.as_str(), "found", None),
            Ok(None) => (id.as_str(), "not-found", None),
            Err(err) => {
                inconclusive += 1;
                (id.as_str(), "inconclusive", Some(err.to_string()))
            }
        };
        if args.json {
            println!(
                "{}",
                serde_json::json!({"id": line.0, "status": line.1, "error": line.2})
            );
        } else if let Some(error) = line.2 {
            println!("{}: {} ({error})", line.0, line.1);
        } else {
            println!("{}: {}", line.0, line.1);
        }
    }

    if inconclusive > 0 {
        bail!("{inconclusive} check(s) were inconclusive");
    }
    Ok(())
}
