//! fixtura operator CLI entrypoint.
//!
//! Tooling for managing synthetic test data in a remote invoicing API:
//! - `fixtura seed` - Create and verify a batch of synthetic records
//! - `fixtura cycle` - Full create/verify/delete/verify-deleted cycle
//! - `fixtura cleanup` - Paginated discovery and deletion of leftovers
//! - `fixtura verify` - Existence check for explicit record ids

#![forbid(unsafe_code)]

mod cleanup;
mod config;
mod cycle;
mod seed;
mod verify;

use clap::{Parser, Subcommand};

/// Synthetic test-data lifecycle tooling.
#[derive(Parser)]
#[command(name = "fixtura")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a batch of synthetic records and verify they exist.
    ///
    /// Records are left in place; the printed run id can later be fed
    /// to `fixtura cleanup --match-run` to remove them.
    Seed(seed::SeedArgs),

    /// Run the full create/verify/delete/verify-deleted cycle.
    ///
    /// Exits non-zero unless every record went through the cycle
    /// cleanly (created, found, deleted, and confirmed gone).
    Cycle(cycle::CycleArgs),

    /// Discover synthetic records page by page and delete them.
    ///
    /// Only records matching the selected filter are deleted; real
    /// data is never touched.
    Cleanup(cleanup::CleanupArgs),

    /// Check whether specific record ids exist.
    Verify(verify::VerifyArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays clean for JSON output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Seed(args) => seed::run(args).await,
        Commands::Cycle(args) => cycle::run(args).await,
        Commands::Cleanup(args) => cleanup::run(args).await,
        Commands::Verify(args) => verify::run(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
