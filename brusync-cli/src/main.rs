//! brusync: sync service OpenAPI specs into a Bruno workspace.
//!
//! # Usage
//!
//! ```text
//! brusync sync <acronym|all> [--force] [--bru <program>]
//! brusync config init --backend <path> --workspace <path> [--name ...] [--parallel N] [--no-auth]
//! brusync config show [--path <dotted.key>]
//! brusync config path
//! brusync auth inject|remove <acronym|all>
//! ```

mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{auth::AuthCommand, config::ConfigCommand, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "brusync",
    version,
    about = "Sync Swagger/OpenAPI specs from a backend monorepo into Bruno collections",
    long_about = None,
)]
struct Cli {
    /// Log every sync step (same as RUST_LOG=debug).
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sync one service, or every service with `all`.
    Sync(SyncArgs),

    /// Create and inspect the configuration file.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Switch generated collections between bearer and no auth.
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Config { command } => commands::config::run(command),
        Commands::Auth { command } => commands::auth::run(command),
    }
}

/// Logs go to stderr so stdout stays the command's report.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
