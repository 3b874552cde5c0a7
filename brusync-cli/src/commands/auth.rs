//! `brusync auth inject|remove`: toggle bearer auth on generated collections.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use brusync_core::{Config, ServiceAcronym};
use brusync_sync::{patcher, workspace, PatchResult};

use super::{load_config, runtime};

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Replace `auth { mode: none }` with the bearer token template.
    Inject(AuthArgs),
    /// Replace any auth block with `auth { mode: none }`.
    Remove(AuthArgs),
}

#[derive(Args, Debug)]
pub struct AuthArgs {
    /// Collection name, or `all` for every collection in the workspace.
    pub service: String,
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Inject,
    Remove,
}

pub fn run(cmd: AuthCommand) -> Result<ExitCode> {
    let config = load_config()?;
    let (action, args) = match cmd {
        AuthCommand::Inject(args) => (Action::Inject, args),
        AuthCommand::Remove(args) => (Action::Remove, args),
    };
    runtime()?.block_on(apply(&config, action, &args.service))
}

async fn apply(config: &Config, action: Action, service: &str) -> Result<ExitCode> {
    let root = config.workspace_root();
    let targets = if service == "all" {
        workspace::list_collections(root)
            .await
            .with_context(|| format!("failed to list collections in {}", root.display()))?
    } else {
        vec![ServiceAcronym::from(service)]
    };

    if targets.is_empty() {
        println!("No collections found in {}", root.display());
        return Ok(ExitCode::SUCCESS);
    }

    let mut missing = 0;
    for acronym in &targets {
        let result = match action {
            Action::Inject => {
                patcher::inject_bearer_auth(root, acronym.as_str(), &config.auth.token_variable)
                    .await
            }
            Action::Remove => patcher::remove_auth(root, acronym.as_str()).await,
        }
        .with_context(|| format!("failed to patch collection '{acronym}'"))?;

        match result {
            PatchResult::Patched => println!("{} {acronym}: updated", "✓".green().bold()),
            PatchResult::Unchanged => println!("  {acronym}: already up to date"),
            PatchResult::Missing => {
                missing += 1;
                eprintln!(
                    "{} {acronym}: no collection at {}",
                    "✗".red().bold(),
                    patcher::collection_path(root, acronym.as_str()).display()
                );
            }
        }
    }

    Ok(if missing == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
