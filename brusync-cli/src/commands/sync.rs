//! `brusync sync`: regenerate collections for one service or all of them.

use std::fmt::Display;
use std::io::Write;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use brusync_core::{Config, ServiceAcronym, SyncOutcome};
use brusync_sync::{
    pipeline::{self, SyncReport, SyncScope},
    BrunoCli, SyncError, SyncOptions,
};

use super::{load_config, runtime};

/// Arguments for `brusync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Service acronym, or `all` for every discovered service.
    pub service: String,

    /// Wipe each service's collection before importing, even with autoClean off.
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Converter executable.
    #[arg(long, value_name = "PROGRAM", default_value = "bru")]
    pub bru: String,
}

impl SyncArgs {
    pub fn run(self) -> Result<ExitCode> {
        let config = load_config()?;
        runtime()?.block_on(self.execute(&config))
    }

    async fn execute(&self, config: &Config) -> Result<ExitCode> {
        let scope = SyncScope::parse(&self.service);
        match &scope {
            SyncScope::All => say("Syncing all services"),
            SyncScope::Service(acronym) => say(format!("Syncing service: {acronym}")),
        }

        let prepared = match pipeline::prepare(config, &scope).await {
            Ok(prepared) => prepared,
            Err(SyncError::ServiceNotFound { acronym, root }) => {
                eprintln!(
                    "{} service '{acronym}' not found under {}",
                    "✗".red().bold(),
                    root.display()
                );
                return Ok(ExitCode::FAILURE);
            }
            Err(e) => return Err(e.into()),
        };

        if !prepared.created.is_empty() {
            say(format!(
                "Workspace ready at {} ({} file(s) created)",
                config.workspace_root().display(),
                prepared.created.len()
            ));
        }

        match scope {
            SyncScope::All if prepared.services.is_empty() => {
                say(format!("No services found under {}", config.services_root().display()));
                return Ok(ExitCode::SUCCESS);
            }
            SyncScope::All => {
                say(format!("Found {} service(s):", prepared.services.len()));
                for service in &prepared.services {
                    say(format!("  - {}", service.acronym));
                }
            }
            SyncScope::Service(_) => {
                for service in &prepared.services {
                    say(format!("Found: {}", service.relative_path.display()));
                }
            }
        }
        say(format!("Syncing with {} parallel job(s)...", config.parallelism()));

        let progress = |svc: &ServiceAcronym, status: &str| say(format!("  [{svc}] {status}"));
        let converter = BrunoCli::with_program(&self.bru);
        let options = SyncOptions::with_progress(&progress).force(self.force);
        let report = prepared.sync(config, &converter, options).await;

        print_summary(&report);
        Ok(if report.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }
}

/// One stdout line. A closed stdout (`brusync sync all | head`) must not
/// abort a half-finished sync, so write errors are dropped.
fn say(line: impl Display) {
    let _ = writeln!(std::io::stdout().lock(), "{line}");
}

fn print_summary(report: &SyncReport) {
    say("");
    for outcome in &report.outcomes {
        say(outcome_line(outcome));
    }
    say(format!(
        "Sync complete: {} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    ));
}

fn outcome_line(outcome: &SyncOutcome) -> String {
    match &outcome.error {
        None => format!("{} {}", "✓".green().bold(), outcome.service),
        Some(error) => format!("{} {}: {error}", "✗".red().bold(), outcome.service),
    }
}
