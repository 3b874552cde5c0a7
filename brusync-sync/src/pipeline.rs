//! Sync pipeline: [`prepare`] then [`Prepared::sync`], or both at once with
//! [`run`]. The CLI calls the two halves so it can report in between.
//!
//! Order: workspace setup → discovery → batch sync. Setup and scope
//! resolution are the only steps that can abort a run; after that every
//! service yields an outcome.

use std::fmt;
use std::path::PathBuf;

use brusync_core::{Config, ServiceAcronym, ServiceDescriptor, SyncOutcome};

use crate::batch::sync_many;
use crate::converter::Converter;
use crate::error::SyncError;
use crate::locator;
use crate::orchestrator::SyncOptions;
use crate::workspace::setup_workspace;

/// Scope for a sync pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncScope {
    /// Every discovered service.
    All,
    /// A single service by acronym.
    Service(ServiceAcronym),
}

impl SyncScope {
    /// `"all"` selects every service; anything else is an acronym.
    pub fn parse(arg: &str) -> Self {
        if arg == "all" {
            SyncScope::All
        } else {
            SyncScope::Service(ServiceAcronym::from(arg))
        }
    }
}

impl fmt::Display for SyncScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncScope::All => write!(f, "all"),
            SyncScope::Service(acronym) => acronym.fmt(f),
        }
    }
}

/// Workspace ready, services resolved; nothing synced yet.
#[derive(Debug)]
pub struct Prepared {
    /// Workspace files created by the setup step.
    pub created: Vec<PathBuf>,
    pub services: Vec<ServiceDescriptor>,
}

impl Prepared {
    /// Sync every resolved service. Never fails: each service yields one
    /// outcome.
    pub async fn sync(
        self,
        config: &Config,
        converter: &dyn Converter,
        options: SyncOptions<'_>,
    ) -> SyncReport {
        let outcomes = sync_many(&self.services, config, converter, options).await;
        SyncReport {
            services: self.services,
            outcomes,
        }
    }
}

/// Outcome of a whole run.
#[derive(Debug)]
pub struct SyncReport {
    pub services: Vec<ServiceDescriptor>,
    pub outcomes: Vec<SyncOutcome>,
}

impl SyncReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &SyncOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Set up the workspace and resolve `scope` into descriptors.
///
/// A single-service scope with no matching specification is
/// `SyncError::ServiceNotFound`. An `All` scope may resolve to no services.
pub async fn prepare(config: &Config, scope: &SyncScope) -> Result<Prepared, SyncError> {
    let created = setup_workspace(config).await?;
    let services = discover(config, scope).await?;
    tracing::debug!("scope '{scope}' resolved to {} service(s)", services.len());
    Ok(Prepared { created, services })
}

/// Run the whole pipeline for a scope: [`prepare`] then [`Prepared::sync`].
pub async fn run(
    config: &Config,
    scope: &SyncScope,
    converter: &dyn Converter,
    options: SyncOptions<'_>,
) -> Result<SyncReport, SyncError> {
    let prepared = prepare(config, scope).await?;
    Ok(prepared.sync(config, converter, options).await)
}

/// The directory walk runs on the blocking pool.
async fn discover(
    config: &Config,
    scope: &SyncScope,
) -> Result<Vec<ServiceDescriptor>, SyncError> {
    let owned = config.clone();
    let wanted = scope.clone();
    let found = tokio::task::spawn_blocking(move || match &wanted {
        SyncScope::All => locator::locate_all(&owned),
        SyncScope::Service(acronym) => locator::locate(&owned, acronym).into_iter().collect(),
    })
    .await?;

    match scope {
        SyncScope::Service(acronym) if found.is_empty() => Err(SyncError::ServiceNotFound {
            acronym: acronym.clone(),
            root: config.services_root(),
        }),
        _ => Ok(found),
    }
}
