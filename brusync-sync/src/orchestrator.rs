//! Single-service sync.
//!
//! ## `sync_one`: step protocol
//!
//! 1. Destination is `<workspace>/<acronym>/`.
//! 2. Auto-clean (or `force`): remove the destination; failures ignored.
//! 3. Run the converter and capture its output.
//! 4. Success is decided by `<destination>/collection.bru` existing, not by
//!    the exit code.
//! 5. Missing collection → failure carrying stderr / stdout / generic text.
//! 6. Bearer injection when enabled.
//! 7. Touch every `*.bru` under the destination; failures ignored.
//! 8. Success.
//!
//! Every error is folded into the returned [`SyncOutcome`]; this module never
//! hands one back to the scheduler. Progress notifications are best effort:
//! a sink that panics is logged and the sync carries on.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use filetime::FileTime;
use walkdir::WalkDir;

use brusync_core::{Config, ServiceAcronym, ServiceDescriptor, SyncOutcome};

use crate::converter::{Converter, ImportRequest};
use crate::error::{io_err, SyncError};
use crate::patcher::{self, COLLECTION_FILE};
use crate::progress::{NoopProgress, ProgressSink, Stage};

static NOOP: NoopProgress = NoopProgress;

/// Per-run options shared by every service in a batch.
#[derive(Clone, Copy)]
pub struct SyncOptions<'a> {
    /// Clean the destination even when `sync.autoClean` is off.
    pub force: bool,
    pub progress: &'a dyn ProgressSink,
}

impl Default for SyncOptions<'_> {
    fn default() -> Self {
        Self {
            force: false,
            progress: &NOOP,
        }
    }
}

impl<'a> SyncOptions<'a> {
    pub fn with_progress(progress: &'a dyn ProgressSink) -> Self {
        Self {
            force: false,
            progress,
        }
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Sync one service. Never fails; see the module docs for the steps.
pub async fn sync_one(
    service: &ServiceDescriptor,
    config: &Config,
    converter: &dyn Converter,
    options: SyncOptions<'_>,
) -> SyncOutcome {
    match run_steps(service, config, converter, options).await {
        Ok(()) => {
            tracing::info!("synced {}", service.acronym);
            SyncOutcome::ok(service.acronym.clone())
        }
        Err(e) => {
            tracing::warn!("sync failed for {}: {e}", service.acronym);
            SyncOutcome::failed(service.acronym.clone(), e.to_string())
        }
    }
}

async fn run_steps(
    service: &ServiceDescriptor,
    config: &Config,
    converter: &dyn Converter,
    options: SyncOptions<'_>,
) -> Result<(), SyncError> {
    let report = |stage: Stage| notify(options.progress, &service.acronym, stage);
    let acronym = service.acronym.as_str();

    // Step 1
    report(Stage::Starting);
    let destination = config.service_dir(acronym);

    // Step 2
    if config.sync.auto_clean || options.force {
        report(Stage::Cleaning);
        if let Err(e) = tokio::fs::remove_dir_all(&destination).await {
            tracing::debug!("clean skipped for {}: {e}", destination.display());
        }
    }

    // Step 3
    report(Stage::Importing);
    let request = ImportRequest {
        spec_path: service.spec_path.clone(),
        output_root: config.workspace_root().to_path_buf(),
        name: service.acronym.clone(),
    };
    let output = converter.import(&request).await?;
    if output.exit_code != Some(0) {
        tracing::debug!("converter for {acronym} exited with {:?}", output.exit_code);
    }

    // Steps 4 + 5
    let collection = destination.join(COLLECTION_FILE);
    let produced = tokio::fs::try_exists(&collection)
        .await
        .map_err(|e| io_err(&collection, e))?;
    if !produced {
        return Err(SyncError::ConverterFailed(
            output.failure_message(&service.acronym),
        ));
    }

    // Step 6
    if config.auth.inject_bearer {
        report(Stage::InjectingAuth);
        patcher::inject_bearer_auth(config.workspace_root(), acronym, &config.auth.token_variable)
            .await?;
    }

    // Step 7
    report(Stage::UpdatingTimestamps);
    touch_collection_files(destination).await;

    // Step 8
    report(Stage::Complete);
    Ok(())
}

/// Forward one stage to the sink. A panicking sink is logged and ignored.
fn notify(progress: &dyn ProgressSink, acronym: &ServiceAcronym, stage: Stage) {
    let delivered = catch_unwind(AssertUnwindSafe(|| {
        progress.on_progress(acronym, stage.label());
    }));
    if delivered.is_err() {
        tracing::debug!("progress sink panicked on {acronym} ({stage})");
    }
}

/// Set the mtime of every `*.bru` below `dir` to now. Best effort.
async fn touch_collection_files(dir: PathBuf) {
    let result = tokio::task::spawn_blocking(move || touch_bru_files(&dir)).await;
    if let Err(e) = result {
        tracing::debug!("timestamp update task failed: {e}");
    }
}

fn touch_bru_files(dir: &Path) {
    let now = FileTime::now();
    for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
        let is_bru = entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "bru");
        if !is_bru {
            continue;
        }
        if let Err(e) = filetime::set_file_mtime(entry.path(), now) {
            tracing::debug!("could not touch {}: {e}", entry.path().display());
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
