//! Workspace root scaffold.
//!
//! ```text
//! <workspace>/
//!   bruno.json
//!   collection.bru          (root auth: bearer or none)
//!   environments/
//!     <name>.bru            (one per configured environment)
//!   <acronym>/              (written by the converter, one per service)
//! ```
//!
//! Runs once, sequentially, before any service sync. Existing files are
//! never overwritten so hand edits in the workspace survive.

use std::path::{Path, PathBuf};

use serde::Serialize;

use brusync_core::{AuthConfig, Config, Environment, ServiceAcronym};

use crate::error::{io_err, SyncError};
use crate::patcher::{bearer_block, COLLECTION_FILE, NO_AUTH_BLOCK};

pub const BRUNO_JSON: &str = "bruno.json";
pub const ENVIRONMENTS_DIR: &str = "environments";

#[derive(Debug, Serialize)]
struct BrunoJson<'a> {
    version: &'a str,
    name: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    ignore: [&'a str; 2],
}

/// Create the workspace root and its metadata files.
///
/// Returns the files that were created by this call.
pub async fn setup_workspace(config: &Config) -> Result<Vec<PathBuf>, SyncError> {
    let root = config.workspace_root();
    create_dir(root).await?;

    let mut created = Vec::new();

    let bruno_json = BrunoJson {
        version: "1",
        name: &config.workspace.workspace_name,
        kind: "collection",
        ignore: ["node_modules", ".git"],
    };
    let mut json = serde_json::to_string_pretty(&bruno_json)?;
    json.push('\n');
    write_if_absent(&root.join(BRUNO_JSON), &json, &mut created).await?;

    write_if_absent(
        &root.join(COLLECTION_FILE),
        &root_collection(&config.auth),
        &mut created,
    )
    .await?;

    let env_dir = root.join(ENVIRONMENTS_DIR);
    create_dir(&env_dir).await?;
    for env in &config.workspace.environments {
        let path = env_dir.join(format!("{}.bru", env.name));
        write_if_absent(&path, &environment_file(env, &config.auth), &mut created).await?;
    }

    for path in &created {
        tracing::debug!("created {}", path.display());
    }
    Ok(created)
}

/// `true` when `root` already holds a `bruno.json`.
pub async fn workspace_exists(root: &Path) -> bool {
    tokio::fs::try_exists(root.join(BRUNO_JSON))
        .await
        .unwrap_or(false)
}

/// Service directories under `root` that contain a `collection.bru`, sorted.
pub async fn list_collections(root: &Path) -> Result<Vec<ServiceAcronym>, SyncError> {
    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => return Err(io_err(root, e)),
    };
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| io_err(root, e))? {
        let path = entry.path();
        if !path.join(COLLECTION_FILE).is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(ServiceAcronym::from(name));
        }
    }
    names.sort();
    Ok(names)
}

fn root_collection(auth: &AuthConfig) -> String {
    if auth.inject_bearer {
        format!("{}\n", bearer_block(&auth.token_variable))
    } else {
        format!("{NO_AUTH_BLOCK}\n")
    }
}

fn environment_file(env: &Environment, auth: &AuthConfig) -> String {
    format!(
        "vars {{\n  baseUrl: {}\n}}\n\nvars:secret [\n  {}\n]\n",
        env.base_url, auth.token_variable
    )
}

async fn create_dir(path: &Path) -> Result<(), SyncError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| io_err(path, e))
}

async fn write_if_absent(
    path: &Path,
    content: &str,
    created: &mut Vec<PathBuf>,
) -> Result<(), SyncError> {
    if tokio::fs::try_exists(path).await.map_err(|e| io_err(path, e))? {
        return Ok(());
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|e| io_err(path, e))?;
    created.push(path.to_path_buf());
    Ok(())
}
