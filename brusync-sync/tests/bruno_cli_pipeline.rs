//! End-to-end pipeline run against a stand-in `bru` executable.
//!
//! The stand-in is a shell script honouring `import openapi -s -o -n`, so the
//! real process plumbing of [`BrunoCli`] is exercised.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use brusync_core::{Config, ServiceAcronym};
use brusync_sync::pipeline::{self, SyncScope};
use brusync_sync::{BrunoCli, SyncOptions};
use tempfile::TempDir;

const FAKE_BRU: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then echo "1.99.0"; exit 0; fi
out="$6"
name="$8"
if [ "$name" = "broken" ]; then
  echo "converting..."
  echo "Error: invalid OpenAPI document" >&2
  exit 0
fi
mkdir -p "$out/$name"
printf 'meta {\n  name: %s\n}\n\nauth {\n  mode: none\n}\n' "$name" > "$out/$name/collection.bru"
printf 'get {\n  url: {{baseUrl}}/health\n}\n' > "$out/$name/Health.bru"
"#;

fn install_fake_bru(dir: &Path) -> PathBuf {
    let path = dir.join("bru");
    fs::write(&path, FAKE_BRU).expect("write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
    path
}

fn write_spec(backend: &Path, name: &str) {
    let path = backend
        .join("services")
        .join("team")
        .join("api")
        .join(name)
        .join(format!("{name}.swagger.json"));
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "{}").unwrap();
}

#[tokio::test]
async fn sync_all_with_script_converter() {
    let tools = TempDir::new().unwrap();
    let backend = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    for name in ["pay", "broken", "iam"] {
        write_spec(backend.path(), name);
    }

    let mut config = Config::default();
    config.backend.path = backend.path().to_path_buf();
    config.workspace.path = workspace.path().join("bruno");
    config.sync.parallel = Some(2);

    let cli = BrunoCli::with_program(install_fake_bru(tools.path()));
    assert_eq!(cli.version().await.as_deref(), Some("1.99.0"));

    let progress = Mutex::new(Vec::new());
    let sink = |svc: &ServiceAcronym, status: &str| {
        progress.lock().unwrap().push(format!("[{svc}] {status}"));
    };

    let report = pipeline::run(
        &config,
        &SyncScope::All,
        &cli,
        SyncOptions::with_progress(&sink),
    )
    .await
    .expect("pipeline");

    let order: Vec<&str> = report.outcomes.iter().map(|o| o.service.as_str()).collect();
    assert_eq!(order, vec!["broken", "iam", "pay"]);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);

    let failure = report.failures().next().expect("one failure");
    assert_eq!(failure.service.as_str(), "broken");
    assert_eq!(
        failure.error.as_deref(),
        Some("Error: invalid OpenAPI document")
    );

    let root = workspace.path().join("bruno");
    assert!(root.join("bruno.json").exists());
    let iam = fs::read_to_string(root.join("iam").join("collection.bru")).unwrap();
    assert!(iam.contains("auth:bearer {\n  token: {{authToken}}\n}"), "{iam}");
    assert!(root.join("pay").join("Health.bru").exists());

    let progress = progress.lock().unwrap();
    assert!(progress.contains(&"[iam] Complete".to_string()));
    assert!(!progress.contains(&"[broken] Complete".to_string()));
}
