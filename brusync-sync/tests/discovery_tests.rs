//! Service discovery over real directory trees.
//!
//! Each test builds its own backend in a `TempDir`: no shared state.

use std::fs;
use std::path::{Path, PathBuf};

use brusync_core::{Config, ServiceAcronym};
use brusync_sync::locator::{locate, locate_all, service_exists};
use rstest::rstest;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn backend_with(files: &[&str]) -> TempDir {
    let backend = TempDir::new().expect("tempdir");
    for rel in files {
        let path = backend.path().join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(&path, r#"{"openapi":"3.0.0"}"#).expect("write fixture");
    }
    backend
}

fn config_for(backend: &Path) -> Config {
    let mut config = Config::default();
    config.backend.path = backend.to_path_buf();
    config.workspace.path = PathBuf::from("/unused");
    config
}

fn acronyms(config: &Config) -> Vec<String> {
    locate_all(config)
        .into_iter()
        .map(|d| d.acronym.to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Layout rule
// ---------------------------------------------------------------------------

#[rstest]
#[case("nested", "services/identity/api/iam/iam.swagger.json")]
#[case("deep", "services/a/b/c/api/iam/iam.swagger.json")]
#[case("api_at_top", "services/api/iam/iam.swagger.json")]
fn qualifying_layouts_are_found(#[case] label: &str, #[case] rel: &str) {
    let backend = backend_with(&[rel]);
    let config = config_for(backend.path());

    let found = locate(&config, &ServiceAcronym::from("iam"))
        .unwrap_or_else(|| panic!("[{label}] not found"));
    assert_eq!(found.acronym.as_str(), "iam", "[{label}]");
    assert_eq!(found.spec_path, backend.path().join(rel), "[{label}]");
    assert_eq!(found.relative_path, PathBuf::from(rel), "[{label}]");
    assert!(found.spec_path.is_absolute(), "[{label}]");
}

#[rstest]
#[case("name_mismatch", "services/identity/api/iam/pay.swagger.json")]
#[case("no_api_parent", "services/identity/iam/iam.swagger.json")]
#[case("api_too_high", "services/api/x/iam/iam.swagger.json")]
#[case("wrong_suffix", "services/identity/api/iam/iam.openapi.json")]
#[case("outside_services_dir", "other/api/iam/iam.swagger.json")]
fn non_qualifying_layouts_are_ignored(#[case] label: &str, #[case] rel: &str) {
    let backend = backend_with(&[rel]);
    let config = config_for(backend.path());

    assert!(acronyms(&config).is_empty(), "[{label}] bulk lookup");
    assert!(!service_exists(&config, &ServiceAcronym::from("iam")), "[{label}] single lookup");
}

#[test]
fn sub_resource_specs_next_to_a_service_are_ignored() {
    let backend = backend_with(&[
        "services/identity/api/iam/iam.swagger.json",
        "services/identity/api/iam/users.swagger.json",
        "services/identity/api/iam/examples/iam.swagger.json",
    ]);
    let config = config_for(backend.path());
    assert_eq!(acronyms(&config), vec!["iam"]);
}

// ---------------------------------------------------------------------------
// Ordering, duplicates, failure degradation
// ---------------------------------------------------------------------------

#[test]
fn bulk_lookup_is_sorted_by_acronym() {
    let backend = backend_with(&[
        "services/z-team/api/alpha/alpha.swagger.json",
        "services/a-team/api/pay/pay.swagger.json",
        "services/m-team/api/Ledger/Ledger.swagger.json",
        "services/m-team/api/iam/iam.swagger.json",
    ]);
    let config = config_for(backend.path());
    assert_eq!(acronyms(&config), vec!["alpha", "iam", "Ledger", "pay"]);
}

#[test]
fn duplicate_acronym_resolves_to_first_path() {
    let backend = backend_with(&[
        "services/b/api/iam/iam.swagger.json",
        "services/a/api/iam/iam.swagger.json",
    ]);
    let config = config_for(backend.path());

    let single = locate(&config, &ServiceAcronym::from("iam")).expect("found");
    assert_eq!(
        single.relative_path,
        PathBuf::from("services/a/api/iam/iam.swagger.json")
    );

    let all = locate_all(&config);
    assert_eq!(all.len(), 1, "one descriptor per acronym");
    assert_eq!(all[0].relative_path, single.relative_path);
}

#[test]
fn missing_services_root_degrades_to_empty() {
    let backend = TempDir::new().expect("tempdir");
    let config = config_for(&backend.path().join("does-not-exist"));
    assert!(locate_all(&config).is_empty());
    assert!(locate(&config, &ServiceAcronym::from("iam")).is_none());
}

#[test]
fn custom_services_dir_is_honoured() {
    let backend = backend_with(&["svc/api/iam/iam.swagger.json"]);
    let mut config = config_for(backend.path());
    assert!(acronyms(&config).is_empty());
    config.backend.services_dir = "svc".to_string();
    assert_eq!(acronyms(&config), vec!["iam"]);
}
