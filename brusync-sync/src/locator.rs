//! Service discovery.
//!
//! A file is a service specification iff it sits at
//!
//! ```text
//! <backend>/<servicesDir>/**/api/<X>/<X>.swagger.json
//! ```
//!
//! i.e. its name minus the suffix equals its parent directory's name and the
//! grandparent directory is literally `api`. Spec files for sub-resources or
//! examples in neighbouring directories never qualify.
//!
//! Traversal errors are logged and skipped: lookups degrade to "not found" or
//! an empty list instead of failing.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use brusync_core::{Config, ServiceAcronym, ServiceDescriptor};

/// File name suffix of a service specification.
pub const SPEC_SUFFIX: &str = ".swagger.json";

/// Directory name that must hold every service directory.
pub const API_DIR: &str = "api";

/// Find the specification of one service.
///
/// When several files match, the first in sorted path order wins and the
/// others are reported with a warning.
pub fn locate(config: &Config, acronym: &ServiceAcronym) -> Option<ServiceDescriptor> {
    let file_name = format!("{acronym}{SPEC_SUFFIX}");
    let mut matches: Vec<ServiceDescriptor> = scan(config, |name| name == file_name)
        .into_iter()
        .filter(|d| &d.acronym == acronym)
        .collect();

    if matches.len() > 1 {
        let ignored: Vec<String> = matches[1..]
            .iter()
            .map(|d| d.relative_path.display().to_string())
            .collect();
        tracing::warn!(
            "{} specifications match '{acronym}'; using {} and ignoring {}",
            matches.len(),
            matches[0].relative_path.display(),
            ignored.join(", ")
        );
    }
    if matches.is_empty() {
        tracing::debug!(
            "no specification for '{acronym}' under {}",
            config.services_root().display()
        );
        return None;
    }
    Some(matches.swap_remove(0))
}

/// Find every service specification, sorted by acronym.
///
/// An acronym that appears at several locations is kept once (first in path
/// order) so that no two syncs in a run share an output directory.
pub fn locate_all(config: &Config) -> Vec<ServiceDescriptor> {
    let mut seen = HashSet::new();
    let mut services: Vec<ServiceDescriptor> = scan(config, |name| name.ends_with(SPEC_SUFFIX))
        .into_iter()
        .filter(|d| {
            let fresh = seen.insert(d.acronym.clone());
            if !fresh {
                tracing::warn!(
                    "duplicate specification for '{}' ignored: {}",
                    d.acronym,
                    d.relative_path.display()
                );
            }
            fresh
        })
        .collect();
    services.sort_by(|a, b| a.acronym.cmp(&b.acronym));
    services
}

/// `true` when [`locate`] finds the service.
pub fn service_exists(config: &Config, acronym: &ServiceAcronym) -> bool {
    locate(config, acronym).is_some()
}

/// Build a descriptor if `spec_path` follows the `api/<X>/<X>.swagger.json`
/// layout. Pure: no filesystem access.
pub fn descriptor_for(backend_root: &Path, spec_path: &Path) -> Option<ServiceDescriptor> {
    let file_name = spec_path.file_name()?.to_str()?;
    let acronym = file_name.strip_suffix(SPEC_SUFFIX)?;
    if acronym.is_empty() {
        return None;
    }
    let parent = spec_path.parent()?;
    let grandparent = parent.parent()?;
    if parent.file_name()?.to_str()? != acronym || grandparent.file_name()?.to_str()? != API_DIR {
        return None;
    }
    let relative_path = spec_path
        .strip_prefix(backend_root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| spec_path.to_path_buf());
    Some(ServiceDescriptor {
        acronym: ServiceAcronym::from(acronym),
        spec_path: spec_path.to_path_buf(),
        relative_path,
    })
}

/// Walk the services root in sorted order and keep qualifying files whose
/// name passes `name_filter`.
fn scan(config: &Config, name_filter: impl Fn(&str) -> bool) -> Vec<ServiceDescriptor> {
    let root: PathBuf = config.services_root();
    let mut found = Vec::new();
    for entry in WalkDir::new(&root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("skipping unreadable path during discovery: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !name_filter(name) {
            continue;
        }
        if let Some(descriptor) = descriptor_for(&config.backend.path, entry.path()) {
            found.push(descriptor);
        }
    }
    found
}
