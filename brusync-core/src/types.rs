//! Domain types for brusync.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Short unique identifier of a service; also its directory and file name key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceAcronym(pub String);

impl ServiceAcronym {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceAcronym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ServiceAcronym {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ServiceAcronym {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Case-insensitive first, exact compare as tie-breaker, so `Auth` sorts
/// next to `auth` instead of before every lowercase name.
impl Ord for ServiceAcronym {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .to_lowercase()
            .cmp(&other.0.to_lowercase())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for ServiceAcronym {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A discovered service specification.
///
/// Built fresh by every discovery call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDescriptor {
    pub acronym: ServiceAcronym,
    /// Absolute path to `<acronym>.swagger.json`.
    pub spec_path: PathBuf,
    /// `spec_path` relative to the backend root; display only.
    pub relative_path: PathBuf,
}

/// Result of one sync attempt for one service.
///
/// `error` is `Some` and non-empty exactly when `success` is false. Use
/// [`SyncOutcome::ok`] / [`SyncOutcome::failed`] to keep that invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub service: ServiceAcronym,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncOutcome {
    pub fn ok(service: ServiceAcronym) -> Self {
        Self {
            service,
            success: true,
            error: None,
        }
    }

    pub fn failed(service: ServiceAcronym, error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.trim().is_empty() {
            error = format!("sync failed for '{service}'");
        }
        Self {
            service,
            success: false,
            error: Some(error),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
