//! Persisted JSON configuration.
//!
//! # Storage layout
//!
//! ```text
//! $XDG_CONFIG_HOME/          (or ~/.config/)
//!   brusync/                 (mode 0700)
//!     config.json            (mode 0600)
//! ```
//!
//! # API pattern
//!
//! Every I/O function has two forms:
//! - `fn_at(config_root: &Path, …)`: explicit config root; used in tests with `TempDir`
//! - `fn(…)`: derives the root from the environment, delegates to `_at`
//!
//! The config is loaded once per invocation and passed by reference into every
//! component; nothing here is global.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{io_err, ConfigError};
use crate::paths::resolve_path;

pub const CONFIG_VERSION: &str = "1.0.0";
pub const APP_DIR: &str = "brusync";
pub const CONFIG_FILE: &str = "config.json";

// ---------------------------------------------------------------------------
// 1. Types
// ---------------------------------------------------------------------------

/// Root configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub backend: BackendConfig,
    /// The Bruno workspace the collections are generated into.
    #[serde(default, rename = "bruno")]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    /// Backend monorepo root.
    #[serde(default)]
    pub path: PathBuf,
    /// Directory under `path` that holds the services.
    #[serde(default = "default_services_dir")]
    pub services_dir: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfig {
    /// Workspace root; each service lands in `<path>/<acronym>/`.
    #[serde(default)]
    pub path: PathBuf,
    #[serde(default = "default_workspace_name")]
    pub workspace_name: String,
    #[serde(default = "default_environments")]
    pub environments: Vec<Environment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub name: String,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSettings {
    /// `null` means "auto" (hardware concurrency).
    #[serde(default)]
    pub parallel: Option<usize>,
    #[serde(default = "default_true")]
    pub auto_clean: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    #[serde(default = "default_true")]
    pub inject_bearer: bool,
    #[serde(default = "default_token_variable")]
    pub token_variable: String,
}

/// Configured batch width: a fixed count or "auto".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parallelism {
    Auto,
    Fixed(usize),
}

impl fmt::Display for Parallelism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parallelism::Auto => write!(f, "auto"),
            Parallelism::Fixed(n) => write!(f, "{n}"),
        }
    }
}

// ---------------------------------------------------------------------------
// 2. Defaults
// ---------------------------------------------------------------------------

fn default_version() -> String {
    CONFIG_VERSION.to_string()
}

fn default_services_dir() -> String {
    "services".to_string()
}

fn default_workspace_name() -> String {
    "api-collection".to_string()
}

fn default_token_variable() -> String {
    "authToken".to_string()
}

fn default_true() -> bool {
    true
}

fn default_environments() -> Vec<Environment> {
    [
        ("test", "https://test.example.com"),
        ("uat", "https://uat.example.com"),
        ("live", "https://api.example.com"),
    ]
    .into_iter()
    .map(|(name, base_url)| Environment {
        name: name.to_string(),
        base_url: base_url.to_string(),
    })
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            backend: BackendConfig::default(),
            workspace: WorkspaceConfig::default(),
            sync: SyncSettings::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            services_dir: default_services_dir(),
        }
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            workspace_name: default_workspace_name(),
            environments: default_environments(),
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            parallel: None,
            auto_clean: true,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            inject_bearer: true,
            token_variable: default_token_variable(),
        }
    }
}

// ---------------------------------------------------------------------------
// 3. Accessors
// ---------------------------------------------------------------------------

impl Config {
    /// `<backend.path>/<backend.servicesDir>`: the discovery root.
    pub fn services_root(&self) -> PathBuf {
        self.backend.path.join(&self.backend.services_dir)
    }

    /// Root of the generated workspace.
    pub fn workspace_root(&self) -> &Path {
        &self.workspace.path
    }

    /// `<workspace>/<acronym>/`: private output directory of one service.
    pub fn service_dir(&self, acronym: &str) -> PathBuf {
        self.workspace.path.join(acronym)
    }

    /// A zero count is treated like `null`.
    pub fn parallelism(&self) -> Parallelism {
        match self.sync.parallel {
            Some(n) if n > 0 => Parallelism::Fixed(n),
            _ => Parallelism::Auto,
        }
    }

    /// Copy with `~` and relative backend / workspace paths made absolute.
    pub fn resolved(&self) -> Config {
        let mut config = self.clone();
        config.backend.path = resolve_path(&self.backend.path);
        config.workspace.path = resolve_path(&self.workspace.path);
        config
    }

    /// Every problem found, empty when the config is usable.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.backend.path.as_os_str().is_empty() {
            problems.push("backend path is required".to_string());
        }
        if self.backend.services_dir.trim().is_empty() {
            problems.push("backend services directory is required".to_string());
        }
        if self.workspace.path.as_os_str().is_empty() {
            problems.push("workspace path is required".to_string());
        }
        if self.workspace.workspace_name.trim().is_empty() {
            problems.push("workspace name is required".to_string());
        }
        if self.workspace.environments.is_empty() {
            problems.push("at least one environment is required".to_string());
        }
        if self.auth.inject_bearer && self.auth.token_variable.trim().is_empty() {
            problems.push("token variable is required when bearer injection is on".to_string());
        }
        problems
    }

    /// `Err(ConfigError::Invalid)` carrying every problem from [`Config::problems`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let problems = self.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }

    /// Look up a dotted key such as `backend.path` in the serialized document.
    ///
    /// Keys use the on-disk (camelCase) names. Returns `None` if any segment
    /// is missing.
    pub fn get_path(&self, dotted: &str) -> Option<Value> {
        let mut current = serde_json::to_value(self).ok()?;
        for key in dotted.split('.') {
            current = current.as_object_mut()?.remove(key)?;
        }
        Some(current)
    }
}

// ---------------------------------------------------------------------------
// 4. Paths
// ---------------------------------------------------------------------------

/// `$XDG_CONFIG_HOME`, else `~/.config`.
pub fn config_root() -> Result<PathBuf, ConfigError> {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(xdg));
    }
    dirs::home_dir()
        .map(|home| home.join(".config"))
        .ok_or(ConfigError::HomeNotFound)
}

/// `<config_root>/brusync/config.json`: pure, no I/O.
pub fn config_path_at(config_root: &Path) -> PathBuf {
    config_root.join(APP_DIR).join(CONFIG_FILE)
}

/// `config_path_at` convenience wrapper.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_path_at(&config_root()?))
}

// ---------------------------------------------------------------------------
// 5. Load
// ---------------------------------------------------------------------------

/// Load the config from `<config_root>/brusync/config.json`.
///
/// Returns `ConfigError::NotFound` if absent, `ConfigError::Parse` (with the
/// path) if the JSON is malformed. Missing keys fall back to their defaults.
pub fn load_at(config_root: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(config_root);
    if !path.exists() {
        return Err(ConfigError::NotFound { path });
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_json::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&config_root()?)
}

/// Like [`load_at`] but maps `NotFound` to `Ok(None)`.
pub fn load_optional_at(config_root: &Path) -> Result<Option<Config>, ConfigError> {
    match load_at(config_root) {
        Ok(config) => Ok(Some(config)),
        Err(ConfigError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

// ---------------------------------------------------------------------------
// 6. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save the config.
///
/// Write flow: serialize → `config.json.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(config_root: &Path, config: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path_at(config_root);
    let dir = config_root.join(APP_DIR);
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
        set_dir_permissions(&dir)?;
    }
    let tmp_path = path.with_file_name(format!("{CONFIG_FILE}.tmp"));

    let mut json = serde_json::to_string_pretty(config)?;
    json.push('\n');
    std::fs::write(&tmp_path, json).map_err(|e| io_err(&tmp_path, e))?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path).map_err(|e| io_err(&path, e))?;
    Ok(path)
}

/// `save_at` convenience wrapper.
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    save_at(&config_root()?, config)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
