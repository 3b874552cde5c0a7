//! brusync core library: domain types, configuration store, path helpers, errors.
//!
//! Public API surface:
//! - [`types`]: newtypes, service descriptors, sync outcomes
//! - [`config`]: typed configuration + load / save / validate
//! - [`paths`]: `~` expansion and absolutization of user-supplied paths
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod paths;
pub mod types;

pub use config::{
    AuthConfig, BackendConfig, Config, Environment, Parallelism, SyncSettings, WorkspaceConfig,
};
pub use error::ConfigError;
pub use types::{ServiceAcronym, ServiceDescriptor, SyncOutcome};
