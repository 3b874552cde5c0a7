//! Subcommand handlers and the helpers they share.

pub mod auth;
pub mod config;
pub mod sync;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;

use brusync_core::{config as config_store, Config, ConfigError};

/// Load, validate and resolve the persisted config.
pub(crate) fn load_config() -> Result<Config> {
    let config = match config_store::load() {
        Ok(config) => config,
        Err(ConfigError::NotFound { path }) => anyhow::bail!(
            "no configuration found at {}; run `brusync config init` first",
            path.display()
        ),
        Err(e) => return Err(e).context("failed to load configuration"),
    };
    config.validate().context("configuration is incomplete")?;
    Ok(config.resolved())
}

/// Multi-threaded runtime for one command.
pub(crate) fn runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}
