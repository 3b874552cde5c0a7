//! `brusync config init|show|path`

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde_json::Value;

use brusync_core::{config as config_store, paths::resolve_path, Config};
use brusync_sync::BrunoCli;

use super::runtime;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a new configuration file from flags.
    Init(InitArgs),
    /// Print the configuration, or one value with `--path`.
    Show(ShowArgs),
    /// Print where the configuration file lives.
    Path,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Backend monorepo root (`~` and relative paths are expanded).
    #[arg(long, value_name = "PATH")]
    pub backend: PathBuf,

    /// Bruno workspace directory to generate collections into.
    #[arg(long, value_name = "PATH")]
    pub workspace: PathBuf,

    /// Workspace name written to bruno.json.
    #[arg(long)]
    pub name: Option<String>,

    /// Directory under the backend root that holds the services.
    #[arg(long)]
    pub services_dir: Option<String>,

    /// Services synced at once; omit for one per CPU.
    #[arg(long, value_name = "N")]
    pub parallel: Option<usize>,

    /// Keep existing collection files instead of wiping them before import.
    #[arg(long)]
    pub no_clean: bool,

    /// Leave collections without bearer authentication.
    #[arg(long)]
    pub no_auth: bool,

    /// Environment variable holding the bearer token.
    #[arg(long, value_name = "NAME")]
    pub token_variable: Option<String>,

    /// Overwrite an existing configuration.
    #[arg(long)]
    pub force: bool,

    /// Converter executable to probe.
    #[arg(long, value_name = "PROGRAM", default_value = "bru")]
    pub bru: String,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Dotted key such as `backend.path` or `sync.parallel`.
    #[arg(long, short = 'p', value_name = "KEY")]
    pub path: Option<String>,
}

pub fn run(cmd: ConfigCommand) -> Result<ExitCode> {
    match cmd {
        ConfigCommand::Init(args) => init(args),
        ConfigCommand::Show(args) => show(args),
        ConfigCommand::Path => {
            println!("{}", config_store::config_path()?.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init(args: InitArgs) -> Result<ExitCode> {
    let root = config_store::config_root()?;
    if !args.force && config_store::load_optional_at(&root)?.is_some() {
        bail!(
            "configuration already exists at {}; pass --force to overwrite",
            config_store::config_path_at(&root).display()
        );
    }

    let config = build_config(&args);
    config.validate()?;

    let services_root = config.services_root();
    if !config.backend.path.is_dir() {
        bail!("backend path does not exist: {}", config.backend.path.display());
    }
    if !services_root.is_dir() {
        bail!("services directory not found at: {}", services_root.display());
    }

    let converter = BrunoCli::with_program(&args.bru);
    match runtime()?.block_on(converter.version()) {
        Some(version) => println!("✓ Bruno CLI found ({version})"),
        None => eprintln!(
            "warning: '{}' not found or not runnable; install it with `npm i -g @usebruno/cli`",
            converter.program()
        ),
    }

    let path = config_store::save_at(&root, &config)
        .with_context(|| format!("failed to save configuration under {}", root.display()))?;
    println!("✓ Configuration saved to {}", path.display());
    println!("  Run: brusync sync all");
    Ok(ExitCode::SUCCESS)
}

fn build_config(args: &InitArgs) -> Config {
    let mut config = Config::default();
    config.backend.path = resolve_path(&args.backend);
    config.workspace.path = resolve_path(&args.workspace);
    if let Some(dir) = &args.services_dir {
        config.backend.services_dir = dir.clone();
    }
    if let Some(name) = &args.name {
        config.workspace.workspace_name = name.clone();
    }
    config.sync.parallel = args.parallel.filter(|n| *n > 0);
    config.sync.auto_clean = !args.no_clean;
    config.auth.inject_bearer = !args.no_auth;
    if let Some(var) = &args.token_variable {
        config.auth.token_variable = var.clone();
    }
    config
}

fn show(args: ShowArgs) -> Result<ExitCode> {
    let path = config_store::config_path()?;
    let config = config_store::load()
        .with_context(|| format!("no readable configuration at {}", path.display()))?;

    if let Some(key) = args.path {
        let Some(value) = config.get_path(&key) else {
            eprintln!("config path '{key}' not found");
            return Ok(ExitCode::FAILURE);
        };
        match value {
            Value::String(s) => println!("{s}"),
            other => println!("{}", serde_json::to_string_pretty(&other)?),
        }
        return Ok(ExitCode::SUCCESS);
    }

    println!("Config file: {}", path.display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(ExitCode::SUCCESS)
}
