//! The external spec-to-collection converter.
//!
//! The converter's exit code is advisory. Callers decide success by looking
//! for the collection file it should have produced, so [`Converter::import`]
//! only fails when the process could not be run at all.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use brusync_core::ServiceAcronym;

use crate::error::SyncError;

/// Program name of the Bruno CLI.
pub const BRUNO_PROGRAM: &str = "bru";

/// Inputs for one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    /// Specification file to convert.
    pub spec_path: PathBuf,
    /// Workspace root; the converter creates `<output_root>/<name>/`.
    pub output_root: PathBuf,
    /// Collection name, equal to the service acronym.
    pub name: ServiceAcronym,
}

/// Captured result of a finished converter process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConverterOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ConverterOutput {
    /// Error text for a run that left no collection: trimmed stderr, else
    /// trimmed stdout, else a generic message.
    pub fn failure_message(&self, name: &ServiceAcronym) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        match self.exit_code {
            Some(code) => {
                format!("converter produced no collection for '{name}' (exit code {code})")
            }
            None => format!("converter produced no collection for '{name}' (terminated by signal)"),
        }
    }
}

/// Turns one specification into a collection directory.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Run to completion and capture the output. Non-zero exit is not an error.
    async fn import(&self, request: &ImportRequest) -> Result<ConverterOutput, SyncError>;
}

/// `bru import openapi -s <spec> -o <root> -n <name>`.
#[derive(Debug, Clone)]
pub struct BrunoCli {
    program: OsString,
}

impl Default for BrunoCli {
    fn default() -> Self {
        Self::with_program(BRUNO_PROGRAM)
    }
}

impl BrunoCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different executable (absolute path or name on `PATH`).
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// `bru --version`, or `None` when the program is missing or fails.
    pub async fn version(&self) -> Option<String> {
        let output = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .ok()?;
        if !output.status.success() {
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl Converter for BrunoCli {
    async fn import(&self, request: &ImportRequest) -> Result<ConverterOutput, SyncError> {
        tracing::debug!(
            "{} import openapi -s {} -o {} -n {}",
            self.program(),
            request.spec_path.display(),
            request.output_root.display(),
            request.name
        );
        let output = Command::new(&self.program)
            .arg("import")
            .arg("openapi")
            .arg("-s")
            .arg(&request.spec_path)
            .arg("-o")
            .arg(&request.output_root)
            .arg("-n")
            .arg(request.name.as_str())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| SyncError::Spawn {
                program: self.program(),
                source,
            })?;

        Ok(ConverterOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

// ---------------------------------------------------------------------------
// Test double
// ---------------------------------------------------------------------------
