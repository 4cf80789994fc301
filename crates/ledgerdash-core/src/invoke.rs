//! Running the ledger executable
//!
//! The process boundary is the [`ProcessRunner`] trait so the query layer and
//! the cache can be driven by a fake in tests. [`SystemRunner`] is the real
//! implementation on top of `tokio::process`.

use async_trait::async_trait;
use ledgerdash_config::LedgerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;

use crate::error::{CoreError, CoreResult};

/// Which executable to run and which journal it reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSettings {
    pub exe_path: PathBuf,
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

impl LedgerSettings {
    pub fn new(exe_path: impl Into<PathBuf>, file_path: Option<PathBuf>) -> Self {
        Self {
            exe_path: exe_path.into(),
            file_path,
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.exe_path.as_os_str().is_empty() {
            return Err(CoreError::ConfigError {
                message: "ledger executable path must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

impl From<&LedgerConfig> for LedgerSettings {
    fn from(config: &LedgerConfig) -> Self {
        Self::new(config.exe_path.clone(), config.file_path.clone())
    }
}

/// One ledger command: executable, optional `-f <file>`, then arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerInvocation {
    pub exe_path: PathBuf,
    pub file_path: Option<PathBuf>,
    pub args: Vec<String>,
}

impl LedgerInvocation {
    pub fn new<I, S>(settings: &LedgerSettings, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exe_path: settings.exe_path.clone(),
            file_path: settings.file_path.clone(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Arguments handed to the executable, file flag first
    pub fn arguments(&self) -> Vec<String> {
        let mut arguments = Vec::with_capacity(self.args.len() + 2);
        if let Some(file) = &self.file_path {
            arguments.push("-f".to_string());
            arguments.push(file.to_string_lossy().to_string());
        }
        arguments.extend(self.args.iter().cloned());
        arguments
    }

    /// Space-joined command line, for logs and error reports
    pub fn command_line(&self) -> String {
        std::iter::once(self.exe_path.to_string_lossy().to_string())
            .chain(self.arguments())
            .map(|part| quote(&part))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote(part: &str) -> String {
    if part.is_empty() || part.chars().any(char::is_whitespace) {
        format!("'{}'", part.replace('\'', r"'\''"))
    } else {
        part.to_string()
    }
}

/// Runner reference type
pub type RunnerRef = Arc<dyn ProcessRunner>;

/// Runs a ledger command and returns its standard output.
///
/// Implementations fail with [`CoreError::ProcessError`] when the process
/// cannot start, exits non-zero, or writes anything to stderr.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, invocation: &LedgerInvocation) -> CoreResult<String>;
}

/// Spawns the executable directly, without a shell
#[derive(Debug, Default, Clone)]
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, invocation: &LedgerInvocation) -> CoreResult<String> {
        let command = invocation.command_line();
        log::debug!("Invoking ledger: {}", command);

        let output = Command::new(&invocation.exe_path)
            .args(invocation.arguments())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                log::error!("Failed to start {}: {}", invocation.exe_path.display(), e);
                CoreError::ProcessError {
                    command: command.clone(),
                    message: format!("Failed to start {}: {}", invocation.exe_path.display(), e),
                }
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let message = if stderr.trim().is_empty() {
                format!("Command failed with {}: {}", output.status, command)
            } else {
                stderr.trim_end().to_string()
            };
            log::warn!("ledger failed ({}): {}", output.status, message);
            return Err(CoreError::ProcessError { command, message });
        }

        // Warnings count as failures too
        if !stderr.is_empty() {
            log::warn!("ledger wrote to stderr: {}", stderr.trim_end());
            return Err(CoreError::ProcessError {
                command,
                message: stderr.trim_end().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        log::trace!("Received stdout: {}", stdout);
        Ok(stdout)
    }
}

/// Run `args` against the given executable and journal
pub async fn invoke<S: AsRef<str>>(
    runner: &dyn ProcessRunner,
    settings: &LedgerSettings,
    args: &[S],
) -> CoreResult<String> {
    let invocation = LedgerInvocation::new(settings, args.iter().map(|a| a.as_ref().to_string()));
    runner.run(&invocation).await
}
