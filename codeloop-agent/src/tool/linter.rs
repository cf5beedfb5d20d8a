//! Lint candidate code through an external linter

use super::{capture_output, Tool};
use crate::fence::strip_fence;
use async_trait::async_trait;
use codeloop_error::{Error, ErrorKind, Result};
use std::ffi::OsStr;
use std::io::Write;

/// Tool name shown in Debugger reports
pub const PYLINT_LINTER: &str = "PylintLinter";

/// How the linter is invoked: `command <tempfile> args...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinterConfig {
    pub command: String,
    pub args: Vec<String>,
    /// Temp file suffix; pylint needs `.py` to treat the file as a module
    pub suffix: String,
}

impl Default for LinterConfig {
    fn default() -> Self {
        Self {
            command: "pylint".to_string(),
            args: vec!["--disable=all".to_string(), "--enable=W,C,E".to_string()],
            suffix: ".py".to_string(),
        }
    }
}

impl LinterConfig {
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct LinterTool {
    name: String,
    config: LinterConfig,
}

impl Default for LinterTool {
    fn default() -> Self {
        Self::new(LinterConfig::default())
    }
}

impl LinterTool {
    pub fn new(config: LinterConfig) -> Self {
        Self {
            name: PYLINT_LINTER.to_string(),
            config,
        }
    }

    pub fn config(&self) -> &LinterConfig {
        &self.config
    }

    /// Write the stripped payload to a temp file and return the linter's stdout.
    ///
    /// A non-zero exit is not an error: pylint exits non-zero whenever it
    /// reports messages. Only failing to write the file or start the process is.
    /// The temp file is removed when this returns.
    pub async fn lint(&self, payload: &str) -> Result<String> {
        let code = strip_fence(payload);

        let mut file = tempfile::Builder::new()
            .prefix("codeloop-")
            .suffix(&self.config.suffix)
            .tempfile()
            .map_err(|e| Error::from(e).with_operation("linter::tempfile"))?;
        file.write_all(code.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| Error::from(e).with_operation("linter::write"))?;

        let args = std::iter::once(file.path().as_os_str())
            .chain(self.config.args.iter().map(OsStr::new));

        tracing::debug!(command = %self.config.command, path = ?file.path(), "linting code");
        let output = capture_output(&self.config.command, args)
            .await
            .map_err(|e| {
                Error::process_failed(&self.config.command, e.to_string())
                    .with_operation("linter::run")
                    .set_source(e)
            })?;

        tracing::debug!(status = %output.status, "linter finished");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl Tool for LinterTool {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, payload: &str) -> Result<String> {
        match self.lint(payload).await {
            Ok(stdout) => Ok(format!("🧹 Pylint Linter Output:\n```\n{}\n```", stdout)),
            Err(err) => {
                tracing::warn!(error = %err, "linting failed");
                let reason = match err.kind() {
                    ErrorKind::ProcessFailed => err.message().to_string(),
                    _ => err.to_string(),
                };
                Ok(format!("❌ Linting Error: {}", reason))
            }
        }
    }
}
