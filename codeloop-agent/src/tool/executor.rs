//! Run candidate code in a child interpreter

use super::{capture_output, last_line, Tool};
use crate::fence::strip_fence;
use async_trait::async_trait;
use codeloop_error::Result;
use std::fmt;

/// Tool name shown in Debugger reports
pub const PYTHON_EXECUTOR: &str = "PythonExecutor";

/// How the executor launches the interpreter.
///
/// The stripped code is passed as the final argument, so `args` must end with
/// whatever flag makes the interpreter read a program from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub interpreter: String,
    pub args: Vec<String>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            // -I: isolated mode, ignore PYTHON* env vars and user site-packages
            args: vec!["-I".to_string(), "-c".to_string()],
        }
    }
}

impl ExecutorConfig {
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }
}

/// Result of one execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Interpreter exited cleanly; everything written to stdout
    Success { stdout: String },
    /// Program raised, exited non-zero, or could not be started
    RuntimeError { description: String },
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionOutcome::Success { stdout } => {
                write!(f, "✅ Execution Output:\n```\n{}\n```", stdout)
            }
            ExecutionOutcome::RuntimeError { description } => {
                write!(f, "❌ Runtime Error: {}", description)
            }
        }
    }
}

/// Executes the code found in a payload and reports stdout or the error
#[derive(Debug, Clone)]
pub struct ExecutorTool {
    name: String,
    config: ExecutorConfig,
}

impl Default for ExecutorTool {
    fn default() -> Self {
        Self::new(ExecutorConfig::default())
    }
}

impl ExecutorTool {
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            name: PYTHON_EXECUTOR.to_string(),
            config,
        }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Strip any fence around `payload` and run it.
    ///
    /// Stdout is only reported on success. On failure the description is the
    /// last line of stderr (the exception line of a Python traceback), or the
    /// exit status when stderr is empty.
    pub async fn execute(&self, payload: &str) -> ExecutionOutcome {
        let code = strip_fence(payload);
        let interpreter = &self.config.interpreter;
        tracing::debug!(interpreter = %interpreter, bytes = code.len(), "executing code");

        let args = self.config.args.iter().map(String::as_str).chain([code]);
        let output = match capture_output(interpreter, args).await {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(interpreter = %interpreter, error = %err, "interpreter did not start");
                return ExecutionOutcome::RuntimeError {
                    description: format!("failed to start {}: {}", interpreter, err),
                };
            }
        };

        if output.status.success() {
            return ExecutionOutcome::Success {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            };
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let description = match last_line(&stderr) {
            Some(line) => line.to_string(),
            None => format!("{} exited with {}", interpreter, output.status),
        };
        tracing::debug!(status = %output.status, %description, "execution failed");
        ExecutionOutcome::RuntimeError { description }
    }
}

#[async_trait]
impl Tool for ExecutorTool {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, payload: &str) -> Result<String> {
        Ok(self.execute(payload).await.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> ExecutorTool {
        ExecutorTool::new(ExecutorConfig {
            interpreter: "sh".to_string(),
            args: vec!["-c".to_string()],
        })
    }

    fn python_available() -> bool {
        std::process::Command::new("python3")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    #[test]
    fn test_report_format() {
        let ok = ExecutionOutcome::Success {
            stdout: "4\n".to_string(),
        };
        assert_eq!(ok.to_string(), "✅ Execution Output:\n```\n4\n\n```");

        let err = ExecutionOutcome::RuntimeError {
            description: "division by zero".to_string(),
        };
        assert_eq!(err.to_string(), "❌ Runtime Error: division by zero");
    }

    #[test]
    fn test_default_config() {
        let config = ExecutorConfig::default();
        assert_eq!(config.interpreter, "python3");
        assert_eq!(config.args, vec!["-I", "-c"]);
        assert_eq!(config.with_interpreter("python3.12").interpreter, "python3.12");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fenced_payload_runs() {
        let outcome = shell().execute("```sh\necho 4\n```").await;
        assert_eq!(
            outcome,
            ExecutionOutcome::Success {
                stdout: "4\n".to_string()
            }
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stderr_last_line_describes_failure() {
        let outcome = shell()
            .execute("echo partial; echo trace >&2; echo boom >&2; exit 3")
            .await;
        assert_eq!(
            outcome,
            ExecutionOutcome::RuntimeError {
                description: "boom".to_string()
            }
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_silent_failure_reports_status() {
        match shell().execute("exit 2").await {
            ExecutionOutcome::RuntimeError { description } => {
                assert!(description.starts_with("sh exited with"), "{}", description);
            }
            other => panic!("expected runtime error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_a_report_not_an_error() {
        let tool = ExecutorTool::new(
            ExecutorConfig::default().with_interpreter("codeloop-no-such-interpreter"),
        );
        let report = tool.run("print(1)").await.unwrap();
        assert!(report.starts_with("❌ Runtime Error: failed to start"), "{}", report);
    }

    #[tokio::test]
    async fn test_python_success() {
        if !python_available() {
            eprintln!("python3 not found, skipping");
            return;
        }
        let report = ExecutorTool::default()
            .run("```python\nprint(2 + 2)\n```")
            .await
            .unwrap();
        assert_eq!(report, "✅ Execution Output:\n```\n4\n\n```");
    }

    #[tokio::test]
    async fn test_python_exception() {
        if !python_available() {
            eprintln!("python3 not found, skipping");
            return;
        }
        let report = ExecutorTool::default().run("1 / 0").await.unwrap();
        assert!(report.starts_with("❌ Runtime Error: "), "{}", report);
        assert!(report.contains("ZeroDivisionError"), "{}", report);
    }
}
