//! Tools the Debugger agent runs over candidate code
//!
//! A tool turns a payload into a report. Tools that wrap a fallible
//! operation (running the code, running the linter) put the failure into the
//! report text instead of returning `Err`, so one broken script does not end
//! the conversation.

mod executor;
mod linter;

pub use executor::{ExecutionOutcome, ExecutorConfig, ExecutorTool, PYTHON_EXECUTOR};
pub use linter::{LinterConfig, LinterTool, PYLINT_LINTER};

use async_trait::async_trait;
use codeloop_error::Result;
use std::process::Output;
use tokio::process::Command;

/// A capability an agent can invoke with a text payload
#[async_trait]
pub trait Tool: Send + Sync {
    /// Label used in the Debugger's combined report
    fn name(&self) -> &str;

    /// Produce a report for `payload`. An `Err` is fatal to the run.
    async fn run(&self, payload: &str) -> Result<String>;
}

/// Spawn `program` with `args`, wait for it, and capture stdout/stderr.
/// Stdin is closed.
pub(crate) async fn capture_output<I, S>(program: &str, args: I) -> std::io::Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
}

/// Last non-empty line of `text`, trimmed
pub(crate) fn last_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).last()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_line() {
        let traceback = "Traceback (most recent call last):\n  File \"<string>\", line 1, in <module>\nZeroDivisionError: division by zero\n\n";
        assert_eq!(last_line(traceback), Some("ZeroDivisionError: division by zero"));
        assert_eq!(last_line(" \n\n"), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_capture_output() {
        let output = capture_output("sh", ["-c", "echo out; echo err >&2"]).await.unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "out\n");
        assert_eq!(String::from_utf8_lossy(&output.stderr), "err\n");
    }
}
