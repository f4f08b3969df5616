//! Child process execution.
//!
//! [`ProcessRunner`] is the seam every higher layer spawns processes
//! through: discovery validation, version probing, and installation all go
//! through the same interface, so test doubles can be substituted without
//! any runtime patching. The system implementation lives in [`system`].

pub mod system;

pub use system::SystemRunner;

use std::time::Duration;

use crate::error::Result;

/// Default wall-clock bound for a child process.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A request to spawn a single child process.
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    /// Program to run; an absolute path or a name resolvable by the host.
    pub command: String,

    /// Arguments, passed through verbatim.
    pub args: Vec<String>,

    /// Run through the platform's privilege-escalation wrapper.
    pub elevated: bool,

    /// Wall-clock bound; the child is killed when it expires.
    pub timeout: Duration,
}

impl ProcessRequest {
    /// Create a request with no arguments and the default timeout.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            elevated: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Request privilege elevation.
    pub fn elevated(mut self) -> Self {
        self.elevated = true;
        self
    }

    /// Override the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Rendered command line for logs and error messages.
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}

/// Result of executing a child process.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether the process exited with code 0.
    pub success: bool,
}

impl ProcessResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }
}

/// Spawns child processes.
///
/// Exit code 0 is the only success signal: a non-zero exit surfaces as
/// [`OutfitterError::Process`](crate::OutfitterError::Process) and a kill on
/// deadline as [`OutfitterError::Timeout`](crate::OutfitterError::Timeout).
/// Implementations start exactly one child per call and never retry; retry
/// policy belongs to the orchestrator.
pub trait ProcessRunner {
    /// Run the request to completion, capturing output.
    fn run(&self, request: &ProcessRequest) -> Result<ProcessResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_accumulates_args() {
        let request = ProcessRequest::new("mytool").arg("--version").arg("--json");
        assert_eq!(request.command, "mytool");
        assert_eq!(request.args, vec!["--version", "--json"]);
        assert!(!request.elevated);
    }

    #[test]
    fn request_args_extends() {
        let request = ProcessRequest::new("apt-get").args(["install", "-y", "mytool"]);
        assert_eq!(request.args, vec!["install", "-y", "mytool"]);
    }

    #[test]
    fn request_elevated_sets_flag() {
        let request = ProcessRequest::new("apt-get").elevated();
        assert!(request.elevated);
    }

    #[test]
    fn request_timeout_overrides_default() {
        let request = ProcessRequest::new("mytool").timeout(Duration::from_secs(5));
        assert_eq!(request.timeout, Duration::from_secs(5));
    }

    #[test]
    fn request_default_timeout_is_bounded() {
        let request = ProcessRequest::new("mytool");
        assert_eq!(request.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn display_renders_command_line() {
        let request = ProcessRequest::new("mytool").arg("--version");
        assert_eq!(request.display(), "mytool --version");
        assert_eq!(ProcessRequest::new("mytool").display(), "mytool");
    }

    #[test]
    fn result_constructors_set_success() {
        let ok = ProcessResult::success("out".into(), String::new(), Duration::from_millis(1));
        assert!(ok.success);
        assert_eq!(ok.exit_code, Some(0));

        let failed =
            ProcessResult::failure(Some(2), String::new(), "bad".into(), Duration::from_millis(1));
        assert!(!failed.success);
        assert_eq!(failed.exit_code, Some(2));
    }
}
