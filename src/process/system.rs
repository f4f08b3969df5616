//! System process runner.
//!
//! Spawns real child processes with captured output, a mandatory deadline,
//! and privilege elevation through the platform's escalation wrapper.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{OutfitterError, Result};
use crate::platform;

use super::{ProcessRequest, ProcessResult, ProcessRunner};

/// How often the runner checks a child for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Executes processes on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, request: &ProcessRequest) -> Result<ProcessResult> {
        let start = Instant::now();
        let (program, args) = elevation_wrapper(request);

        let mut cmd = Command::new(&program);
        cmd.args(&args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| OutfitterError::Process {
            command: request.display(),
            exit_code: None,
            stderr: e.to_string(),
        })?;

        let mut stdout_pipe = child.stdout.take().unwrap();
        let mut stderr_pipe = child.stderr.take().unwrap();

        // Drain pipes on their own threads so a chatty child cannot fill a
        // pipe buffer and deadlock against the wait loop.
        let stdout_handle = thread::spawn(move || {
            let mut buf = String::new();
            let _ = stdout_pipe.read_to_string(&mut buf);
            buf
        });
        let stderr_handle = thread::spawn(move || {
            let mut buf = String::new();
            let _ = stderr_pipe.read_to_string(&mut buf);
            buf
        });

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if start.elapsed() >= request.timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        let _ = stdout_handle.join();
                        let _ = stderr_handle.join();
                        return Err(OutfitterError::Timeout {
                            command: request.display(),
                            timeout: request.timeout,
                        });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    let _ = child.kill();
                    return Err(e.into());
                }
            }
        };

        let stdout = stdout_handle.join().unwrap_or_default();
        let stderr = stderr_handle.join().unwrap_or_default();
        let duration = start.elapsed();

        if status.success() {
            Ok(ProcessResult::success(stdout, stderr, duration))
        } else {
            Err(OutfitterError::Process {
                command: request.display(),
                exit_code: status.code(),
                stderr,
            })
        }
    }
}

/// Build the actual program and argument list for a request.
///
/// On Unix, an elevated request from an unprivileged process is routed
/// through `sudo -n`; `-n` fails instead of prompting, since the child's
/// stdin is not a terminal. An already-privileged process runs the command
/// directly. Windows installers elevate themselves, so elevation is a no-op
/// there.
fn elevation_wrapper(request: &ProcessRequest) -> (String, Vec<String>) {
    if request.elevated && cfg!(unix) && !platform::is_elevated() {
        let mut args = vec!["-n".to_string(), request.command.clone()];
        args.extend(request.args.iter().cloned());
        ("sudo".to_string(), args)
    } else {
        (request.command.clone(), request.args.clone())
    }
}
