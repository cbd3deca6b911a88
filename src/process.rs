//! External tool invocation
//!
//! Every platform tool (`hdiutil`, `xar`, `tar`, `sips`, `iconutil`) is reached
//! through [`ToolRunner`], which reports a [`ToolOutcome`] instead of an
//! `io::Error`. Callers match on the outcome to tell a tool that is not
//! installed apart from a tool that ran and failed.

use std::ffi::OsStr;
use std::io::{ErrorKind, Read};
use std::process::{Command, Output, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

/// How often a bounded invocation checks whether the child has exited
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long to wait for output once a bounded invocation has ended
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Result of running an external tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    /// The program could not be found on the system
    NotFound,
    /// The program ran (or could not be started) and did not succeed
    Failed {
        code: Option<i32>,
        diagnostics: String,
    },
    /// The program exited with status zero
    Success(ToolOutput),
}

/// Captured output of a successful invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutcome {
    /// Build an outcome from a finished process
    pub fn from_output(output: &Output) -> Self {
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            return ToolOutcome::Success(ToolOutput { stdout, stderr });
        }

        let diagnostics = if stderr.trim().is_empty() {
            stdout
        } else {
            stderr
        };
        ToolOutcome::Failed {
            code: output.status.code(),
            diagnostics: diagnostics.trim().to_string(),
        }
    }

    /// Short human-readable description of a non-successful outcome
    pub fn describe(&self, program: &str) -> String {
        match self {
            ToolOutcome::NotFound => format!("{program} not found"),
            ToolOutcome::Failed { code, diagnostics } => {
                let status = code.map_or_else(
                    || "without an exit status".to_string(),
                    |c| format!("with status {c}"),
                );
                if diagnostics.is_empty() {
                    format!("{program} failed {status}")
                } else {
                    format!("{program} failed {status}: {diagnostics}")
                }
            }
            ToolOutcome::Success(_) => format!("{program} succeeded"),
        }
    }
}

/// Runs external programs on behalf of the pipeline
pub trait ToolRunner {
    /// Run `program` to completion
    fn run(&self, program: &str, args: &[&OsStr]) -> ToolOutcome;

    /// Run `program`, killing it if it has not exited after `timeout`
    fn run_with_timeout(&self, program: &str, args: &[&OsStr], timeout: Duration) -> ToolOutcome;
}

/// Runs programs found on `PATH`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&OsStr]) -> ToolOutcome {
        tracing::debug!(program, ?args, "running external tool");

        match Command::new(program).args(args).output() {
            Ok(output) => ToolOutcome::from_output(&output),
            Err(e) => spawn_error(&e),
        }
    }

    fn run_with_timeout(&self, program: &str, args: &[&OsStr], timeout: Duration) -> ToolOutcome {
        tracing::debug!(program, ?args, ?timeout, "running external tool with timeout");

        let mut child = match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => return spawn_error(&e),
        };

        // Pipes are drained while polling so a chatty child never blocks on a full pipe
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    let deadline = Instant::now() + DRAIN_GRACE;
                    return ToolOutcome::from_output(&Output {
                        status,
                        stdout: collect(&stdout, deadline),
                        stderr: collect(&stderr, deadline),
                    });
                }
                Ok(None) if start.elapsed() >= timeout => {
                    let _ = child.kill();
                    let _ = child.wait();
                    let stderr = collect(&stderr, Instant::now() + DRAIN_GRACE);
                    let stderr = String::from_utf8_lossy(&stderr);
                    return ToolOutcome::Failed {
                        code: None,
                        diagnostics: format!("timed out after {timeout:?} {}", stderr.trim())
                            .trim_end()
                            .to_string(),
                    };
                }
                Ok(None) => std::thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return spawn_error(&e);
                }
            }
        }
    }
}

/// Read `pipe` to EOF on a background thread
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    if let Some(mut pipe) = pipe {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            let _ = tx.send(buf);
        });
    }
    rx
}

/// Output drained by [`drain`], or nothing if EOF has not arrived by `deadline`.
///
/// A descendant that inherited the pipe can hold it open long after the child
/// exits; its reader thread is left behind rather than waited for.
fn collect(rx: &Receiver<Vec<u8>>, deadline: Instant) -> Vec<u8> {
    rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
        .unwrap_or_default()
}

fn spawn_error(err: &std::io::Error) -> ToolOutcome {
    if err.kind() == ErrorKind::NotFound {
        ToolOutcome::NotFound
    } else {
        ToolOutcome::Failed {
            code: None,
            diagnostics: err.to_string(),
        }
    }
}
