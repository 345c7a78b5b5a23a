//! Structural diff operations
//!
//! The pipeline only sees the [`StructuralDiff`] trait. [`ExternalDiffTool`]
//! runs a diff program such as `dyff between --omit-header A B` and splits its
//! stdout into stanzas.

use crate::error::{Result, SnapdiffError};
use crate::parser::{split_stanzas, Stanza};
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default diff program
pub const DEFAULT_TOOL: &str = "dyff";

/// Default arguments placed before the two file paths
pub const DEFAULT_TOOL_ARGS: &[&str] = &["between", "--omit-header"];

/// Compares two structured documents
pub trait StructuralDiff: Send + Sync {
    /// Short name used in logs and error reports
    fn name(&self) -> &str;

    /// Stanzas describing how `newer` differs from `older`; empty when equivalent
    fn diff(&self, older: &Path, newer: &Path) -> Result<Vec<Stanza>>;
}

impl<T: StructuralDiff + ?Sized> StructuralDiff for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn diff(&self, older: &Path, newer: &Path) -> Result<Vec<Stanza>> {
        (**self).diff(older, newer)
    }
}

/// A diff program run once per file pair
#[derive(Debug, Clone)]
pub struct ExternalDiffTool {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    differences_exit_code: Option<i32>,
}

impl ExternalDiffTool {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
            differences_exit_code: None,
        }
    }

    /// `dyff between --omit-header` with the given timeout
    pub fn dyff(timeout: Duration) -> Self {
        Self::new(
            DEFAULT_TOOL,
            DEFAULT_TOOL_ARGS.iter().map(|a| a.to_string()).collect(),
            timeout,
        )
    }

    /// Exit code the tool uses to signal "differences found" rather than failure
    pub fn with_differences_exit_code(mut self, code: Option<i32>) -> Self {
        self.differences_exit_code = code;
        self
    }

    /// Run the tool and return its stdout
    pub fn run(&self, older: &Path, newer: &Path) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(older)
            .arg(newer)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SnapdiffError::ToolUnavailable {
                tool: self.program.clone(),
                message: if e.kind() == ErrorKind::NotFound {
                    "program not found".to_string()
                } else {
                    e.to_string()
                },
            })?;

        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let status = match self.wait_with_timeout(&mut child) {
            Ok(Some(status)) => status,
            Ok(None) => {
                reap(&mut child);
                return Err(SnapdiffError::Timeout {
                    tool: self.program.clone(),
                    seconds: self.timeout.as_secs(),
                });
            }
            Err(e) => {
                reap(&mut child);
                return Err(e);
            }
        };

        let stdout = join_reader(stdout)?;
        let stderr = join_reader(stderr)?;

        if !self.is_success(&status) {
            let stderr = String::from_utf8_lossy(&stderr);
            return Err(SnapdiffError::diff_tool(
                &self.program,
                format!("{} ({})", status, stderr.trim()),
            ));
        }

        String::from_utf8(stdout).map_err(|e| {
            SnapdiffError::diff_tool(&self.program, format!("output is not valid UTF-8: {}", e))
        })
    }

    fn is_success(&self, status: &ExitStatus) -> bool {
        status.success() || (self.differences_exit_code.is_some() && status.code() == self.differences_exit_code)
    }

    /// `None` when the deadline passes before the child exits
    fn wait_with_timeout(&self, child: &mut Child) -> Result<Option<ExitStatus>> {
        let deadline = Instant::now() + self.timeout;
        let mut interval = Duration::from_millis(2);

        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Some(status));
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }

            thread::sleep(interval.min(deadline - now));
            interval = (interval * 2).min(Duration::from_millis(50));
        }
    }
}

impl StructuralDiff for ExternalDiffTool {
    fn name(&self) -> &str {
        &self.program
    }

    fn diff(&self, older: &Path, newer: &Path) -> Result<Vec<Stanza>> {
        let output = self.run(older, newer)?;
        Ok(split_stanzas(&output))
    }
}

/// Kill the child if it is still running and collect its exit status
fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        log::debug!("Failed to kill diff tool process {}: {}", child.id(), e);
    }
    let _ = child.wait();
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<std::io::Result<Vec<u8>>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

fn join_reader(handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>) -> Result<Vec<u8>> {
    match handle {
        Some(handle) => {
            let bytes = handle
                .join()
                .map_err(|_| anyhow::anyhow!("pipe reader thread panicked"))??;
            Ok(bytes)
        }
        None => Ok(Vec::new()),
    }
}
