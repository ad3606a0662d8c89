// ABOUTME: Output formatting for command results.
// ABOUTME: Supports normal, quiet (raw stdout), and JSON output modes.

use crate::ssh::CommandOutput;
use serde::Serialize;
use std::io::{self, Write};
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Command line, then stdout, then stderr
    Normal,
    /// Remote stdout and stderr passed through untouched
    Quiet,
    /// A single JSON object for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Print a command result to stdout (remote stderr goes to stderr in quiet mode).
    pub fn report(&self, result: &CommandOutput) -> io::Result<()> {
        let mut out = io::stdout().lock();
        let mut err = io::stderr().lock();
        self.write_report(&mut out, &mut err, result)?;
        out.flush()?;
        err.flush()
    }

    fn write_report(
        &self,
        out: &mut impl Write,
        err: &mut impl Write,
        result: &CommandOutput,
    ) -> io::Result<()> {
        match self.mode {
            OutputMode::Normal => {
                writeln!(out, "SSH Session Command: {}", result.command)?;
                writeln!(out, "{}", result.stdout_lossy())?;
                writeln!(out, "{}", result.stderr_lossy())
            }
            OutputMode::Quiet => {
                out.write_all(&result.stdout)?;
                err.write_all(&result.stderr)
            }
            OutputMode::Json => {
                let stdout = result.stdout_lossy();
                let stderr = result.stderr_lossy();
                let event = JsonResult {
                    command: &result.command,
                    exit_status: result.exit_status,
                    stdout: &stdout,
                    stderr: &stderr,
                    duration_secs: self.start_time.map(|_| self.elapsed_secs()),
                };
                serde_json::to_writer(&mut *out, &event)?;
                writeln!(out)
            }
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                let event = JsonError {
                    event: "error",
                    message,
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }
}

#[derive(Serialize)]
struct JsonResult<'a> {
    command: &'a str,
    exit_status: u32,
    stdout: &'a str,
    stderr: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct JsonError<'a> {
    event: &'a str,
    message: &'a str,
}
