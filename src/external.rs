//! Running external chemistry tools.
//!
//! aizynthfinder, CoPriNet and template extraction live outside this crate.
//! They are reached as processes: either a one-shot invocation with arguments,
//! or a line filter that reads one record per stdin line and answers with one
//! line per record on stdout.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExternalError {
    #[error("external command is empty")]
    EmptyCommand,

    #[error("'{program}' was not found on PATH")]
    NotFound { program: String },

    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("'{program}' returned {got} lines for {expected} inputs")]
    LineCount {
        program: String,
        expected: usize,
        got: usize,
    },
}

/// A program plus its fixed leading arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    program: String,
    args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Build from a configured `[program, arg, ...]` list.
    pub fn from_parts(parts: &[String]) -> Result<Self, ExternalError> {
        let (program, args) = parts.split_first().ok_or(ExternalError::EmptyCommand)?;
        if program.trim().is_empty() {
            return Err(ExternalError::EmptyCommand);
        }
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Locate the program on PATH (or accept an explicit path).
    pub fn resolve(&self) -> Result<PathBuf, ExternalError> {
        which::which(&self.program).map_err(|_| ExternalError::NotFound {
            program: self.program.clone(),
        })
    }

    /// Run to completion with extra arguments, returning stdout.
    pub fn run(&self, extra_args: &[String]) -> Result<String, ExternalError> {
        let program = self.resolve()?;
        tracing::debug!(program = %self.program, args = ?self.args, extra = ?extra_args, "running external command");

        let output = Command::new(&program)
            .args(&self.args)
            .args(extra_args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ExternalError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ExternalError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Feed `inputs` one per line on stdin and read back exactly one line per input.
    pub fn filter_lines(&self, inputs: &[String]) -> Result<Vec<String>, ExternalError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let program = self.resolve()?;
        let spawn_err = |source| ExternalError::Spawn {
            program: self.program.clone(),
            source,
        };

        let mut child = Command::new(&program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        // Write from a separate thread so a chatty child can't deadlock on a full stdout pipe.
        let mut stdin = child.stdin.take().ok_or_else(|| {
            spawn_err(std::io::Error::other("stdin was not captured"))
        })?;
        let payload: String = inputs.iter().map(|line| format!("{line}\n")).collect();
        let writer = std::thread::spawn(move || stdin.write_all(payload.as_bytes()));

        let output = child.wait_with_output().map_err(spawn_err)?;
        let written = writer
            .join()
            .map_err(|_| spawn_err(std::io::Error::other("stdin writer panicked")))?;
        // A child may stop reading early; that surfaces below as a line count mismatch.
        if let Err(e) = written {
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(spawn_err(e));
            }
        }

        if !output.status.success() {
            return Err(ExternalError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let lines: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|l| l.trim().to_string())
            .collect();

        if lines.len() != inputs.len() {
            return Err(ExternalError::LineCount {
                program: self.program.clone(),
                expected: inputs.len(),
                got: lines.len(),
            });
        }

        Ok(lines)
    }
}
