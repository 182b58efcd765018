//! External program execution.

use std::fmt;
use std::process::{Command, Stdio};

/// Failure to run an external program.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The program could not be started.
    #[error("failed to launch `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited unsuccessfully.
    #[error("`{command}` exited with {}", describe_exit(*status, stderr))]
    Status {
        command: String,
        status: Option<i32>,
        stderr: String,
    },
}

fn describe_exit(status: Option<i32>, stderr: &str) -> String {
    let status = status.map_or_else(|| "a signal".to_string(), |code| format!("status {code}"));
    if stderr.is_empty() {
        status
    } else {
        format!("{status}: {stderr}")
    }
}

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// Create a command line with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Split a `[program, args...]` list. Returns `None` for an empty list.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone()).args(args.iter().cloned()))
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Seam for launching external programs.
pub trait CommandRunner {
    /// Run to completion with the console attached.
    fn run(&self, cmd: &CommandLine) -> Result<(), CommandError>;

    /// Run to completion and return its standard output.
    fn capture(&self, cmd: &CommandLine) -> Result<String, CommandError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, cmd: &CommandLine) -> Result<(), CommandError> {
        (**self).run(cmd)
    }

    fn capture(&self, cmd: &CommandLine) -> Result<String, CommandError> {
        (**self).capture(cmd)
    }
}

/// Runs programs as child processes of this one.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &CommandLine) -> Result<(), CommandError> {
        tracing::debug!(command = %cmd, "Running command");

        let status = Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| CommandError::Spawn {
                command: cmd.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(CommandError::Status {
                command: cmd.to_string(),
                status: status.code(),
                stderr: String::new(),
            });
        }

        Ok(())
    }

    fn capture(&self, cmd: &CommandLine) -> Result<String, CommandError> {
        tracing::debug!(command = %cmd, "Capturing command output");

        let output = Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| CommandError::Spawn {
                command: cmd.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(CommandError::Status {
                command: cmd.to_string(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
