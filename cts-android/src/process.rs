//! Invocations of external tools.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use log::debug;

use crate::error::ToolError;

/// A tool invocation that can be inspected before it is run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Invocation {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Arguments as lossy strings, for comparisons and logs.
    pub fn arg_strings(&self) -> Vec<String> {
        self.args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }
        command
    }

    fn io_error(&self, e: std::io::Error) -> ToolError {
        ToolError::IOError(self.to_string(), e)
    }

    /// Starts the tool without waiting for it.
    pub fn spawn(&self) -> Result<Child, ToolError> {
        debug!("Spawning {}", self);
        self.command().spawn().map_err(|e| self.io_error(e))
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.contains(' ') || arg.is_empty() {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Runs `cmd` to completion. A non-zero exit is an error.
pub fn execute(cmd: &Invocation) -> Result<(), ToolError> {
    debug!("Running {}", cmd);
    let status = cmd.command().status().map_err(|e| cmd.io_error(e))?;
    if status.success() {
        Ok(())
    } else {
        Err(ToolError::Failed {
            command: cmd.to_string(),
            status,
        })
    }
}

/// Runs `cmd` and returns its standard output.
pub fn execute_output(cmd: &Invocation) -> Result<String, ToolError> {
    debug!("Running {}", cmd);
    let output = cmd
        .command()
        .stderr(Stdio::inherit())
        .output()
        .map_err(|e| cmd.io_error(e))?;
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Err(ToolError::Failed {
            command: cmd.to_string(),
            status: output.status,
        })
    }
}

/// Finds `tool` in `dirs`, then on `PATH`.
pub fn find_tool(tool: &str, dirs: &[&Path]) -> Result<PathBuf, ToolError> {
    for dir in dirs {
        let path = dir.join(tool);
        if path.is_file() {
            return Ok(path);
        }
    }
    which::which(tool).map_err(|error| ToolError::NotFound {
        tool: tool.to_string(),
        error,
    })
}
