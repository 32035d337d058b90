use std::{error, fmt, io, path::PathBuf, process::ExitStatus};

#[derive(Debug)]
pub enum ToolError {
    NotFound {
        tool: String,
        error: which::Error,
    },
    IOError(String, io::Error),
    Failed {
        command: String,
        status: ExitStatus,
    },
    MissingInputs(Vec<PathBuf>),
    DeviceFailures(Vec<(String, ToolError)>),
    NoDevices,
    ConfigError(PathBuf, ron::error::SpannedError),
    UnknownAbi(String),
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolError::NotFound { tool, error } => write!(f, "{} not found: {}", tool, error),
            ToolError::IOError(what, e) => write!(f, "{}: {}", what, e),
            ToolError::Failed { command, status } => write!(f, "'{}' failed: {}", command, status),
            ToolError::MissingInputs(paths) => {
                write!(f, "missing input files:")?;
                for path in paths {
                    write!(f, " {}", path.display())?;
                }
                Ok(())
            }
            ToolError::DeviceFailures(failures) => {
                write!(f, "failed on {} device(s):", failures.len())?;
                for (serial, error) in failures {
                    write!(f, "\n  {}: {}", serial, error)?;
                }
                Ok(())
            }
            ToolError::NoDevices => write!(f, "no connected devices"),
            ToolError::ConfigError(path, e) => write!(f, "{}: {}", path.display(), e),
            ToolError::UnknownAbi(abi) => write!(f, "unknown ABI: {}", abi),
        }
    }
}

impl error::Error for ToolError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ToolError::NotFound { error, .. } => Some(error),
            ToolError::IOError(_, e) => Some(e),
            ToolError::ConfigError(_, e) => Some(e),
            _ => None,
        }
    }
}
