use std::{error, fmt, io, path::PathBuf, process::ExitStatus};

#[derive(Debug)]
pub enum FetchError {
    IOError(PathBuf, io::Error),
    HttpError {
        url: String,
        error: reqwest::Error,
    },
    ChecksumMismatch {
        url: String,
        expected: String,
        actual: String,
    },
    UnsupportedArchive(String),
    ToolNotFound {
        tool: &'static str,
        error: which::Error,
    },
    CommandFailed {
        command: String,
        status: ExitStatus,
    },
    ManifestError(PathBuf, ron::error::SpannedError),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::IOError(path, e) => write!(f, "{}: {}", path.display(), e),
            FetchError::HttpError { url, error } => write!(f, "failed to fetch {}: {}", url, error),
            FetchError::ChecksumMismatch {
                url,
                expected,
                actual,
            } => write!(
                f,
                "checksum mismatch for {}: expected {}, got {}",
                url, expected, actual
            ),
            FetchError::UnsupportedArchive(name) => write!(f, "unsupported archive type: {}", name),
            FetchError::ToolNotFound { tool, error } => write!(f, "{} not found: {}", tool, error),
            FetchError::CommandFailed { command, status } => {
                write!(f, "'{}' failed: {}", command, status)
            }
            FetchError::ManifestError(path, e) => write!(f, "{}: {}", path.display(), e),
        }
    }
}

impl error::Error for FetchError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            FetchError::IOError(_, e) => Some(e),
            FetchError::HttpError { error, .. } => Some(error),
            FetchError::ToolNotFound { error, .. } => Some(error),
            FetchError::ManifestError(_, e) => Some(e),
            _ => None,
        }
    }
}

pub(crate) trait IoContext<T> {
    fn at(self, path: &std::path::Path) -> Result<T, FetchError>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn at(self, path: &std::path::Path) -> Result<T, FetchError> {
        self.map_err(|e| FetchError::IOError(path.to_path_buf(), e))
    }
}
