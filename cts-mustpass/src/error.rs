use std::{error, fmt, io, path::PathBuf};

#[derive(Debug)]
pub enum Error {
    IOError(PathBuf, io::Error),
    ProjectError(PathBuf, ron::error::SpannedError),
    XmlError(xml::writer::Error),
    PatternError {
        file: PathBuf,
        pattern: String,
        error: regex::Error,
    },
    HierarchyError {
        line: usize,
        message: String,
    },
}

impl From<xml::writer::Error> for Error {
    fn from(v: xml::writer::Error) -> Self {
        Error::XmlError(v)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IOError(path, e) => write!(f, "{}: {}", path.display(), e),
            Error::ProjectError(path, e) => write!(f, "{}: {}", path.display(), e),
            Error::XmlError(e) => write!(f, "failed to write XML: {}", e),
            Error::PatternError {
                file,
                pattern,
                error,
            } => write!(f, "{}: invalid pattern '{}': {}", file.display(), pattern, error),
            Error::HierarchyError { line, message } => {
                write!(f, "test hierarchy line {}: {}", line, message)
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::IOError(_, e) => Some(e),
            Error::ProjectError(_, e) => Some(e),
            Error::XmlError(e) => Some(e),
            Error::PatternError { error, .. } => Some(error),
            Error::HierarchyError { .. } => None,
        }
    }
}

/// Attaches the path to an I/O result.
pub(crate) trait IoContext<T> {
    fn at(self, path: &std::path::Path) -> Result<T, Error>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn at(self, path: &std::path::Path) -> Result<T, Error> {
        self.map_err(|e| Error::IOError(path.to_path_buf(), e))
    }
}
