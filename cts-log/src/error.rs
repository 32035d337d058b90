use std::{error, fmt, io, path::PathBuf};

#[derive(Debug)]
pub enum LogError {
    IOError(PathBuf, io::Error),
    ParseError { line: usize, message: String },
    CaseListError(cts_mustpass::Error),
}

impl From<cts_mustpass::Error> for LogError {
    fn from(v: cts_mustpass::Error) -> Self {
        LogError::CaseListError(v)
    }
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::IOError(path, e) => write!(f, "{}: {}", path.display(), e),
            LogError::ParseError { line, message } => write!(f, "line {}: {}", line, message),
            LogError::CaseListError(e) => write!(f, "{}", e),
        }
    }
}

impl error::Error for LogError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            LogError::IOError(_, e) => Some(e),
            LogError::ParseError { .. } => None,
            LogError::CaseListError(e) => Some(e),
        }
    }
}
