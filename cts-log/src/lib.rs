//! Test log post-processing: parsing, CSV export and mustpass verification.

pub mod csv;
mod error;
pub mod qpa;
pub mod verify;

use std::fs;
use std::path::Path;

pub use error::LogError;
pub use qpa::{parse, TestCaseResult, TestLog};
pub use verify::{verify, Verification};

pub fn read_log(path: &Path) -> Result<TestLog, LogError> {
    let text = fs::read_to_string(path).map_err(|e| LogError::IOError(path.to_path_buf(), e))?;
    parse(&text)
}

/// Case names of a mustpass list, in list order.
pub fn read_must_pass(path: &Path) -> Result<Vec<String>, LogError> {
    Ok(cts_mustpass::case_list::read_lines(path)?)
}
