//! Incremental build steps.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::{debug, info};

use crate::error::ToolError;
use crate::process::{execute, Invocation};

/// Expands directories into the files below them. Paths that do not exist
/// are kept as they are.
pub fn expand_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>, ToolError> {
    fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
        let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
        entries.sort_by_key(|e| e.file_name());
        for entry in entries {
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                walk(&path, out)?;
            } else {
                out.push(path);
            }
        }
        Ok(())
    }

    let mut out = Vec::new();
    for path in paths {
        if path.is_dir() {
            walk(path, &mut out).map_err(|e| ToolError::IOError(path.display().to_string(), e))?;
        } else {
            out.push(path.clone());
        }
    }
    Ok(out)
}

fn modified(path: &Path) -> Result<Option<SystemTime>, ToolError> {
    match fs::metadata(path) {
        Ok(meta) => meta
            .modified()
            .map(Some)
            .map_err(|e| ToolError::IOError(path.display().to_string(), e)),
        Err(ref e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ToolError::IOError(path.display().to_string(), e)),
    }
}

/// True when every output exists and no input is newer than the oldest
/// output. Missing inputs are an error.
pub fn outputs_up_to_date(inputs: &[PathBuf], outputs: &[PathBuf]) -> Result<bool, ToolError> {
    let inputs = expand_paths(inputs)?;
    let outputs = expand_paths(outputs)?;

    let mut missing = Vec::new();
    let mut newest_input = None;
    for input in inputs {
        match modified(&input)? {
            Some(time) => newest_input = newest_input.max(Some(time)),
            None => missing.push(input),
        }
    }
    if !missing.is_empty() {
        return Err(ToolError::MissingInputs(missing));
    }

    let mut oldest_output: Option<SystemTime> = None;
    for output in &outputs {
        match modified(output)? {
            Some(time) => oldest_output = Some(oldest_output.map_or(time, |t| t.min(time))),
            None => return Ok(false),
        }
    }
    match oldest_output {
        Some(oldest) => Ok(newest_input.map_or(true, |newest| newest <= oldest)),
        None => Ok(false),
    }
}

pub trait BuildStep {
    fn name(&self) -> String;

    fn inputs(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    /// Tool invocations performing the step, in order.
    fn commands(&self) -> Result<Vec<Invocation>, ToolError>;

    /// Steps without declared outputs always run.
    fn is_up_to_date(&self) -> Result<bool, ToolError> {
        let outputs = self.outputs();
        if outputs.is_empty() {
            return Ok(false);
        }
        outputs_up_to_date(&self.inputs(), &outputs)
    }

    fn update(&self) -> Result<(), ToolError> {
        for output in self.outputs() {
            if let Some(parent) = output.parent() {
                fs::create_dir_all(parent).map_err(|e| ToolError::IOError(parent.display().to_string(), e))?;
            }
        }
        for cmd in self.commands()? {
            execute(&cmd)?;
        }
        Ok(())
    }
}

/// Runs the steps that are not up to date. Returns how many ran.
pub fn execute_steps(steps: &[Box<dyn BuildStep>]) -> Result<usize, ToolError> {
    let mut count = 0;
    for step in steps {
        if step.is_up_to_date()? {
            debug!("{} is up to date", step.name());
            continue;
        }
        info!("{}", step.name());
        step.update()?;
        count += 1;
    }
    Ok(count)
}
