//! RON manifest listing every source of a checkout.

use std::fs;
use std::path::Path;

use serde_derive::{Deserialize, Serialize};

use crate::error::{FetchError, IoContext};
use crate::source::{GitRepo, Source, SourceFile, SourcePackage};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceSpec {
    File(SourceFile),
    Package(SourcePackage),
    Git(GitRepo),
}

impl SourceSpec {
    pub fn source(&self) -> &dyn Source {
        match self {
            SourceSpec::File(s) => s,
            SourceSpec::Package(s) => s,
            SourceSpec::Git(s) => s,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub sources: Vec<SourceSpec>,
}

impl Manifest {
    pub fn from_ron(text: &str, path: &Path) -> Result<Self, FetchError> {
        ron::from_str(text).map_err(|e| FetchError::ManifestError(path.to_path_buf(), e))
    }

    pub fn load(path: &Path) -> Result<Self, FetchError> {
        let text = fs::read_to_string(path).at(path)?;
        Manifest::from_ron(&text, path)
    }
}
