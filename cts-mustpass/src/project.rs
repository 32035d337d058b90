//! Mustpass project description, read from RON.

use std::fs;
use std::path::{Path, PathBuf};

use serde_derive::{Deserialize, Serialize};

use crate::error::{Error, IoContext};
use crate::filter::{Filter, FilterKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    /// Mustpass version written into `mustpass.xml`.
    pub version: String,
    /// Root that exhaustive case lists and filter files are relative to.
    pub src_root: PathBuf,
    /// Root that outputs are written under, one directory per package.
    pub dst_root: PathBuf,
    pub packages: Vec<Package>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub module: Module,
    pub configurations: Vec<Configuration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    /// Exhaustive case list, relative to `src_root`.
    pub case_list: PathBuf,
    /// API name, e.g. `VK` or `EGL`.
    pub api: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub name: String,
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    #[serde(default)]
    pub glconfig: Option<String>,
    #[serde(default)]
    pub rotation: Option<String>,
    #[serde(default)]
    pub surfacetype: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default = "default_true")]
    pub run_by_default: bool,
    /// Write one case list per top-level group.
    #[serde(default)]
    pub split: bool,
}

fn default_true() -> bool {
    true
}

/// A filter and its pattern files, relative to `src_root`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterSpec {
    Include(Vec<PathBuf>),
    Exclude(Vec<PathBuf>),
}

impl FilterSpec {
    pub fn kind(&self) -> FilterKind {
        match self {
            FilterSpec::Include(_) => FilterKind::Include,
            FilterSpec::Exclude(_) => FilterKind::Exclude,
        }
    }

    pub fn files(&self) -> &[PathBuf] {
        match self {
            FilterSpec::Include(files) | FilterSpec::Exclude(files) => files,
        }
    }
}

impl Project {
    pub fn from_ron(text: &str, path: &Path) -> Result<Self, Error> {
        ron::from_str(text).map_err(|e| Error::ProjectError(path.to_path_buf(), e))
    }

    /// Loads a project. Relative roots are resolved against the directory
    /// holding the project file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path).at(path)?;
        let mut project = Project::from_ron(&text, path)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        project.src_root = base.join(&project.src_root);
        project.dst_root = base.join(&project.dst_root);
        Ok(project)
    }

    pub fn load_filters(&self, config: &Configuration) -> Result<Vec<Filter>, Error> {
        config
            .filters
            .iter()
            .map(|spec| {
                let files: Vec<PathBuf> = spec.files().iter().map(|f| self.src_root.join(f)).collect();
                Filter::load(spec.kind(), &files)
            })
            .collect()
    }
}
