//! Per-extension JSON metadata kept next to the registry.
//!
//! Each `<EXTENSION_NAME>.json` file looks like:
//!
//! ```json
//! {
//!     "register_extension": { "type": "device", "core": "1.2.0" },
//!     "mandatory_features": {
//!         "VkPhysicalDeviceFooFeaturesEXT": [
//!             { "features": ["foo"], "requirements": ["VK_EXT_foo"] }
//!         ]
//!     }
//! }
//! ```

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde_json::Value;

use crate::api::{Api, ExtensionKind, FeatureRequirement};

#[derive(Debug)]
pub enum MetadataError {
    Io { path: PathBuf, error: io::Error },
    Json { path: PathBuf, error: serde_json::Error },
    Format { path: PathBuf, desc: String },
}

impl fmt::Display for MetadataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataError::Io { path, error } => write!(f, "{}: {}", path.display(), error),
            MetadataError::Json { path, error } => write!(f, "{}: invalid JSON: {}", path.display(), error),
            MetadataError::Format { path, desc } => write!(f, "{}: {}", path.display(), desc),
        }
    }
}

impl std::error::Error for MetadataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MetadataError::Io { error, .. } => Some(error),
            MetadataError::Json { error, .. } => Some(error),
            MetadataError::Format { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtensionMetadata {
    pub name: String,
    pub kind: Option<ExtensionKind>,
    /// Core version the extension was promoted to, as `(major, minor)`.
    pub core: Option<(u32, u32)>,
    pub mandatory_features: Vec<FeatureRequirement>,
}

fn format_error(path: &Path, desc: impl Into<String>) -> MetadataError {
    MetadataError::Format {
        path: path.to_path_buf(),
        desc: desc.into(),
    }
}

fn parse_core_version(text: &str) -> Option<(u32, u32)> {
    let mut parts = text.split('.');
    let major = parts.next()?.trim().parse().ok()?;
    let minor = parts.next()?.trim().parse().ok()?;
    Some((major, minor))
}

/// Parses the metadata of extension `name` from JSON text.
pub fn parse_metadata(name: &str, text: &str, path: &Path) -> Result<ExtensionMetadata, MetadataError> {
    let root: Value = serde_json::from_str(text).map_err(|error| MetadataError::Json {
        path: path.to_path_buf(),
        error,
    })?;
    let root = root
        .as_object()
        .ok_or_else(|| format_error(path, "top level value is not an object"))?;

    let mut metadata = ExtensionMetadata {
        name: name.to_string(),
        ..ExtensionMetadata::default()
    };

    if let Some(register) = root.get("register_extension") {
        if let Some(kind) = register.get("type").and_then(Value::as_str) {
            metadata.kind = Some(
                ExtensionKind::parse(kind)
                    .ok_or_else(|| format_error(path, format!("unknown extension type '{}'", kind)))?,
            );
        }
        if let Some(core) = register.get("core").and_then(Value::as_str) {
            metadata.core = Some(
                parse_core_version(core)
                    .ok_or_else(|| format_error(path, format!("bad core version '{}'", core)))?,
            );
        }
    }

    if let Some(features) = root.get("mandatory_features") {
        let features = features
            .as_object()
            .ok_or_else(|| format_error(path, "mandatory_features is not an object"))?;
        for (struct_name, entries) in features {
            let entries = entries
                .as_array()
                .ok_or_else(|| format_error(path, format!("entry for {} is not an array", struct_name)))?;
            for entry in entries {
                let requirements: Vec<&str> = entry
                    .get("requirements")
                    .and_then(Value::as_array)
                    .map(|r| r.iter().filter_map(Value::as_str).collect())
                    .unwrap_or_default();
                let depends = if requirements.is_empty() {
                    None
                } else {
                    Some(requirements.join("+"))
                };
                let names = entry
                    .get("features")
                    .and_then(Value::as_array)
                    .ok_or_else(|| format_error(path, format!("entry for {} has no features", struct_name)))?;
                for feature in names.iter().filter_map(Value::as_str) {
                    metadata.mandatory_features.push(FeatureRequirement {
                        struct_name: struct_name.clone(),
                        feature: feature.to_string(),
                        depends: depends.clone(),
                    });
                }
            }
        }
    }

    Ok(metadata)
}

/// Reads every `*.json` file in `dir`, sorted by file name.
pub fn load_metadata_dir(dir: &Path) -> Result<Vec<ExtensionMetadata>, MetadataError> {
    let io_error = |error| MetadataError::Io {
        path: dir.to_path_buf(),
        error,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.extension().map_or(false, |e| e == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut result = Vec::new();
    for path in paths {
        let name = match path.file_stem().and_then(|s| s.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        let text = fs::read_to_string(&path).map_err(|error| MetadataError::Io {
            path: path.clone(),
            error,
        })?;
        debug!("loading extension metadata {}", path.display());
        result.push(parse_metadata(&name, &text, &path)?);
    }
    Ok(result)
}

impl Api {
    /// Fills in what the registry leaves out from extension metadata.
    /// Registry data wins where both are present.
    pub(crate) fn merge_metadata(&mut self, metadata: &[ExtensionMetadata]) {
        for m in metadata {
            let ext = match self.extensions.iter_mut().find(|e| e.name == m.name) {
                Some(ext) => ext,
                None => {
                    warn!("metadata for unknown extension {}", m.name);
                    continue;
                }
            };
            if ext.kind.is_none() {
                ext.kind = m.kind;
            }
            if ext.promoted_to.is_none() {
                if let Some((major, minor)) = m.core {
                    ext.promoted_to = Some(format!("VK_VERSION_{}_{}", major, minor));
                }
            }
            for f in &m.mandatory_features {
                if !ext.feature_requirements.contains(f) {
                    ext.feature_requirements.push(f.clone());
                }
            }
        }
    }
}
