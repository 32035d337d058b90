//! This crate parses the Vulkan XML registry and builds the API model the CTS
//! framework generator emits C++ from.
//!
//! Parsing is done by [`parse_file`] or [`parse_stream`], which return a
//! [`Registry`] mirroring the XML together with the recoverable errors found
//! along the way. [`Api::build`] then turns the registry into a
//! cross-referenced model of one API variant, and [`Api::post_process`]
//! applies the per-variant fixups and merges extension metadata. [`load_api`]
//! does all three.

#[cfg(feature = "serialize")]
#[macro_use]
extern crate serde_derive;

mod api;
mod builder;
mod c_decl;
mod depends;
mod metadata;
mod parse;
mod post_process;
mod types;

use log::warn;

pub use api::*;
pub use api::Extension;
pub use c_decl::{normalize_type, parse_declaration, CDecl};
pub use depends::{is_dependency_met, DependsError, DependsExpr};
pub use metadata::{load_metadata_dir, parse_metadata, ExtensionMetadata, MetadataError};
pub use parse::parse_file;
pub use parse::parse_registry_integer;
pub use parse::parse_stream;
pub use types::*;
pub use types::Extension as RegistryExtension;

/// Parses `path`, builds the `variant` model and post-processes it.
///
/// Recoverable parse errors are logged and skipped.
pub fn load_api(path: &std::path::Path, variant: ApiVariant) -> Result<api::Api, FatalError> {
    let (registry, errors) = parse_file(path)?;
    for error in &errors {
        warn!("{}", error);
    }
    let mut api = api::Api::build(&registry, variant);
    api.post_process(&[]);
    Ok(api)
}
