//! Fetches the external sources the conformance suite builds against and
//! verifies them by SHA-256.

pub mod checksum;
pub mod download;
mod error;
pub mod manifest;
pub mod source;

use log::info;

pub use download::{Downloader, HttpDownloader};
pub use error::FetchError;
pub use manifest::{Manifest, SourceSpec};
pub use source::{Context, GitRepo, Protocol, Source, SourceFile, SourcePackage};

/// Updates, or with `clean` removes, every source in order. The first
/// failure aborts the run.
pub fn run(manifest: &Manifest, ctx: &Context<'_>, clean: bool) -> Result<(), FetchError> {
    for spec in &manifest.sources {
        let source = spec.source();
        if clean {
            info!("Cleaning {}", source.name());
            source.clean(ctx)?;
        } else {
            source.update(ctx)?;
        }
    }
    Ok(())
}
