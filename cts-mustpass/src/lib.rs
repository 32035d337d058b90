//! Mustpass case list assembly and Android CTS test descriptions.

pub mod case_list;
mod error;
pub mod filter;
pub mod hierarchy;
pub mod mustpass;
pub mod project;

pub use error::Error;
pub use filter::{apply_filters, Filter, FilterKind, Pattern, PatternUsage};
pub use hierarchy::Hierarchy;
pub use mustpass::{build, build_package, ConfigReport, PackageReport};
pub use project::{Configuration, FilterSpec, Module, Package, Project};
