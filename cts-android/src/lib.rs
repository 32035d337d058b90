//! Builds the test packages and drives devices over adb.

pub mod adb;
pub mod config;
pub mod debug;
mod error;
pub mod launch;
pub mod native;
pub mod package;
pub mod process;
pub mod step;

pub use adb::{install_to_devices, Adb, Device};
pub use config::{BuildConfig, Platform, Target};
pub use error::ToolError;
pub use process::{execute, execute_output, Invocation};
pub use step::{execute_steps, BuildStep};
