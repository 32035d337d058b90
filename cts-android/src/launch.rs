//! Starting test runs on a device.

use std::path::Path;

use log::info;

use crate::adb::Adb;
use crate::error::ToolError;
use crate::process::{execute, Invocation};

pub const NATIVE_ACTIVITY: &str = "android.app.NativeActivity";
pub const DEVICE_CASE_LIST: &str = "/sdcard/dEQP-caselist.txt";
pub const DEVICE_LOG: &str = "/sdcard/TestLog.qpa";

/// Test binary arguments for a case list already pushed to the device.
pub fn test_command_line(extra: &[String]) -> String {
    let mut args = vec![
        String::from("unused"),
        format!("--deqp-caselist-file={}", DEVICE_CASE_LIST),
        format!("--deqp-log-filename={}", DEVICE_LOG),
    ];
    args.extend(extra.iter().cloned());
    args.join(" ")
}

/// Pushes `case_list` and starts the native activity of `package`.
pub fn launch_commands(
    adb: &Adb,
    serial: Option<&str>,
    package: &str,
    case_list: &Path,
    extra: &[String],
) -> Vec<Invocation> {
    vec![
        adb.push(serial, case_list, DEVICE_CASE_LIST),
        adb.shell(serial, ["rm", "-f", DEVICE_LOG]),
        adb.launch(serial, package, NATIVE_ACTIVITY, &test_command_line(extra)),
    ]
}

pub fn launch(adb: &Adb, serial: Option<&str>, package: &str, case_list: &Path, extra: &[String]) -> Result<(), ToolError> {
    info!("Launching {} with {}", package, case_list.display());
    for cmd in launch_commands(adb, serial, package, case_list, extra) {
        execute(&cmd)?;
    }
    info!("Test log will be written to {}", DEVICE_LOG);
    Ok(())
}
