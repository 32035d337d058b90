//! Android Debug Bridge commands.

use std::path::{Path, PathBuf};
use std::thread;

use log::{error, info};

use crate::error::ToolError;
use crate::process::{execute, execute_output, find_tool, Invocation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub serial: String,
    pub state: String,
}

impl Device {
    /// Only devices in the `device` state accept commands.
    pub fn is_usable(&self) -> bool {
        self.state == "device"
    }
}

/// Parses the output of `adb devices`.
pub fn parse_devices(output: &str) -> Vec<Device> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("List of devices") && !l.starts_with('*'))
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let serial = fields.next()?;
            let state = fields.next()?;
            Some(Device {
                serial: serial.to_string(),
                state: state.to_string(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adb {
    pub path: PathBuf,
}

impl Adb {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Adb { path: path.into() }
    }

    /// `adb` from the SDK platform tools, else from `PATH`.
    pub fn find(sdk: Option<&Path>) -> Result<Self, ToolError> {
        let platform_tools = sdk.map(|sdk| sdk.join("platform-tools"));
        let dirs: Vec<&Path> = platform_tools.iter().map(PathBuf::as_path).collect();
        Ok(Adb::new(find_tool("adb", &dirs)?))
    }

    fn command(&self, serial: Option<&str>) -> Invocation {
        let cmd = Invocation::new(&self.path);
        match serial {
            Some(serial) => cmd.arg("-s").arg(serial),
            None => cmd,
        }
    }

    pub fn devices(&self) -> Result<Vec<Device>, ToolError> {
        let output = execute_output(&self.command(None).arg("devices"))?;
        Ok(parse_devices(&output))
    }

    /// Serials of every usable device.
    pub fn usable_serials(&self) -> Result<Vec<String>, ToolError> {
        Ok(self
            .devices()?
            .into_iter()
            .filter(Device::is_usable)
            .map(|d| d.serial)
            .collect())
    }

    pub fn install(&self, serial: Option<&str>, apk: &Path) -> Invocation {
        self.command(serial).arg("install").arg("-r").arg(apk)
    }

    pub fn uninstall(&self, serial: Option<&str>, package: &str) -> Invocation {
        self.command(serial).arg("uninstall").arg(package)
    }

    pub fn shell<I, S>(&self, serial: Option<&str>, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<std::ffi::OsString>,
    {
        self.command(serial).arg("shell").args(args)
    }

    pub fn push(&self, serial: Option<&str>, local: &Path, remote: &str) -> Invocation {
        self.command(serial).arg("push").arg(local).arg(remote)
    }

    pub fn forward(&self, serial: Option<&str>, local: &str, remote: &str) -> Invocation {
        self.command(serial).arg("forward").arg(local).arg(remote)
    }

    /// Starts `activity` of `package` with the given test command line.
    pub fn launch(&self, serial: Option<&str>, package: &str, activity: &str, cmd_line: &str) -> Invocation {
        let args = vec![
            String::from("am"),
            String::from("start"),
            String::from("-n"),
            format!("{}/{}", package, activity),
            String::from("-e"),
            String::from("cmdLine"),
            format!("\"{}\"", cmd_line),
        ];
        self.shell(serial, args)
    }

    /// Runs the instrumentation runner of `package` and waits for it.
    pub fn instrument(&self, serial: Option<&str>, package: &str, runner: &str, extras: &[(&str, &str)]) -> Invocation {
        let mut args = vec![String::from("am"), String::from("instrument"), String::from("-w")];
        for (key, value) in extras {
            args.push(String::from("-e"));
            args.push(key.to_string());
            args.push(value.to_string());
        }
        args.push(format!("{}/{}", package, runner));
        self.shell(serial, args)
    }
}

/// Runs `action` for every device, on one thread per device when
/// `parallel` is set. Every device is attempted; failures are collected.
pub fn for_each_device<F>(serials: &[String], parallel: bool, action: F) -> Result<(), ToolError>
where
    F: Fn(&str) -> Result<(), ToolError> + Sync,
{
    let results: Vec<(String, Result<(), ToolError>)> = if parallel {
        let action = &action;
        thread::scope(|scope| {
            let handles: Vec<_> = serials
                .iter()
                .map(|serial| (serial, scope.spawn(move || action(serial.as_str()))))
                .collect();
            handles
                .into_iter()
                .map(|(serial, handle)| {
                    let result = handle.join().unwrap_or_else(|_| {
                        Err(ToolError::IOError(
                            serial.clone(),
                            std::io::Error::new(std::io::ErrorKind::Other, "worker thread panicked"),
                        ))
                    });
                    (serial.clone(), result)
                })
                .collect()
        })
    } else {
        serials.iter().map(|s| (s.clone(), action(s.as_str()))).collect()
    };

    let mut failures = Vec::new();
    for (serial, result) in results {
        match result {
            Ok(()) => info!("{}: done", serial),
            Err(e) => {
                error!("{}: {}", serial, e);
                failures.push((serial, e));
            }
        }
    }
    if failures.is_empty() {
        Ok(())
    } else {
        Err(ToolError::DeviceFailures(failures))
    }
}

/// Installs `apk` on each device, replacing any previous install.
pub fn install_to_devices(adb: &Adb, apk: &Path, serials: &[String], parallel: bool) -> Result<(), ToolError> {
    if serials.is_empty() {
        return Err(ToolError::NoDevices);
    }
    info!("Installing {} to {} device(s)", apk.display(), serials.len());
    for_each_device(serials, parallel, |serial| execute(&adb.install(Some(serial), apk)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_list() {
        let output = "* daemon not running; starting now at tcp:5037\n\
                      * daemon started successfully\n\
                      List of devices attached\n\
                      0123456789ABCDEF\tdevice\n\
                      emulator-5554\toffline\n\
                      R58M\tunauthorized\n\n";
        let devices = parse_devices(output);
        assert_eq!(devices.len(), 3);
        assert_eq!(devices[0].serial, "0123456789ABCDEF");
        assert!(devices[0].is_usable());
        assert!(!devices[1].is_usable());
        assert_eq!(devices[2].state, "unauthorized");
    }
}
