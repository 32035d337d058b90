//! Native (gdb) and Java (jdb) debugging of the test application.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::adb::Adb;
use crate::error::ToolError;
use crate::launch::NATIVE_ACTIVITY;
use crate::process::{execute, execute_output, Invocation};

pub const DEVICE_GDBSERVER: &str = "/data/local/tmp/gdbserver";

/// How long a freshly launched app gets to show up in `pidof`.
pub const PID_TIMEOUT: Duration = Duration::from_secs(15);
const PID_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Calls `attempt` every `interval` until it succeeds or `timeout` has
/// passed. The error of the last attempt is returned.
pub fn retry<T, E: fmt::Display>(
    timeout: Duration,
    interval: Duration,
    mut attempt: impl FnMut() -> Result<T, E>,
) -> Result<T, E> {
    let deadline = Instant::now() + timeout;
    loop {
        match attempt() {
            Ok(value) => return Ok(value),
            Err(e) if Instant::now() >= deadline => return Err(e),
            Err(e) => {
                debug!("retrying: {}", e);
                thread::sleep(interval);
            }
        }
    }
}

/// First pid in the output of `pidof`.
pub fn parse_pid(output: &str) -> Option<u32> {
    output.split_whitespace().next()?.parse().ok()
}

/// Host gdb commands: symbol search path, then attach to the forwarded port.
pub fn gdb_script(libs: &[PathBuf], port: u16) -> String {
    let paths: Vec<String> = libs.iter().map(|p| p.display().to_string()).collect();
    format!(
        "set solib-search-path {}\ntarget remote :{}\n",
        paths.join(":"),
        port
    )
}

#[derive(Debug, Clone)]
pub struct DebugSession {
    pub adb: Adb,
    pub serial: Option<String>,
    pub package: String,
    pub port: u16,
    pub gdb: PathBuf,
    pub gdbserver: PathBuf,
    /// Host directories holding unstripped native libraries.
    pub libs: Vec<PathBuf>,
}

impl DebugSession {
    fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    pub fn setup_commands(&self) -> Vec<Invocation> {
        let tcp = format!("tcp:{}", self.port);
        vec![
            self.adb.push(self.serial(), &self.gdbserver, DEVICE_GDBSERVER),
            self.adb.shell(self.serial(), ["chmod", "755", DEVICE_GDBSERVER]),
            self.adb.forward(self.serial(), &tcp, &tcp),
            self.adb.launch(self.serial(), &self.package, NATIVE_ACTIVITY, "unused"),
        ]
    }

    pub fn gdbserver_command(&self, pid: u32) -> Invocation {
        self.adb.shell(
            self.serial(),
            vec![
                String::from("run-as"),
                self.package.clone(),
                String::from(DEVICE_GDBSERVER),
                format!(":{}", self.port),
                String::from("--attach"),
                pid.to_string(),
            ],
        )
    }

    pub fn gdb_command(&self, script: &Path) -> Invocation {
        Invocation::new(&self.gdb).arg("-x").arg(script)
    }

    pub fn pid(&self) -> Result<u32, ToolError> {
        let output = execute_output(&self.adb.shell(self.serial(), ["pidof", self.package.as_str()]))?;
        parse_pid(&output).ok_or_else(|| {
            ToolError::IOError(
                format!("pidof {}", self.package),
                std::io::Error::new(std::io::ErrorKind::NotFound, "application is not running"),
            )
        })
    }

    /// Polls `pidof` until the app is running or `timeout` has passed.
    pub fn wait_for_pid(&self, timeout: Duration) -> Result<u32, ToolError> {
        retry(timeout, PID_POLL_INTERVAL, || self.pid())
    }

    /// Starts the app, attaches gdbserver to it and runs gdb on the host
    /// until it exits.
    pub fn run(&self, work_dir: &Path) -> Result<(), ToolError> {
        for cmd in self.setup_commands() {
            execute(&cmd)?;
        }
        let pid = self.wait_for_pid(PID_TIMEOUT)?;
        info!("Attaching to {} (pid {})", self.package, pid);
        let mut server = self.gdbserver_command(pid).spawn()?;

        let script = work_dir.join("gdb-commands.txt");
        let result = fs::write(&script, gdb_script(&self.libs, self.port))
            .map_err(|e| ToolError::IOError(script.display().to_string(), e))
            .and_then(|()| execute(&self.gdb_command(&script)));

        if let Err(e) = server.kill() {
            warn!("failed to stop gdbserver: {}", e);
        }
        let _ = server.wait();
        result
    }
}

/// Forwards the JDWP channel of `pid` and attaches jdb to it.
pub fn jdb_commands(adb: &Adb, serial: Option<&str>, pid: u32, port: u16) -> Vec<Invocation> {
    vec![
        adb.forward(serial, &format!("tcp:{}", port), &format!("jdwp:{}", pid)),
        Invocation::new("jdb").arg("-connect").arg(format!(
            "com.sun.jdi.SocketAttach:hostname=localhost,port={}",
            port
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pids() {
        assert_eq!(parse_pid("1234\n"), Some(1234));
        assert_eq!(parse_pid("1234 5678\n"), Some(1234));
        assert_eq!(parse_pid(""), None);
    }
}
