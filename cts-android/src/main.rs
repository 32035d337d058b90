use std::{error::Error, path::PathBuf};

use clap::{Parser, Subcommand};
use cts_android::debug::{jdb_commands, DebugSession};
use cts_android::{execute, execute_steps, install_to_devices, package, Adb, BuildConfig, Target};
use log::{info, LevelFilter};

/// Builds, installs, launches and debugs the test packages.
#[derive(Debug, Parser)]
#[command(name = "deqp-android")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to adb. Searched on PATH when absent.
    #[arg(long, global = true)]
    adb: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Builds native libraries and the package.
    Build {
        /// Package build description (RON).
        #[arg(long)]
        config: PathBuf,
        #[arg(long, default_value = "deqp")]
        target: Target,
        /// Comma-separated ABIs, overriding the description.
        #[arg(long, value_delimiter = ',')]
        abis: Vec<String>,
        #[arg(long)]
        build_root: Option<PathBuf>,
    },
    /// Installs a package on connected devices.
    Install {
        package: PathBuf,
        /// Target device serials. All usable devices when absent.
        #[arg(long)]
        device: Vec<String>,
        /// Install on all devices at the same time.
        #[arg(long)]
        parallel: bool,
    },
    /// Starts a test run from a case list.
    Launch {
        #[arg(long, default_value = "com.drawelements.deqp")]
        package: String,
        #[arg(long)]
        case_list: PathBuf,
        #[arg(long)]
        device: Option<String>,
        /// Extra arguments for the test binary.
        #[arg(last = true)]
        extra: Vec<String>,
    },
    /// Attaches a debugger to the running application.
    Debug {
        #[arg(long)]
        device: Option<String>,
        #[arg(long, default_value = "com.drawelements.deqp")]
        package: String,
        #[arg(long, default_value_t = 5039)]
        port: u16,
        #[arg(long, default_value = "gdb")]
        gdb: PathBuf,
        /// gdbserver binary for the device ABI.
        #[arg(long)]
        gdbserver: Option<PathBuf>,
        /// Directories with unstripped native libraries.
        #[arg(long)]
        libs: Vec<PathBuf>,
        /// Attach jdb to this pid instead of gdb.
        #[arg(long)]
        jdb: Option<u32>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let adb = || match &args.adb {
        Some(path) => Ok(Adb::new(path)),
        None => Adb::find(None),
    };

    match &args.command {
        Command::Build {
            config,
            target,
            abis,
            build_root,
        } => {
            let mut config = BuildConfig::load(config)?;
            if !abis.is_empty() {
                config.check_abis(abis)?;
                config.abis = abis.clone();
            }
            if let Some(root) = build_root {
                config.build_root = root.clone();
            }
            let steps = package::build_steps(&config, *target)?;
            let count = execute_steps(&steps)?;
            info!(
                "{} of {} steps run, built {}",
                count,
                steps.len(),
                package::package_path(&config, *target).display()
            );
        }
        Command::Install {
            package,
            device,
            parallel,
        } => {
            let adb = adb()?;
            let serials = if device.is_empty() {
                adb.usable_serials()?
            } else {
                device.clone()
            };
            install_to_devices(&adb, package, &serials, *parallel)?;
        }
        Command::Launch {
            package,
            case_list,
            device,
            extra,
        } => {
            cts_android::launch::launch(&adb()?, device.as_deref(), package, case_list, extra)?;
        }
        Command::Debug {
            device,
            package,
            port,
            gdb,
            gdbserver,
            libs,
            jdb,
        } => {
            let adb = adb()?;
            if let Some(pid) = jdb {
                for cmd in jdb_commands(&adb, device.as_deref(), *pid, *port) {
                    execute(&cmd)?;
                }
                return Ok(());
            }
            let gdbserver = gdbserver.clone().ok_or("--gdbserver is required for native debugging")?;
            let session = DebugSession {
                adb,
                serial: device.clone(),
                package: package.clone(),
                port: *port,
                gdb: gdb.clone(),
                gdbserver,
                libs: libs.clone(),
            };
            session.run(&std::env::temp_dir())?;
        }
    }
    Ok(())
}
