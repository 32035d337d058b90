use std::{error::Error, fs, io, io::Write, path::PathBuf, process};

use clap::{Parser, Subcommand};
use cts_log::{csv, read_log, read_must_pass, verify};
use log::{error, info, LevelFilter};

/// Converts and checks conformance test logs.
#[derive(Debug, Parser)]
#[command(name = "cts-log")]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Writes one `case,status,details` row per result.
    LogToCsv {
        log: PathBuf,
        /// Output file. Standard output when absent.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Skip results with a passing status.
        #[arg(long)]
        only_failures: bool,
    },
    /// Checks a log against a mustpass case list.
    Verify {
        log: PathBuf,
        #[arg(long)]
        must_pass: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match args.command {
        Command::LogToCsv {
            log,
            output,
            only_failures,
        } => {
            let test_log = read_log(&log)?;
            let rows = match output {
                Some(path) => {
                    let mut file = io::BufWriter::new(fs::File::create(&path)?);
                    let rows = csv::write_csv(&mut file, &test_log.results, only_failures)?;
                    file.flush()?;
                    rows
                }
                None => csv::write_csv(&mut io::stdout().lock(), &test_log.results, only_failures)?,
            };
            info!("{} of {} results written", rows, test_log.results.len());
        }
        Command::Verify { log, must_pass } => {
            let test_log = read_log(&log)?;
            let cases = read_must_pass(&must_pass)?;
            let verification = verify(&test_log, &cases);
            if verification.is_ok() {
                info!("{}", verification);
            } else {
                error!("{}", verification);
                process::exit(1);
            }
        }
    }
    Ok(())
}
