use std::{error::Error, fs, path::PathBuf};

use clap::{Parser, Subcommand};
use cts_mustpass::{Hierarchy, Project};
use log::{info, LevelFilter};

/// Builds mustpass case lists and Android CTS test descriptions.
#[derive(Debug, Parser)]
#[command(name = "build-mustpass")]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Filters the exhaustive case lists of a project and writes the mustpass.
    Build {
        /// Project description (RON).
        project: PathBuf,
    },
    /// Converts a test hierarchy dump into Android CTS XML.
    CtsXml {
        /// Test package name.
        #[arg(long)]
        name: String,
        hierarchy: PathBuf,
        output: PathBuf,
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
        Command::Build { project } => {
            let project = Project::load(&project)?;
            for report in cts_mustpass::build(&project)? {
                info!("{} written to {}", report.name, report.dir.display());
            }
        }
        Command::CtsXml {
            name,
            hierarchy,
            output,
        } => {
            let text = fs::read_to_string(&hierarchy)?;
            let tree = Hierarchy::parse(&text)?;
            fs::write(&output, tree.to_cts_xml(&name)?)?;
            info!("{} tests written to {}", tree.test_count(), output.display());
        }
    }
    Ok(())
}
