use std::{error::Error, path::PathBuf};

use clap::Parser;
use cts_fetch::{Context, HttpDownloader, Manifest, Protocol};
use log::LevelFilter;

/// Fetches and verifies external sources listed in a manifest.
#[derive(Debug, Parser)]
#[command(name = "fetch-sources")]
struct Args {
    /// Source manifest (RON).
    manifest: PathBuf,

    /// Directory sources are fetched into. Defaults to the manifest's directory.
    #[arg(long)]
    outdir: Option<PathBuf>,

    /// Remove fetched content instead of updating it.
    #[arg(long)]
    clean: bool,

    /// Do not verify TLS certificates.
    #[arg(long)]
    insecure: bool,

    /// Protocol for git repositories: https or ssh.
    #[arg(long, default_value = "https")]
    protocol: Protocol,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let manifest = Manifest::load(&args.manifest)?;
    let root = match args.outdir {
        Some(dir) => dir,
        None => args.manifest.parent().map(PathBuf::from).unwrap_or_default(),
    };
    let downloader = HttpDownloader::new(args.insecure)?;
    let ctx = Context {
        root,
        downloader: &downloader,
        protocol: args.protocol,
    };
    cts_fetch::run(&manifest, &ctx, args.clean)?;
    Ok(())
}
