use std::{error::Error, fs, path::PathBuf};

use clap::Parser;
use log::{debug, info, LevelFilter};
use vk_registry::{Api, ApiVariant};

/// Generates the Vulkan framework inline files from the XML registry.
#[derive(Debug, Parser)]
#[command(name = "gen-framework")]
struct Args {
    /// API variant: vulkan or vulkansc.
    #[arg(short, long, default_value = "vulkan")]
    api: ApiVariant,

    /// Output directory for the generated files.
    #[arg(short, long)]
    outdir: PathBuf,

    /// Path to vk.xml.
    #[arg(short, long)]
    registry: PathBuf,

    /// Directory of extension JSON metadata.
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// Also write the built model as RON.
    #[arg(long, value_name = "FILE")]
    dump_model: Option<PathBuf>,

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

    let (registry, errors) = vk_registry::parse_file(&args.registry)?;
    for error in &errors {
        debug!("non-fatal error while parsing registry: {}", error);
    }
    if !errors.is_empty() {
        info!("{} non-fatal errors while parsing {}", errors.len(), args.registry.display());
    }

    let metadata = match &args.metadata {
        Some(dir) => vk_registry::load_metadata_dir(dir)?,
        None => Vec::new(),
    };
    let mut api = Api::build(&registry, args.api);
    api.post_process(&metadata);

    if let Some(path) = &args.dump_model {
        let config = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .indentor(String::from("  "));
        fs::write(path, ron::ser::to_string_pretty(&api, config)?)?;
    }

    let report = vk_framework_gen::run(&api, &args.outdir)?;
    info!(
        "{} files written, {} unchanged in {}",
        report.written,
        report.unchanged,
        args.outdir.display()
    );
    Ok(())
}
