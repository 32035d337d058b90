use std::{error::Error, fmt, path::PathBuf};

use vk_registry::ApiVariant;

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .map(PathBuf::from)
        .ok_or(MissingArgumentError("XML_PATH"))?;
    let variant: ApiVariant = args.next().as_deref().unwrap_or("vulkan").parse()?;

    let (registry, errors) = vk_registry::parse_file(&path)?;
    errors.into_iter().for_each(|e| {
        eprintln!("non-fatal error while parsing registry: {}", e);
    });
    let mut api = vk_registry::Api::build(&registry, variant);
    api.post_process(&[]);

    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor(String::from("  "));
    println!("{}", ron::ser::to_string_pretty(&api, config)?);
    Ok(())
}

#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
struct MissingArgumentError<'a>(&'a str);

impl<'a> fmt::Display for MissingArgumentError<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing required argument: {}", self.0)
    }
}

impl<'a> Error for MissingArgumentError<'a> {}
