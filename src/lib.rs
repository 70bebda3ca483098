pub mod choices;
pub mod cli;
pub mod collection;
pub mod compose;
pub mod config;
pub mod constants;
pub mod font;
pub mod hex;
pub mod normalize;
pub mod pipeline;

use log::info;

use crate::cli::{BuildArgs, Cli, Command};
use crate::config::Config;
use crate::normalize::UnicodeNormalizer;
use crate::pipeline::Pipeline;

pub fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Some(Command::Compose {
            input,
            output,
            height,
        }) => {
            pipeline::compose_file(&input, &output, height, UnicodeNormalizer)?;
        }
        Some(Command::Build(args)) => build(config, &args)?,
        None => build(config, &BuildArgs::default())?,
    }

    Ok(())
}

fn build(config: Config, args: &BuildArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = config.build;
    args.apply(&mut settings);

    let pipeline = Pipeline::new(settings, UnicodeNormalizer);
    let built = pipeline.run()?;

    info!(
        "Built {} font(s) into {}",
        built.len(),
        pipeline.settings().output_dir.display()
    );
    Ok(())
}
