use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::BuildSettings;
use crate::constants::DEFAULT_CELL_HEIGHT;

#[derive(Parser)]
#[command(name = "hexfont-build")]
#[command(version)]
#[command(about = "Build HEX bitmap fonts from FreeDOS CPIDOS codepage fonts", long_about = None)]
#[command(after_help = "\
INPUT:
    The input directory holds one HEX file per CPI file, codepage and size,
    named `{cpi}_{codepage}_{size}.hex`, e.g. `ega.cpx_cp437_16.hex`.

CONFIGURATION:
    Settings are read from ./hexfont.toml, or from hexfont-build/config.toml
    in the user configuration directory. Command line flags take precedence.")]
pub struct Cli {
    /// Configuration file to use instead of the default locations
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge the codepage fonts into one base_{size}.hex per size (default)
    Build(BuildArgs),
    /// Fill in composed glyphs of a single HEX file
    Compose {
        /// HEX file to read
        input: PathBuf,
        /// HEX file to write
        output: PathBuf,
        /// Glyph height of the input in pixels
        #[arg(long, default_value_t = DEFAULT_CELL_HEIGHT)]
        height: u32,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct BuildArgs {
    /// Directory with the per-codepage HEX sources
    #[arg(short, long)]
    pub input_dir: Option<PathBuf>,

    /// Directory to write base_{size}.hex into
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Preferred glyph choices file
    #[arg(long)]
    pub choices: Option<PathBuf>,

    /// Pixel sizes to build (repeatable)
    #[arg(short, long = "size")]
    pub sizes: Vec<u32>,

    /// Skip filling in composed glyphs
    #[arg(long)]
    pub no_compose: bool,
}

impl BuildArgs {
    /// Overrides configured settings with the flags that were given.
    pub fn apply(&self, settings: &mut BuildSettings) {
        if let Some(dir) = &self.input_dir {
            settings.input_dir.clone_from(dir);
        }
        if let Some(dir) = &self.output_dir {
            settings.output_dir.clone_from(dir);
        }
        if let Some(choices) = &self.choices {
            settings.choices.clone_from(choices);
        }
        if !self.sizes.is_empty() {
            settings.sizes.clone_from(&self.sizes);
        }
        if self.no_compose {
            settings.compose = false;
        }
    }
}
