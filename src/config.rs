use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{
    default_cpi_names, DEFAULT_CELL_HEIGHT, DEFAULT_CHOICES_FILE, DEFAULT_INPUT_DIR,
    DEFAULT_OUTPUT_DIR, DEFAULT_SIZES, PUA_END, PUA_START,
};

const LOCAL_CONFIG_FILE: &str = "hexfont.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub build: BuildSettings,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BuildSettings {
    /// Directory holding the `{cpi}_{codepage}_{size}.hex` sources.
    pub input_dir: PathBuf,
    /// Directory receiving `base_{size}.hex`.
    pub output_dir: PathBuf,
    pub choices: PathBuf,
    /// CPI files in merge order.
    pub cpi_names: Vec<String>,
    pub sizes: Vec<u32>,
    pub cell_height: u32,
    /// Fill in missing code points from canonical equivalents.
    pub compose: bool,
    pub pua_start: u32,
    pub pua_end: u32,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            choices: PathBuf::from(DEFAULT_CHOICES_FILE),
            cpi_names: default_cpi_names(),
            sizes: DEFAULT_SIZES.to_vec(),
            cell_height: DEFAULT_CELL_HEIGHT,
            compose: true,
            pua_start: PUA_START,
            pua_end: PUA_END,
        }
    }
}

impl Config {
    /// Loads the configuration from `path` if one is given, failing if it
    /// cannot be read or parsed. Otherwise the first default location that
    /// exists is used, and an unreadable default file falls back to the
    /// built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::load_default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn load_default() -> Self {
        let config_path = match config_file_path() {
            Some(path) => path,
            None => return Config::default(),
        };

        if !config_path.exists() {
            return Config::default();
        }

        match Self::from_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{}", e);
                Config::default()
            }
        }
    }
}

fn config_file_path() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        Some(local)
    } else {
        dirs::config_dir().map(|dir| dir.join("hexfont-build").join("config.toml"))
    }
}
