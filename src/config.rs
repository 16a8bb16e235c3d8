use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use fishing_engine::{ConfigError, FishingConfig};
use log::info;
use secrecy::SecretString;

const DATABASE_URL: &str = "sqlite://fishing_game.db";
const FISHING_CONFIG: &str = "my_fishing_game_config.json";
const BUNDLED_FISHING_CONFIG: &str = "fishing_game_config.json";
const FISHING_ASSETS: &str = "FishingGameAssets";
const COMMAND_PREFIX: &str = "!";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Environment variable {name} is not set")]
    EnvVarNotSet {
        source: env::VarError,
        name: &'static str,
    },

    #[error("Could not copy bundled fishing config to {path}")]
    CopyBundled { source: io::Error, path: PathBuf },

    #[error("Could not read fishing config {path}")]
    Read { source: io::Error, path: PathBuf },

    #[error("Could not write fishing config {path}")]
    Write { source: io::Error, path: PathBuf },

    #[error("Fishing config {path} is invalid")]
    Invalid { source: ConfigError, path: PathBuf },
}

/// Deployment settings read from the environment.
#[derive(Debug)]
pub struct Config {
    pub token: SecretString,
    pub database_url: String,
    pub fishing_config: PathBuf,
    pub bundled_config: PathBuf,
    pub assets_dir: PathBuf,
    pub prefix: String,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Ok(Self {
            token: SecretString::new(env_var("DISCORD_TOKEN")?),
            database_url: env_or("DATABASE_URL", DATABASE_URL),
            fishing_config: env_or("FISHING_CONFIG", FISHING_CONFIG).into(),
            bundled_config: BUNDLED_FISHING_CONFIG.into(),
            assets_dir: env_or("FISHING_ASSETS", FISHING_ASSETS).into(),
            prefix: env_or("COMMAND_PREFIX", COMMAND_PREFIX),
        })
    }
}

#[inline]
fn env_var(name: &'static str) -> Result<String, Error> {
    env::var(name).map_err(|source| Error::EnvVarNotSet { source, name })
}

fn env_or(name: &'static str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Seeds the working config from the bundled one on first run.
pub fn ensure_game_config(working: &Path, bundled: &Path) -> Result<(), Error> {
    if working.exists() || !bundled.exists() {
        return Ok(());
    }

    info!(
        "Copying {} to {}",
        bundled.display(),
        working.display()
    );
    fs::copy(bundled, working).map_err(|source| Error::CopyBundled {
        source,
        path: working.to_path_buf(),
    })?;

    Ok(())
}

pub fn load_game_config(path: &Path) -> Result<FishingConfig, Error> {
    let json = fs::read_to_string(path).map_err(|source| Error::Read {
        source,
        path: path.to_path_buf(),
    })?;

    FishingConfig::from_json(&json).map_err(|source| Error::Invalid {
        source,
        path: path.to_path_buf(),
    })
}

pub fn save_game_config(path: &Path, config: &FishingConfig) -> Result<(), Error> {
    let json = config.to_json().map_err(|source| Error::Invalid {
        source,
        path: path.to_path_buf(),
    })?;

    fs::write(path, json).map_err(|source| Error::Write {
        source,
        path: path.to_path_buf(),
    })
}
