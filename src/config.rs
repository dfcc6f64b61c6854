//! Per-tool JSON config files under `~/.toolbox`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_DIR_ENV: &str = "TOOLBOX_CONFIG_DIR";
const CONFIG_DIR_NAME: &str = ".toolbox";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot determine home directory for config")]
    HomeDirUnavailable,
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// `$TOOLBOX_CONFIG_DIR` if set, otherwise `~/.toolbox`.
pub fn dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR_NAME))
        .ok_or(ConfigError::HomeDirUnavailable)
}

/// Resolves `file` in `dir_override`, or in [`dir`] when none is given.
pub fn path(dir_override: Option<&Path>, file: &str) -> Result<PathBuf, ConfigError> {
    match dir_override {
        Some(dir) => Ok(dir.join(file)),
        None => Ok(dir()?.join(file)),
    }
}

/// Reads `dir/file`. A missing file is `Ok(None)`.
pub fn load_from<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<Option<T>, ConfigError> {
    load_path(dir.join(file))
}

fn load_path<T: DeserializeOwned>(path: PathBuf) -> Result<Option<T>, ConfigError> {
    let data = match fs::read_to_string(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(ConfigError::Read { path, source }),
    };
    serde_json::from_str(&data)
        .map(Some)
        .map_err(|source| ConfigError::Parse { path, source })
}

/// Writes `value` as pretty JSON to `dir/file`, creating `dir` if needed.
pub fn save_to<T: Serialize>(dir: &Path, file: &str, value: &T) -> Result<PathBuf, ConfigError> {
    let path = dir.join(file);
    fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut data = serde_json::to_string_pretty(value)?;
    data.push('\n');
    fs::write(&path, data).map_err(|source| ConfigError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Config is optional: any problem is logged and the defaults are used.
pub fn load_or_default<T: DeserializeOwned + Default>(dir_override: Option<&Path>, file: &str) -> T {
    match path(dir_override, file).and_then(load_path) {
        Ok(Some(config)) => config,
        Ok(None) => {
            log::debug!("No config file {}; using defaults", file);
            T::default()
        }
        Err(e) => {
            log::warn!("Ignoring config: {}", e);
            T::default()
        }
    }
}
