// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{ConfigOverrides, RawConfigFile, Settings};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_settings`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Build validated [`Settings`] from an optional config file plus CLI
/// overrides.
///
/// Precedence: command line > config file > built-in defaults.
pub fn load_settings(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Settings> {
    let mut raw = match path {
        Some(path) => load_from_path(path)?,
        None => RawConfigFile::default(),
    };
    raw.apply_overrides(overrides);
    Settings::try_from(raw)
}
