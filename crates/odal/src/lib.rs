//! Loading of configuration structs from TOML files.
//!
//! A config lives at [`Config::PATH`] inside a main config directory. An overlay directory
//! can hold a partial file at the same relative path, whose values replace those of the
//! main file before deserializing.

pub mod error;


use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use toml::Table;

pub use error::{Error, Result};

pub trait Config: DeserializeOwned {
    /// Path of the config file, relative to the config directory.
    const PATH: &'static str;

    /// Check values that can not be expressed in the type itself.
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }

    /// Load the config from `main_dir`.
    fn load(main_dir: impl AsRef<Path>) -> Result<Self> {
        let path = main_dir.as_ref().join(Self::PATH);
        let table = read_table(&path)?;

        parse(&path, table)
    }

    /// Load the config from `main_dir`, with the values from `overlay_dir` on top.
    ///
    /// The overlay file is optional.
    fn load_with_overlay(
        main_dir: impl AsRef<Path>,
        overlay_dir: impl AsRef<Path>,
    ) -> Result<Self> {
        let path = main_dir.as_ref().join(Self::PATH);
        let main = read_table(&path)?;

        let overlay_path = overlay_dir.as_ref().join(Self::PATH);
        let table = if overlay_path.is_file() {
            generate_config(main, read_table(&overlay_path)?, true)
        } else {
            main
        };

        parse(&path, table)
    }
}

fn parse<T: Config>(path: &Path, table: Table) -> Result<T> {
    let config: T = toml::Value::Table(table)
        .try_into()
        .map_err(|source| Error::Deserialize {
            path: path.to_path_buf(),
            source,
        })?;

    config.validate().map_err(|reason| Error::Validation {
        path: path.to_path_buf(),
        reason,
    })?;

    Ok(config)
}

/// Read a TOML file into a table.
pub fn read_table(path: &Path) -> Result<Table> {
    let contents = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    contents.parse::<Table>().map_err(|source| Error::Deserialize {
        path: path.to_path_buf(),
        source,
    })
}

/// Recursively merge `overlay` on top of `main`.
///
/// Keys that only exist in the overlay are kept if `add_key` is set.
#[must_use]
pub fn generate_config(main: Table, mut overlay: Table, add_key: bool) -> Table {
    let mut generated_toml = Table::new();

    for (k, v) in main {
        let merged = match (v, overlay.remove(&k)) {
            // both are tables, merge them
            (toml::Value::Table(main_table), Some(toml::Value::Table(overlay_table))) => {
                toml::Value::Table(generate_config(main_table, overlay_table, add_key))
            }
            (_, Some(overlay_value)) => overlay_value,
            (main_value, None) => main_value,
        };

        generated_toml.insert(k, merged);
    }

    // whatever is left only exists in the overlay
    if add_key {
        generated_toml.extend(overlay);
    }

    generated_toml
}
