//! Result and Error types for the crate.
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Result containing an error variant from this module.
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration error variants
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// The config file could not be read.
    #[error("Failed to read config file `{}`", path.display())]
    #[diagnostic(code(odal::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML, or does not match the config type.
    #[error("Failed to deserialize config file `{}`", path.display())]
    #[diagnostic(code(odal::deserialize))]
    Deserialize {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The config was deserialized, but holds values that are not allowed.
    #[error("Invalid config `{}`: {reason}", path.display())]
    #[diagnostic(code(odal::validation))]
    Validation { path: PathBuf, reason: String },
}
