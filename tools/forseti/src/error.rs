use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Type alias for [`std::result::Result`] containing a forseti [`enum@Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Enum describing the possible errors that can occur in forseti.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] odal::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Targets(#[from] yolo_targets::Error),

    #[error("Failed to access `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse labels in `{}`", path.display())]
    #[diagnostic(
        code(forseti::labels),
        help("labels are a JSON list of `[xmin, ymin, xmax, ymax, class]` entries")
    )]
    Labels {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Label {index} has class {class}, expected an integer in 0..{num_classes}")]
    #[diagnostic(code(forseti::invalid_class))]
    InvalidClass {
        index: usize,
        class: f32,
        num_classes: usize,
    },

    #[error("Invalid grid `{0}`")]
    #[diagnostic(
        code(forseti::grid),
        help("the grid is written as `<height>x<width>`, e.g. `13x13`")
    )]
    InvalidGrid(String),

    #[error("Failed to write summary")]
    Summary(#[source] serde_json::Error),

    #[error("Failed to serialize config")]
    Serialize(#[source] toml::ser::Error),
}
