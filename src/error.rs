use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while preparing or writing a dataset.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("missing input: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("malformed label {}:{line}: {message}", path.display())]
    MalformedLabel {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("output dataset directory already exists: {}", path.display())]
    OutputConflict { path: PathBuf },

    #[error("validation sample '{name}' is not an eligible sample")]
    UnknownSample { name: String },

    #[error("manual validation mode needs at least one selected sample")]
    EmptySelection,

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("failed to decode image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to encode image {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to serialize dataset manifest: {0}")]
    Manifest(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
