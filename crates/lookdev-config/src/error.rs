//! Errors raised while loading, validating or saving `config.ron`.

use std::path::PathBuf;

use thiserror::Error;

/// A config file that could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The directory or file could not be written.
    #[error("cannot write {}: {source}", path.display())]
    Write {
        /// Config directory or file path.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The file is not valid RON for [`Config`](crate::Config).
    #[error("{}: {source}", path.display())]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Parser error with its position.
        source: ron::error::SpannedError,
    },

    /// The config could not be serialized.
    #[error("failed to serialize config: {0}")]
    Serialize(#[source] ron::Error),

    /// `fuzzy_threshold` is above 100.
    #[error("fuzzy_threshold {0} is out of range 0-100")]
    ThresholdOutOfRange(u8),

    /// `shader_family` is empty.
    #[error("shader_family must not be empty")]
    MissingShaderFamily,

    /// A `material_mapping` entry has an empty element or plug.
    #[error("material_mapping[{family:?}] maps {element:?} to {plug:?}")]
    EmptyMappingEntry {
        /// Shader family table holding the entry.
        family: String,
        /// Textureset element key.
        element: String,
        /// Shader plug value.
        plug: String,
    },
}
