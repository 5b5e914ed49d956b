//! Texture parsing and import errors.

use std::path::PathBuf;

use lookdev_host::HostError;
use lookdev_surfacing::SurfacingError;
use thiserror::Error;

/// Result alias for texture operations.
pub type TextureResult<T> = Result<T, TextureError>;

/// Errors raised while discovering, parsing, grouping or importing textures.
#[derive(Debug, Error)]
pub enum TextureError {
    /// The filename template itself is malformed.
    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    /// A file path does not match the template.
    #[error("{path} does not match template {template}")]
    TemplateMismatch {
        /// Offending path.
        path: String,
        /// Template source text.
        template: String,
    },

    /// The captured tile index is not a number.
    #[error("{path}: tile index {value:?} is not numeric")]
    InvalidTileIndex {
        /// Offending path.
        path: String,
        /// Captured tile index text.
        value: String,
    },

    /// A texture path cannot be stored as text on a texture node.
    #[error("{} is not valid UTF-8", .0.display())]
    NonUtf8Path(PathBuf),

    /// The texture search root is not a directory.
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// Filesystem error during discovery.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A host call failed during import.
    #[error("host error: {0}")]
    Host(#[from] HostError),

    /// The surfacing model could not be queried during import.
    #[error("surfacing error: {0}")]
    Surfacing(#[from] SurfacingError),
}
