//! Surfacing error types.

use std::path::PathBuf;

use lookdev_host::HostError;
use thiserror::Error;

/// Result alias for surfacing operations.
pub type SurfacingResult<T> = Result<T, SurfacingError>;

/// Errors raised by the surfacing model, the validator, and export.
#[derive(Debug, Error)]
pub enum SurfacingError {
    /// A host API call failed.
    #[error("host error: {0}")]
    Host(#[from] HostError),

    /// More than one root set exists in the scene.
    #[error("found {0} surfacing roots, expected at most one")]
    AmbiguousRoot(usize),

    /// An object was requested under something that is not a project.
    #[error("cannot create an object under {0}: not a surfacing project")]
    InvalidParent(String),

    /// The node is not a surfacing project.
    #[error("{0} is not a surfacing project")]
    InvalidProject(String),

    /// The node is not a surfacing object.
    #[error("{0} is not a surfacing object")]
    InvalidObject(String),

    /// The root's export directory is missing or not a directory.
    #[error("export path {} is not an existing directory", .0.display())]
    InvalidExportPath(PathBuf),

    /// The export directory cannot be stored as text.
    #[error("export path {} is not valid UTF-8", .0.display())]
    NonUtf8Path(PathBuf),

    /// The user declined to save a modified scene before a destructive export.
    #[error("scene has unsaved changes")]
    UnsavedChanges,

    /// The scene could not be reopened after a destructive export. The merged
    /// scene is still loaded.
    #[error("failed to reopen {} after export: {source}", .path.display())]
    ReopenFailed {
        /// Scene that should have been reopened.
        path: PathBuf,
        /// Host failure.
        #[source]
        source: HostError,
    },
}
