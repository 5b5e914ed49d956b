//! Surfacing projects: partition a scene's meshes into named projects and
//! objects, keep that partition valid, derive preview colors from names, and
//! export one merged geometry cache per project.
//!
//! All state lives in the host scene. [`Surfacing`] borrows a [`Host`] and
//! queries it fresh on every call; it caches nothing between calls.
//!
//! [`Host`]: lookdev_host::Host

mod color;
mod error;
mod export;
mod model;
mod validate;


pub use color::{ColorScope, color_of, material_name};
pub use error::{SurfacingError, SurfacingResult};
pub use export::{ExportMode, ExportSettings, ExportSummary, SavePrompt};
pub use model::{
    DEFAULT_OBJECT_NAME, DEFAULT_PROJECT_NAME, OBJECT_MARKER, PARTITION_MARKER, PARTITION_NAME,
    PROJECT_MARKER, Project, ROOT_MARKER, ROOT_NAME, Root, Surfacing, SurfacingObject,
};
pub use validate::ValidationReport;
