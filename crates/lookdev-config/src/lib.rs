//! Configuration for the look-development toolkit.
//!
//! Settings persist to disk as a RON file and can be overridden from the
//! command line. Every struct uses `#[serde(default)]` so that older or partial
//! files keep loading as new options are added.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, ExportConfig, MaterialMapping, TextureConfig, default_config_dir,
};
pub use error::ConfigError;
