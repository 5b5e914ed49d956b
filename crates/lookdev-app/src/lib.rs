//! Front end of the look-development toolkit.
//!
//! [`panel`] holds the headless controllers behind each tool window; the
//! `lookdev` binary drives the same controllers from the command line against
//! a scene file.

#![warn(missing_docs)]

mod commands;
pub mod panel;

pub use commands::{AppError, AppResult, Cli, ColorAction, Command, Scope, TextureArgs, run};
pub use panel::{
    ListItem, LookdevPanel, MaterialMappingPanel, PanelError, PanelResult, SurfacingPanel,
    TextureRow,
};
