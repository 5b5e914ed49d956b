//! `lookdev`: manage surfacing projects, import textures and export caches
//! from the command line.
//!
//! Run with: `cargo run -p lookdev-app -- --scene shot.ron init`

use std::process::ExitCode;

use clap::Parser;
use lookdev_app::Cli;
use lookdev_config::{Config, default_config_dir};
use tracing::{error, info, warn};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_dir = cli.args.config.clone().unwrap_or_else(default_config_dir);
    let (mut config, load_error) = match Config::load_or_create(&config_dir) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    config.apply_cli_overrides(&cli.args);

    // Initialize structured logging.
    lookdev_log::init_logging(Some(&config_dir), cfg!(debug_assertions), Some(&config));

    if let Some(e) = load_error {
        warn!("using default config: {}", e);
    }
    info!("lookdev {} | scene: {}", env!("CARGO_PKG_VERSION"), cli.scene.display());

    let mut stdout = std::io::stdout().lock();
    match lookdev_app::run(&cli, &config, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
