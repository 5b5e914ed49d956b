//! Structured logging for the look-development toolkit.
//!
//! Console output with uptime timestamps and module targets, plus JSON file
//! logging in debug builds. The filter honours `RUST_LOG` first and the
//! configured `log_level` second.

use lookdev_config::Config;
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info";

/// Name of the JSON log file written in debug builds.
pub const LOG_FILE_NAME: &str = "lookdev.log";

/// Initialize the tracing subscriber.
///
/// * `log_dir` - Optional directory for JSON log files (debug builds only)
/// * `debug_build` - Whether this is a debug build (enables file logging)
/// * `config` - Optional configuration to use for log level override
///
/// Calling this twice in one process is harmless; the second call leaves the
/// first subscriber in place. If the log file cannot be created, console
/// logging still starts and a warning names the directory.
///
/// ```no_run
/// use lookdev_log::init_logging;
/// use lookdev_config::Config;
///
/// let config = Config::default();
/// init_logging(None, false, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let filter_str = filter_for(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_timer(fmt::time::uptime());

    let (file_layer, file_error) = match log_dir.filter(|_| debug_build) {
        Some(dir) => match open_log_file(dir) {
            Ok(log_file) => {
                let layer = fmt::layer()
                    .with_writer(log_file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_timer(fmt::time::uptime())
                    .json();
                (Some(layer), None)
            }
            Err(e) => (None, Some((dir, e))),
        },
        None => (None, None),
    };

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_ok();

    if let Some((dir, e)) = file_error {
        tracing::warn!("file logging disabled, cannot write to {}: {}", dir.display(), e);
    }
    if !installed {
        tracing::debug!("a tracing subscriber is already installed, keeping it");
    }
}

/// Create `log_dir` and truncate the JSON log file inside it.
fn open_log_file(log_dir: &Path) -> std::io::Result<std::fs::File> {
    std::fs::create_dir_all(log_dir)?;
    std::fs::File::create(log_dir.join(LOG_FILE_NAME))
}

/// Filter string derived from the config, falling back to [`DEFAULT_FILTER`].
fn filter_for(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.is_empty() => config.debug.log_level.clone(),
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Create an `EnvFilter` with the default filter string.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}
