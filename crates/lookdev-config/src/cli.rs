//! Command-line overrides for the configuration.

use std::path::PathBuf;

use clap::Args;

use crate::Config;

/// Global command-line options shared by every `lookdev` subcommand.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Args, Debug, Clone, Default)]
pub struct CliArgs {
    /// Path to config directory (overrides default location).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Minimum fuzzy score (0-100) for textureset element matching.
    #[arg(long, global = true)]
    pub fuzzy_threshold: Option<u8>,

    /// Smoothing iterations applied on export.
    #[arg(long, global = true)]
    pub subdiv: Option<u32>,

    /// Texture filename template.
    #[arg(long, global = true)]
    pub template: Option<String>,

    /// Shader family used for placeholder and imported materials.
    #[arg(long, global = true)]
    pub shader_family: Option<String>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(threshold) = args.fuzzy_threshold {
            self.fuzzy_threshold = threshold.min(100);
        }
        if let Some(level) = args.subdiv {
            self.export.subdiv_level = level;
        }
        if let Some(ref template) = args.template {
            self.textures.template = template.clone();
        }
        if let Some(ref family) = args.shader_family {
            self.shader_family = family.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            fuzzy_threshold: Some(150),
            subdiv: Some(2),
            shader_family: Some("PxrDisney".to_string()),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.fuzzy_threshold, 100);
        assert_eq!(config.export.subdiv_level, 2);
        assert_eq!(config.shader_family, "PxrDisney");
        // Non-overridden fields retain defaults
        assert_eq!(config.textures.extension, "tif");
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }
}
