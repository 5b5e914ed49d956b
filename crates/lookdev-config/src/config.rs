//! Configuration structs with sensible defaults and RON persistence.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Shader family → textureset element → shader plug.
pub type MaterialMapping = BTreeMap<String, BTreeMap<String, String>>;

const CONFIG_FILE: &str = "config.ron";

/// Top-level toolkit configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Exact element-to-plug lookup tables, keyed by shader family.
    pub material_mapping: MaterialMapping,
    /// Minimum token-set ratio (0-100) for a fuzzy element match to count.
    pub fuzzy_threshold: u8,
    /// Shader family used for placeholder and imported materials.
    pub shader_family: String,
    /// Texture discovery and parsing settings.
    pub textures: TextureConfig,
    /// Geometry cache export settings.
    pub export: ExportConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Texture discovery and filename parsing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextureConfig {
    /// Filename template with `{field}` placeholders.
    pub template: String,
    /// Only files whose name contains this extension are considered.
    pub extension: String,
    /// Search sub-directories too.
    pub recursive: bool,
    /// Colorspace assigned when the filename carries none.
    pub default_colorspace: String,
    /// Placeholder the host's texture node expands to tile indices.
    pub tile_token: String,
}

/// Geometry cache export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Smoothing iterations applied to merged geometry (0 = none).
    pub subdiv_level: u32,
    /// Attribute name prefixes written into the cache.
    pub attr_prefixes: Vec<String>,
    /// Write UVs.
    pub uv_write: bool,
    /// The single frame sampled.
    pub frame: i32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            material_mapping: default_material_mapping(),
            fuzzy_threshold: 70,
            shader_family: "PxrSurface".to_string(),
            textures: TextureConfig::default(),
            export: ExportConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            template: "{surfacing_project}_{surfacing_object}_{textureset_element}.{tile_index}.{extension}"
                .to_string(),
            extension: "tif".to_string(),
            recursive: true,
            default_colorspace: "sRGB".to_string(),
            tile_token: "<UDIM>".to_string(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            subdiv_level: 1,
            attr_prefixes: vec!["surfacing_".to_string()],
            uv_write: true,
            frame: 0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

fn default_material_mapping() -> MaterialMapping {
    let pxr_surface: BTreeMap<String, String> = [
        ("baseColor", "diffuseColor"),
        ("diffuse", "diffuseColor"),
        ("specular", "specularFaceColor"),
        ("specularColor", "specularFaceColor"),
        ("roughness", "specularRoughness"),
        ("metallic", "specularEdgeColor"),
        ("normal", "bumpNormal"),
        ("bump", "bumpNormal"),
        ("height", "bumpNormal"),
        ("emission", "glowColor"),
        ("opacity", "presence"),
        ("coat_color", "clearcoatFaceColor"),
        ("coat_roughness", "clearcoatRoughness"),
        ("subsurface_color", "subsurfaceColor"),
    ]
    .into_iter()
    .map(|(element, plug)| (element.to_string(), plug.to_string()))
    .collect();

    let mut mapping = MaterialMapping::new();
    mapping.insert("PxrSurface".to_string(), pxr_surface);
    mapping
}

/// Platform config directory for the toolkit, e.g. `~/.config/lookdev`.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lookdev")
}

// --- Load / Save / Validate ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    ///
    /// A loaded file must pass [`Config::validate`].
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
                    path: config_path.clone(),
                    source,
                })?;
            let config: Config = ron::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: config_path.clone(),
                source,
            })?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&config_path, serialized).map_err(|source| ConfigError::Write {
            path: config_path,
            source,
        })?;
        Ok(())
    }

    /// Reject values the texture mapper and shader creation cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fuzzy_threshold > 100 {
            return Err(ConfigError::ThresholdOutOfRange(self.fuzzy_threshold));
        }
        if self.shader_family.trim().is_empty() {
            return Err(ConfigError::MissingShaderFamily);
        }
        for (family, table) in &self.material_mapping {
            if let Some((element, plug)) = table
                .iter()
                .find(|(element, plug)| element.is_empty() || plug.is_empty())
            {
                return Err(ConfigError::EmptyMappingEntry {
                    family: family.clone(),
                    element: element.clone(),
                    plug: plug.clone(),
                });
            }
        }
        Ok(())
    }

    /// Exact plug lookup for `element` in the table of `family`.
    pub fn mapped_plug(&self, family: &str, element: &str) -> Option<&str> {
        self.material_mapping
            .get(family)
            .and_then(|table| table.get(element))
            .map(String::as_str)
    }
}
