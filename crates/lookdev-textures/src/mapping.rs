//! Textureset element → shader plug resolution.

use std::collections::BTreeMap;
use std::fmt;

use lookdev_config::{Config, MaterialMapping};
use tracing::debug;

use crate::fuzzy::token_set_ratio;

/// Where a textureset element connects on the shader.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShaderPlug {
    /// Connect to this shader input.
    Mapped(String),
    /// No configured or similar enough input exists.
    Unmapped,
}

impl ShaderPlug {
    /// The plug name, if mapped.
    pub fn as_mapped(&self) -> Option<&str> {
        match self {
            ShaderPlug::Mapped(plug) => Some(plug),
            ShaderPlug::Unmapped => None,
        }
    }
}

impl fmt::Display for ShaderPlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderPlug::Mapped(plug) => f.write_str(plug),
            ShaderPlug::Unmapped => f.write_str("unmapped"),
        }
    }
}

/// Resolves element names against one shader family's table.
///
/// Exact table hits win. Otherwise every table key and every plug name is
/// scored with [`token_set_ratio`]; the best candidate at or above the
/// threshold wins, ties going to the lexicographically smallest candidate.
#[derive(Clone, Debug)]
pub struct MaterialMapper {
    family: String,
    table: BTreeMap<String, String>,
    /// Candidate name → plug it resolves to.
    candidates: BTreeMap<String, String>,
    threshold: u8,
}

impl MaterialMapper {
    /// Mapper for `family` in `mapping`. An unknown family maps nothing exactly
    /// and has no fuzzy candidates.
    pub fn new(mapping: &MaterialMapping, family: &str, threshold: u8) -> Self {
        let table = mapping.get(family).cloned().unwrap_or_default();
        let mut candidates: BTreeMap<String, String> = table
            .values()
            .map(|plug| (plug.clone(), plug.clone()))
            .collect();
        candidates.extend(table.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self {
            family: family.to_string(),
            table,
            candidates,
            threshold: threshold.min(100),
        }
    }

    /// Mapper for the configured shader family and threshold.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.material_mapping,
            &config.shader_family,
            config.fuzzy_threshold,
        )
    }

    /// Shader family this mapper resolves for.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Minimum fuzzy score accepted.
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Resolve an element name.
    pub fn map(&self, element: &str) -> ShaderPlug {
        if let Some(plug) = self.table.get(element) {
            return ShaderPlug::Mapped(plug.clone());
        }
        match self.fuzzy_match(element) {
            Some((candidate, plug, score)) if score >= self.threshold => {
                debug!(
                    "{} matched {} (score {}) -> {}",
                    element, candidate, score, plug
                );
                ShaderPlug::Mapped(plug.to_string())
            }
            _ => ShaderPlug::Unmapped,
        }
    }

    /// Best scoring candidate as `(candidate, plug, score)`, regardless of the
    /// threshold.
    pub fn fuzzy_match(&self, element: &str) -> Option<(&str, &str, u8)> {
        let mut best: Option<(&str, &str, u8)> = None;
        for (candidate, plug) in &self.candidates {
            let score = token_set_ratio(element, candidate);
            if best.is_none_or(|(_, _, top)| score > top) {
                best = Some((candidate.as_str(), plug.as_str(), score));
            }
        }
        best
    }
}
