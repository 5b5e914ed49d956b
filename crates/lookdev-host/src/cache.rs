//! On-disk geometry cache written by [`MemoryHost`](crate::MemoryHost).

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::HostResult;

/// A single-frame geometry cache.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheDocument {
    /// Sampled frame.
    pub frame: i32,
    /// Whether UVs were written.
    pub uv_write: bool,
    /// One entry per exported root.
    pub roots: Vec<CachedTransform>,
}

/// One exported transform and its geometry summary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CachedTransform {
    /// Transform name at export time.
    pub name: String,
    /// Total faces of the transform's meshes.
    pub faces: u64,
    /// String attributes that passed the prefix filter.
    pub attributes: BTreeMap<String, String>,
}

impl CacheDocument {
    /// Write the cache as RON.
    pub fn write(&self, path: &Path) -> HostResult<()> {
        let pretty = ron::ser::PrettyConfig::new().depth_limit(4);
        let serialized = ron::ser::to_string_pretty(self, pretty)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Read a cache written by [`CacheDocument::write`].
    pub fn read(path: &Path) -> HostResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(ron::from_str(&contents)?)
    }

    /// Find an exported root by name.
    pub fn root(&self, name: &str) -> Option<&CachedTransform> {
        self.roots.iter().find(|root| root.name == name)
    }
}
