//! Node handles and the small value types shared across the host contract.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle to a node in the host scene.
///
/// Handles are the only identity the toolkit relies on; node names are
/// mutable labels and may collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Coarse node classification used for type gating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// An object set.
    Set,
    /// A transform (may parent meshes and other transforms).
    Transform,
    /// A mesh shape.
    Mesh,
    /// A set partition enforcing disjoint membership.
    Partition,
    /// A surface shader.
    Shader,
    /// A file texture node.
    Texture,
    /// Anything else.
    Other,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeType::Set => "set",
            NodeType::Transform => "transform",
            NodeType::Mesh => "mesh",
            NodeType::Partition => "partition",
            NodeType::Shader => "shader",
            NodeType::Texture => "texture",
            NodeType::Other => "other",
        };
        f.write_str(name)
    }
}

/// Linear RGB triple, each component in `[0, 1]`.
pub type Rgb = [f64; 3];

/// Options for [`Host::export_cache`](crate::Host::export_cache).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheOptions {
    /// The single frame written.
    pub frame: i32,
    /// Write UV sets.
    pub uv_write: bool,
    /// Only attributes whose name starts with one of these prefixes are written.
    pub attr_prefixes: Vec<String>,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            frame: 0,
            uv_write: true,
            attr_prefixes: vec!["surfacing_".to_string()],
        }
    }
}

impl CacheOptions {
    /// Returns `true` if `attribute` passes the prefix filter.
    pub fn exports_attribute(&self, attribute: &str) -> bool {
        self.attr_prefixes
            .iter()
            .any(|prefix| attribute.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_filter() {
        let options = CacheOptions::default();
        assert!(options.exports_attribute("surfacing_project"));
        assert!(options.exports_attribute("surfacing_object"));
        assert!(!options.exports_attribute("visibility"));
    }

    #[test]
    fn test_empty_prefix_list_exports_nothing() {
        let options = CacheOptions {
            attr_prefixes: Vec::new(),
            ..Default::default()
        };
        assert!(!options.exports_attribute("surfacing_project"));
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId(12).to_string(), "#12");
        assert_eq!(NodeType::Partition.to_string(), "partition");
    }
}
