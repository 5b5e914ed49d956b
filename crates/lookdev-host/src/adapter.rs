//! The host capability set the surfacing core depends on.

use std::path::{Path, PathBuf};

use crate::error::HostResult;
use crate::node::{CacheOptions, NodeId, NodeType, Rgb};

/// Abstraction over a DCC host scene.
///
/// Every call queries or mutates the live scene; implementations hold no
/// toolkit state of their own. The trait is object safe so panels can hold a
/// `&mut dyn Host`.
///
/// All operations run on the host's main thread and are not re-entrant.
pub trait Host {
    // -----------------------------------------------------------------------
    // Nodes
    // -----------------------------------------------------------------------

    /// Create an empty object set. The host may adjust the name to keep it unique.
    fn create_set(&mut self, name: &str) -> HostResult<NodeId>;

    /// Delete a node. Deleting a transform also deletes its descendants.
    fn delete(&mut self, node: NodeId) -> HostResult<()>;

    /// Rename a node and return the name the host actually assigned.
    fn rename(&mut self, node: NodeId, new_name: &str) -> HostResult<String>;

    /// Current name of a node.
    fn name(&self, node: NodeId) -> HostResult<String>;

    /// Returns `true` if the handle refers to a live node.
    fn exists(&self, node: NodeId) -> bool;

    /// Classify a node.
    fn type_of(&self, node: NodeId) -> HostResult<NodeType>;

    /// All nodes currently carrying `name`, in host traversal order.
    fn find_by_name(&self, name: &str) -> Vec<NodeId>;

    // -----------------------------------------------------------------------
    // Marker attributes
    // -----------------------------------------------------------------------

    /// Write a string attribute, creating it if needed.
    fn set_marker(&mut self, node: NodeId, marker: &str, value: &str) -> HostResult<()>;

    /// Read a string attribute.
    fn get_marker(&self, node: NodeId, marker: &str) -> HostResult<Option<String>>;

    /// Returns `true` if the node carries the attribute.
    fn has_marker(&self, node: NodeId, marker: &str) -> HostResult<bool> {
        Ok(self.get_marker(node, marker)?.is_some())
    }

    // -----------------------------------------------------------------------
    // Sets
    // -----------------------------------------------------------------------

    /// Add members to a set. If the set belongs to a partition, members are
    /// moved out of every other set of that partition.
    fn add_members(&mut self, set: NodeId, members: &[NodeId]) -> HostResult<()>;

    /// Remove members from a set. Non-members are ignored.
    fn remove_members(&mut self, set: NodeId, members: &[NodeId]) -> HostResult<()>;

    /// Direct members of a set, in insertion order.
    fn members(&self, set: NodeId) -> HostResult<Vec<NodeId>>;

    /// Every set carrying `marker`.
    fn find_sets_with_marker(&self, marker: &str) -> HostResult<Vec<NodeId>>;

    // -----------------------------------------------------------------------
    // Hierarchy
    // -----------------------------------------------------------------------

    /// Unique transforms at or below `node` that have at least one mesh child,
    /// in host traversal order. A mesh resolves to its parent transform.
    fn mesh_transforms_under(&self, node: NodeId) -> HostResult<Vec<NodeId>>;

    /// Returns `true` if `node` is a transform with at least one mesh child.
    fn has_mesh_child(&self, node: NodeId) -> HostResult<bool>;

    // -----------------------------------------------------------------------
    // Partitions
    // -----------------------------------------------------------------------

    /// Create an empty partition.
    fn create_partition(&mut self, name: &str) -> HostResult<NodeId>;

    /// Connect a set to a partition. Members already owned by another set of
    /// the partition are dropped from the newly connected set.
    fn connect_object_to_partition(&mut self, partition: NodeId, set: NodeId) -> HostResult<()>;

    /// Every partition carrying `marker`.
    fn find_partitions_with_marker(&self, marker: &str) -> HostResult<Vec<NodeId>>;

    /// Sets connected to a partition.
    fn partition_sets(&self, partition: NodeId) -> HostResult<Vec<NodeId>>;

    /// Disconnect every set from a partition.
    fn disconnect_partition(&mut self, partition: NodeId) -> HostResult<()>;

    // -----------------------------------------------------------------------
    // Geometry and export
    // -----------------------------------------------------------------------

    /// Union the meshes of `transforms` into a single world-level transform
    /// named `target_name`. A single transform is renamed and reparented to
    /// world instead.
    fn merge_meshes(&mut self, transforms: &[NodeId], target_name: &str) -> HostResult<NodeId>;

    /// Apply `level` smoothing iterations (`level >= 1`).
    fn subdivide(&mut self, transform: NodeId, level: u32) -> HostResult<()>;

    /// Write a single-frame geometry cache rooted at `roots`.
    fn export_cache(
        &mut self,
        roots: &[NodeId],
        file_path: &Path,
        options: &CacheOptions,
    ) -> HostResult<()>;

    // -----------------------------------------------------------------------
    // Scene file
    // -----------------------------------------------------------------------

    /// Returns `true` if the scene has unsaved changes.
    fn scene_modified(&self) -> bool;

    /// Path of the currently open scene file, if it was ever saved.
    fn scene_path(&self) -> Option<PathBuf>;

    /// Save the scene to its current path.
    fn save_scene(&mut self) -> HostResult<()>;

    /// Discard the in-memory scene and load `path`.
    fn open_scene(&mut self, path: &Path) -> HostResult<()>;

    // -----------------------------------------------------------------------
    // Look development
    // -----------------------------------------------------------------------

    /// Return the shader named `name`, creating it as `family` if absent.
    ///
    /// An existing shader of another family is switched to `family`. A
    /// non-shader node holding the name is a `WrongType` error.
    fn ensure_shader(&mut self, family: &str, name: &str) -> HostResult<NodeId>;

    /// Set a shader's diffuse color.
    fn set_shader_color(&mut self, shader: NodeId, color: Rgb) -> HostResult<()>;

    /// Return the texture node named `name`, creating it if absent, and point it
    /// at `file_path` with `colorspace`. Fails with `WrongType` if `name`
    /// belongs to a node of another kind.
    fn ensure_texture(&mut self, name: &str, file_path: &str, colorspace: &str)
    -> HostResult<NodeId>;

    /// Connect a texture to a shader input, replacing any previous connection.
    fn connect_texture(&mut self, texture: NodeId, shader: NodeId, plug: &str) -> HostResult<()>;

    /// Assign a shader to mesh-bearing transforms.
    fn assign_shader(&mut self, shader: NodeId, transforms: &[NodeId]) -> HostResult<()>;

    /// Set or clear (`None`) the viewport wireframe color of a transform.
    fn set_wireframe_color(&mut self, transform: NodeId, color: Option<Rgb>) -> HostResult<()>;

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Current selection, in selection order.
    fn selection(&self) -> Vec<NodeId>;

    /// Replace the selection.
    fn select(&mut self, nodes: &[NodeId]) -> HostResult<()>;
}
