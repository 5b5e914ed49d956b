//! In-memory scene graph implementing the full [`Host`] contract.
//!
//! Nodes live in a `BTreeMap` keyed by [`NodeId`], so iteration order is
//! creation order and doubles as the host traversal order. The whole graph
//! serializes to RON, which is how scenes are saved, reopened, and restored
//! after destructive exports.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adapter::Host;
use crate::cache::{CacheDocument, CachedTransform};
use crate::error::{HostError, HostResult};
use crate::node::{CacheOptions, NodeId, NodeType, Rgb};

// ---------------------------------------------------------------------------
// Node payloads
// ---------------------------------------------------------------------------

/// Shader node state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShaderData {
    /// Shader family, e.g. `PxrSurface`.
    pub family: String,
    /// Diffuse color, if one was set.
    pub color: Option<Rgb>,
    /// Input plug → connected texture node.
    pub inputs: BTreeMap<String, NodeId>,
}

/// File texture node state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextureData {
    /// Image path, possibly containing a tile placeholder.
    pub file_path: String,
    /// Colorspace the image is read in.
    pub colorspace: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
enum NodeKind {
    Set {
        members: Vec<NodeId>,
        partition: Option<NodeId>,
    },
    Transform {
        wireframe: Option<Rgb>,
        shader: Option<NodeId>,
    },
    Mesh {
        faces: u64,
    },
    Partition {
        sets: Vec<NodeId>,
    },
    Shader(ShaderData),
    Texture(TextureData),
    Other,
}

impl NodeKind {
    fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Set { .. } => NodeType::Set,
            NodeKind::Transform { .. } => NodeType::Transform,
            NodeKind::Mesh { .. } => NodeType::Mesh,
            NodeKind::Partition { .. } => NodeType::Partition,
            NodeKind::Shader(_) => NodeType::Shader,
            NodeKind::Texture(_) => NodeType::Texture,
            NodeKind::Other => NodeType::Other,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Node {
    name: String,
    parent: Option<NodeId>,
    #[serde(default)]
    markers: BTreeMap<String, String>,
    kind: NodeKind,
}

/// The serialized form of a scene file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct SceneDocument {
    next_id: u64,
    nodes: BTreeMap<NodeId, Node>,
}

fn wrong_type(node: NodeId, expected: NodeType, actual: NodeType) -> HostError {
    HostError::WrongType {
        node,
        expected,
        actual,
    }
}

// ---------------------------------------------------------------------------
// MemoryHost
// ---------------------------------------------------------------------------

/// A scene held entirely in memory, saved to and opened from RON files.
#[derive(Debug, Default)]
pub struct MemoryHost {
    scene: SceneDocument,
    selection: Vec<NodeId>,
    path: Option<PathBuf>,
    modified: bool,
}

impl MemoryHost {
    /// Creates an empty, unsaved scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a scene file.
    pub fn open(path: &Path) -> HostResult<Self> {
        let mut host = Self::new();
        host.open_scene(path)?;
        Ok(host)
    }

    /// Saves the scene to `path` and makes it the current scene path.
    pub fn save_scene_as(&mut self, path: &Path) -> HostResult<()> {
        self.path = Some(path.to_path_buf());
        self.save_scene()
    }

    /// Creates a transform, parented under `parent` or at world level.
    pub fn create_transform(&mut self, name: &str, parent: Option<NodeId>) -> HostResult<NodeId> {
        if let Some(parent) = parent {
            self.expect_type(parent, NodeType::Transform)?;
        }
        Ok(self.insert(
            name,
            parent,
            NodeKind::Transform {
                wireframe: None,
                shader: None,
            },
        ))
    }

    /// Creates a mesh shape with `faces` polygons under a transform.
    pub fn create_mesh(&mut self, name: &str, parent: NodeId, faces: u64) -> HostResult<NodeId> {
        self.expect_type(parent, NodeType::Transform)?;
        Ok(self.insert(name, Some(parent), NodeKind::Mesh { faces }))
    }

    /// Creates a node of no particular type (a light, a camera, ...).
    pub fn create_node(&mut self, name: &str, parent: Option<NodeId>) -> HostResult<NodeId> {
        if let Some(parent) = parent {
            self.node(parent)?;
        }
        Ok(self.insert(name, parent, NodeKind::Other))
    }

    /// Convenience: a world transform with a single mesh child.
    pub fn create_mesh_transform(&mut self, name: &str, faces: u64) -> HostResult<NodeId> {
        let transform = self.create_transform(name, None)?;
        let shape_name = format!("{}Shape", self.name(transform)?);
        self.create_mesh(&shape_name, transform, faces)?;
        Ok(transform)
    }

    /// Parent of a node, `None` at world level.
    pub fn parent_of(&self, node: NodeId) -> HostResult<Option<NodeId>> {
        Ok(self.node(node)?.parent)
    }

    /// Direct children of a node in creation order.
    pub fn children_of(&self, node: NodeId) -> Vec<NodeId> {
        self.scene
            .nodes
            .iter()
            .filter(|(_, n)| n.parent == Some(node))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Total faces of the meshes directly under a transform.
    pub fn face_count(&self, transform: NodeId) -> HostResult<u64> {
        self.expect_type(transform, NodeType::Transform)?;
        Ok(self
            .children_of(transform)
            .into_iter()
            .filter_map(|child| match self.scene.nodes.get(&child).map(|n| &n.kind) {
                Some(NodeKind::Mesh { faces }) => Some(*faces),
                _ => None,
            })
            .sum())
    }

    /// Viewport wireframe color of a transform.
    pub fn wireframe_color(&self, transform: NodeId) -> HostResult<Option<Rgb>> {
        match &self.node(transform)?.kind {
            NodeKind::Transform { wireframe, .. } => Ok(*wireframe),
            other => Err(wrong_type(transform, NodeType::Transform, other.node_type())),
        }
    }

    /// Shader assigned to a transform.
    pub fn assigned_shader(&self, transform: NodeId) -> HostResult<Option<NodeId>> {
        match &self.node(transform)?.kind {
            NodeKind::Transform { shader, .. } => Ok(*shader),
            other => Err(wrong_type(transform, NodeType::Transform, other.node_type())),
        }
    }

    /// Shader node state.
    pub fn shader(&self, shader: NodeId) -> HostResult<&ShaderData> {
        match &self.node(shader)?.kind {
            NodeKind::Shader(data) => Ok(data),
            other => Err(wrong_type(shader, NodeType::Shader, other.node_type())),
        }
    }

    /// Texture node state.
    pub fn texture(&self, texture: NodeId) -> HostResult<&TextureData> {
        match &self.node(texture)?.kind {
            NodeKind::Texture(data) => Ok(data),
            other => Err(wrong_type(texture, NodeType::Texture, other.node_type())),
        }
    }

    /// Partition a set is connected to.
    pub fn partition_of(&self, set: NodeId) -> HostResult<Option<NodeId>> {
        match &self.node(set)?.kind {
            NodeKind::Set { partition, .. } => Ok(*partition),
            other => Err(wrong_type(set, NodeType::Set, other.node_type())),
        }
    }

    /// Every live node of the given type, in creation order.
    pub fn nodes_of_type(&self, node_type: NodeType) -> Vec<NodeId> {
        self.scene
            .nodes
            .iter()
            .filter(|(_, n)| n.kind.node_type() == node_type)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.scene.nodes.len()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn node(&self, node: NodeId) -> HostResult<&Node> {
        self.scene
            .nodes
            .get(&node)
            .ok_or(HostError::NodeNotFound(node))
    }

    fn node_mut(&mut self, node: NodeId) -> HostResult<&mut Node> {
        self.scene
            .nodes
            .get_mut(&node)
            .ok_or(HostError::NodeNotFound(node))
    }

    fn expect_type(&self, node: NodeId, expected: NodeType) -> HostResult<()> {
        let actual = self.node(node)?.kind.node_type();
        if actual == expected {
            Ok(())
        } else {
            Err(wrong_type(node, expected, actual))
        }
    }

    fn set_members_mut(&mut self, set: NodeId) -> HostResult<&mut Vec<NodeId>> {
        match &mut self.node_mut(set)?.kind {
            NodeKind::Set { members, .. } => Ok(members),
            other => Err(wrong_type(set, NodeType::Set, other.node_type())),
        }
    }

    fn partition_sets_mut(&mut self, partition: NodeId) -> HostResult<&mut Vec<NodeId>> {
        match &mut self.node_mut(partition)?.kind {
            NodeKind::Partition { sets } => Ok(sets),
            other => Err(wrong_type(partition, NodeType::Partition, other.node_type())),
        }
    }

    fn shader_mut(&mut self, shader: NodeId) -> HostResult<&mut ShaderData> {
        match &mut self.node_mut(shader)?.kind {
            NodeKind::Shader(data) => Ok(data),
            other => Err(wrong_type(shader, NodeType::Shader, other.node_type())),
        }
    }

    fn is_taken(&self, name: &str, exclude: Option<NodeId>) -> bool {
        self.scene
            .nodes
            .iter()
            .any(|(id, n)| Some(*id) != exclude && n.name == name)
    }

    /// The node currently called `name`. Names are unique, so there is at most one.
    fn named(&self, name: &str) -> Option<NodeId> {
        self.scene
            .nodes
            .iter()
            .find_map(|(id, n)| (n.name == name).then_some(*id))
    }

    /// `wanted` if free, else its digit-stripped stem plus the smallest free index.
    fn unique_name(&self, wanted: &str, exclude: Option<NodeId>) -> String {
        if !self.is_taken(wanted, exclude) {
            return wanted.to_string();
        }
        let stem = match wanted.trim_end_matches(|c: char| c.is_ascii_digit()) {
            "" => wanted,
            stem => stem,
        };
        let mut index = 1u64;
        loop {
            let candidate = format!("{stem}{index}");
            if !self.is_taken(&candidate, exclude) {
                return candidate;
            }
            index += 1;
        }
    }

    fn insert(&mut self, name: &str, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let name = self.unique_name(if name.is_empty() { "node" } else { name }, None);
        let id = NodeId(self.scene.next_id);
        self.scene.next_id += 1;
        debug!("created {} {} ({})", kind.node_type(), name, id);
        self.scene.nodes.insert(
            id,
            Node {
                name,
                parent,
                markers: BTreeMap::new(),
                kind,
            },
        );
        self.modified = true;
        id
    }

    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            for child in self.children_of(current) {
                found.push(child);
                stack.push(child);
            }
        }
        found
    }

    fn write_scene(&self, path: &Path) -> HostResult<()> {
        let pretty = ron::ser::PrettyConfig::new().depth_limit(4);
        let serialized = ron::ser::to_string_pretty(&self.scene, pretty)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Host implementation
// ---------------------------------------------------------------------------

impl Host for MemoryHost {
    fn create_set(&mut self, name: &str) -> HostResult<NodeId> {
        Ok(self.insert(
            name,
            None,
            NodeKind::Set {
                members: Vec::new(),
                partition: None,
            },
        ))
    }

    fn delete(&mut self, node: NodeId) -> HostResult<()> {
        self.node(node)?;
        let mut doomed = self.descendants(node);
        doomed.push(node);

        for id in &doomed {
            self.scene.nodes.remove(id);
        }
        for n in self.scene.nodes.values_mut() {
            match &mut n.kind {
                NodeKind::Set { members, partition } => {
                    members.retain(|m| !doomed.contains(m));
                    if partition.is_some_and(|p| doomed.contains(&p)) {
                        *partition = None;
                    }
                }
                NodeKind::Partition { sets } => sets.retain(|s| !doomed.contains(s)),
                NodeKind::Transform { shader, .. } => {
                    if shader.is_some_and(|s| doomed.contains(&s)) {
                        *shader = None;
                    }
                }
                NodeKind::Shader(data) => data.inputs.retain(|_, t| !doomed.contains(t)),
                NodeKind::Mesh { .. } | NodeKind::Texture(_) | NodeKind::Other => {}
            }
        }
        self.selection.retain(|s| !doomed.contains(s));
        self.modified = true;
        debug!("deleted {} node(s) rooted at {}", doomed.len(), node);
        Ok(())
    }

    fn rename(&mut self, node: NodeId, new_name: &str) -> HostResult<String> {
        self.node(node)?;
        if new_name.is_empty() {
            return Err(HostError::InvalidOperation(
                "node names cannot be empty".to_string(),
            ));
        }
        let name = self.unique_name(new_name, Some(node));
        self.node_mut(node)?.name = name.clone();
        self.modified = true;
        Ok(name)
    }

    fn name(&self, node: NodeId) -> HostResult<String> {
        Ok(self.node(node)?.name.clone())
    }

    fn exists(&self, node: NodeId) -> bool {
        self.scene.nodes.contains_key(&node)
    }

    fn type_of(&self, node: NodeId) -> HostResult<NodeType> {
        Ok(self.node(node)?.kind.node_type())
    }

    fn find_by_name(&self, name: &str) -> Vec<NodeId> {
        self.scene
            .nodes
            .iter()
            .filter(|(_, n)| n.name == name)
            .map(|(id, _)| *id)
            .collect()
    }

    fn set_marker(&mut self, node: NodeId, marker: &str, value: &str) -> HostResult<()> {
        self.node_mut(node)?
            .markers
            .insert(marker.to_string(), value.to_string());
        self.modified = true;
        Ok(())
    }

    fn get_marker(&self, node: NodeId, marker: &str) -> HostResult<Option<String>> {
        Ok(self.node(node)?.markers.get(marker).cloned())
    }

    fn add_members(&mut self, set: NodeId, members: &[NodeId]) -> HostResult<()> {
        let partition = self.partition_of(set)?;
        for member in members {
            self.node(*member)?;
            if *member == set {
                return Err(HostError::InvalidOperation(format!(
                    "set {set} cannot contain itself"
                )));
            }
        }

        if let Some(partition) = partition {
            for sibling in self.partition_sets(partition)? {
                if sibling == set {
                    continue;
                }
                let sibling_members = self.set_members_mut(sibling)?;
                let before = sibling_members.len();
                sibling_members.retain(|m| !members.contains(m));
                if sibling_members.len() != before {
                    debug!(
                        "partition {} moved {} member(s) from {} to {}",
                        partition,
                        before - sibling_members.len(),
                        sibling,
                        set
                    );
                }
            }
        }

        let own = self.set_members_mut(set)?;
        for member in members {
            if !own.contains(member) {
                own.push(*member);
            }
        }
        self.modified = true;
        Ok(())
    }

    fn remove_members(&mut self, set: NodeId, members: &[NodeId]) -> HostResult<()> {
        self.set_members_mut(set)?
            .retain(|m| !members.contains(m));
        self.modified = true;
        Ok(())
    }

    fn members(&self, set: NodeId) -> HostResult<Vec<NodeId>> {
        match &self.node(set)?.kind {
            NodeKind::Set { members, .. } => Ok(members.clone()),
            other => Err(wrong_type(set, NodeType::Set, other.node_type())),
        }
    }

    fn find_sets_with_marker(&self, marker: &str) -> HostResult<Vec<NodeId>> {
        Ok(self
            .scene
            .nodes
            .iter()
            .filter(|(_, n)| matches!(n.kind, NodeKind::Set { .. }) && n.markers.contains_key(marker))
            .map(|(id, _)| *id)
            .collect())
    }

    fn mesh_transforms_under(&self, node: NodeId) -> HostResult<Vec<NodeId>> {
        let start = self.node(node)?;
        if let NodeKind::Mesh { .. } = start.kind {
            return Ok(start.parent.into_iter().collect());
        }

        let mut found = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if self.has_mesh_child(current)? && !found.contains(&current) {
                found.push(current);
            }
            let mut children = self.children_of(current);
            children.reverse();
            stack.extend(children);
        }
        Ok(found)
    }

    fn has_mesh_child(&self, node: NodeId) -> HostResult<bool> {
        if !matches!(self.node(node)?.kind, NodeKind::Transform { .. }) {
            return Ok(false);
        }
        Ok(self.children_of(node).into_iter().any(|child| {
            matches!(
                self.scene.nodes.get(&child).map(|n| &n.kind),
                Some(NodeKind::Mesh { .. })
            )
        }))
    }

    fn create_partition(&mut self, name: &str) -> HostResult<NodeId> {
        Ok(self.insert(name, None, NodeKind::Partition { sets: Vec::new() }))
    }

    fn connect_object_to_partition(&mut self, partition: NodeId, set: NodeId) -> HostResult<()> {
        self.expect_type(partition, NodeType::Partition)?;
        if let Some(previous) = self.partition_of(set)? {
            if previous == partition {
                return Ok(());
            }
            self.partition_sets_mut(previous)?.retain(|s| *s != set);
        }

        let mut owned = Vec::new();
        for sibling in self.partition_sets(partition)? {
            owned.extend(self.members(sibling)?);
        }
        let members = self.set_members_mut(set)?;
        let before = members.len();
        members.retain(|m| !owned.contains(m));
        let dropped = before - members.len();
        if dropped > 0 {
            debug!(
                "dropped {} member(s) of {} already owned within partition {}",
                dropped, set, partition
            );
        }

        self.partition_sets_mut(partition)?.push(set);
        if let NodeKind::Set {
            partition: slot, ..
        } = &mut self.node_mut(set)?.kind
        {
            *slot = Some(partition);
        }
        self.modified = true;
        Ok(())
    }

    fn find_partitions_with_marker(&self, marker: &str) -> HostResult<Vec<NodeId>> {
        Ok(self
            .scene
            .nodes
            .iter()
            .filter(|(_, n)| {
                matches!(n.kind, NodeKind::Partition { .. }) && n.markers.contains_key(marker)
            })
            .map(|(id, _)| *id)
            .collect())
    }

    fn partition_sets(&self, partition: NodeId) -> HostResult<Vec<NodeId>> {
        match &self.node(partition)?.kind {
            NodeKind::Partition { sets } => Ok(sets.clone()),
            other => Err(wrong_type(partition, NodeType::Partition, other.node_type())),
        }
    }

    fn disconnect_partition(&mut self, partition: NodeId) -> HostResult<()> {
        let sets = std::mem::take(self.partition_sets_mut(partition)?);
        for set in sets {
            if let NodeKind::Set {
                partition: slot, ..
            } = &mut self.node_mut(set)?.kind
            {
                *slot = None;
            }
        }
        self.modified = true;
        Ok(())
    }

    fn merge_meshes(&mut self, transforms: &[NodeId], target_name: &str) -> HostResult<NodeId> {
        let mut sources: Vec<NodeId> = Vec::with_capacity(transforms.len());
        for transform in transforms {
            self.expect_type(*transform, NodeType::Transform)?;
            if !sources.contains(transform) {
                sources.push(*transform);
            }
        }

        match sources.as_slice() {
            [] => Err(HostError::InvalidOperation(
                "merge needs at least one transform".to_string(),
            )),
            [single] => {
                let single = *single;
                self.rename(single, target_name)?;
                self.node_mut(single)?.parent = None;
                self.modified = true;
                debug!("single transform {} renamed for export", single);
                Ok(single)
            }
            _ => {
                let mut faces = 0u64;
                for source in &sources {
                    faces = faces.saturating_add(self.face_count(*source)?);
                }

                // Markers survive the union only where every source agrees.
                let mut shared = self.node(sources[0])?.markers.clone();
                for source in &sources[1..] {
                    let markers = &self.node(*source)?.markers;
                    shared.retain(|key, value| markers.get(key) == Some(&*value));
                }

                let merged = self.create_transform(target_name, None)?;
                self.node_mut(merged)?.markers = shared;
                let shape_name = format!("{}Shape", self.name(merged)?);
                self.create_mesh(&shape_name, merged, faces)?;

                let consumed: Vec<NodeId> = sources
                    .iter()
                    .flat_map(|source| self.children_of(*source))
                    .filter(|child| {
                        matches!(
                            self.scene.nodes.get(child).map(|n| &n.kind),
                            Some(NodeKind::Mesh { .. })
                        )
                    })
                    .collect();
                for shape in consumed {
                    self.delete(shape)?;
                }
                debug!("merged {} transforms into {}", sources.len(), merged);
                Ok(merged)
            }
        }
    }

    fn subdivide(&mut self, transform: NodeId, level: u32) -> HostResult<()> {
        if level == 0 {
            return Err(HostError::InvalidOperation(
                "subdivision level must be at least 1".to_string(),
            ));
        }
        self.expect_type(transform, NodeType::Transform)?;
        let factor = 4u64.saturating_pow(level);
        let mut smoothed = 0;
        for child in self.children_of(transform) {
            if let NodeKind::Mesh { faces } = &mut self.node_mut(child)?.kind {
                *faces = faces.saturating_mul(factor);
                smoothed += 1;
            }
        }
        if smoothed == 0 {
            return Err(HostError::InvalidOperation(format!(
                "transform {transform} has no mesh to subdivide"
            )));
        }
        self.modified = true;
        Ok(())
    }

    fn export_cache(
        &mut self,
        roots: &[NodeId],
        file_path: &Path,
        options: &CacheOptions,
    ) -> HostResult<()> {
        let mut document = CacheDocument {
            frame: options.frame,
            uv_write: options.uv_write,
            roots: Vec::with_capacity(roots.len()),
        };
        for root in roots {
            let node = self.node(*root)?;
            if node.parent.is_some() {
                return Err(HostError::InvalidOperation(format!(
                    "cache root {} is not parented to world",
                    node.name
                )));
            }
            let attributes = node
                .markers
                .iter()
                .filter(|(key, _)| options.exports_attribute(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            document.roots.push(CachedTransform {
                name: node.name.clone(),
                faces: self.face_count(*root)?,
                attributes,
            });
        }
        document.write(file_path)?;
        info!(
            "wrote cache with {} root(s) to {}",
            document.roots.len(),
            file_path.display()
        );
        Ok(())
    }

    fn scene_modified(&self) -> bool {
        self.modified
    }

    fn scene_path(&self) -> Option<PathBuf> {
        self.path.clone()
    }

    fn save_scene(&mut self) -> HostResult<()> {
        let path = self.path.clone().ok_or(HostError::NoScenePath)?;
        self.write_scene(&path)?;
        self.modified = false;
        info!("saved scene to {}", path.display());
        Ok(())
    }

    fn open_scene(&mut self, path: &Path) -> HostResult<()> {
        let contents = std::fs::read_to_string(path)?;
        let scene: SceneDocument = ron::from_str(&contents)?;
        self.scene = scene;
        self.selection.clear();
        self.path = Some(path.to_path_buf());
        self.modified = false;
        info!("opened scene {}", path.display());
        Ok(())
    }

    fn ensure_shader(&mut self, family: &str, name: &str) -> HostResult<NodeId> {
        let Some(existing) = self.named(name) else {
            return Ok(self.insert(
                name,
                None,
                NodeKind::Shader(ShaderData {
                    family: family.to_string(),
                    ..Default::default()
                }),
            ));
        };
        let data = self.shader_mut(existing)?;
        if data.family != family {
            debug!("shader {} changes family {} -> {}", name, data.family, family);
            data.family = family.to_string();
            self.modified = true;
        }
        Ok(existing)
    }

    fn set_shader_color(&mut self, shader: NodeId, color: Rgb) -> HostResult<()> {
        self.shader_mut(shader)?.color = Some(color);
        self.modified = true;
        Ok(())
    }

    fn ensure_texture(
        &mut self,
        name: &str,
        file_path: &str,
        colorspace: &str,
    ) -> HostResult<NodeId> {
        let data = TextureData {
            file_path: file_path.to_string(),
            colorspace: colorspace.to_string(),
        };
        let Some(existing) = self.named(name) else {
            return Ok(self.insert(name, None, NodeKind::Texture(data)));
        };
        match &mut self.node_mut(existing)?.kind {
            NodeKind::Texture(slot) => {
                if *slot != data {
                    *slot = data;
                    self.modified = true;
                }
                Ok(existing)
            }
            other => Err(wrong_type(existing, NodeType::Texture, other.node_type())),
        }
    }

    fn connect_texture(&mut self, texture: NodeId, shader: NodeId, plug: &str) -> HostResult<()> {
        self.expect_type(texture, NodeType::Texture)?;
        if plug.is_empty() {
            return Err(HostError::InvalidOperation(
                "cannot connect to an unnamed plug".to_string(),
            ));
        }
        self.shader_mut(shader)?
            .inputs
            .insert(plug.to_string(), texture);
        self.modified = true;
        Ok(())
    }

    fn assign_shader(&mut self, shader: NodeId, transforms: &[NodeId]) -> HostResult<()> {
        self.expect_type(shader, NodeType::Shader)?;
        for transform in transforms {
            match &mut self.node_mut(*transform)?.kind {
                NodeKind::Transform { shader: slot, .. } => *slot = Some(shader),
                other => {
                    return Err(wrong_type(
                        *transform,
                        NodeType::Transform,
                        other.node_type(),
                    ));
                }
            }
        }
        self.modified = true;
        Ok(())
    }

    fn set_wireframe_color(&mut self, transform: NodeId, color: Option<Rgb>) -> HostResult<()> {
        match &mut self.node_mut(transform)?.kind {
            NodeKind::Transform { wireframe, .. } => *wireframe = color,
            other => {
                return Err(wrong_type(
                    transform,
                    NodeType::Transform,
                    other.node_type(),
                ));
            }
        }
        self.modified = true;
        Ok(())
    }

    fn selection(&self) -> Vec<NodeId> {
        self.selection.clone()
    }

    fn select(&mut self, nodes: &[NodeId]) -> HostResult<()> {
        for node in nodes {
            self.node(*node)?;
        }
        self.selection = nodes.to_vec();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_uniquified() {
        let mut host = MemoryHost::new();
        let a = host.create_set("object").unwrap();
        let b = host.create_set("object").unwrap();
        let c = host.create_set("object").unwrap();
        assert_eq!(host.name(a).unwrap(), "object");
        assert_eq!(host.name(b).unwrap(), "object1");
        assert_eq!(host.name(c).unwrap(), "object2");

        // Renaming onto a taken name strips the digits and picks a free index.
        assert_eq!(host.rename(c, "object1").unwrap(), "object2");
        assert_eq!(host.rename(a, "object2").unwrap(), "object3");
        // Renaming to its own name is a no-op.
        assert_eq!(host.rename(b, "object1").unwrap(), "object1");
    }

    #[test]
    fn test_rename_rejects_empty_name() {
        let mut host = MemoryHost::new();
        let set = host.create_set("set").unwrap();
        assert!(matches!(
            host.rename(set, ""),
            Err(HostError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_mesh_transforms_under_hierarchy() {
        let mut host = MemoryHost::new();
        let group = host.create_transform("group", None).unwrap();
        let a = host.create_transform("a", Some(group)).unwrap();
        host.create_mesh("aShape", a, 6).unwrap();
        let empty = host.create_transform("empty", Some(group)).unwrap();
        let b = host.create_transform("b", Some(empty)).unwrap();
        let b_shape = host.create_mesh("bShape", b, 6).unwrap();
        host.create_mesh("bShapeOrig", b, 6).unwrap();

        assert_eq!(host.mesh_transforms_under(group).unwrap(), vec![a, b]);
        assert_eq!(host.mesh_transforms_under(b_shape).unwrap(), vec![b]);
        assert!(host.mesh_transforms_under(empty).unwrap().contains(&b));
        assert!(!host.has_mesh_child(group).unwrap());
        assert!(host.has_mesh_child(b).unwrap());
    }

    #[test]
    fn test_partition_moves_members() {
        let mut host = MemoryHost::new();
        let mesh = host.create_mesh_transform("mesh", 6).unwrap();
        let first = host.create_set("first").unwrap();
        let second = host.create_set("second").unwrap();
        let partition = host.create_partition("partition").unwrap();
        host.connect_object_to_partition(partition, first).unwrap();
        host.connect_object_to_partition(partition, second).unwrap();

        host.add_members(first, &[mesh]).unwrap();
        host.add_members(second, &[mesh]).unwrap();
        assert!(host.members(first).unwrap().is_empty());
        assert_eq!(host.members(second).unwrap(), vec![mesh]);
    }

    #[test]
    fn test_connect_drops_overlapping_members() {
        let mut host = MemoryHost::new();
        let mesh = host.create_mesh_transform("mesh", 6).unwrap();
        let first = host.create_set("first").unwrap();
        let second = host.create_set("second").unwrap();
        host.add_members(first, &[mesh]).unwrap();
        host.add_members(second, &[mesh]).unwrap();

        let partition = host.create_partition("partition").unwrap();
        host.connect_object_to_partition(partition, first).unwrap();
        host.connect_object_to_partition(partition, second).unwrap();
        assert_eq!(host.members(first).unwrap(), vec![mesh]);
        assert!(host.members(second).unwrap().is_empty());
        assert_eq!(host.partition_sets(partition).unwrap(), vec![first, second]);

        host.disconnect_partition(partition).unwrap();
        assert!(host.partition_sets(partition).unwrap().is_empty());
        assert_eq!(host.partition_of(first).unwrap(), None);
    }

    #[test]
    fn test_sets_without_partition_may_overlap() {
        let mut host = MemoryHost::new();
        let mesh = host.create_mesh_transform("mesh", 6).unwrap();
        let first = host.create_set("first").unwrap();
        let second = host.create_set("second").unwrap();
        host.add_members(first, &[mesh]).unwrap();
        host.add_members(second, &[mesh, mesh]).unwrap();
        assert_eq!(host.members(first).unwrap(), vec![mesh]);
        assert_eq!(host.members(second).unwrap(), vec![mesh]);
    }

    #[test]
    fn test_delete_cleans_references() {
        let mut host = MemoryHost::new();
        let group = host.create_transform("group", None).unwrap();
        let child = host.create_transform("child", Some(group)).unwrap();
        host.create_mesh("childShape", child, 6).unwrap();
        let set = host.create_set("set").unwrap();
        host.add_members(set, &[child]).unwrap();
        host.select(&[child]).unwrap();

        host.delete(group).unwrap();
        assert!(!host.exists(child));
        assert!(host.members(set).unwrap().is_empty());
        assert!(host.selection().is_empty());
        assert_eq!(host.node_count(), 1);
    }

    #[test]
    fn test_delete_partition_clears_set_links() {
        let mut host = MemoryHost::new();
        let set = host.create_set("set").unwrap();
        let partition = host.create_partition("partition").unwrap();
        host.connect_object_to_partition(partition, set).unwrap();
        host.delete(partition).unwrap();
        assert_eq!(host.partition_of(set).unwrap(), None);
    }

    #[test]
    fn test_add_members_type_errors() {
        let mut host = MemoryHost::new();
        let mesh = host.create_mesh_transform("mesh", 6).unwrap();
        assert!(matches!(
            host.add_members(mesh, &[mesh]),
            Err(HostError::WrongType { .. })
        ));
        let set = host.create_set("set").unwrap();
        assert!(matches!(
            host.add_members(set, &[NodeId(999)]),
            Err(HostError::NodeNotFound(_))
        ));
        assert!(host.add_members(set, &[set]).is_err());
    }

    #[test]
    fn test_merge_many_and_single() {
        let mut host = MemoryHost::new();
        let a = host.create_mesh_transform("a", 10).unwrap();
        let b = host.create_mesh_transform("b", 20).unwrap();
        host.set_marker(a, "surfacing_object", "hull").unwrap();
        host.set_marker(b, "surfacing_object", "hull").unwrap();
        host.set_marker(a, "note", "only on a").unwrap();

        let merged = host.merge_meshes(&[a, b], "hull_geo").unwrap();
        assert_eq!(host.name(merged).unwrap(), "hull_geo");
        assert_eq!(host.face_count(merged).unwrap(), 30);
        assert_eq!(host.face_count(a).unwrap(), 0);
        assert_eq!(
            host.get_marker(merged, "surfacing_object").unwrap().as_deref(),
            Some("hull")
        );
        assert_eq!(host.get_marker(merged, "note").unwrap(), None);

        let group = host.create_transform("group", None).unwrap();
        let c = host.create_transform("c", Some(group)).unwrap();
        host.create_mesh("cShape", c, 4).unwrap();
        let single = host.merge_meshes(&[c], "deck_geo").unwrap();
        assert_eq!(single, c);
        assert_eq!(host.name(c).unwrap(), "deck_geo");
        assert_eq!(host.parent_of(c).unwrap(), None);

        assert!(host.merge_meshes(&[], "nothing").is_err());
    }

    #[test]
    fn test_subdivide_multiplies_faces() {
        let mut host = MemoryHost::new();
        let mesh = host.create_mesh_transform("mesh", 6).unwrap();
        host.subdivide(mesh, 2).unwrap();
        assert_eq!(host.face_count(mesh).unwrap(), 96);
        assert!(host.subdivide(mesh, 0).is_err());

        let empty = host.create_transform("empty", None).unwrap();
        assert!(host.subdivide(empty, 1).is_err());
    }

    #[test]
    fn test_export_cache_filters_attributes() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = MemoryHost::new();
        let mesh = host.create_mesh_transform("hull_geo", 12).unwrap();
        host.set_marker(mesh, "surfacing_project", "A").unwrap();
        host.set_marker(mesh, "notes", "skip me").unwrap();

        let path = dir.path().join("A.abc");
        host.export_cache(&[mesh], &path, &CacheOptions::default())
            .unwrap();

        let cache = CacheDocument::read(&path).unwrap();
        let root = cache.root("hull_geo").unwrap();
        assert_eq!(root.faces, 12);
        assert_eq!(root.attributes.len(), 1);
        assert_eq!(root.attributes["surfacing_project"], "A");
    }

    #[test]
    fn test_export_cache_requires_world_roots() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = MemoryHost::new();
        let group = host.create_transform("group", None).unwrap();
        let child = host.create_transform("child", Some(group)).unwrap();
        let result = host.export_cache(
            &[child],
            &dir.path().join("x.abc"),
            &CacheOptions::default(),
        );
        assert!(matches!(result, Err(HostError::InvalidOperation(_))));
    }

    #[test]
    fn test_save_and_reopen_restores_scene() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.ron");
        let mut host = MemoryHost::new();
        assert!(matches!(host.save_scene(), Err(HostError::NoScenePath)));

        let mesh = host.create_mesh_transform("mesh", 6).unwrap();
        assert!(host.scene_modified());
        host.save_scene_as(&path).unwrap();
        assert!(!host.scene_modified());

        host.rename(mesh, "renamed").unwrap();
        host.subdivide(mesh, 1).unwrap();
        assert!(host.scene_modified());

        host.open_scene(&path).unwrap();
        assert!(!host.scene_modified());
        assert_eq!(host.name(mesh).unwrap(), "mesh");
        assert_eq!(host.face_count(mesh).unwrap(), 6);
        assert_eq!(host.scene_path(), Some(path));
    }

    #[test]
    fn test_shader_and_texture_reuse() {
        let mut host = MemoryHost::new();
        let shader = host.ensure_shader("PxrSurface", "hull_mtl").unwrap();
        assert_eq!(host.ensure_shader("PxrSurface", "hull_mtl").unwrap(), shader);

        let texture = host
            .ensure_texture("hull_tex", "/tex/a.<UDIM>.tif", "sRGB")
            .unwrap();
        let again = host
            .ensure_texture("hull_tex", "/tex/b.<UDIM>.tif", "Raw")
            .unwrap();
        assert_eq!(texture, again);
        assert_eq!(host.texture(texture).unwrap().file_path, "/tex/b.<UDIM>.tif");
        assert_eq!(host.texture(texture).unwrap().colorspace, "Raw");

        host.connect_texture(texture, shader, "diffuseColor").unwrap();
        let other = host.ensure_texture("other_tex", "/tex/c.tif", "sRGB").unwrap();
        host.connect_texture(other, shader, "diffuseColor").unwrap();
        assert_eq!(host.shader(shader).unwrap().inputs.len(), 1);
        assert_eq!(host.shader(shader).unwrap().inputs["diffuseColor"], other);
        assert!(host.connect_texture(other, shader, "").is_err());
    }

    #[test]
    fn test_wireframe_and_assignment() {
        let mut host = MemoryHost::new();
        let mesh = host.create_mesh_transform("mesh", 6).unwrap();
        let set = host.create_set("set").unwrap();
        host.set_wireframe_color(mesh, Some([0.1, 0.2, 0.3]))
            .unwrap();
        assert_eq!(host.wireframe_color(mesh).unwrap(), Some([0.1, 0.2, 0.3]));
        host.set_wireframe_color(mesh, None).unwrap();
        assert_eq!(host.wireframe_color(mesh).unwrap(), None);
        assert!(host.set_wireframe_color(set, None).is_err());

        let shader = host.ensure_shader("PxrSurface", "mtl").unwrap();
        host.assign_shader(shader, &[mesh]).unwrap();
        assert_eq!(host.assigned_shader(mesh).unwrap(), Some(shader));
        host.delete(shader).unwrap();
        assert_eq!(host.assigned_shader(mesh).unwrap(), None);
    }

    #[test]
    fn test_shader_family_change_reuses_node() {
        let mut host = MemoryHost::new();
        let shader = host.ensure_shader("PxrSurface", "B_mtl").unwrap();
        let count = host.node_count();
        for _ in 0..2 {
            assert_eq!(host.ensure_shader("PxrDisney", "B_mtl").unwrap(), shader);
        }
        assert_eq!(host.node_count(), count);
        assert_eq!(host.shader(shader).unwrap().family, "PxrDisney");
        assert_eq!(host.name(shader).unwrap(), "B_mtl");
    }

    #[test]
    fn test_ensure_rejects_name_held_by_other_kind() {
        let mut host = MemoryHost::new();
        let mesh = host.create_mesh_transform("A_mtl", 6).unwrap();
        let count = host.node_count();
        for _ in 0..2 {
            match host.ensure_shader("PxrSurface", "A_mtl") {
                Err(HostError::WrongType { node, expected, .. }) => {
                    assert_eq!(node, mesh);
                    assert_eq!(expected, NodeType::Shader);
                }
                other => panic!("expected a type error, got {other:?}"),
            }
        }
        assert!(host.ensure_texture("A_mtl", "/tex/a.tif", "sRGB").is_err());
        assert_eq!(host.node_count(), count);
        assert_eq!(host.find_by_name("A_mtl"), vec![mesh]);
    }
}
