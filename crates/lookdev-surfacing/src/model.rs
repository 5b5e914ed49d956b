//! Root → Project → Object → mesh-transform hierarchy over host sets.
//!
//! Typing is carried by marker attributes: a set is a project because it has
//! [`PROJECT_MARKER`], an object because it has [`OBJECT_MARKER`]. Identity is
//! always the host handle; names are labels the user can change at any time.

use std::path::Path;

use lookdev_host::{Host, NodeId, NodeType};
use tracing::{debug, info};

use crate::error::{SurfacingError, SurfacingResult};

/// Marker on the single root set. Its value is the export directory.
pub const ROOT_MARKER: &str = "surfacing_root";
/// Marker on project sets, and on mesh transforms naming their project.
pub const PROJECT_MARKER: &str = "surfacing_project";
/// Marker on object sets, and on mesh transforms naming their object.
pub const OBJECT_MARKER: &str = "surfacing_object";
/// Marker on the partition that keeps objects disjoint.
pub const PARTITION_MARKER: &str = "surfacing_partition";

/// Name given to the root set on creation.
pub const ROOT_NAME: &str = "surfacing_root";
/// Name given to the partition on creation.
pub const PARTITION_NAME: &str = "surfacing_partition";
/// Name of a project created without an explicit name.
pub const DEFAULT_PROJECT_NAME: &str = "project";
/// Name of an object created without an explicit name.
pub const DEFAULT_OBJECT_NAME: &str = "object";

/// The root set holding every project.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Root(pub NodeId);

/// A surfacing project set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Project(pub NodeId);

/// A surfacing object set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfacingObject(pub NodeId);

/// Stateless view of the surfacing data in a host scene.
pub struct Surfacing<'h, H: Host + ?Sized> {
    pub(crate) host: &'h mut H,
}

impl<'h, H: Host + ?Sized> Surfacing<'h, H> {
    /// Wrap a host scene.
    pub fn new(host: &'h mut H) -> Self {
        Self { host }
    }

    /// The wrapped host.
    pub fn host(&self) -> &H {
        &*self.host
    }

    /// The wrapped host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut *self.host
    }

    // -----------------------------------------------------------------------
    // Root
    // -----------------------------------------------------------------------

    /// The root set, if one exists.
    pub fn find_root(&self) -> SurfacingResult<Option<Root>> {
        let roots = self.host.find_sets_with_marker(ROOT_MARKER)?;
        match roots.as_slice() {
            [] => Ok(None),
            [root] => Ok(Some(Root(*root))),
            _ => Err(SurfacingError::AmbiguousRoot(roots.len())),
        }
    }

    /// Return the root set, creating it on first use.
    ///
    /// # Errors
    ///
    /// [`SurfacingError::AmbiguousRoot`] if the scene holds more than one root.
    pub fn ensure_root(&mut self) -> SurfacingResult<Root> {
        if let Some(root) = self.find_root()? {
            return Ok(root);
        }
        let set = self.host.create_set(ROOT_NAME)?;
        self.host.set_marker(set, ROOT_MARKER, "")?;
        info!("created surfacing root {}", self.host.name(set)?);
        Ok(Root(set))
    }

    /// Bootstrap a scene: make sure a root exists and, if it is empty, give it
    /// a default project, then validate.
    pub fn init_scene(&mut self) -> SurfacingResult<Root> {
        let root = self.ensure_root()?;
        if self.host.members(root.0)?.is_empty() {
            self.create_project(None)?;
        }
        self.validate()?;
        Ok(root)
    }

    /// Export directory stored on the root, empty if never set.
    pub fn export_path(&mut self) -> SurfacingResult<String> {
        let root = self.ensure_root()?;
        Ok(self.host.get_marker(root.0, ROOT_MARKER)?.unwrap_or_default())
    }

    /// Store the export directory on the root. The path must be valid UTF-8.
    pub fn set_export_path(&mut self, dir: &Path) -> SurfacingResult<()> {
        let text = dir
            .to_str()
            .ok_or_else(|| SurfacingError::NonUtf8Path(dir.to_path_buf()))?;
        let root = self.ensure_root()?;
        self.host.set_marker(root.0, ROOT_MARKER, text)?;
        info!("export path set to {}", dir.display());
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    /// Create a project named `name` (default `"project"`) with one default
    /// object, add it to the root, and refresh the partition.
    pub fn create_project(&mut self, name: Option<&str>) -> SurfacingResult<Project> {
        let root = self.ensure_root()?;
        let set = self
            .host
            .create_set(name.unwrap_or(DEFAULT_PROJECT_NAME))?;
        self.host.set_marker(set, PROJECT_MARKER, "")?;
        let project = Project(set);
        self.insert_object(project, None)?;
        self.host.add_members(root.0, &[set])?;
        self.rebuild_partition()?;
        info!("created surfacing project {}", self.host.name(set)?);
        Ok(project)
    }

    /// Delete a project and every object in it. Meshes stay in the scene.
    pub fn delete_project(&mut self, project: Project) -> SurfacingResult<()> {
        if !self.is_project(project.0)? {
            return Err(SurfacingError::InvalidProject(self.label(project.0)));
        }
        let name = self.host.name(project.0)?;
        for object in self.objects(project)? {
            self.host.delete(object.0)?;
        }
        self.host.delete(project.0)?;
        self.rebuild_partition()?;
        info!("deleted surfacing project {}", name);
        Ok(())
    }

    /// Projects that are direct members of the root, in membership order.
    pub fn projects(&mut self) -> SurfacingResult<Vec<Project>> {
        let root = self.ensure_root()?;
        let mut projects = Vec::new();
        for member in self.host.members(root.0)? {
            if self.is_project(member)? {
                projects.push(Project(member));
            }
        }
        Ok(projects)
    }

    /// Returns `true` if `node` is a set carrying the project marker.
    pub fn is_project(&self, node: NodeId) -> SurfacingResult<bool> {
        self.is_marked_set(node, PROJECT_MARKER)
    }

    // -----------------------------------------------------------------------
    // Objects
    // -----------------------------------------------------------------------

    /// Create an object under `project` and refresh the partition.
    ///
    /// # Errors
    ///
    /// [`SurfacingError::InvalidParent`] if `project` is not a project.
    pub fn create_object(
        &mut self,
        project: Project,
        name: Option<&str>,
    ) -> SurfacingResult<SurfacingObject> {
        self.ensure_root()?;
        if !self.is_project(project.0)? {
            return Err(SurfacingError::InvalidParent(self.label(project.0)));
        }
        let object = self.insert_object(project, name)?;
        self.rebuild_partition()?;
        Ok(object)
    }

    /// Delete an object set. Its meshes stay in the scene.
    pub fn delete_object(&mut self, object: SurfacingObject) -> SurfacingResult<()> {
        if !self.is_object(object.0)? {
            return Err(SurfacingError::InvalidObject(self.label(object.0)));
        }
        let name = self.host.name(object.0)?;
        self.host.delete(object.0)?;
        self.rebuild_partition()?;
        info!("deleted surfacing object {}", name);
        Ok(())
    }

    /// Objects that are direct members of `project`, in membership order.
    /// Anything that is not a project yields no objects.
    pub fn objects(&self, project: Project) -> SurfacingResult<Vec<SurfacingObject>> {
        if !self.is_project(project.0)? {
            return Ok(Vec::new());
        }
        let mut objects = Vec::new();
        for member in self.host.members(project.0)? {
            if self.is_object(member)? {
                objects.push(SurfacingObject(member));
            }
        }
        Ok(objects)
    }

    /// The project an object belongs to, if any.
    pub fn project_of(&mut self, object: SurfacingObject) -> SurfacingResult<Option<Project>> {
        for project in self.projects()? {
            if self.host.members(project.0)?.contains(&object.0) {
                return Ok(Some(project));
            }
        }
        Ok(None)
    }

    /// Returns `true` if `node` is a set carrying the object marker.
    pub fn is_object(&self, node: NodeId) -> SurfacingResult<bool> {
        self.is_marked_set(node, OBJECT_MARKER)
    }

    /// Resolve `nodes` to their mesh-bearing transforms and add them to
    /// `object`. The partition moves any that belonged to another object.
    ///
    /// Returns the transforms that were added.
    pub fn add_mesh_transforms_to_object(
        &mut self,
        object: SurfacingObject,
        nodes: &[NodeId],
    ) -> SurfacingResult<Vec<NodeId>> {
        if !self.is_object(object.0)? {
            return Err(SurfacingError::InvalidObject(self.label(object.0)));
        }
        let mut transforms: Vec<NodeId> = Vec::new();
        for node in nodes {
            for transform in self.host.mesh_transforms_under(*node)? {
                if !transforms.contains(&transform) {
                    transforms.push(transform);
                }
            }
        }
        if transforms.is_empty() {
            debug!("no mesh transforms found in {} node(s)", nodes.len());
            return Ok(transforms);
        }
        self.host.add_members(object.0, &transforms)?;
        info!(
            "added {} mesh transform(s) to {}",
            transforms.len(),
            self.host.name(object.0)?
        );
        Ok(transforms)
    }

    /// Direct members of an object.
    pub fn mesh_transforms(&self, object: SurfacingObject) -> SurfacingResult<Vec<NodeId>> {
        Ok(self.host.members(object.0)?)
    }

    // -----------------------------------------------------------------------
    // Names
    // -----------------------------------------------------------------------

    /// Current name of a node.
    pub fn name(&self, node: NodeId) -> SurfacingResult<String> {
        Ok(self.host.name(node)?)
    }

    /// Rename a project or object; returns the name the host assigned.
    pub fn rename(&mut self, node: NodeId, new_name: &str) -> SurfacingResult<String> {
        let old = self.host.name(node)?;
        let name = self.host.rename(node, new_name)?;
        info!("renamed {} to {}", old, name);
        Ok(name)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn is_marked_set(&self, node: NodeId, marker: &str) -> SurfacingResult<bool> {
        if !self.host.exists(node) || self.host.type_of(node)? != NodeType::Set {
            return Ok(false);
        }
        Ok(self.host.has_marker(node, marker)?)
    }

    /// Create an object set under `project` without refreshing the partition.
    fn insert_object(
        &mut self,
        project: Project,
        name: Option<&str>,
    ) -> SurfacingResult<SurfacingObject> {
        let set = self
            .host
            .create_set(name.unwrap_or(DEFAULT_OBJECT_NAME))?;
        self.host.set_marker(set, OBJECT_MARKER, "")?;
        self.host.add_members(project.0, &[set])?;
        debug!(
            "created surfacing object {} in {}",
            self.host.name(set)?,
            self.host.name(project.0)?
        );
        Ok(SurfacingObject(set))
    }

    /// Node name for messages, falling back to the handle.
    pub(crate) fn label(&self, node: NodeId) -> String {
        self.host.name(node).unwrap_or_else(|_| node.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lookdev_host::MemoryHost;

    #[test]
    fn test_root_created_lazily_once() {
        let mut host = MemoryHost::new();
        let mut surfacing = Surfacing::new(&mut host);
        assert!(surfacing.find_root().unwrap().is_none());
        let root = surfacing.ensure_root().unwrap();
        assert_eq!(surfacing.ensure_root().unwrap(), root);
        assert_eq!(surfacing.name(root.0).unwrap(), ROOT_NAME);
        assert_eq!(surfacing.export_path().unwrap(), "");
    }

    #[test]
    fn test_ambiguous_root() {
        let mut host = MemoryHost::new();
        for _ in 0..2 {
            let set = host.create_set("root").unwrap();
            host.set_marker(set, ROOT_MARKER, "").unwrap();
        }
        let mut surfacing = Surfacing::new(&mut host);
        assert!(matches!(
            surfacing.ensure_root(),
            Err(SurfacingError::AmbiguousRoot(2))
        ));
        assert!(surfacing.create_project(None).is_err());
    }

    #[test]
    fn test_create_project_with_default_object() {
        let mut host = MemoryHost::new();
        let mut surfacing = Surfacing::new(&mut host);
        let project = surfacing.create_project(None).unwrap();
        assert_eq!(surfacing.name(project.0).unwrap(), DEFAULT_PROJECT_NAME);
        assert_eq!(
            surfacing.host().get_marker(project.0, PROJECT_MARKER).unwrap(),
            Some(String::new())
        );

        let objects = surfacing.objects(project).unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(surfacing.name(objects[0].0).unwrap(), DEFAULT_OBJECT_NAME);
        assert_eq!(surfacing.projects().unwrap(), vec![project]);
        assert_eq!(surfacing.project_of(objects[0]).unwrap(), Some(project));
    }

    #[test]
    fn test_create_object_requires_project() {
        let mut host = MemoryHost::new();
        let stray = host.create_set("stray").unwrap();
        let mut surfacing = Surfacing::new(&mut host);
        let result = surfacing.create_object(Project(stray), Some("hull"));
        assert!(matches!(result, Err(SurfacingError::InvalidParent(name)) if name == "stray"));
    }

    #[test]
    fn test_delete_project_removes_objects_only() {
        let mut host = MemoryHost::new();
        let mesh = host.create_mesh_transform("mesh", 6).unwrap();
        let mut surfacing = Surfacing::new(&mut host);
        let project = surfacing.create_project(Some("A")).unwrap();
        let object = surfacing.objects(project).unwrap()[0];
        surfacing
            .add_mesh_transforms_to_object(object, &[mesh])
            .unwrap();

        surfacing.delete_project(project).unwrap();
        assert!(surfacing.projects().unwrap().is_empty());
        assert!(!surfacing.host().exists(object.0));
        assert!(surfacing.host().exists(mesh));
        assert!(matches!(
            surfacing.delete_project(project),
            Err(SurfacingError::InvalidProject(_))
        ));
    }

    #[test]
    fn test_delete_object_keeps_meshes() {
        let mut host = MemoryHost::new();
        let mesh = host.create_mesh_transform("mesh", 6).unwrap();
        let mut surfacing = Surfacing::new(&mut host);
        let project = surfacing.create_project(Some("A")).unwrap();
        let object = surfacing.create_object(project, Some("hull")).unwrap();
        surfacing
            .add_mesh_transforms_to_object(object, &[mesh])
            .unwrap();

        surfacing.delete_object(object).unwrap();
        assert_eq!(surfacing.objects(project).unwrap().len(), 1);
        assert!(surfacing.host().exists(mesh));
    }

    #[test]
    fn test_add_selection_resolves_hierarchy() {
        let mut host = MemoryHost::new();
        let group = host.create_transform("group", None).unwrap();
        let a = host.create_transform("a", Some(group)).unwrap();
        host.create_mesh("aShape", a, 6).unwrap();
        let b = host.create_transform("b", Some(group)).unwrap();
        host.create_mesh("bShape", b, 6).unwrap();
        let light = host.create_node("light", None).unwrap();

        let mut surfacing = Surfacing::new(&mut host);
        let project = surfacing.create_project(None).unwrap();
        let object = surfacing.objects(project).unwrap()[0];
        let added = surfacing
            .add_mesh_transforms_to_object(object, &[group, a, light])
            .unwrap();
        assert_eq!(added, vec![a, b]);
        assert_eq!(surfacing.mesh_transforms(object).unwrap(), vec![a, b]);
    }

    #[test]
    fn test_add_moves_mesh_between_objects() {
        let mut host = MemoryHost::new();
        let mesh = host.create_mesh_transform("mesh", 6).unwrap();
        let mut surfacing = Surfacing::new(&mut host);
        let project = surfacing.create_project(None).unwrap();
        let first = surfacing.objects(project).unwrap()[0];
        let second = surfacing.create_object(project, Some("deck")).unwrap();

        surfacing
            .add_mesh_transforms_to_object(first, &[mesh])
            .unwrap();
        surfacing
            .add_mesh_transforms_to_object(second, &[mesh])
            .unwrap();
        assert!(surfacing.mesh_transforms(first).unwrap().is_empty());
        assert_eq!(surfacing.mesh_transforms(second).unwrap(), vec![mesh]);
    }

    #[test]
    fn test_add_to_non_object_fails() {
        let mut host = MemoryHost::new();
        let mut surfacing = Surfacing::new(&mut host);
        let project = surfacing.create_project(None).unwrap();
        assert!(matches!(
            surfacing.add_mesh_transforms_to_object(SurfacingObject(project.0), &[]),
            Err(SurfacingError::InvalidObject(_))
        ));
    }

    #[test]
    fn test_export_path_roundtrip() {
        let mut host = MemoryHost::new();
        let mut surfacing = Surfacing::new(&mut host);
        surfacing.set_export_path(Path::new("/tmp/caches")).unwrap();
        assert_eq!(surfacing.export_path().unwrap(), "/tmp/caches");
    }

    #[cfg(unix)]
    #[test]
    fn test_export_path_must_be_utf8() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let mut host = MemoryHost::new();
        let mut surfacing = Surfacing::new(&mut host);
        surfacing.set_export_path(Path::new("/tmp/caches")).unwrap();
        let bad = Path::new(OsStr::from_bytes(b"/tmp/cach\xffes"));
        assert!(matches!(
            surfacing.set_export_path(bad),
            Err(SurfacingError::NonUtf8Path(_))
        ));
        assert_eq!(surfacing.export_path().unwrap(), "/tmp/caches");
    }

    #[test]
    fn test_init_scene_is_idempotent() {
        let mut host = MemoryHost::new();
        let mut surfacing = Surfacing::new(&mut host);
        let root = surfacing.init_scene().unwrap();
        assert_eq!(surfacing.init_scene().unwrap(), root);
        assert_eq!(surfacing.projects().unwrap().len(), 1);
    }

    #[test]
    fn test_rename_allows_collisions_by_handle() {
        let mut host = MemoryHost::new();
        let mut surfacing = Surfacing::new(&mut host);
        let first = surfacing.create_project(Some("A")).unwrap();
        let second = surfacing.create_project(Some("B")).unwrap();
        let assigned = surfacing.rename(second.0, "A").unwrap();
        assert_ne!(assigned, "B");
        assert_eq!(surfacing.projects().unwrap(), vec![first, second]);
    }
}
