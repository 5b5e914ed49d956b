//! Headless panel controllers.
//!
//! Each panel holds the state a tool window would show (lists, checkboxes,
//! text fields) and exposes one method per button. A panel built without a
//! host adapter is disabled: it still constructs, but every action returns
//! [`PanelError::Unavailable`].

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use lookdev_config::Config;
use lookdev_host::{Host, HostError, NodeId};
use lookdev_surfacing::{
    ColorScope, ExportMode, ExportSettings, ExportSummary, Project, SavePrompt, Surfacing,
    SurfacingError, SurfacingObject, ValidationReport,
};
use lookdev_textures::{
    GroupBy, GroupedTextureRecord, ImportReport, ImportSettings, TextureError, scan_textures,
};
use thiserror::Error;
use tracing::{debug, info};

/// Result alias for panel actions.
pub type PanelResult<T> = Result<T, PanelError>;

/// Errors returned by panel actions.
#[derive(Debug, Error)]
pub enum PanelError {
    /// The panel was built without a host adapter.
    #[error("no host application available")]
    Unavailable,

    /// The action needs a selected list entry.
    #[error("no {0} selected")]
    NothingSelected(&'static str),

    /// The surfacing model rejected the action.
    #[error(transparent)]
    Surfacing(#[from] SurfacingError),

    /// Texture scan or import failed.
    #[error(transparent)]
    Texture(#[from] TextureError),

    /// A direct host call failed.
    #[error(transparent)]
    Host(#[from] HostError),
}

/// One row of a project or object list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListItem {
    /// Set or transform the row stands for.
    pub node: NodeId,
    /// Name shown in the row.
    pub name: String,
}

fn list_items<H: Host + ?Sized>(
    surfacing: &Surfacing<'_, H>,
    nodes: impl IntoIterator<Item = NodeId>,
) -> PanelResult<Vec<ListItem>> {
    nodes
        .into_iter()
        .map(|node| {
            Ok(ListItem {
                node,
                name: surfacing.name(node)?,
            })
        })
        .collect()
}

fn node_label<H: Host + ?Sized>(surfacing: &Surfacing<'_, H>, node: NodeId) -> String {
    surfacing.name(node).unwrap_or_else(|_| node.to_string())
}

// ---------------------------------------------------------------------------
// Surfacing panel
// ---------------------------------------------------------------------------

/// Projects and objects, their lists, and the export buttons.
pub struct SurfacingPanel<'h> {
    host: Option<&'h mut dyn Host>,
    settings: ExportSettings,
    shader_family: String,
    sync_selection: bool,
    expand_to_members: bool,
    projects: Vec<ListItem>,
    objects: Vec<ListItem>,
    selected_project: Option<Project>,
    selected_object: Option<SurfacingObject>,
}

impl<'h> SurfacingPanel<'h> {
    /// A panel over `host`, or a disabled placeholder when `host` is `None`.
    /// Lists stay empty until [`open`](Self::open) or [`refresh`](Self::refresh).
    pub fn new(host: Option<&'h mut dyn Host>, config: &Config) -> Self {
        Self {
            host,
            settings: ExportSettings::from(&config.export),
            shader_family: config.shader_family.clone(),
            sync_selection: false,
            expand_to_members: false,
            projects: Vec::new(),
            objects: Vec::new(),
            selected_project: None,
            selected_object: None,
        }
    }

    /// `false` when the panel has no host and shows a placeholder.
    pub fn is_enabled(&self) -> bool {
        self.host.is_some()
    }

    fn surfacing(&mut self) -> PanelResult<Surfacing<'_, dyn Host + 'h>> {
        let host = self.host.as_deref_mut().ok_or(PanelError::Unavailable)?;
        Ok(Surfacing::new(host))
    }

    /// Bootstrap the scene and fill the project list, as when the tool
    /// window opens.
    pub fn open(&mut self) -> PanelResult<()> {
        self.surfacing()?.init_scene()?;
        self.refresh()
    }

    // --- Lists and checkboxes ---

    /// Rows of the project list, in scene order.
    pub fn projects(&self) -> &[ListItem] {
        &self.projects
    }

    /// Objects of the selected project.
    pub fn objects(&self) -> &[ListItem] {
        &self.objects
    }

    /// Highlighted project row.
    pub fn selected_project(&self) -> Option<NodeId> {
        self.selected_project.map(|p| p.0)
    }

    /// Highlighted object row.
    pub fn selected_object(&self) -> Option<NodeId> {
        self.selected_object.map(|o| o.0)
    }

    /// Mirror list clicks into the host selection.
    pub fn set_sync_selection(&mut self, enabled: bool) {
        self.sync_selection = enabled;
    }

    /// With sync on, select the member meshes instead of the set itself.
    pub fn set_expand_to_members(&mut self, enabled: bool) {
        self.expand_to_members = enabled;
    }

    /// Re-read both lists from the scene, dropping selections that no longer exist.
    pub fn refresh(&mut self) -> PanelResult<()> {
        let selected_project = self.selected_project;
        let selected_object = self.selected_object;
        let mut surfacing = self.surfacing()?;

        let projects = surfacing.projects()?;
        let project_items = list_items(&surfacing, projects.iter().map(|p| p.0))?;
        let selected_project = selected_project.filter(|p| projects.contains(p));
        let objects = match selected_project {
            Some(project) => surfacing.objects(project)?,
            None => Vec::new(),
        };
        let object_items = list_items(&surfacing, objects.iter().map(|o| o.0))?;

        self.projects = project_items;
        self.objects = object_items;
        self.selected_project = selected_project;
        self.selected_object = selected_object.filter(|o| objects.contains(o));
        Ok(())
    }

    /// Single click on a project row.
    pub fn select_project(&mut self, node: NodeId) -> PanelResult<()> {
        let (sync, expand) = (self.sync_selection, self.expand_to_members);
        let mut surfacing = self.surfacing()?;
        if !surfacing.is_project(node)? {
            return Err(SurfacingError::InvalidProject(node_label(&surfacing, node)).into());
        }
        let project = Project(node);
        let objects = surfacing.objects(project)?;
        if sync {
            let mut nodes = Vec::new();
            if expand {
                for object in &objects {
                    nodes.extend(surfacing.mesh_transforms(*object)?);
                }
            } else {
                nodes.push(node);
            }
            surfacing.host_mut().select(&nodes)?;
        }
        let object_items = list_items(&surfacing, objects.iter().map(|o| o.0))?;

        self.selected_project = Some(project);
        self.selected_object = None;
        self.objects = object_items;
        Ok(())
    }

    /// Single click on an object row.
    pub fn select_object(&mut self, node: NodeId) -> PanelResult<()> {
        let (sync, expand) = (self.sync_selection, self.expand_to_members);
        let mut surfacing = self.surfacing()?;
        if !surfacing.is_object(node)? {
            return Err(SurfacingError::InvalidObject(node_label(&surfacing, node)).into());
        }
        let object = SurfacingObject(node);
        let project = surfacing.project_of(object)?;
        if sync {
            let nodes = if expand {
                surfacing.mesh_transforms(object)?
            } else {
                vec![node]
            };
            surfacing.host_mut().select(&nodes)?;
        }

        if project != self.selected_project
            && let Some(project) = project
        {
            self.select_project_quietly(project)?;
        }
        self.selected_object = Some(object);
        Ok(())
    }

    fn select_project_quietly(&mut self, project: Project) -> PanelResult<()> {
        let surfacing = self.surfacing()?;
        let objects = surfacing.objects(project)?;
        let object_items = list_items(&surfacing, objects.iter().map(|o| o.0))?;
        self.selected_project = Some(project);
        self.objects = object_items;
        Ok(())
    }

    /// Double click on a row. Returns the name the host assigned.
    pub fn rename(&mut self, node: NodeId, new_name: &str) -> PanelResult<String> {
        let mut surfacing = self.surfacing()?;
        if !surfacing.is_project(node)? && !surfacing.is_object(node)? {
            return Err(SurfacingError::InvalidObject(node_label(&surfacing, node)).into());
        }
        let name = surfacing.rename(node, new_name)?;
        self.refresh()?;
        Ok(name)
    }

    /// Mesh transforms of an object, for display.
    pub fn members(&mut self, object: NodeId) -> PanelResult<Vec<ListItem>> {
        let surfacing = self.surfacing()?;
        let transforms = surfacing.mesh_transforms(SurfacingObject(object))?;
        list_items(&surfacing, transforms)
    }

    // --- Buttons ---

    /// *New project*: creates the project and selects it.
    pub fn new_project(&mut self, name: Option<&str>) -> PanelResult<NodeId> {
        let project = self.surfacing()?.create_project(name)?;
        self.refresh()?;
        self.select_project(project.0)?;
        Ok(project.0)
    }

    /// *Delete project*: deletes the selected project.
    pub fn delete_project(&mut self) -> PanelResult<()> {
        let project = self
            .selected_project
            .ok_or(PanelError::NothingSelected("project"))?;
        self.surfacing()?.delete_project(project)?;
        self.selected_project = None;
        self.selected_object = None;
        self.refresh()
    }

    /// *New object*: adds an object to the selected project.
    pub fn new_object(&mut self, name: Option<&str>) -> PanelResult<NodeId> {
        let project = self
            .selected_project
            .ok_or(PanelError::NothingSelected("project"))?;
        let object = self.surfacing()?.create_object(project, name)?;
        self.refresh()?;
        self.selected_object = Some(object);
        Ok(object.0)
    }

    /// *Delete object*: deletes the selected object, leaving its meshes.
    pub fn delete_object(&mut self) -> PanelResult<()> {
        let object = self
            .selected_object
            .ok_or(PanelError::NothingSelected("object"))?;
        self.surfacing()?.delete_object(object)?;
        self.selected_object = None;
        self.refresh()
    }

    /// *Add selection to object*: moves the meshes under the host selection
    /// into the selected object.
    pub fn add_selection_to_object(&mut self) -> PanelResult<Vec<NodeId>> {
        let object = self
            .selected_object
            .ok_or(PanelError::NothingSelected("object"))?;
        let mut surfacing = self.surfacing()?;
        let selection = surfacing.host().selection();
        debug!("adding {} selected node(s)", selection.len());
        Ok(surfacing.add_mesh_transforms_to_object(object, &selection)?)
    }

    /// *Validate*.
    pub fn validate(&mut self) -> PanelResult<ValidationReport> {
        let report = self.surfacing()?.validate()?;
        self.refresh()?;
        Ok(report)
    }

    /// *Export project*: exports the selected project.
    pub fn export_project(&mut self, prompt: &mut dyn SavePrompt) -> PanelResult<PathBuf> {
        let project = self
            .selected_project
            .ok_or(PanelError::NothingSelected("project"))?;
        let settings = self.settings.clone();
        let path = self
            .surfacing()?
            .export_project(project, &settings, ExportMode::Single(prompt))?;
        self.refresh()?;
        Ok(path)
    }

    /// *Export all*.
    pub fn export_all(&mut self, prompt: &mut dyn SavePrompt) -> PanelResult<ExportSummary> {
        let settings = self.settings.clone();
        let summary = self.surfacing()?.export_all(&settings, prompt)?;
        self.refresh()?;
        Ok(summary)
    }

    /// *Apply colors per project/object*.
    pub fn apply_colors(&mut self, scope: ColorScope) -> PanelResult<usize> {
        Ok(self.surfacing()?.apply_colors(scope)?)
    }

    /// *Clear colors*.
    pub fn clear_colors(&mut self) -> PanelResult<usize> {
        Ok(self.surfacing()?.clear_colors()?)
    }

    /// *Apply placeholder materials per project/object*.
    pub fn apply_placeholder_materials(&mut self, scope: ColorScope) -> PanelResult<Vec<NodeId>> {
        let family = self.shader_family.clone();
        Ok(self
            .surfacing()?
            .apply_placeholder_materials(scope, &family)?)
    }

    /// *Set export path*.
    pub fn set_export_path(&mut self, dir: &Path) -> PanelResult<()> {
        Ok(self.surfacing()?.set_export_path(dir)?)
    }

    /// Export directory stored in the scene, empty if never set.
    pub fn export_path(&mut self) -> PanelResult<String> {
        Ok(self.surfacing()?.export_path()?)
    }
}

// ---------------------------------------------------------------------------
// Material mapping panel
// ---------------------------------------------------------------------------

/// A grouped texture record and whether the scene has a matching project
/// and object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureRow {
    /// Parsed and mapped texture group.
    pub record: GroupedTextureRecord,
    /// The record's project exists, and so does its object when it names one.
    pub in_scene: bool,
}

/// Template and extension fields, a folder scan, and texture import.
pub struct MaterialMappingPanel<'h> {
    host: Option<&'h mut dyn Host>,
    config: Config,
    rows: Vec<TextureRow>,
    skipped: Vec<(String, TextureError)>,
}

impl<'h> MaterialMappingPanel<'h> {
    /// A panel whose fields start from the `textures` section of `config`.
    pub fn new(host: Option<&'h mut dyn Host>, config: &Config) -> Self {
        Self {
            host,
            config: config.clone(),
            rows: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// `false` without a host.
    pub fn is_enabled(&self) -> bool {
        self.host.is_some()
    }

    /// Filename template field.
    pub fn template(&self) -> &str {
        &self.config.textures.template
    }

    /// Edit the template field. It is compiled on the next scan, so an invalid
    /// template only fails there.
    pub fn set_template(&mut self, template: &str) {
        self.config.textures.template = template.to_string();
    }

    /// Extension filter field.
    pub fn extension(&self) -> &str {
        &self.config.textures.extension
    }

    /// Edit the extension filter. Files whose name contains it are scanned.
    pub fn set_extension(&mut self, extension: &str) {
        self.config.textures.extension = extension.to_string();
    }

    /// *Search sub-folders* checkbox.
    pub fn set_recursive(&mut self, recursive: bool) {
        self.config.textures.recursive = recursive;
    }

    /// Rows from the last scan.
    pub fn rows(&self) -> &[TextureRow] {
        &self.rows
    }

    /// Files the last scan could not parse.
    pub fn skipped(&self) -> &[(String, TextureError)] {
        &self.skipped
    }

    /// *Scan folder*: load every texture under `dir` with the current fields.
    pub fn scan_folder(&mut self, dir: &Path) -> PanelResult<&[TextureRow]> {
        let host = self.host.as_deref_mut().ok_or(PanelError::Unavailable)?;
        let scene = scene_names(&mut Surfacing::new(host))?;
        let report = scan_textures(dir, &self.config)?;

        self.rows = report
            .records
            .into_iter()
            .map(|record| {
                let project = record.surfacing_project().unwrap_or_default().to_string();
                let object = record.surfacing_object().map(str::to_string);
                let in_scene = scene.contains(&(project.clone(), None))
                    && object.is_none_or(|o| scene.contains(&(project, Some(o))));
                TextureRow { record, in_scene }
            })
            .collect();
        self.skipped = report.skipped;
        info!(
            "{} texture group(s), {} in scene",
            self.rows.len(),
            self.rows.iter().filter(|r| r.in_scene).count()
        );
        Ok(&self.rows)
    }

    /// *Import by project*.
    pub fn import_by_project(&mut self) -> PanelResult<ImportReport> {
        self.import(GroupBy::ByProject)
    }

    /// *Import by object*.
    pub fn import_by_object(&mut self) -> PanelResult<ImportReport> {
        self.import(GroupBy::ByObject)
    }

    fn import(&mut self, group_by: GroupBy) -> PanelResult<ImportReport> {
        let host = self.host.as_deref_mut().ok_or(PanelError::Unavailable)?;
        let records: Vec<GroupedTextureRecord> =
            self.rows.iter().map(|row| row.record.clone()).collect();
        let settings = ImportSettings::from(&self.config);
        Ok(lookdev_textures::import_textures(
            host, &records, group_by, &settings,
        )?)
    }
}

/// `(project, None)` for every project and `(project, Some(object))` for
/// every object in the scene.
fn scene_names<H: Host + ?Sized>(
    surfacing: &mut Surfacing<'_, H>,
) -> PanelResult<BTreeSet<(String, Option<String>)>> {
    let mut names = BTreeSet::new();
    for project in surfacing.projects()? {
        let project_name = surfacing.name(project.0)?;
        for object in surfacing.objects(project)? {
            names.insert((project_name.clone(), Some(surfacing.name(object.0)?)));
        }
        names.insert((project_name, None));
    }
    Ok(names)
}

// ---------------------------------------------------------------------------
// Lookdev panel
// ---------------------------------------------------------------------------

/// Viewport colors and placeholder materials.
pub struct LookdevPanel<'h> {
    host: Option<&'h mut dyn Host>,
    shader_family: String,
}

impl<'h> LookdevPanel<'h> {
    /// A panel creating placeholder shaders of the configured family.
    pub fn new(host: Option<&'h mut dyn Host>, config: &Config) -> Self {
        Self {
            host,
            shader_family: config.shader_family.clone(),
        }
    }

    /// `false` without a host.
    pub fn is_enabled(&self) -> bool {
        self.host.is_some()
    }

    fn surfacing(&mut self) -> PanelResult<Surfacing<'_, dyn Host + 'h>> {
        let host = self.host.as_deref_mut().ok_or(PanelError::Unavailable)?;
        Ok(Surfacing::new(host))
    }

    /// Tint every mesh with its project's color.
    pub fn apply_colors_per_project(&mut self) -> PanelResult<usize> {
        Ok(self.surfacing()?.apply_colors(ColorScope::PerProject)?)
    }

    /// Tint every mesh with its object's color.
    pub fn apply_colors_per_object(&mut self) -> PanelResult<usize> {
        Ok(self.surfacing()?.apply_colors(ColorScope::PerObject)?)
    }

    /// Remove wireframe tints from every surfaced mesh.
    pub fn clear_colors(&mut self) -> PanelResult<usize> {
        Ok(self.surfacing()?.clear_colors()?)
    }

    /// One `<project>_mtl` shader per project, tinted and assigned.
    pub fn apply_materials_per_project(&mut self) -> PanelResult<Vec<NodeId>> {
        self.apply_materials(ColorScope::PerProject)
    }

    /// One `<project>_<object>_mtl` shader per object.
    pub fn apply_materials_per_object(&mut self) -> PanelResult<Vec<NodeId>> {
        self.apply_materials(ColorScope::PerObject)
    }

    fn apply_materials(&mut self, scope: ColorScope) -> PanelResult<Vec<NodeId>> {
        let family = self.shader_family.clone();
        Ok(self
            .surfacing()?
            .apply_placeholder_materials(scope, &family)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lookdev_host::MemoryHost;
    use lookdev_surfacing::color_of;

    fn scene() -> (MemoryHost, NodeId, NodeId) {
        let mut host = MemoryHost::new();
        let hull = host.create_mesh_transform("hullGeo", 6).unwrap();
        let deck = host.create_mesh_transform("deckGeo", 6).unwrap();
        Surfacing::new(&mut host).init_scene().unwrap();
        (host, hull, deck)
    }

    #[test]
    fn test_disabled_panels() {
        let config = Config::default();
        let mut surfacing = SurfacingPanel::new(None, &config);
        assert!(!surfacing.is_enabled());
        assert!(matches!(surfacing.refresh(), Err(PanelError::Unavailable)));
        assert!(matches!(surfacing.new_project(None), Err(PanelError::Unavailable)));
        assert!(matches!(
            surfacing.set_export_path(Path::new("/tmp")),
            Err(PanelError::Unavailable)
        ));

        let mut mapping = MaterialMappingPanel::new(None, &config);
        assert!(!mapping.is_enabled());
        assert!(matches!(
            mapping.scan_folder(Path::new(".")),
            Err(PanelError::Unavailable)
        ));
        assert!(matches!(mapping.import_by_object(), Err(PanelError::Unavailable)));

        let mut lookdev = LookdevPanel::new(None, &config);
        assert!(!lookdev.is_enabled());
        assert!(matches!(lookdev.clear_colors(), Err(PanelError::Unavailable)));
    }

    #[test]
    fn test_buttons_need_a_selection() {
        let (mut host, _, _) = scene();
        let mut panel = SurfacingPanel::new(Some(&mut host), &Config::default());
        panel.refresh().unwrap();
        assert!(matches!(
            panel.delete_project(),
            Err(PanelError::NothingSelected("project"))
        ));
        assert!(matches!(
            panel.add_selection_to_object(),
            Err(PanelError::NothingSelected("object"))
        ));
    }

    #[test]
    fn test_project_and_object_workflow() {
        let (mut host, hull, deck) = scene();
        host.select(&[hull, deck]).unwrap();

        let mut panel = SurfacingPanel::new(Some(&mut host), &Config::default());
        panel.refresh().unwrap();
        assert_eq!(panel.projects().len(), 1);
        assert_eq!(panel.projects()[0].name, "project");

        let ship = panel.new_project(Some("ship")).unwrap();
        assert_eq!(panel.selected_project(), Some(ship));
        assert_eq!(panel.objects().len(), 1);

        let hull_object = panel.objects()[0].node;
        assert_eq!(panel.rename(hull_object, "hull").unwrap(), "hull");
        panel.select_object(hull_object).unwrap();
        assert_eq!(panel.add_selection_to_object().unwrap(), vec![hull, deck]);

        let deck_object = panel.new_object(Some("deck")).unwrap();
        assert_eq!(panel.objects().len(), 2);
        assert_eq!(panel.selected_object(), Some(deck_object));

        panel.delete_object().unwrap();
        assert_eq!(panel.objects().len(), 1);
        assert_eq!(panel.members(hull_object).unwrap().len(), 2);

        panel.delete_project().unwrap();
        assert_eq!(panel.selected_project(), None);
        assert_eq!(panel.projects().len(), 1);
        assert!(panel.objects().is_empty());
        drop(panel);

        assert!(host.exists(hull));
        assert!(host.exists(deck));
    }

    #[test]
    fn test_sync_selection() {
        let (mut host, hull, _) = scene();
        let (project, object) = {
            let mut surfacing = Surfacing::new(&mut host);
            let project = surfacing.projects().unwrap()[0];
            let object = surfacing.objects(project).unwrap()[0];
            surfacing.add_mesh_transforms_to_object(object, &[hull]).unwrap();
            (project, object)
        };

        let mut panel = SurfacingPanel::new(Some(&mut host), &Config::default());
        panel.select_project(project.0).unwrap();
        panel.set_sync_selection(true);
        panel.select_object(object.0).unwrap();
        panel.set_expand_to_members(true);
        panel.select_project(project.0).unwrap();
        drop(panel);
        assert_eq!(host.selection(), vec![hull]);

        let mut panel = SurfacingPanel::new(Some(&mut host), &Config::default());
        panel.set_sync_selection(true);
        panel.select_object(object.0).unwrap();
        assert_eq!(panel.selected_project(), Some(project.0));
        drop(panel);
        assert_eq!(host.selection(), vec![object.0]);
    }

    #[test]
    fn test_select_rejects_non_surfacing_nodes() {
        let (mut host, hull, _) = scene();
        let mut panel = SurfacingPanel::new(Some(&mut host), &Config::default());
        assert!(matches!(
            panel.select_project(hull),
            Err(PanelError::Surfacing(SurfacingError::InvalidProject(_)))
        ));
        assert!(matches!(
            panel.rename(hull, "x"),
            Err(PanelError::Surfacing(SurfacingError::InvalidObject(_)))
        ));
    }

    #[test]
    fn test_export_selected_project() {
        let dir = tempfile::tempdir().unwrap();
        let scene_path = dir.path().join("scene.ron");
        let (mut host, hull, _) = scene();
        {
            let mut surfacing = Surfacing::new(&mut host);
            let project = surfacing.projects().unwrap()[0];
            let object = surfacing.objects(project).unwrap()[0];
            surfacing.add_mesh_transforms_to_object(object, &[hull]).unwrap();
        }
        host.save_scene_as(&scene_path).unwrap();

        let mut panel = SurfacingPanel::new(Some(&mut host), &Config::default());
        panel.set_export_path(dir.path()).unwrap();
        let mut declined = || false;
        assert!(matches!(
            panel.export_all(&mut declined),
            Err(PanelError::Surfacing(SurfacingError::UnsavedChanges))
        ));

        let mut accept = || true;
        panel.refresh().unwrap();
        let project = panel.projects()[0].node;
        panel.select_project(project).unwrap();
        let path = panel.export_project(&mut accept).unwrap();
        assert_eq!(path, dir.path().join("project.abc"));
        assert!(path.is_file());
        assert_eq!(panel.selected_project(), Some(project));
    }

    #[test]
    fn test_scan_and_import() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "shipA_hull_baseColor.1001.tif",
            "shipA_hull_baseColor.1002.tif",
            "shipB_sail_roughness.1001.tif",
            "notes.tif",
        ] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let mut host = MemoryHost::new();
        let hull = host.create_mesh_transform("hullGeo", 6).unwrap();
        {
            let mut surfacing = Surfacing::new(&mut host);
            let project = surfacing.create_project(Some("shipA")).unwrap();
            let object = surfacing.objects(project).unwrap()[0];
            surfacing.rename(object.0, "hull").unwrap();
            surfacing.add_mesh_transforms_to_object(object, &[hull]).unwrap();
        }

        let mut panel = MaterialMappingPanel::new(Some(&mut host), &Config::default());
        assert_eq!(panel.extension(), "tif");
        panel.set_recursive(false);
        let rows = panel.scan_folder(dir.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows.iter().filter(|r| r.in_scene).count(),
            1,
            "only shipA/hull exists in the scene"
        );
        assert_eq!(panel.skipped().len(), 1);

        let report = panel.import_by_object().unwrap();
        assert_eq!(report.shaders.len(), 2);
        assert_eq!(report.unmatched, 1);
        assert_eq!(report.assigned, 1);
        drop(panel);
        assert_eq!(
            host.assigned_shader(hull).unwrap(),
            Some(report.shaders["shipA_hull_mtl"])
        );
    }

    #[test]
    fn test_template_field_changes_scan() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("shipA-bump.png"), b"").unwrap();
        let (mut host, _, _) = scene();

        let mut panel = MaterialMappingPanel::new(Some(&mut host), &Config::default());
        panel.set_extension("png");
        panel.set_template("{surfacing_project}-{textureset_element}.{extension}");
        assert_eq!(panel.template(), "{surfacing_project}-{textureset_element}.{extension}");
        let rows = panel.scan_folder(dir.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record.surfacing_project(), Some("shipA"));
        assert!(!rows[0].in_scene);
    }

    #[test]
    fn test_lookdev_colors_and_materials() {
        let (mut host, hull, _) = scene();
        {
            let mut surfacing = Surfacing::new(&mut host);
            let project = surfacing.projects().unwrap()[0];
            let object = surfacing.objects(project).unwrap()[0];
            surfacing.add_mesh_transforms_to_object(object, &[hull]).unwrap();
        }

        let mut panel = LookdevPanel::new(Some(&mut host), &Config::default());
        assert_eq!(panel.apply_colors_per_object().unwrap(), 1);
        assert_eq!(panel.apply_colors_per_project().unwrap(), 1);
        let shaders = panel.apply_materials_per_object().unwrap();
        assert_eq!(shaders.len(), 1);
        drop(panel);
        assert_eq!(host.wireframe_color(hull).unwrap(), Some(color_of("project")));
        assert_eq!(host.assigned_shader(hull).unwrap(), Some(shaders[0]));

        let mut panel = LookdevPanel::new(Some(&mut host), &Config::default());
        assert_eq!(panel.clear_colors().unwrap(), 1);
        assert_eq!(panel.apply_materials_per_project().unwrap().len(), 1);
        drop(panel);
        assert_eq!(host.wireframe_color(hull).unwrap(), None);
    }
}
