//! Bind grouped texture records to placeholder shaders in the scene.

use std::collections::BTreeMap;

use lookdev_config::Config;
use lookdev_host::{Host, NodeId};
use lookdev_surfacing::{OBJECT_MARKER, PROJECT_MARKER, Surfacing, material_name};
use tracing::{debug, info, warn};

use crate::error::TextureResult;
use crate::mapping::ShaderPlug;
use crate::record::GroupedTextureRecord;

/// Which scene entity a shader is created for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroupBy {
    /// One shader per surfacing project.
    ByProject,
    /// One shader per surfacing object.
    ByObject,
}

/// Shader and colorspace settings for an import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportSettings {
    /// Shader family to create.
    pub shader_family: String,
    /// Colorspace used when a record carries none.
    pub default_colorspace: String,
}

impl From<&Config> for ImportSettings {
    fn from(config: &Config) -> Self {
        Self {
            shader_family: config.shader_family.clone(),
            default_colorspace: config.textures.default_colorspace.clone(),
        }
    }
}

/// What an import did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Shader per group name, e.g. `shipA_mtl` or `shipA_hull_mtl`.
    pub shaders: BTreeMap<String, NodeId>,
    /// Texture nodes connected to a shader input.
    pub connected: usize,
    /// Records skipped because their element has no shader plug.
    pub unmapped: usize,
    /// Records missing the fields needed for the chosen grouping, or whose
    /// texture node name was already claimed by another file.
    pub skipped: usize,
    /// Groups with no matching project or object in the scene.
    pub unmatched: usize,
    /// Mesh transforms that received a shader.
    pub assigned: usize,
}

/// Scene members a group key resolves to.
struct SceneMatch {
    transforms: Vec<NodeId>,
}

/// Create one placeholder shader per project or object named in `records`,
/// create a texture node per mapped record and connect it to the record's
/// plug, then assign each shader to the matching scene members.
///
/// Re-running with the same records rebuilds the same graph: shaders and
/// texture nodes are found by name and plugs are reconnected.
pub fn import_textures<H: Host + ?Sized>(
    host: &mut H,
    records: &[GroupedTextureRecord],
    group_by: GroupBy,
    settings: &ImportSettings,
) -> TextureResult<ImportReport> {
    let mut surfacing = Surfacing::new(host);
    surfacing.validate()?;
    let scene = scene_index(&mut surfacing, group_by)?;

    let mut report = ImportReport::default();
    let mut groups: BTreeMap<String, Vec<&GroupedTextureRecord>> = BTreeMap::new();
    let mut scene_keys: BTreeMap<String, (String, Option<String>)> = BTreeMap::new();

    for record in records {
        let (Some(project), object) = (record.surfacing_project(), record.surfacing_object()) else {
            warn!("{} names no surfacing project, skipping", record.file_path);
            report.skipped += 1;
            continue;
        };
        let object = match (group_by, object) {
            (GroupBy::ByProject, _) => None,
            (GroupBy::ByObject, Some(object)) => Some(object),
            (GroupBy::ByObject, None) => {
                warn!("{} names no surfacing object, skipping", record.file_path);
                report.skipped += 1;
                continue;
            }
        };
        let shader_name = material_name(project, object);
        scene_keys
            .entry(shader_name.clone())
            .or_insert_with(|| (project.to_string(), object.map(str::to_string)));
        groups.entry(shader_name).or_default().push(record);
    }

    let host = surfacing.host_mut();
    let mut claimed: BTreeMap<String, &str> = BTreeMap::new();
    for (shader_name, group) in &groups {
        let shader = host.ensure_shader(&settings.shader_family, shader_name)?;
        report.shaders.insert(shader_name.clone(), shader);

        for record in group {
            let element = record.textureset_element().unwrap_or("texture");
            let Some(ShaderPlug::Mapped(plug)) = &record.shader_plug else {
                warn!(
                    "{} has no shader plug for element {:?}, skipping",
                    record.file_path, element
                );
                report.unmapped += 1;
                continue;
            };
            let texture_name = texture_name(record, element);
            if let Some(first) = claimed.get(&texture_name) {
                warn!(
                    "{} and {} both resolve to {}, keeping {}",
                    first, record.file_path, texture_name, first
                );
                report.skipped += 1;
                continue;
            }
            claimed.insert(texture_name.clone(), record.file_path.as_str());
            let colorspace = record
                .colorspace()
                .unwrap_or(settings.default_colorspace.as_str());
            let texture = host.ensure_texture(&texture_name, &record.file_path, colorspace)?;
            host.connect_texture(texture, shader, plug)?;
            debug!("{} -> {}.{}", texture_name, shader_name, plug);
            report.connected += 1;
        }

        let Some(key) = scene_keys.get(shader_name) else {
            continue;
        };
        match scene.get(key) {
            Some(found) if !found.transforms.is_empty() => {
                host.assign_shader(shader, &found.transforms)?;
                report.assigned += found.transforms.len();
            }
            Some(_) => debug!("{} matches an empty scene group", shader_name),
            None => {
                warn!("no scene match for {}", shader_name);
                report.unmatched += 1;
            }
        }
    }

    info!(
        "imported textures into {} shader(s): {} connected, {} unmapped, {} skipped, {} unmatched",
        report.shaders.len(),
        report.connected,
        report.unmapped,
        report.skipped,
        report.unmatched
    );
    Ok(report)
}

/// `<project>[_<object>]_<element>_tex`. Files differing only in extension or
/// folder share a name, so the import keeps the first of them.
fn texture_name(record: &GroupedTextureRecord, element: &str) -> String {
    let project = record.surfacing_project().unwrap_or_default();
    match record.surfacing_object() {
        Some(object) => format!("{project}_{object}_{element}_tex"),
        None => format!("{project}_{element}_tex"),
    }
}

/// Map `(project marker, object marker)` keys to the scene's mesh transforms.
fn scene_index<H: Host + ?Sized>(
    surfacing: &mut Surfacing<'_, H>,
    group_by: GroupBy,
) -> TextureResult<BTreeMap<(String, Option<String>), SceneMatch>> {
    let mut index: BTreeMap<(String, Option<String>), SceneMatch> = BTreeMap::new();
    for project in surfacing.projects()? {
        let project_name = surfacing
            .host()
            .get_marker(project.0, PROJECT_MARKER)?
            .unwrap_or_default();
        for object in surfacing.objects(project)? {
            let transforms = surfacing.mesh_transforms(object)?;
            let object_key = match group_by {
                GroupBy::ByProject => None,
                GroupBy::ByObject => surfacing.host().get_marker(object.0, OBJECT_MARKER)?,
            };
            index
                .entry((project_name.clone(), object_key))
                .or_insert_with(|| SceneMatch {
                    transforms: Vec::new(),
                })
                .transforms
                .extend(transforms);
        }
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TextureError;
    use crate::load::load_textures;
    use crate::template::Template;
    use lookdev_host::MemoryHost;
    use std::path::PathBuf;

    fn scene() -> (MemoryHost, NodeId, NodeId) {
        let mut host = MemoryHost::new();
        let hull = host.create_mesh_transform("hullGeo", 6).unwrap();
        let deck = host.create_mesh_transform("deckGeo", 6).unwrap();
        let mut surfacing = Surfacing::new(&mut host);
        let project = surfacing.create_project(Some("shipA")).unwrap();
        let default = surfacing.objects(project).unwrap()[0];
        surfacing.rename(default.0, "hull").unwrap();
        let deck_object = surfacing.create_object(project, Some("deck")).unwrap();
        surfacing.add_mesh_transforms_to_object(default, &[hull]).unwrap();
        surfacing
            .add_mesh_transforms_to_object(deck_object, &[deck])
            .unwrap();
        (host, hull, deck)
    }

    fn records(paths: &[&str]) -> Vec<GroupedTextureRecord> {
        let template = Template::new(
            "{surfacing_project}_{surfacing_object}_{textureset_element}.{tile_index}.{extension}",
        )
        .unwrap();
        let files: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();
        load_textures(&files, &template, &Config::default())
            .unwrap()
            .records
    }

    #[test]
    fn test_import_by_object() {
        let (mut host, hull, deck) = scene();
        let records = records(&[
            "/tex/shipA_hull_baseColor.1001.tif",
            "/tex/shipA_hull_baseColor.1002.tif",
            "/tex/shipA_hull_roughness.1001.tif",
            "/tex/shipA_deck_baseColor.1001.tif",
            "/tex/shipA_deck_base.1001.tif",
        ]);
        let settings = ImportSettings::from(&Config::default());
        let report = import_textures(&mut host, &records, GroupBy::ByObject, &settings).unwrap();

        assert_eq!(report.shaders.len(), 2);
        assert_eq!(report.connected, 3);
        assert_eq!(report.unmapped, 1);
        assert_eq!(report.unmatched, 0);
        assert_eq!(report.assigned, 2);

        let hull_shader = report.shaders["shipA_hull_mtl"];
        let data = host.shader(hull_shader).unwrap();
        assert_eq!(data.family, "PxrSurface");
        let texture = data.inputs["diffuseColor"];
        assert_eq!(
            host.texture(texture).unwrap().file_path,
            "/tex/shipA_hull_baseColor.<UDIM>.tif"
        );
        assert_eq!(host.texture(texture).unwrap().colorspace, "sRGB");
        assert!(data.inputs.contains_key("specularRoughness"));
        assert_eq!(host.assigned_shader(hull).unwrap(), Some(hull_shader));
        assert_eq!(
            host.assigned_shader(deck).unwrap(),
            Some(report.shaders["shipA_deck_mtl"])
        );
    }

    #[test]
    fn test_import_by_project_shares_shader() {
        let (mut host, hull, deck) = scene();
        let records = records(&[
            "/tex/shipA_hull_roughness.1001.tif",
            "/tex/shipA_deck_bump.1001.tif",
        ]);
        let settings = ImportSettings::from(&Config::default());
        let report = import_textures(&mut host, &records, GroupBy::ByProject, &settings).unwrap();

        let shader = report.shaders["shipA_mtl"];
        assert_eq!(report.shaders.len(), 1);
        assert_eq!(host.assigned_shader(hull).unwrap(), Some(shader));
        assert_eq!(host.assigned_shader(deck).unwrap(), Some(shader));
        assert_eq!(host.shader(shader).unwrap().inputs.len(), 2);
    }

    /// `(shader, family, plug, texture file)` for every connection in the scene.
    fn connections(host: &MemoryHost) -> Vec<(String, String, String, String)> {
        let mut found = Vec::new();
        for shader in host.nodes_of_type(lookdev_host::NodeType::Shader) {
            let data = host.shader(shader).unwrap();
            for (plug, texture) in &data.inputs {
                found.push((
                    host.name(shader).unwrap(),
                    data.family.clone(),
                    plug.clone(),
                    host.texture(*texture).unwrap().file_path.clone(),
                ));
            }
        }
        found.sort();
        found
    }

    #[test]
    fn test_import_is_idempotent() {
        let paths = [
            "/tex/shipA_hull_baseColor.1001.tif",
            "/tex/shipA_hull_baseColor.1002.tif",
            "/tex/shipA_hull_roughness.1001.tif",
            "/tex/shipA_deck_bump.1001.tif",
        ];
        let settings = ImportSettings::from(&Config::default());
        for group_by in [GroupBy::ByProject, GroupBy::ByObject] {
            let (mut host, hull, deck) = scene();
            let records = records(&paths);

            let first = import_textures(&mut host, &records, group_by, &settings).unwrap();
            let nodes = host.node_count();
            let graph = connections(&host);
            assert_eq!(graph.len(), 3);

            let second = import_textures(&mut host, &records, group_by, &settings).unwrap();
            assert_eq!(first.shaders, second.shaders);
            assert_eq!(first.connected, second.connected);
            // Validation replaces the partition node but keeps the count.
            assert_eq!(host.node_count(), nodes, "{group_by:?}");
            assert_eq!(connections(&host), graph, "{group_by:?}");
            assert_eq!(host.nodes_of_type(lookdev_host::NodeType::Texture).len(), 3);
            assert!(host.assigned_shader(hull).unwrap().is_some());
            assert!(host.assigned_shader(deck).unwrap().is_some());
        }
    }

    #[test]
    fn test_reimport_with_other_family_reuses_shaders() {
        let (mut host, _, _) = scene();
        let records = records(&["/tex/shipA_hull_baseColor.1001.tif"]);
        let mut settings = ImportSettings::from(&Config::default());

        let first = import_textures(&mut host, &records, GroupBy::ByObject, &settings).unwrap();
        let nodes = host.node_count();
        settings.shader_family = "PxrDisney".to_string();
        let second = import_textures(&mut host, &records, GroupBy::ByObject, &settings).unwrap();
        let third = import_textures(&mut host, &records, GroupBy::ByObject, &settings).unwrap();

        assert_eq!(first.shaders, second.shaders);
        assert_eq!(second.shaders, third.shaders);
        assert_eq!(host.node_count(), nodes);
        let shader = first.shaders["shipA_hull_mtl"];
        assert_eq!(host.shader(shader).unwrap().family, "PxrDisney");
    }

    #[test]
    fn test_import_fails_when_shader_name_is_taken() {
        let (mut host, _, _) = scene();
        host.create_mesh_transform("shipA_hull_mtl", 6).unwrap();
        let records = records(&["/tex/shipA_hull_baseColor.1001.tif"]);
        let settings = ImportSettings::from(&Config::default());

        let result = import_textures(&mut host, &records, GroupBy::ByObject, &settings);
        assert!(matches!(
            result,
            Err(TextureError::Host(lookdev_host::HostError::WrongType { .. }))
        ));
        assert!(host.nodes_of_type(lookdev_host::NodeType::Shader).is_empty());
    }

    #[test]
    fn test_same_element_in_two_formats_keeps_first() {
        let (mut host, _, _) = scene();
        let records = records(&[
            "/tex/shipA_hull_baseColor.1001.png",
            "/tex/shipA_hull_baseColor.1001.exr",
        ]);
        assert_eq!(records.len(), 2);
        let settings = ImportSettings::from(&Config::default());

        for _ in 0..2 {
            let report =
                import_textures(&mut host, &records, GroupBy::ByObject, &settings).unwrap();
            assert_eq!(report.connected, 1);
            assert_eq!(report.skipped, 1);
        }
        assert_eq!(
            connections(&host),
            vec![(
                "shipA_hull_mtl".to_string(),
                "PxrSurface".to_string(),
                "diffuseColor".to_string(),
                "/tex/shipA_hull_baseColor.<UDIM>.png".to_string(),
            )]
        );
        assert_eq!(host.nodes_of_type(lookdev_host::NodeType::Texture).len(), 1);
    }

    #[test]
    fn test_unmatched_and_incomplete_records() {
        let (mut host, _, _) = scene();
        let mut records = records(&["/tex/shipB_sail_baseColor.1001.tif"]);
        let mut partial = records[0].clone();
        partial.fields.remove("surfacing_project");
        records.push(partial);

        let settings = ImportSettings::from(&Config::default());
        let report = import_textures(&mut host, &records, GroupBy::ByObject, &settings).unwrap();
        assert_eq!(report.unmatched, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.assigned, 0);
        assert!(report.shaders.contains_key("shipB_sail_mtl"));
    }
}
