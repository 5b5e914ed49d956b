//! Name-derived preview colors and placeholder materials.

use lookdev_host::{Host, NodeId, Rgb};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::SurfacingResult;
use crate::model::Surfacing;

/// Whether colors and materials follow projects or objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorScope {
    /// One color per project, seeded by the project name.
    PerProject,
    /// One color per object, seeded by the object name.
    PerObject,
}

/// Derive a color from a name.
///
/// Each channel seeds its own generator with `seed + "_r"`, `"_g"` or `"_b"`
/// and takes the first uniform draw in `[0, 1)`. The SHA-256 of the channel
/// seed feeds a ChaCha8 stream, so the result is identical on every platform
/// and in every process.
pub fn color_of(seed: &str) -> Rgb {
    let channel = |suffix: &str| {
        let digest: [u8; 32] = Sha256::digest(format!("{seed}{suffix}").as_bytes()).into();
        let mut rng = ChaCha8Rng::from_seed(digest);
        rng.random::<f64>()
    };
    [channel("_r"), channel("_g"), channel("_b")]
}

/// Placeholder material name for a project, or for one of its objects.
pub fn material_name(project: &str, object: Option<&str>) -> String {
    match object {
        Some(object) => format!("{project}_{object}_mtl"),
        None => format!("{project}_mtl"),
    }
}

/// One colorable group: a seed name, a material name and its transforms.
struct ColorGroup {
    seed: String,
    material: String,
    transforms: Vec<NodeId>,
}

impl<H: Host + ?Sized> Surfacing<'_, H> {
    /// Set the wireframe color of every mesh transform from its project or
    /// object name. Returns how many transforms were colored.
    pub fn apply_colors(&mut self, scope: ColorScope) -> SurfacingResult<usize> {
        let mut colored = 0;
        for group in self.color_groups(scope)? {
            let color = color_of(&group.seed);
            for transform in &group.transforms {
                self.host.set_wireframe_color(*transform, Some(color))?;
            }
            debug!("colored {} transform(s) for {}", group.transforms.len(), group.seed);
            colored += group.transforms.len();
        }
        info!("applied {:?} colors to {} transform(s)", scope, colored);
        Ok(colored)
    }

    /// Reset the wireframe color of every mesh transform.
    pub fn clear_colors(&mut self) -> SurfacingResult<usize> {
        let mut cleared = 0;
        for group in self.color_groups(ColorScope::PerObject)? {
            for transform in &group.transforms {
                self.host.set_wireframe_color(*transform, None)?;
            }
            cleared += group.transforms.len();
        }
        info!("cleared colors on {} transform(s)", cleared);
        Ok(cleared)
    }

    /// Create (or reuse) one placeholder shader of `family` per project or
    /// object, tint it with the name-derived color and assign it to the
    /// group's transforms. Returns the shaders in project order.
    pub fn apply_placeholder_materials(
        &mut self,
        scope: ColorScope,
        family: &str,
    ) -> SurfacingResult<Vec<NodeId>> {
        let mut shaders = Vec::new();
        for group in self.color_groups(scope)? {
            let shader = self.host.ensure_shader(family, &group.material)?;
            self.host.set_shader_color(shader, color_of(&group.seed))?;
            if !group.transforms.is_empty() {
                self.host.assign_shader(shader, &group.transforms)?;
            }
            shaders.push(shader);
        }
        info!(
            "applied {} placeholder {} material(s) {:?}",
            shaders.len(),
            family,
            scope
        );
        Ok(shaders)
    }

    fn color_groups(&mut self, scope: ColorScope) -> SurfacingResult<Vec<ColorGroup>> {
        let mut groups = Vec::new();
        for project in self.projects()? {
            let project_name = self.host.name(project.0)?;
            let mut project_transforms = Vec::new();
            for object in self.objects(project)? {
                let transforms = self.mesh_transforms(object)?;
                match scope {
                    ColorScope::PerProject => project_transforms.extend(transforms),
                    ColorScope::PerObject => {
                        let object_name = self.host.name(object.0)?;
                        groups.push(ColorGroup {
                            material: material_name(&project_name, Some(&object_name)),
                            seed: object_name,
                            transforms,
                        });
                    }
                }
            }
            if scope == ColorScope::PerProject {
                groups.push(ColorGroup {
                    material: material_name(&project_name, None),
                    seed: project_name,
                    transforms: project_transforms,
                });
            }
        }
        Ok(groups)
    }
}
