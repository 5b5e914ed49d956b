//! Per-project geometry cache export.
//!
//! Merging and subdivision are destructive. A single export saves (or refuses
//! to run on) a modified scene first and reopens the saved file afterwards;
//! a batch export does the same once around the whole loop.

use std::path::{Path, PathBuf};

use lookdev_config::ExportConfig;
use lookdev_host::{CacheOptions, Host, NodeId};
use tracing::{error, info, warn};

use crate::error::{SurfacingError, SurfacingResult};
use crate::model::{Project, Surfacing};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Asks the user whether a modified scene may be saved before export.
pub trait SavePrompt {
    /// Returns `true` to save and continue, `false` to abort.
    fn confirm_save(&mut self) -> bool;
}

impl<F: FnMut() -> bool> SavePrompt for F {
    fn confirm_save(&mut self) -> bool {
        self()
    }
}

/// How an export interacts with the scene file.
pub enum ExportMode<'p> {
    /// Check the scene state before exporting and reopen it afterwards.
    Single(&'p mut dyn SavePrompt),
    /// Leave scene bookkeeping to the caller.
    Batch,
}

/// Geometry processing and cache options for one export run.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportSettings {
    /// Smoothing iterations on merged geometry, 0 for none.
    pub subdiv_level: u32,
    /// Options forwarded to the host's cache writer.
    pub cache: CacheOptions,
}

impl From<&ExportConfig> for ExportSettings {
    fn from(config: &ExportConfig) -> Self {
        Self {
            subdiv_level: config.subdiv_level,
            cache: CacheOptions {
                frame: config.frame,
                uv_write: config.uv_write,
                attr_prefixes: config.attr_prefixes.clone(),
            },
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self::from(&ExportConfig::default())
    }
}

/// Outcome of [`Surfacing::export_all`].
#[derive(Debug, Default)]
pub struct ExportSummary {
    /// Cache files written, in project order.
    pub written: Vec<PathBuf>,
    /// Projects that failed, with the reason.
    pub failed: Vec<(String, SurfacingError)>,
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

impl<H: Host + ?Sized> Surfacing<'_, H> {
    /// Export one project to `<export dir>/<project>.abc`.
    ///
    /// # Errors
    ///
    /// - [`SurfacingError::UnsavedChanges`] if the prompt is declined.
    /// - [`SurfacingError::InvalidExportPath`] if the root holds no existing directory.
    /// - [`SurfacingError::ReopenFailed`] if the scene could not be restored.
    pub fn export_project(
        &mut self,
        project: Project,
        settings: &ExportSettings,
        mode: ExportMode<'_>,
    ) -> SurfacingResult<PathBuf> {
        match mode {
            ExportMode::Batch => {
                let dir = self.resolve_export_dir()?;
                self.write_project_cache(project, &dir, settings)
            }
            ExportMode::Single(prompt) => {
                self.check_scene_state(prompt)?;
                let dir = self.resolve_export_dir()?;
                let scene = self.host.scene_path();

                let exported = self.write_project_cache(project, &dir, settings);
                if let Err(e) = &exported {
                    error!("export of {} failed: {}", self.label(project.0), e);
                }
                self.restore_scene(scene)?;
                exported
            }
        }
    }

    /// Export every project, then reopen the scene once.
    ///
    /// A failing project is recorded in the summary and the loop moves on.
    pub fn export_all(
        &mut self,
        settings: &ExportSettings,
        prompt: &mut dyn SavePrompt,
    ) -> SurfacingResult<ExportSummary> {
        self.check_scene_state(prompt)?;
        self.resolve_export_dir()?;
        let scene = self.host.scene_path();

        let mut summary = ExportSummary::default();
        for project in self.projects()? {
            let name = self.label(project.0);
            match self.export_project(project, settings, ExportMode::Batch) {
                Ok(path) => summary.written.push(path),
                Err(e) => {
                    error!("export of {} failed: {}", name, e);
                    summary.failed.push((name, e));
                }
            }
        }

        self.restore_scene(scene)?;
        info!(
            "exported {} project(s), {} failed",
            summary.written.len(),
            summary.failed.len()
        );
        Ok(summary)
    }

    /// Make sure the scene on disk matches the scene in memory, saving with
    /// the user's consent.
    pub fn check_scene_state(&mut self, prompt: &mut dyn SavePrompt) -> SurfacingResult<()> {
        if !self.host.scene_modified() && self.host.scene_path().is_some() {
            return Ok(());
        }
        if !prompt.confirm_save() {
            return Err(SurfacingError::UnsavedChanges);
        }
        self.host.save_scene()?;
        Ok(())
    }

    /// The export directory stored on the root, which must exist.
    pub fn resolve_export_dir(&mut self) -> SurfacingResult<PathBuf> {
        let raw = self.export_path()?;
        let dir = PathBuf::from(raw);
        if dir.as_os_str().is_empty() || !dir.is_dir() {
            return Err(SurfacingError::InvalidExportPath(dir));
        }
        Ok(dir)
    }

    fn restore_scene(&mut self, scene: Option<PathBuf>) -> SurfacingResult<()> {
        let Some(path) = scene else {
            warn!("scene was never saved, leaving merged geometry in place");
            return Ok(());
        };
        self.host
            .open_scene(&path)
            .map_err(|source| SurfacingError::ReopenFailed { path, source })
    }

    fn write_project_cache(
        &mut self,
        project: Project,
        dir: &Path,
        settings: &ExportSettings,
    ) -> SurfacingResult<PathBuf> {
        if !self.is_project(project.0)? {
            return Err(SurfacingError::InvalidProject(self.label(project.0)));
        }
        self.validate()?;
        let project_name = self.host.name(project.0)?;

        let mut roots = Vec::new();
        for object in self.objects(project)? {
            let object_name = self.host.name(object.0)?;
            let members = self.mesh_transforms(object)?;
            if members.is_empty() {
                warn!("{}/{} has no meshes, skipping", project_name, object_name);
                continue;
            }
            match self.merge_object(&members, &object_name, settings.subdiv_level) {
                Ok(merged) => roots.push(merged),
                Err(e) => error!("could not merge {}/{}: {}", project_name, object_name, e),
            }
        }
        if roots.is_empty() {
            warn!("{} has no exportable geometry", project_name);
        }

        let file_path = dir.join(format!("{project_name}.abc"));
        self.host
            .export_cache(&roots, &file_path, &settings.cache)?;
        info!(
            "exported {} ({} object(s)) to {}",
            project_name,
            roots.len(),
            file_path.display()
        );
        Ok(file_path)
    }

    fn merge_object(
        &mut self,
        members: &[NodeId],
        object_name: &str,
        subdiv_level: u32,
    ) -> SurfacingResult<NodeId> {
        let merged = self
            .host
            .merge_meshes(members, &format!("{object_name}_geo"))?;
        if subdiv_level >= 1 {
            self.host.subdivide(merged, subdiv_level)?;
        }
        Ok(merged)
    }
}
