//! The `lookdev` command line: one subcommand per panel button, run against a
//! scene file that is saved back when the command changed it.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use lookdev_config::{CliArgs, Config};
use lookdev_host::{Host, HostError, MemoryHost, NodeId};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::panel::{LookdevPanel, MaterialMappingPanel, PanelError, SurfacingPanel, TextureRow};

/// Result alias for command execution.
pub type AppResult<T> = Result<T, AppError>;

/// Errors reported by the `lookdev` binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// A panel action failed.
    #[error(transparent)]
    Panel(#[from] PanelError),

    /// The scene file could not be opened or saved.
    #[error(transparent)]
    Host(#[from] HostError),

    /// No node has the name given on the command line.
    #[error("no node named {0:?}")]
    NotFound(String),

    /// Several nodes share the name given on the command line.
    #[error("{count} nodes are named {name:?}")]
    Ambiguous {
        /// Name looked up.
        name: String,
        /// Nodes carrying it.
        count: usize,
    },

    /// A batch export finished with failures.
    #[error("{0} project(s) failed to export")]
    ExportFailed(usize),

    /// A listing could not be encoded as JSON.
    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing to the output stream failed.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Command-line interface of the `lookdev` binary.
#[derive(Parser, Debug)]
#[command(
    name = "lookdev",
    version,
    about = "Surfacing projects, texture import and cache export"
)]
pub struct Cli {
    /// Config overrides shared with the config file.
    #[command(flatten)]
    pub args: CliArgs,

    /// Scene file to operate on.
    #[arg(long, global = true, default_value = "scene.ron")]
    pub scene: PathBuf,

    /// Action to run.
    #[command(subcommand)]
    pub command: Command,
}

/// One subcommand per panel button.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the scene file if needed and bootstrap the surfacing root.
    Init,
    /// Add a mesh transform to the scene.
    AddMesh {
        /// Transform name.
        name: String,
        /// Face count of the new mesh.
        #[arg(long, default_value_t = 6)]
        faces: u64,
    },
    /// Print projects, objects and their meshes.
    List {
        /// Print JSON instead of an indented tree.
        #[arg(long)]
        json: bool,
    },
    /// Create a project with one default object.
    NewProject {
        /// Project name, `project` if omitted.
        name: Option<String>,
    },
    /// Delete a project and its objects. Meshes stay in the scene.
    DeleteProject {
        /// Project name.
        project: String,
    },
    /// Add an object to a project.
    NewObject {
        /// Owning project name.
        project: String,
        /// Object name, `object` if omitted.
        name: Option<String>,
    },
    /// Delete an object. Its meshes stay in the scene.
    DeleteObject {
        /// Object name.
        object: String,
    },
    /// Add meshes (or groups containing meshes) to an object.
    Add {
        /// Target object name.
        object: String,
        /// Meshes or groups to add.
        #[arg(required = true)]
        nodes: Vec<String>,
    },
    /// Rename a project or object.
    Rename {
        /// Current name.
        node: String,
        /// Requested name. The scene may uniquify it.
        new_name: String,
    },
    /// Repair set membership and refresh mesh markers.
    Validate,
    /// Store the cache export directory in the scene.
    SetExportPath {
        /// Existing directory.
        dir: PathBuf,
    },
    /// Export one project's geometry cache.
    Export {
        /// Project name.
        project: String,
        /// Save pending scene changes instead of refusing to export.
        #[arg(long)]
        save: bool,
    },
    /// Export every project.
    ExportAll {
        /// Save pending scene changes instead of refusing to export.
        #[arg(long)]
        save: bool,
    },
    /// Set or clear viewport wireframe colors.
    Colors {
        /// Color per project or per object, or clear.
        #[arg(value_enum)]
        action: ColorAction,
    },
    /// Create placeholder materials.
    Materials {
        /// One material per project or per object.
        #[arg(value_enum)]
        scope: Scope,
    },
    /// List the texture groups found in a folder.
    ScanTextures {
        /// Folder and filters.
        #[command(flatten)]
        textures: TextureArgs,
        /// Print JSON instead of one line per group.
        #[arg(long)]
        json: bool,
    },
    /// Scan a folder and build shaders from the textures found.
    ImportTextures {
        /// Folder and filters.
        #[command(flatten)]
        textures: TextureArgs,
        /// Create one shader per project or per object.
        #[arg(long, value_enum, default_value_t = Scope::Object)]
        by: Scope,
    },
}

/// Folder scan options.
#[derive(Args, Debug)]
pub struct TextureArgs {
    /// Folder to search.
    pub dir: PathBuf,

    /// Substring texture file names must contain.
    #[arg(long)]
    pub extension: Option<String>,

    /// Do not descend into sub-folders.
    #[arg(long)]
    pub flat: bool,
}

/// Grouping level for materials and texture import.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Scope {
    /// One per project.
    Project,
    /// One per object.
    Object,
}

/// `colors` subcommand argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorAction {
    /// Color meshes by project.
    Project,
    /// Color meshes by object.
    Object,
    /// Reset wireframe colors.
    Clear,
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct SceneListing {
    export_path: String,
    projects: Vec<ProjectListing>,
}

#[derive(Debug, Serialize)]
struct ProjectListing {
    name: String,
    objects: Vec<ObjectListing>,
}

#[derive(Debug, Serialize)]
struct ObjectListing {
    name: String,
    meshes: Vec<String>,
}

#[derive(Debug, Serialize)]
struct TextureListing<'a> {
    file_path: &'a str,
    project: Option<&'a str>,
    object: Option<&'a str>,
    element: Option<&'a str>,
    plug: String,
    tiles: Vec<u32>,
    in_scene: bool,
}

impl<'a> From<&'a TextureRow> for TextureListing<'a> {
    fn from(row: &'a TextureRow) -> Self {
        let record = &row.record;
        Self {
            file_path: &record.file_path,
            project: record.surfacing_project(),
            object: record.surfacing_object(),
            element: record.textureset_element(),
            plug: record
                .shader_plug
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            tiles: record.tile_indices.iter().copied().collect(),
            in_scene: row.in_scene,
        }
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Open the scene named by `cli`, run the command and save the scene if the
/// command modified it. Human-readable results go to `out`.
pub fn run(cli: &Cli, config: &Config, out: &mut dyn Write) -> AppResult<()> {
    let mut host = open_scene(&cli.scene, matches!(cli.command, Command::Init))?;
    execute(&cli.command, &mut host, config, out)?;
    if host.scene_modified() {
        host.save_scene()?;
        info!("saved {}", cli.scene.display());
    }
    Ok(())
}

fn open_scene(path: &Path, create: bool) -> AppResult<MemoryHost> {
    if create && !path.exists() {
        let mut host = MemoryHost::new();
        host.save_scene_as(path)?;
        info!("created scene {}", path.display());
        return Ok(host);
    }
    Ok(MemoryHost::open(path)?)
}

/// The single node called `name`.
fn resolve(host: &dyn Host, name: &str) -> AppResult<NodeId> {
    match host.find_by_name(name).as_slice() {
        [node] => Ok(*node),
        [] => Err(AppError::NotFound(name.to_string())),
        nodes => Err(AppError::Ambiguous {
            name: name.to_string(),
            count: nodes.len(),
        }),
    }
}

fn execute(
    command: &Command,
    host: &mut MemoryHost,
    config: &Config,
    out: &mut dyn Write,
) -> AppResult<()> {
    match command {
        Command::AddMesh { name, faces } => {
            let transform = host.create_mesh_transform(name, *faces)?;
            writeln!(out, "{}", host.name(transform)?)?;
        }
        Command::Init => {
            let mut panel = SurfacingPanel::new(Some(host), config);
            panel.open()?;
            for project in panel.projects() {
                writeln!(out, "{}", project.name)?;
            }
        }
        Command::List { json } => {
            let listing = scene_listing(&mut SurfacingPanel::new(Some(host), config))?;
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&listing)?)?;
            } else {
                write_listing(&listing, out)?;
            }
        }
        Command::NewProject { name } => {
            let mut panel = SurfacingPanel::new(Some(host), config);
            panel.refresh()?;
            let project = panel.new_project(name.as_deref())?;
            let name = panel
                .projects()
                .iter()
                .find(|item| item.node == project)
                .map(|item| item.name.as_str())
                .unwrap_or_default();
            writeln!(out, "{name}")?;
        }
        Command::DeleteProject { project } => {
            let project = resolve(host, project)?;
            let mut panel = SurfacingPanel::new(Some(host), config);
            panel.select_project(project)?;
            panel.delete_project()?;
        }
        Command::NewObject { project, name } => {
            let project = resolve(host, project)?;
            let mut panel = SurfacingPanel::new(Some(&mut *host), config);
            panel.select_project(project)?;
            let object = panel.new_object(name.as_deref())?;
            drop(panel);
            writeln!(out, "{}", host.name(object)?)?;
        }
        Command::DeleteObject { object } => {
            let object = resolve(host, object)?;
            let mut panel = SurfacingPanel::new(Some(host), config);
            panel.select_object(object)?;
            panel.delete_object()?;
        }
        Command::Add { object, nodes } => {
            let object = resolve(host, object)?;
            let nodes = nodes
                .iter()
                .map(|name| resolve(&*host, name))
                .collect::<AppResult<Vec<_>>>()?;
            host.select(&nodes)?;
            let mut panel = SurfacingPanel::new(Some(&mut *host), config);
            panel.select_object(object)?;
            let added = panel.add_selection_to_object()?;
            drop(panel);
            for transform in added {
                writeln!(out, "{}", host.name(transform)?)?;
            }
        }
        Command::Rename { node, new_name } => {
            let node = resolve(host, node)?;
            let name = SurfacingPanel::new(Some(host), config).rename(node, new_name)?;
            writeln!(out, "{name}")?;
        }
        Command::Validate => {
            let report = SurfacingPanel::new(Some(host), config).validate()?;
            writeln!(
                out,
                "removed {} member(s), {} object(s) partitioned, {} mesh transform(s) marked",
                report.removed, report.objects, report.mesh_transforms
            )?;
        }
        Command::SetExportPath { dir } => {
            SurfacingPanel::new(Some(host), config).set_export_path(dir)?;
        }
        Command::Export { project, save } => {
            let project = resolve(host, project)?;
            let save = *save;
            let mut prompt = move || save;
            let mut panel = SurfacingPanel::new(Some(host), config);
            panel.select_project(project)?;
            let path = panel.export_project(&mut prompt)?;
            writeln!(out, "{}", path.display())?;
        }
        Command::ExportAll { save } => {
            let save = *save;
            let mut prompt = move || save;
            let summary = SurfacingPanel::new(Some(host), config).export_all(&mut prompt)?;
            for path in &summary.written {
                writeln!(out, "{}", path.display())?;
            }
            for (project, e) in &summary.failed {
                writeln!(out, "failed: {project}: {e}")?;
            }
            if !summary.failed.is_empty() {
                return Err(AppError::ExportFailed(summary.failed.len()));
            }
        }
        Command::Colors { action } => {
            let mut panel = LookdevPanel::new(Some(host), config);
            let count = match action {
                ColorAction::Project => panel.apply_colors_per_project()?,
                ColorAction::Object => panel.apply_colors_per_object()?,
                ColorAction::Clear => panel.clear_colors()?,
            };
            writeln!(out, "{count} transform(s)")?;
        }
        Command::Materials { scope } => {
            let mut panel = LookdevPanel::new(Some(&mut *host), config);
            let shaders = match scope {
                Scope::Project => panel.apply_materials_per_project()?,
                Scope::Object => panel.apply_materials_per_object()?,
            };
            drop(panel);
            for shader in shaders {
                writeln!(out, "{}", host.name(shader)?)?;
            }
        }
        Command::ScanTextures { textures, json } => {
            let mut panel = texture_panel(host, config, textures);
            let rows = panel.scan_folder(&textures.dir)?;
            let listings: Vec<TextureListing<'_>> = rows.iter().map(TextureListing::from).collect();
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&listings)?)?;
            } else {
                for listing in &listings {
                    let marker = if listing.in_scene { ' ' } else { '?' };
                    writeln!(
                        out,
                        "{marker} {} -> {} {:?}",
                        listing.file_path, listing.plug, listing.tiles
                    )?;
                }
            }
        }
        Command::ImportTextures { textures, by } => {
            let mut panel = texture_panel(host, config, textures);
            panel.scan_folder(&textures.dir)?;
            let report = match by {
                Scope::Project => panel.import_by_project()?,
                Scope::Object => panel.import_by_object()?,
            };
            for shader in report.shaders.keys() {
                writeln!(out, "{shader}")?;
            }
            writeln!(
                out,
                "{} connected, {} unmapped, {} skipped, {} unmatched, {} assigned",
                report.connected,
                report.unmapped,
                report.skipped,
                report.unmatched,
                report.assigned
            )?;
        }
    }
    Ok(())
}

fn texture_panel<'h>(
    host: &'h mut dyn Host,
    config: &Config,
    args: &TextureArgs,
) -> MaterialMappingPanel<'h> {
    let mut panel = MaterialMappingPanel::new(Some(host), config);
    if let Some(extension) = &args.extension {
        panel.set_extension(extension);
    }
    if args.flat {
        panel.set_recursive(false);
    }
    panel
}

fn scene_listing(panel: &mut SurfacingPanel<'_>) -> AppResult<SceneListing> {
    panel.refresh()?;
    let export_path = panel.export_path()?;
    let mut projects = Vec::new();
    for project in panel.projects().to_vec() {
        panel.select_project(project.node)?;
        let mut objects = Vec::new();
        for object in panel.objects().to_vec() {
            let meshes = panel
                .members(object.node)?
                .into_iter()
                .map(|item| item.name)
                .collect();
            objects.push(ObjectListing {
                name: object.name,
                meshes,
            });
        }
        projects.push(ProjectListing {
            name: project.name,
            objects,
        });
    }
    Ok(SceneListing {
        export_path,
        projects,
    })
}

fn write_listing(listing: &SceneListing, out: &mut dyn Write) -> std::io::Result<()> {
    if !listing.export_path.is_empty() {
        writeln!(out, "export path: {}", listing.export_path)?;
    }
    for project in &listing.projects {
        writeln!(out, "{}", project.name)?;
        for object in &project.objects {
            writeln!(out, "  {}: {}", object.name, object.meshes.join(", "))?;
        }
    }
    Ok(())
}
