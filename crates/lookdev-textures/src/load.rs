//! Parse, map and group a batch of texture files.

use std::path::{Path, PathBuf};

use lookdev_config::Config;
use tracing::{info, warn};

use crate::discover::find_texture_files;
use crate::error::{TextureError, TextureResult};
use crate::mapping::{MaterialMapper, ShaderPlug};
use crate::record::{GroupedTextureRecord, group_by_tile};
use crate::template::Template;

/// Result of loading a batch of texture files.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Grouped records, in order of first appearance.
    pub records: Vec<GroupedTextureRecord>,
    /// Files that could not be parsed, with the reason.
    pub skipped: Vec<(String, TextureError)>,
    /// Grouped records whose element has no shader plug.
    pub unmapped: usize,
}

/// Parse every file against `template`, attach a shader plug to each record
/// and group the records by tile.
///
/// A file that does not parse, or whose path is not valid UTF-8, is logged and
/// recorded in the report; the rest of the batch continues.
pub fn load_textures(
    files: &[PathBuf],
    template: &Template,
    config: &Config,
) -> TextureResult<LoadReport> {
    let mapper = MaterialMapper::from_config(config);
    let mut report = LoadReport::default();
    let mut records = Vec::with_capacity(files.len());

    for file in files {
        let parsed = file
            .to_str()
            .ok_or_else(|| TextureError::NonUtf8Path(file.clone()))
            .and_then(|path| template.parse(path))
            .and_then(|record| record.tile_index().map(|_| record));
        let mut record = match parsed {
            Ok(record) => record,
            Err(e) => {
                warn!("skipping {}: {}", file.display(), e);
                report.skipped.push((file.display().to_string(), e));
                continue;
            }
        };
        record.shader_plug = Some(match record.textureset_element() {
            Some(element) => mapper.map(element),
            None => ShaderPlug::Unmapped,
        });
        records.push(record);
    }

    report.records = group_by_tile(records, &config.textures.tile_token)?;
    for record in &report.records {
        if record.shader_plug == Some(ShaderPlug::Unmapped) {
            warn!(
                "{}: element {:?} is not mapped to a {} plug",
                record.file_path,
                record.textureset_element().unwrap_or_default(),
                mapper.family()
            );
            report.unmapped += 1;
        }
    }
    info!(
        "loaded {} texture group(s) from {} file(s), {} skipped, {} unmapped",
        report.records.len(),
        files.len(),
        report.skipped.len(),
        report.unmapped
    );
    Ok(report)
}

/// Find texture files under `dir` and load them with the configured template,
/// extension and search depth.
pub fn scan_textures(dir: &Path, config: &Config) -> TextureResult<LoadReport> {
    let template = Template::new(&config.textures.template)?;
    let files = find_texture_files(dir, config.textures.recursive, &config.textures.extension)?;
    load_textures(&files, &template, config)
}
