//! Parsed texture records and grouping by tile index.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use tracing::warn;

use crate::error::{TextureError, TextureResult};
use crate::mapping::ShaderPlug;
use crate::template::{
    FIELD_COLORSPACE, FIELD_ELEMENT, FIELD_OBJECT, FIELD_PROJECT, FIELD_TILE_INDEX,
};

/// One texture file parsed against a template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureRecord {
    /// Path the record was parsed from.
    pub file_path: String,
    /// Captured template fields.
    pub fields: BTreeMap<String, String>,
    /// Shader input this texture feeds, once mapped.
    pub shader_plug: Option<ShaderPlug>,
    tile_span: Option<Range<usize>>,
}

/// Records that differ only in their tile index, folded into one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupedTextureRecord {
    /// Path with the tile index replaced by the tile token. Unchanged for
    /// untiled records.
    pub file_path: String,
    /// Captured template fields, without `tile_index`.
    pub fields: BTreeMap<String, String>,
    /// Shader input this texture feeds, once mapped.
    pub shader_plug: Option<ShaderPlug>,
    /// Observed tile indices, empty for untiled records.
    pub tile_indices: BTreeSet<u32>,
}

macro_rules! field_accessors {
    ($($(#[$doc:meta])* $name:ident => $field:expr;)*) => {
        $(
            $(#[$doc])*
            pub fn $name(&self) -> Option<&str> {
                self.get($field)
            }
        )*
    };
}

impl TextureRecord {
    /// Build a record from a path and its fields, without tile information.
    pub fn new(file_path: impl Into<String>, fields: BTreeMap<String, String>) -> Self {
        Self {
            file_path: file_path.into(),
            fields,
            shader_plug: None,
            tile_span: None,
        }
    }

    pub(crate) fn with_tile_span(
        file_path: String,
        fields: BTreeMap<String, String>,
        tile_span: Option<Range<usize>>,
    ) -> Self {
        Self {
            file_path,
            fields,
            shader_plug: None,
            tile_span,
        }
    }

    /// A captured field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    field_accessors! {
        /// The `surfacing_project` field.
        surfacing_project => FIELD_PROJECT;
        /// The `surfacing_object` field.
        surfacing_object => FIELD_OBJECT;
        /// The `textureset_element` field.
        textureset_element => FIELD_ELEMENT;
        /// The `colorspace` field.
        colorspace => FIELD_COLORSPACE;
    }

    /// The numeric tile index, if the template captured one.
    ///
    /// # Errors
    ///
    /// [`TextureError::InvalidTileIndex`] if the captured text is not a number.
    pub fn tile_index(&self) -> TextureResult<Option<u32>> {
        let Some(value) = self.get(FIELD_TILE_INDEX) else {
            return Ok(None);
        };
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(self.invalid_tile(value));
        }
        value
            .parse()
            .map(Some)
            .map_err(|_| self.invalid_tile(value))
    }

    /// The file path with the tile index replaced by `tile_token`.
    fn tiled_path(&self, tile_token: &str) -> String {
        let value = self.get(FIELD_TILE_INDEX).unwrap_or_default();
        match &self.tile_span {
            Some(span) if self.file_path.get(span.clone()) == Some(value) => {
                let mut path = self.file_path.clone();
                path.replace_range(span.clone(), tile_token);
                path
            }
            // Hand-built record: substitute the last occurrence.
            _ => match self.file_path.rfind(value) {
                Some(start) if !value.is_empty() => {
                    let mut path = self.file_path.clone();
                    path.replace_range(start..start + value.len(), tile_token);
                    path
                }
                _ => self.file_path.clone(),
            },
        }
    }

    fn invalid_tile(&self, value: &str) -> TextureError {
        TextureError::InvalidTileIndex {
            path: self.file_path.clone(),
            value: value.to_string(),
        }
    }
}

impl GroupedTextureRecord {
    /// A captured field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    field_accessors! {
        /// The `surfacing_project` field.
        surfacing_project => FIELD_PROJECT;
        /// The `surfacing_object` field.
        surfacing_object => FIELD_OBJECT;
        /// The `textureset_element` field.
        textureset_element => FIELD_ELEMENT;
        /// The `colorspace` field.
        colorspace => FIELD_COLORSPACE;
    }

    /// Returns `true` if the record stands for several tiles.
    pub fn is_tiled(&self) -> bool {
        !self.tile_indices.is_empty()
    }

    /// One concrete path per tile, or the path itself when untiled.
    pub fn expand(&self, tile_token: &str) -> Vec<String> {
        if self.tile_indices.is_empty() {
            return vec![self.file_path.clone()];
        }
        self.tile_indices
            .iter()
            .map(|index| self.file_path.replacen(tile_token, &index.to_string(), 1))
            .collect()
    }
}

impl From<TextureRecord> for GroupedTextureRecord {
    fn from(record: TextureRecord) -> Self {
        Self {
            file_path: record.file_path,
            fields: record.fields,
            shader_plug: record.shader_plug,
            tile_indices: BTreeSet::new(),
        }
    }
}

/// Fold records that share every field except `tile_index` into one grouped
/// record whose path carries `tile_token` in place of the index.
///
/// Groups come out in order of first appearance. Untiled records pass through
/// unchanged and a repeated (group, tile) pair is dropped with a warning.
///
/// # Errors
///
/// [`TextureError::InvalidTileIndex`] for a non-numeric tile index.
pub fn group_by_tile(
    records: Vec<TextureRecord>,
    tile_token: &str,
) -> TextureResult<Vec<GroupedTextureRecord>> {
    let mut grouped: Vec<GroupedTextureRecord> = Vec::new();
    let mut index: BTreeMap<(String, BTreeMap<String, String>), usize> = BTreeMap::new();

    for record in records {
        let Some(tile) = record.tile_index()? else {
            grouped.push(record.into());
            continue;
        };
        let file_path = record.tiled_path(tile_token);
        let mut fields = record.fields;
        fields.remove(FIELD_TILE_INDEX);
        let key = (file_path, fields);

        match index.get(&key) {
            Some(&slot) => {
                if !grouped[slot].tile_indices.insert(tile) {
                    warn!("duplicate tile {} for {}, ignoring {}", tile, key.0, record.file_path);
                }
            }
            None => {
                index.insert(key.clone(), grouped.len());
                let (file_path, fields) = key;
                grouped.push(GroupedTextureRecord {
                    file_path,
                    fields,
                    shader_plug: record.shader_plug,
                    tile_indices: BTreeSet::from([tile]),
                });
            }
        }
    }
    Ok(grouped)
}
