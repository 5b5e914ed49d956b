//! Texture import: find image files, parse their names against a template,
//! group tiles, map textureset elements to shader plugs, and wire the result
//! into placeholder shaders in the host scene.

mod discover;
mod error;
mod fuzzy;
mod import;
mod load;
mod mapping;
mod record;
mod template;

pub use discover::find_texture_files;
pub use error::{TextureError, TextureResult};
pub use fuzzy::{ratio, token_set_ratio};
pub use import::{GroupBy, ImportReport, ImportSettings, import_textures};
pub use load::{LoadReport, load_textures, scan_textures};
pub use mapping::{MaterialMapper, ShaderPlug};
pub use record::{GroupedTextureRecord, TextureRecord, group_by_tile};
pub use template::{
    FIELD_COLORSPACE, FIELD_ELEMENT, FIELD_EXTENSION, FIELD_OBJECT, FIELD_PROJECT,
    FIELD_TILE_INDEX, Template,
};
