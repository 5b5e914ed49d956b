//! Texture file discovery.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{TextureError, TextureResult};

/// Files under `dir` whose name contains `extension`, sorted by path.
///
/// An empty `extension` accepts every file. Sub-directories are searched when
/// `recursive` is set.
///
/// # Errors
///
/// [`TextureError::NotADirectory`] if `dir` is not a directory.
pub fn find_texture_files(
    dir: &Path,
    recursive: bool,
    extension: &str,
) -> TextureResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(TextureError::NotADirectory(dir.to_path_buf()));
    }
    info!(
        "searching {} for '{}' files (recursive: {})",
        dir.display(),
        extension,
        recursive
    );
    let mut files = Vec::new();
    collect(dir, recursive, extension, &mut files)?;
    files.sort();
    info!("found {} texture file(s)", files.len());
    Ok(files)
}

fn collect(
    dir: &Path,
    recursive: bool,
    extension: &str,
    files: &mut Vec<PathBuf>,
) -> TextureResult<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if recursive {
                collect(&path, recursive, extension, files)?;
            }
            continue;
        }
        let matches = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().contains(extension));
        if matches {
            debug!("found {}", path.display());
            files.push(path);
        }
    }
    Ok(())
}
