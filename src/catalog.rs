//! Local image discovery.
//!
//! Lists the files in a single directory whose names end in one of the
//! accepted extensions. The match is a case-sensitive suffix match on
//! `.<ext>`, so `photo.JPG` is not picked up while `photo.jpg` is.
//! Subdirectories are skipped even when their names look like images, and the
//! scan carries on with the next entry.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extensions accepted both locally and when filtering the remote listing.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "png", "bmp", "jpeg"];

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Cannot list directory {path}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An image file found in the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalImage {
    pub path: PathBuf,
    pub file_name: String,
    pub extension: String,
}

/// Whether `name` ends in `.<ext>` for one of `extensions`.
pub fn is_image_name(name: &str, extensions: &[&str]) -> bool {
    extensions.iter().any(|ext| {
        name.strip_suffix(ext)
            .is_some_and(|stem| stem.ends_with('.'))
    })
}

/// List the image files directly inside `dir`.
///
/// Returns an empty list when nothing matches. Results are sorted by file
/// name so output is stable from run to run. An entry that cannot be read
/// while the directory is being enumerated fails the whole listing.
pub fn list(dir: &Path, extensions: &[&str]) -> Result<Vec<LocalImage>, CatalogError> {
    let entries = fs::read_dir(dir).map_err(|source| CatalogError::DirectoryUnreadable {
        path: dir.to_path_buf(),
        source,
    })?;
    select_images(
        dir,
        entries.map(|entry| entry.map(|e| (e.path(), e.file_name()))),
        extensions,
    )
}

/// Keep the `(path, file name)` entries that are image files.
fn select_images(
    dir: &Path,
    entries: impl IntoIterator<Item = io::Result<(PathBuf, OsString)>>,
    extensions: &[&str],
) -> Result<Vec<LocalImage>, CatalogError> {
    let mut images = Vec::new();
    for entry in entries {
        let (path, name) = entry.map_err(|source| CatalogError::DirectoryUnreadable {
            path: dir.to_path_buf(),
            source,
        })?;
        if path.is_dir() {
            continue;
        }
        // Non UTF-8 names cannot match an ASCII suffix anyway.
        let Some(file_name) = name.to_str().map(str::to_owned) else {
            continue;
        };
        let Some(extension) = extensions
            .iter()
            .find(|ext| is_image_name(&file_name, &[**ext]))
        else {
            continue;
        };
        images.push(LocalImage {
            path,
            file_name,
            extension: extension.to_string(),
        });
    }

    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(images)
}
