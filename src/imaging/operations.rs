//! High-level image operations.
//!
//! These functions combine calculations with backend execution: they read
//! the source dimensions, work out the bounded size and ask the backend to
//! produce the file in the staging directory.

use super::backend::{BackendError, ImageBackend};
use super::calculations::calculate_bounded_dimensions;
use super::params::{Quality, ResizeParams};
use crate::catalog::LocalImage;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// A resized copy sitting in the staging directory, named like its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizedImage {
    pub file_name: String,
    pub staging_path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Plan a resize without executing it.
pub fn plan_resize(
    image: &LocalImage,
    original_dims: (u32, u32),
    max_dimension: u32,
    staging_dir: &Path,
    quality: Quality,
) -> ResizeParams {
    let (width, height) = calculate_bounded_dimensions(original_dims, max_dimension);
    ResizeParams {
        source: image.path.clone(),
        output: staging_dir.join(&image.file_name),
        width,
        height,
        quality,
    }
}

/// Resize `image` into `staging_dir` so neither edge exceeds `max_dimension`.
pub fn resize_to_bound(
    backend: &impl ImageBackend,
    image: &LocalImage,
    max_dimension: u32,
    staging_dir: &Path,
    quality: Quality,
) -> Result<ResizedImage> {
    let dims = backend.identify(&image.path)?;
    let params = plan_resize(
        image,
        (dims.width, dims.height),
        max_dimension,
        staging_dir,
        quality,
    );
    backend.resize(&params)?;

    Ok(ResizedImage {
        file_name: image.file_name.clone(),
        staging_path: params.output,
        width: params.width,
        height: params.height,
    })
}
