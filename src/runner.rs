//! Run orchestration.
//!
//! Loads the configuration first, so a missing or incomplete `config.toml`
//! stops the run before the staging directory is created and before any
//! connection is opened. Then prepares staging and hands over to the
//! [`GalleryPublisher`].

use crate::catalog::{self, CatalogError, IMAGE_EXTENSIONS, LocalImage};
use crate::config::{self, Config, ConfigError};
use crate::imaging::ImageBackend;
use crate::publish::{
    Emit, GalleryPublisher, PublishError, PublishEvent, PublishReport, Workspace,
};
use crate::transfer::TransferClient;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Cannot create staging directory {path}: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Which part of the pipeline to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Resize, upload, then regenerate the manifest.
    Publish,
    /// Resize into staging only.
    Resize,
    /// Regenerate the manifest from the remote listing only.
    Manifest,
}

impl Mode {
    fn needs_staging(self) -> bool {
        matches!(self, Mode::Publish | Mode::Resize)
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config_path: PathBuf,
    pub workspace: Workspace,
    pub mode: Mode,
}

/// Create `path` if it is missing. Returns whether it had to be created;
/// an existing directory is not an error.
pub fn ensure_staging_dir(path: &Path) -> Result<bool, RunError> {
    if path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(path).map_err(|source| RunError::Staging {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}

/// Load the config, prepare staging and run the selected mode.
pub fn run<B: ImageBackend, C: TransferClient>(
    options: &RunOptions,
    backend: &B,
    client: &C,
    emit: Emit<'_>,
) -> Result<PublishReport, RunError> {
    let config = config::load_config(&options.config_path)?;
    run_with_config(&config, options, backend, client, emit)
}

/// Same as [`run`] with an already loaded config.
pub fn run_with_config<B: ImageBackend, C: TransferClient>(
    config: &Config,
    options: &RunOptions,
    backend: &B,
    client: &C,
    emit: Emit<'_>,
) -> Result<PublishReport, RunError> {
    let workspace = &options.workspace;
    if options.mode.needs_staging() {
        let created = ensure_staging_dir(&workspace.staging_dir)?;
        emit(&PublishEvent::StagingReady {
            path: workspace.staging_dir.clone(),
            created,
        });
    }

    let publisher = GalleryPublisher::new(config, workspace, backend, client);
    let report = match options.mode {
        Mode::Publish => publisher.publish(emit)?,
        Mode::Resize => publisher.resize_only(emit)?,
        Mode::Manifest => publisher.publish_manifest(emit)?,
    };
    Ok(report)
}

/// Validate the config and list what would be processed. Touches neither
/// the staging directory nor the network.
pub fn check(config_path: &Path, source_dir: &Path) -> Result<(Config, Vec<LocalImage>), RunError> {
    let config = config::load_config(config_path)?;
    let images = catalog::list(source_dir, IMAGE_EXTENSIONS)?;
    Ok((config, images))
}
