//! Gallery publishing.
//!
//! Drives one run through its phases, strictly in sequence:
//!
//! ```text
//! Idle → Cataloging → Resizing ⇄ Uploading → Listing → Rendering → PublishingManifest → Done
//!                              (any phase) → Failed(reason)
//! ```
//!
//! ## Failure isolation
//!
//! Every image gets its own resize attempt and, only if that succeeded, its
//! own transfer session. A corrupt file or a rejected upload is reported as
//! that image's outcome and the loop moves on. The run itself only fails
//! when:
//!
//! - the source directory cannot be listed,
//! - every cataloged image failed,
//! - the gallery listing or the manifest upload failed,
//! - the gallery listing has no images (an empty page is never uploaded).
//!
//! An empty source directory is not a failure: the manifest is still
//! regenerated from whatever the server already holds.
//!
//! ## Sessions
//!
//! One session per uploaded image, one for the listing and one for the
//! manifest upload. No session outlives the step that opened it, so a
//! dropped connection costs at most one image. A disconnect the server
//! rejects is reported as [`PublishEvent::SessionCloseFailed`], also when the
//! step itself already failed.

use crate::catalog::{self, CatalogError, IMAGE_EXTENSIONS, LocalImage};
use crate::config::Config;
use crate::imaging::{ImageBackend, Quality, ResizedImage, resize_to_bound};
use crate::manifest;
use crate::transfer::{RemoteEntry, Session, TransferClient, TransferError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("All {0} images failed, nothing was published")]
    AllImagesFailed(usize),
    #[error("Gallery listing failed: {0}")]
    Listing(#[source] TransferError),
    #[error("Cannot write manifest {path}: {source}")]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Remote gallery has no images, refusing to publish an empty manifest")]
    EmptyManifest,
    #[error("Manifest upload failed: {0}")]
    ManifestUpload(#[source] TransferError),
}

/// Where a run currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Cataloging,
    Resizing,
    Uploading,
    Listing,
    Rendering,
    PublishingManifest,
    Done,
    Failed(String),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Cataloging => write!(f, "cataloging"),
            Phase::Resizing => write!(f, "resizing"),
            Phase::Uploading => write!(f, "uploading"),
            Phase::Listing => write!(f, "listing"),
            Phase::Rendering => write!(f, "rendering"),
            Phase::PublishingManifest => write!(f, "publishing manifest"),
            Phase::Done => write!(f, "done"),
            Phase::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Progress events, delivered synchronously as the run advances.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishEvent {
    PhaseChanged(Phase),
    StagingReady {
        path: PathBuf,
        created: bool,
    },
    Cataloged {
        count: usize,
    },
    ImageStarted {
        index: usize,
        total: usize,
        file_name: String,
    },
    ImageResized {
        file_name: String,
        width: u32,
        height: u32,
    },
    ImageUploaded {
        file_name: String,
        remote_path: String,
    },
    ImageFailed {
        file_name: String,
        status: ImageStatus,
    },
    GalleryListed {
        images: usize,
        ignored: usize,
    },
    ManifestWritten {
        path: PathBuf,
        fragments: usize,
    },
    ManifestUploaded {
        remote_path: String,
    },
    /// The server did not acknowledge a disconnect.
    SessionCloseFailed {
        reason: String,
    },
}

/// What happened to one cataloged image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStatus {
    /// Resized into staging; no upload was requested.
    Staged { width: u32, height: u32 },
    Uploaded { remote_path: String },
    ResizeFailed(String),
    UploadFailed(String),
}

impl ImageStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, ImageStatus::ResizeFailed(_) | ImageStatus::UploadFailed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOutcome {
    pub file_name: String,
    pub status: ImageStatus,
}

/// The published manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestReport {
    pub local_path: PathBuf,
    pub remote_path: String,
    pub fragments: usize,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub images: Vec<ImageOutcome>,
    pub manifest: Option<ManifestReport>,
}

impl PublishReport {
    pub fn failed_count(&self) -> usize {
        self.images.iter().filter(|i| i.status.is_failure()).count()
    }
}

/// Local directories a run works with.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Directory scanned for images; the local manifest is written here too.
    pub source_dir: PathBuf,
    /// Resized copies land here, named like their sources.
    pub staging_dir: PathBuf,
}

impl Workspace {
    pub fn manifest_file(&self, config: &Config) -> PathBuf {
        self.source_dir.join(&config.remote.manifest)
    }
}

/// Receiver for progress events.
pub type Emit<'e> = &'e mut dyn FnMut(&PublishEvent);

/// Announce the terminal phase for `result` and pass it through.
fn conclude(
    result: Result<PublishReport, PublishError>,
    emit: Emit<'_>,
) -> Result<PublishReport, PublishError> {
    let terminal = match &result {
        Ok(_) => Phase::Done,
        Err(e) => Phase::Failed(e.to_string()),
    };
    emit(&PublishEvent::PhaseChanged(terminal));
    result
}

/// Runs the publishing phases against an image backend and transfer client.
pub struct GalleryPublisher<'a, B: ImageBackend, C: TransferClient> {
    config: &'a Config,
    workspace: &'a Workspace,
    backend: &'a B,
    client: &'a C,
}

impl<'a, B: ImageBackend, C: TransferClient> GalleryPublisher<'a, B, C> {
    pub fn new(
        config: &'a Config,
        workspace: &'a Workspace,
        backend: &'a B,
        client: &'a C,
    ) -> Self {
        Self {
            config,
            workspace,
            backend,
            client,
        }
    }

    /// Full run: resize and upload every local image, then regenerate and
    /// upload the manifest from the remote listing.
    pub fn publish(&self, emit: Emit<'_>) -> Result<PublishReport, PublishError> {
        emit(&PublishEvent::PhaseChanged(Phase::Idle));
        let result = match self.process_images(true, emit) {
            Ok(images) => self
                .regenerate_manifest(emit)
                .map(|manifest| PublishReport {
                    images,
                    manifest: Some(manifest),
                }),
            Err(e) => Err(e),
        };
        conclude(result, emit)
    }

    /// Resize every local image into staging without touching the network.
    pub fn resize_only(&self, emit: Emit<'_>) -> Result<PublishReport, PublishError> {
        emit(&PublishEvent::PhaseChanged(Phase::Idle));
        let result = self
            .process_images(false, emit)
            .map(|images| PublishReport {
                images,
                manifest: None,
            });
        conclude(result, emit)
    }

    /// Regenerate and upload the manifest from what is already on the server.
    pub fn publish_manifest(&self, emit: Emit<'_>) -> Result<PublishReport, PublishError> {
        emit(&PublishEvent::PhaseChanged(Phase::Idle));
        let result = self
            .regenerate_manifest(emit)
            .map(|manifest| PublishReport {
                images: Vec::new(),
                manifest: Some(manifest),
            });
        conclude(result, emit)
    }

    fn catalog(&self, emit: Emit<'_>) -> Result<Vec<LocalImage>, PublishError> {
        emit(&PublishEvent::PhaseChanged(Phase::Cataloging));
        let images = catalog::list(&self.workspace.source_dir, IMAGE_EXTENSIONS)?;
        emit(&PublishEvent::Cataloged {
            count: images.len(),
        });
        Ok(images)
    }

    /// Resize (and optionally upload) each cataloged image.
    fn process_images(
        &self,
        upload: bool,
        emit: Emit<'_>,
    ) -> Result<Vec<ImageOutcome>, PublishError> {
        let images = self.catalog(emit)?;
        let total = images.len();
        let mut outcomes = Vec::with_capacity(total);

        for (i, image) in images.iter().enumerate() {
            emit(&PublishEvent::ImageStarted {
                index: i + 1,
                total,
                file_name: image.file_name.clone(),
            });
            let status = self.process_image(image, upload, emit);
            if status.is_failure() {
                emit(&PublishEvent::ImageFailed {
                    file_name: image.file_name.clone(),
                    status: status.clone(),
                });
            }
            outcomes.push(ImageOutcome {
                file_name: image.file_name.clone(),
                status,
            });
        }

        if total > 0 && outcomes.iter().all(|o| o.status.is_failure()) {
            return Err(PublishError::AllImagesFailed(total));
        }
        Ok(outcomes)
    }

    fn process_image(&self, image: &LocalImage, upload: bool, emit: Emit<'_>) -> ImageStatus {
        emit(&PublishEvent::PhaseChanged(Phase::Resizing));
        let resized = match resize_to_bound(
            self.backend,
            image,
            self.config.images.max_dimension,
            &self.workspace.staging_dir,
            Quality::new(self.config.images.quality),
        ) {
            Ok(resized) => resized,
            Err(e) => return ImageStatus::ResizeFailed(e.to_string()),
        };
        emit(&PublishEvent::ImageResized {
            file_name: resized.file_name.clone(),
            width: resized.width,
            height: resized.height,
        });

        if !upload {
            return ImageStatus::Staged {
                width: resized.width,
                height: resized.height,
            };
        }

        emit(&PublishEvent::PhaseChanged(Phase::Uploading));
        match self.upload_image(&resized, emit) {
            Ok(remote_path) => {
                emit(&PublishEvent::ImageUploaded {
                    file_name: resized.file_name.clone(),
                    remote_path: remote_path.clone(),
                });
                ImageStatus::Uploaded { remote_path }
            }
            Err(e) => ImageStatus::UploadFailed(e.to_string()),
        }
    }

    fn upload_image(
        &self,
        resized: &ResizedImage,
        emit: Emit<'_>,
    ) -> Result<String, TransferError> {
        let remote_path = self.config.remote.image_path(&resized.file_name);
        self.in_session(emit, |session| {
            session.store(&remote_path, &resized.staging_path)
        })?;
        Ok(remote_path)
    }

    /// Run `work` in its own session. A failed disconnect is reported
    /// whatever the work's outcome, and never replaces that outcome.
    fn in_session<T>(
        &self,
        emit: Emit<'_>,
        work: impl FnOnce(&mut Session<'a, C>) -> Result<T, TransferError>,
    ) -> Result<T, TransferError> {
        let outcome = Session::run(self.client, self.config, work);
        if let Some(e) = outcome.close_error {
            emit(&PublishEvent::SessionCloseFailed {
                reason: e.to_string(),
            });
        }
        outcome.result
    }

    /// Listing → Rendering → PublishingManifest.
    fn regenerate_manifest(&self, emit: Emit<'_>) -> Result<ManifestReport, PublishError> {
        emit(&PublishEvent::PhaseChanged(Phase::Listing));
        let entries = self.list_gallery(emit).map_err(PublishError::Listing)?;

        emit(&PublishEvent::PhaseChanged(Phase::Rendering));
        let content = manifest::render(&entries, &self.config.remote);

        emit(&PublishEvent::PhaseChanged(Phase::PublishingManifest));
        if content.trim().is_empty() {
            return Err(PublishError::EmptyManifest);
        }

        let local_path = self.workspace.manifest_file(self.config);
        fs::write(&local_path, &content).map_err(|source| PublishError::ManifestWrite {
            path: local_path.clone(),
            source,
        })?;
        emit(&PublishEvent::ManifestWritten {
            path: local_path.clone(),
            fragments: entries.len(),
        });

        let remote_path = self.config.remote.manifest_path();
        self.upload_manifest(&local_path, &remote_path, emit)
            .map_err(PublishError::ManifestUpload)?;
        emit(&PublishEvent::ManifestUploaded {
            remote_path: remote_path.clone(),
        });

        Ok(ManifestReport {
            local_path,
            remote_path,
            fragments: entries.len(),
        })
    }

    /// List the remote gallery, keeping only image names.
    fn list_gallery(&self, emit: Emit<'_>) -> Result<Vec<RemoteEntry>, TransferError> {
        let gallery_dir = self.config.remote.gallery_dir();
        let listing = self.in_session(emit, |session| session.list(&gallery_dir))?;

        let total = listing.len();
        let images: Vec<RemoteEntry> = listing
            .into_iter()
            .filter(|entry| catalog::is_image_name(&entry.file_name, IMAGE_EXTENSIONS))
            .collect();
        emit(&PublishEvent::GalleryListed {
            images: images.len(),
            ignored: total - images.len(),
        });
        Ok(images)
    }

    fn upload_manifest(
        &self,
        local_path: &Path,
        remote_path: &str,
        emit: Emit<'_>,
    ) -> Result<(), TransferError> {
        self.in_session(emit, |session| session.store(remote_path, local_path))
    }
}
