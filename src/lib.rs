//! # Gallery Push
//!
//! Publishes a directory of images to a gallery on an FTP-hosted website.
//! Each local image is scaled to fit a bounding box, uploaded into the
//! gallery folder, and an HTML fragment listing the whole remote gallery is
//! regenerated and uploaded next to the site's pages.
//!
//! # Architecture: One Pass, Five Steps
//!
//! ```text
//! 1. Catalog    source/        →  [LocalImage]          (extension filter, sorted)
//! 2. Resize     [LocalImage]   →  staging/              (bounded, aspect kept)
//! 3. Upload     staging/       →  <root>/<gallery>/     (one session per image)
//! 4. List       <gallery>/     →  [RemoteEntry]         (image extensions only)
//! 5. Manifest   [RemoteEntry]  →  <root>/<manifest>     (local file + upload)
//! ```
//!
//! Steps 2 and 3 run per image, so a failing image is reported and skipped
//! while the rest of the batch carries on. Steps 4 and 5 always work from the
//! server's listing, which means images published by earlier runs stay in the
//! manifest.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `config.toml` loading and validation; remote path composition |
//! | [`catalog`] | Lists image files in the source directory |
//! | [`imaging`] | Bounded resize through the [`imaging::ImageBackend`] trait |
//! | [`transfer`] | [`transfer::TransferClient`] trait, FTP client, scoped sessions |
//! | [`manifest`] | Renders thumbnail fragments with Maud |
//! | [`publish`] | The per-run pipeline, its events and report |
//! | [`runner`] | Config first, staging second, then the selected mode |
//! | [`output`] | CLI output formatting of events and reports |
//!
//! # Design Decisions
//!
//! ## Traits At The Edges
//!
//! Image decoding and the wire protocol are the two things tests cannot
//! afford to do for real on every run. [`imaging::ImageBackend`] and
//! [`transfer::TransferClient`] keep them behind traits so the pipeline is
//! tested with recording mocks, while [`imaging::RustBackend`] and
//! [`transfer::FtpClient`] are the production implementations.
//!
//! ## Sessions Close Exactly Once
//!
//! Every upload and listing runs inside [`transfer::Session::run`], which
//! owns the connection and disconnects it once on every path, including a
//! failed login. A disconnect the server rejects is reported as an event
//! rather than dropped.
//!
//! ## Synchronous Progress Events
//!
//! The pipeline reports what it does through a callback receiving
//! [`publish::PublishEvent`]s. The CLI prints them as they arrive; tests
//! collect them and assert on the sequence.

pub mod catalog;
pub mod config;
pub mod imaging;
pub mod manifest;
pub mod output;
pub mod publish;
pub mod runner;
pub mod transfer;

#[cfg(test)]
pub(crate) mod test_helpers;
