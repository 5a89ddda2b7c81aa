//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Publish
//!
//! ```text
//! Staging: imagesToUpload (created)
//! Cataloging
//! Found 3 images
//! 001/003 a.jpg
//!     Resized: 600x400
//!     Uploaded: /public_html/img/gallery/a.jpg
//! 002/003 broken.png
//!     Resize failed: cannot decode
//! 003/003 c.bmp
//!     Resized: 450x600
//!     Uploaded: /public_html/img/gallery/c.bmp
//! Listing gallery
//!     2 images, 1 other entry ignored
//! Publishing manifest
//!     Written: gallery_content.html (2 thumbnails)
//!     Uploaded: /public_html/gallery_content.html
//! Done
//!
//! Published 2 of 3 images, 1 failed
//! ```
//!
//! ## Check
//!
//! ```text
//! Config
//!     Server: ftp.example.com:21 as webmaster
//!     Gallery: /public_html/img/gallery
//!     Manifest: /public_html/gallery_content.html
//!     Resize: 600px, quality 90
//!
//! Images (2)
//! 001 a.jpg
//! 002 c.bmp
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::catalog::LocalImage;
use crate::config::Config;
use crate::publish::{ImageStatus, Phase, PublishEvent, PublishReport};
use std::error::Error;
use std::path::Path;

fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

/// Last path component for display, falling back to the whole path.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Phase headers worth showing. Per-image phases are implied by the image
/// lines that follow them.
fn phase_line(phase: &Phase) -> Option<String> {
    match phase {
        Phase::Idle | Phase::Resizing | Phase::Uploading | Phase::Rendering => None,
        Phase::Cataloging => Some("Cataloging".to_string()),
        Phase::Listing => Some("Listing gallery".to_string()),
        Phase::PublishingManifest => Some("Publishing manifest".to_string()),
        Phase::Done => Some("Done".to_string()),
        Phase::Failed(reason) => Some(format!("Failed: {reason}")),
    }
}

// ============================================================================
// Publish
// ============================================================================

/// Format one progress event. Returns no lines for events that are not shown.
pub fn format_event(event: &PublishEvent) -> Vec<String> {
    match event {
        PublishEvent::PhaseChanged(phase) => phase_line(phase).into_iter().collect(),
        PublishEvent::StagingReady { path, created } => {
            let state = if *created { "created" } else { "exists" };
            vec![format!("Staging: {} ({state})", path.display())]
        }
        PublishEvent::Cataloged { count } => {
            vec![format!("Found {}", plural(*count, "image", "images"))]
        }
        PublishEvent::ImageStarted {
            index,
            total,
            file_name,
        } => vec![format!(
            "{}/{} {}",
            format_index(*index),
            format_index(*total),
            file_name
        )],
        PublishEvent::ImageResized { width, height, .. } => {
            vec![format!("    Resized: {width}x{height}")]
        }
        PublishEvent::ImageUploaded { remote_path, .. } => {
            vec![format!("    Uploaded: {remote_path}")]
        }
        PublishEvent::ImageFailed { status, .. } => match status {
            ImageStatus::ResizeFailed(reason) => vec![format!("    Resize failed: {reason}")],
            ImageStatus::UploadFailed(reason) => vec![format!("    Upload failed: {reason}")],
            ImageStatus::Staged { .. } | ImageStatus::Uploaded { .. } => vec![],
        },
        PublishEvent::GalleryListed { images, ignored } => {
            let mut line = format!("    {}", plural(*images, "image", "images"));
            if *ignored > 0 {
                line.push_str(&format!(
                    ", {} ignored",
                    plural(*ignored, "other entry", "other entries")
                ));
            }
            vec![line]
        }
        PublishEvent::ManifestWritten { path, fragments } => vec![format!(
            "    Written: {} ({})",
            display_name(path),
            plural(*fragments, "thumbnail", "thumbnails")
        )],
        PublishEvent::ManifestUploaded { remote_path } => {
            vec![format!("    Uploaded: {remote_path}")]
        }
        PublishEvent::SessionCloseFailed { reason } => {
            vec![format!("    Warning: disconnect not acknowledged: {reason}")]
        }
    }
}

pub fn print_event(event: &PublishEvent) {
    for line in format_event(event) {
        println!("{}", line);
    }
}

/// Closing summary of a finished run.
pub fn format_report(report: &PublishReport) -> Vec<String> {
    let total = report.images.len();
    let failed = report.failed_count();
    let uploaded = report
        .images
        .iter()
        .filter(|i| matches!(i.status, ImageStatus::Uploaded { .. }))
        .count();
    let staged = report
        .images
        .iter()
        .filter(|i| matches!(i.status, ImageStatus::Staged { .. }))
        .count();

    let mut lines = Vec::new();
    if uploaded > 0 || (total > 0 && staged == 0) {
        lines.push(format!("Published {uploaded} of {}", plural(total, "image", "images")));
    } else if staged > 0 {
        lines.push(format!("Resized {staged} of {}", plural(total, "image", "images")));
    }
    if failed > 0 {
        if let Some(first) = lines.first_mut() {
            first.push_str(&format!(", {failed} failed"));
        }
    }
    if let Some(manifest) = &report.manifest {
        lines.push(format!(
            "Manifest: {} ({})",
            manifest.remote_path,
            plural(manifest.fragments, "thumbnail", "thumbnails")
        ));
    }
    lines
}

pub fn print_report(report: &PublishReport) {
    let lines = format_report(report);
    if !lines.is_empty() {
        println!();
    }
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Config summary plus the images a run would process. The password is
/// never shown.
pub fn format_check_output(config: &Config, images: &[LocalImage]) -> Vec<String> {
    let mut lines = vec![
        "Config".to_string(),
        format!(
            "    Server: {}:{} as {}",
            config.address, config.remote.port, config.user
        ),
        format!("    Gallery: {}", config.remote.gallery_dir()),
        format!("    Manifest: {}", config.remote.manifest_path()),
        format!(
            "    Resize: {}px, quality {}",
            config.images.max_dimension, config.images.quality
        ),
        String::new(),
        format!("Images ({})", images.len()),
    ];
    if images.is_empty() {
        lines.push("    (none)".to_string());
    }
    for (idx, image) in images.iter().enumerate() {
        lines.push(format!("{} {}", format_index(idx + 1), image.file_name));
    }
    lines
}

pub fn print_check_output(config: &Config, images: &[LocalImage]) {
    for line in format_check_output(config, images) {
        println!("{}", line);
    }
}

// ============================================================================
// Errors
// ============================================================================

/// An error message followed by its chain of causes, one per line. Causes
/// whose text the previous message already contains are not repeated.
pub fn format_error(err: &dyn Error) -> Vec<String> {
    let mut lines = vec![format!("Error: {err}")];
    let mut shown = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !shown.contains(&text) {
            lines.push(format!("    Caused by: {text}"));
        }
        shown = text;
        source = cause.source();
    }
    lines
}

pub fn print_error(err: &dyn Error) {
    for line in format_error(err) {
        eprintln!("{}", line);
    }
}
