//! Run configuration.
//!
//! A single `config.toml` in the working directory holds the FTP credentials
//! plus a few optional sections that tune resizing and the remote layout.
//!
//! ## Configuration Options
//!
//! ```toml
//! address = "ftp.example.com"   # FTP host (required)
//! user = "photos"               # FTP login (required)
//! password = "secret"           # FTP password (required)
//!
//! [images]
//! max_dimension = 600           # Longest allowed edge after resizing
//! quality = 90                  # JPEG quality (1-100)
//!
//! [remote]
//! port = 21
//! root = "/public_html"         # Site root on the server
//! gallery = "/img/gallery/"     # Image directory, relative to the site root
//! manifest = "gallery_content.html"
//! ```
//!
//! The three credential keys are mandatory and must not be blank; a missing
//! or incomplete file aborts the run before any directory is created or any
//! connection is attempted. Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing config file: {0}")]
    Missing(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration for one run. Built once, then passed by reference.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// FTP host name or IP address.
    pub address: String,
    pub user: String,
    pub password: String,
    /// Resize settings.
    pub images: ImagesConfig,
    /// Where things live on the server.
    pub remote: RemoteConfig,
}

// Hand-written so the password never ends up in logs or panic messages.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("address", &self.address)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("images", &self.images)
            .field("remote", &self.remote)
            .finish()
    }
}

impl Config {
    /// Check that credentials are present and tuning values are in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("address", &self.address),
            ("user", &self.user),
            ("password", &self.password),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{key} must be set and not blank"
                )));
            }
        }
        if self.images.max_dimension == 0 {
            return Err(ConfigError::Validation(
                "images.max_dimension must be greater than 0".into(),
            ));
        }
        if !(1..=100).contains(&self.images.quality) {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        if self.remote.port == 0 {
            return Err(ConfigError::Validation(
                "remote.port must be non-zero".into(),
            ));
        }
        let manifest = self.remote.manifest.trim();
        if manifest.is_empty() || manifest.contains('/') {
            return Err(ConfigError::Validation(
                "remote.manifest must be a plain file name".into(),
            ));
        }
        Ok(())
    }
}

/// Resize settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Neither edge of an uploaded image exceeds this many pixels.
    pub max_dimension: u32,
    /// Encoding quality for lossy output formats.
    pub quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            max_dimension: 600,
            quality: 90,
        }
    }
}

/// Remote layout.
///
/// `gallery` is relative to the site root: it is the path the published
/// page uses to reference images, while `root + gallery` is where they are
/// stored over FTP.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteConfig {
    pub port: u16,
    pub root: String,
    pub gallery: String,
    pub manifest: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            port: 21,
            root: "/public_html".to_string(),
            gallery: "/img/gallery/".to_string(),
            manifest: "gallery_content.html".to_string(),
        }
    }
}

impl RemoteConfig {
    /// Directory on the server that holds the gallery images.
    pub fn gallery_dir(&self) -> String {
        join_remote(&self.root, self.gallery.trim_end_matches('/'))
    }

    /// Upload destination for an image.
    pub fn image_path(&self, file_name: &str) -> String {
        join_remote(&self.gallery_dir(), file_name)
    }

    /// Path the published page uses to reference an image.
    pub fn gallery_ref(&self, file_name: &str) -> String {
        join_remote(&self.gallery, file_name)
    }

    /// Upload destination for the manifest.
    pub fn manifest_path(&self) -> String {
        join_remote(&self.root, &self.manifest)
    }
}

/// Join two remote path segments with exactly one `/` between them.
fn join_remote(base: &str, name: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        name.trim_start_matches('/')
    )
}

/// Load and validate the config file at `path`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::Missing(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command. The credentials are placeholders
/// and must be replaced before the first run.
pub fn stock_config_toml() -> &'static str {
    r##"# gallery-push configuration
# ==========================
# address, user and password are required. Everything else is optional;
# the values shown below are the defaults.
# Unknown keys will cause an error.

# FTP host name or IP address.
address = "ftp.example.com"

# FTP login.
user = "photos"

# FTP password.
password = "change-me"

# ---------------------------------------------------------------------------
# Resizing
# ---------------------------------------------------------------------------
[images]
# Longest allowed edge in pixels. Images are scaled down to fit inside a
# max_dimension x max_dimension box, keeping their aspect ratio. Smaller
# images keep their size.
max_dimension = 600

# Encoding quality for JPEG output (1-100). PNG and BMP are lossless.
quality = 90

# ---------------------------------------------------------------------------
# Remote layout
# ---------------------------------------------------------------------------
[remote]
port = 21

# Site root on the server.
root = "/public_html"

# Image directory relative to the site root. Images are uploaded to
# root + gallery and referenced from the page as gallery + file name.
gallery = "/img/gallery/"

# Manifest file name, written locally and uploaded to the site root.
manifest = "gallery_content.html"
"##
}
