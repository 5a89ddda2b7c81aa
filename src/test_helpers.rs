//! Shared test utilities.
//!
//! Synthetic image writers and a ready-made [`Config`] so module tests do
//! not each reinvent fixtures.

use crate::config::Config;
use image::{ImageEncoder, RgbImage};
use std::path::Path;

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Write a small valid JPEG with the given dimensions.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = gradient(width, height);
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a small valid PNG with the given dimensions.
pub fn write_test_png(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

/// A valid config pointing at a fake host, with default layout.
pub fn test_config() -> Config {
    Config {
        address: "ftp.test".to_string(),
        user: "tester".to_string(),
        password: "secret".to_string(),
        ..Config::default()
    }
}
