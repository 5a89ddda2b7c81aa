//! Image resizing.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Resize** | `image::imageops` Lanczos3 |
//! | **Encode** | JPEG (quality), PNG, BMP by output extension |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::calculate_bounded_dimensions;
pub use operations::{ResizedImage, resize_to_bound};
pub use params::{Quality, ResizeParams};
pub use rust_backend::RustBackend;
