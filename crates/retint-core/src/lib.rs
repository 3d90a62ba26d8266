//! Retint Core - Configuration-driven image transform pipeline
//!
//! This crate turns a decoded source bitmap and a set of declarative options
//! (crop rectangle/anchor, rotation, flip, EXIF-orientation correction,
//! color tinting, greyscale) into a single derived bitmap:
//! - Option parsing from an already-tokenized config source
//! - A fixed-order staged pipeline executed against a rendering backend
//! - Anchor-relative crop-origin resolution
//! - 5x4 color-matrix construction with diagonal fallbacks
//!
//! Pixel math lives behind the [`backend::RenderBackend`] trait; a software
//! reference backend built on the `image` crate is provided in [`raster`].

pub mod backend;
pub mod config;
pub mod entity;
pub mod matrix;
pub mod options;
pub mod pipeline;
pub mod raster;

pub use backend::{BackendError, BitmapLoader, CropBox, EffectStream, LoadError, RenderBackend};
pub use config::{ConfigSource, Diagnostics, LogDiagnostics, TableConfig};
pub use entity::ImageEntity;
pub use matrix::ColorMatrix;
pub use options::{CropAnchor, CropSpec, FlipMode, OptionKeys, TransformOptions};
pub use pipeline::{execute, plan, Stage};

/// An RGBA color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Opaque white, the default tint (a no-op).
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}
