//! Software reference backend built on the `image` crate.
//!
//! [`RasterBackend`] implements the full backend surface in plain pixel
//! math: crops clamp to the source bounds, rotation expands the canvas
//! (see [`rotate`]), flips and EXIF correction map onto `imageops`, and
//! tints run the 5x4 matrix per pixel (see [`tint`]).
//!
//! Streams are genuinely staged: every operation is queued and only runs
//! when the stream is materialized, matching what a GPU effect-graph
//! backend would do.

mod rotate;
mod tint;

pub use rotate::{rotate as rotate_rgba, rotated_bounds};
pub use tint::apply_matrix;

use std::io::Cursor;
use std::path::Path;

use exif::{In, Reader, Tag};
use image::{imageops, ImageError, ImageReader, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::backend::{
    BackendError, BitmapLoader, CropBox, EffectStream, LoadError, RenderBackend,
};
use crate::matrix::ColorMatrix;
use crate::options::FlipMode;
use crate::pipeline::Stage;

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            1 => Orientation::Normal,
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// A decoded RGBA bitmap plus the EXIF orientation captured at decode time.
///
/// The orientation is carried, not applied: the pipeline's EXIF stage
/// decides whether to correct it.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterBitmap {
    pub image: RgbaImage,
    pub orientation: Orientation,
}

impl RasterBitmap {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image,
            orientation: Orientation::Normal,
        }
    }

    pub fn with_orientation(image: RgbaImage, orientation: Orientation) -> Self {
        Self { image, orientation }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// The software rendering backend and file loader.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterBackend;

impl RasterBackend {
    pub fn new() -> Self {
        Self
    }
}

/// A staged operation queue over a snapshot of the source bitmap.
pub struct RasterStream {
    source: RasterBitmap,
    stages: Vec<Stage>,
}

impl EffectStream for RasterStream {
    type Bitmap = RasterBitmap;

    fn crop(&mut self, rect: CropBox) {
        self.stages.push(Stage::Crop(rect));
    }

    fn rotate(&mut self, degrees: f32) {
        self.stages.push(Stage::Rotate(degrees));
    }

    fn flip(&mut self, mode: FlipMode) {
        self.stages.push(Stage::Flip(mode));
    }

    fn apply_exif_orientation(&mut self) {
        self.stages.push(Stage::ExifOrientation);
    }

    fn tint(&mut self, matrix: &ColorMatrix) {
        self.stages.push(Stage::Tint(*matrix));
    }

    fn materialize(self) -> Result<RasterBitmap, BackendError> {
        let mut image = self.source.image;
        let mut orientation = self.source.orientation;

        for stage in self.stages {
            image = match stage {
                Stage::Crop(rect) => apply_crop(&image, rect)?,
                Stage::Rotate(degrees) => rotate::rotate(&image, degrees as f64),
                Stage::Flip(mode) => apply_flip(image, mode),
                Stage::ExifOrientation => {
                    let corrected = apply_orientation(image, orientation);
                    orientation = Orientation::Normal;
                    corrected
                }
                Stage::Tint(matrix) => {
                    let mut tinted = image;
                    tint::apply_matrix(&mut tinted, &matrix);
                    tinted
                }
            };
        }

        Ok(RasterBitmap { image, orientation })
    }
}

impl RenderBackend for RasterBackend {
    type Bitmap = RasterBitmap;
    type Stream = RasterStream;

    fn open_stream(&self, source: &RasterBitmap) -> Result<RasterStream, BackendError> {
        Ok(RasterStream {
            source: source.clone(),
            stages: Vec::new(),
        })
    }

    fn dimensions(&self, bitmap: &RasterBitmap) -> (u32, u32) {
        (bitmap.width(), bitmap.height())
    }
}

impl BitmapLoader for RasterBackend {
    type Bitmap = RasterBitmap;

    fn load(&self, path: &Path) -> Result<RasterBitmap, LoadError> {
        let bytes = std::fs::read(path)?;

        // Orientation is read before decoding so the pipeline can decide
        // whether to correct it later
        let orientation = extract_orientation(&bytes);

        let reader = ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(LoadError::Io)?;

        let decoded = reader.decode().map_err(|e| match e {
            ImageError::Unsupported(_) => LoadError::InvalidFormat,
            other => LoadError::CorruptedFile(other.to_string()),
        })?;

        Ok(RasterBitmap::with_orientation(
            decoded.to_rgba8(),
            orientation,
        ))
    }
}

/// Extract the EXIF orientation tag from encoded image bytes.
///
/// Returns `Orientation::Normal` when no EXIF data is present or the tag
/// cannot be read.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or(Orientation::Normal),
        Err(_) => Orientation::Normal,
    }
}

/// Crop to `rect`, clamped to the image bounds.
fn apply_crop(image: &RgbaImage, rect: CropBox) -> Result<RgbaImage, BackendError> {
    let w = image.width() as i32;
    let h = image.height() as i32;

    let left = rect.left.clamp(0, w);
    let top = rect.top.clamp(0, h);
    let right = rect.right.clamp(0, w);
    let bottom = rect.bottom.clamp(0, h);

    if right <= left || bottom <= top {
        return Err(BackendError::Staging(format!(
            "crop [{}, {}, {}, {}] does not intersect a {w}x{h} image",
            rect.left, rect.top, rect.right, rect.bottom
        )));
    }

    Ok(imageops::crop_imm(
        image,
        left as u32,
        top as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    )
    .to_image())
}

fn apply_flip(image: RgbaImage, mode: FlipMode) -> RgbaImage {
    match mode {
        FlipMode::None => image,
        FlipMode::Horizontal => imageops::flip_horizontal(&image),
        FlipMode::Vertical => imageops::flip_vertical(&image),
        FlipMode::Both => imageops::rotate180(&image),
    }
}

/// Undo the physical rotation/mirroring recorded in the EXIF orientation.
fn apply_orientation(image: RgbaImage, orientation: Orientation) -> RgbaImage {
    match orientation {
        Orientation::Normal => image,
        Orientation::FlipHorizontal => imageops::flip_horizontal(&image),
        Orientation::Rotate180 => imageops::rotate180(&image),
        Orientation::FlipVertical => imageops::flip_vertical(&image),
        Orientation::Transpose => imageops::flip_horizontal(&imageops::rotate90(&image)),
        Orientation::Rotate90CW => imageops::rotate90(&image),
        Orientation::Transverse => imageops::flip_horizontal(&imageops::rotate270(&image)),
        Orientation::Rotate270CW => imageops::rotate270(&image),
    }
}
