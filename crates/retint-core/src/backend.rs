//! Rendering-backend and bitmap-loader interfaces.
//!
//! The pipeline never touches pixels itself. It stages operations on an
//! [`EffectStream`] opened from a [`RenderBackend`]; the backend performs
//! the actual pixel math when the stream is materialized. Decoding a file
//! into a bitmap is a separate concern behind [`BitmapLoader`].
//!
//! The software reference implementation of all three lives in
//! [`crate::raster`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matrix::ColorMatrix;
use crate::options::FlipMode;

/// Error types for bitmap loading.
#[derive(Debug, Error)]
pub enum LoadError {
    /// I/O error while reading the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a recognized or supported image format.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// The backend failed while deriving the transformed bitmap of a
    /// freshly loaded image.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Error types for backend staging and materialization.
///
/// These are fatal to a single transform pass only; the entity keeps its
/// previous derived bitmap when a pass fails.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend rejected a staged operation.
    #[error("Staging failed: {0}")]
    Staging(String),

    /// The staged stream could not be materialized into a bitmap.
    #[error("Materialization failed: {0}")]
    Materialize(String),
}

/// An absolute crop rectangle in source-image pixel coordinates,
/// `[left, top, right, bottom]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl CropBox {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// A staged sequence of pending transform operations bound to a source
/// bitmap. Operations take effect only at [`EffectStream::materialize`].
pub trait EffectStream {
    type Bitmap;

    fn crop(&mut self, rect: CropBox);
    fn rotate(&mut self, degrees: f32);
    fn flip(&mut self, mode: FlipMode);
    fn apply_exif_orientation(&mut self);
    fn tint(&mut self, matrix: &ColorMatrix);

    /// Execute the staged operations and produce the derived bitmap,
    /// consuming the stream.
    fn materialize(self) -> Result<Self::Bitmap, BackendError>;
}

/// A graphics backend able to open effect streams over bitmaps.
pub trait RenderBackend {
    type Bitmap;
    type Stream: EffectStream<Bitmap = Self::Bitmap>;

    fn open_stream(&self, source: &Self::Bitmap) -> Result<Self::Stream, BackendError>;

    /// Pixel dimensions of a bitmap, `(width, height)`.
    fn dimensions(&self, bitmap: &Self::Bitmap) -> (u32, u32);
}

/// Decodes an image file into a backend bitmap.
pub trait BitmapLoader {
    type Bitmap;

    fn load(&self, path: &Path) -> Result<Self::Bitmap, LoadError>;
}
