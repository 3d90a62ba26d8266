//! 5x4 color transform matrices.
//!
//! A color matrix maps an RGBA pixel through a linear transform: rows 0-3
//! weight the R, G, B and A input channels, row 4 adds a per-channel bias.
//! The original GDI+-style matrix carries a reserved fifth column; it is
//! never stored here because it must always read as zero.
//!
//! Matrix equality therefore compares exactly the 20 stored coefficients,
//! which is what the pipeline uses to decide whether a tint stage is a no-op.

use serde::{Deserialize, Serialize};

use crate::Color;

/// A 5x4 color transform matrix, row-major.
///
/// Rows 0-3 transform the R, G, B, A channels; row 4 is the bias row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorMatrix(pub [[f32; 4]; 5]);

impl ColorMatrix {
    /// The identity transform: unit diagonal, zero bias.
    pub const IDENTITY: ColorMatrix = ColorMatrix([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
        [0.0, 0.0, 0.0, 0.0],
    ]);

    /// Rec. 601 luminance weights replicated into the R, G and B output
    /// channels; alpha passes through unchanged.
    pub const GREYSCALE: ColorMatrix = ColorMatrix([
        [0.299, 0.299, 0.299, 0.0],
        [0.587, 0.587, 0.587, 0.0],
        [0.114, 0.114, 0.114, 0.0],
        [0.0, 0.0, 0.0, 1.0],
        [0.0, 0.0, 0.0, 0.0],
    ]);

    /// Build a matrix from a tint color, an alpha value and up to five
    /// explicit rows.
    ///
    /// An explicit row wins outright; a missing row 0-3 falls back to a
    /// diagonal entry holding the normalized tint channel (R, G, B) or
    /// `alpha` for row 3. A missing bias row stays zero.
    ///
    /// With white tint, alpha 255 and no explicit rows the result is
    /// bit-identical to [`ColorMatrix::IDENTITY`].
    pub fn build(tint: Color, alpha: u8, rows: &[Option<[f32; 4]>; 5]) -> Self {
        let mut m = ColorMatrix::IDENTITY;

        let fallback = [
            tint.r as f32 / 255.0,
            tint.g as f32 / 255.0,
            tint.b as f32 / 255.0,
            alpha as f32 / 255.0,
        ];

        for i in 0..4 {
            match rows[i] {
                Some(row) => m.0[i] = row,
                None => m.0[i][i] = fallback[i],
            }
        }
        if let Some(bias) = rows[4] {
            m.0[4] = bias;
        }

        m
    }

    /// Whether applying this matrix would leave every pixel unchanged.
    pub fn is_identity(&self) -> bool {
        *self == ColorMatrix::IDENTITY
    }
}

impl Default for ColorMatrix {
    fn default() -> Self {
        ColorMatrix::IDENTITY
    }
}
