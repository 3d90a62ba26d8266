//! Per-pixel application of a 5x4 color matrix.

use image::RgbaImage;

use crate::matrix::ColorMatrix;

/// Apply `matrix` to every pixel of `image` in place.
///
/// Each output channel is a weighted sum of the normalized input channels
/// plus the bias row, clamped back into range:
/// `out[c] = r*m[0][c] + g*m[1][c] + b*m[2][c] + a*m[3][c] + m[4][c]`
pub fn apply_matrix(image: &mut RgbaImage, matrix: &ColorMatrix) {
    if matrix.is_identity() {
        return;
    }

    let m = &matrix.0;
    for pixel in image.pixels_mut() {
        let r = pixel.0[0] as f32 / 255.0;
        let g = pixel.0[1] as f32 / 255.0;
        let b = pixel.0[2] as f32 / 255.0;
        let a = pixel.0[3] as f32 / 255.0;

        for c in 0..4 {
            let v = r * m[0][c] + g * m[1][c] + b * m[2][c] + a * m[3][c] + m[4][c];
            pixel.0[c] = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;
    use image::Rgba;

    fn single_pixel(color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(1, 1, Rgba(color))
    }

    #[test]
    fn test_identity_leaves_pixels_untouched() {
        let mut img = single_pixel([12, 34, 56, 78]);
        apply_matrix(&mut img, &ColorMatrix::IDENTITY);
        assert_eq!(img.get_pixel(0, 0).0, [12, 34, 56, 78]);
    }

    #[test]
    fn test_tint_scales_channels() {
        let mut img = single_pixel([200, 100, 50, 255]);
        let half_red = ColorMatrix::build(Color::rgb(128, 255, 255), 255, &[None; 5]);
        apply_matrix(&mut img, &half_red);

        let p = img.get_pixel(0, 0).0;
        assert_eq!(p[0], 100); // 200 * 128/255, rounded
        assert_eq!(p[1], 100);
        assert_eq!(p[2], 50);
        assert_eq!(p[3], 255);
    }

    #[test]
    fn test_greyscale_weights() {
        let mut img = single_pixel([255, 0, 0, 255]);
        apply_matrix(&mut img, &ColorMatrix::GREYSCALE);

        let p = img.get_pixel(0, 0).0;
        // Pure red maps to its luminance in all color channels
        assert_eq!(p[0], 76); // 0.299 * 255
        assert_eq!(p[1], 76);
        assert_eq!(p[2], 76);
        assert_eq!(p[3], 255);
    }

    #[test]
    fn test_greyscale_uniform_for_grey_input() {
        let mut img = single_pixel([90, 90, 90, 200]);
        apply_matrix(&mut img, &ColorMatrix::GREYSCALE);

        let p = img.get_pixel(0, 0).0;
        assert_eq!(p[0], p[1]);
        assert_eq!(p[1], p[2]);
        assert_eq!(p[3], 200, "alpha passes through");
    }

    #[test]
    fn test_bias_row_adds_offset() {
        let mut img = single_pixel([0, 0, 0, 255]);
        let mut matrix = ColorMatrix::IDENTITY;
        matrix.0[4] = [0.5, 0.0, 0.0, 0.0];
        apply_matrix(&mut img, &matrix);

        let p = img.get_pixel(0, 0).0;
        assert_eq!(p[0], 128);
        assert_eq!(p[1], 0);
    }

    #[test]
    fn test_output_clamped() {
        let mut img = single_pixel([255, 255, 255, 255]);
        let mut matrix = ColorMatrix::IDENTITY;
        matrix.0[4] = [1.0, -2.0, 0.0, 0.0];
        apply_matrix(&mut img, &matrix);

        let p = img.get_pixel(0, 0).0;
        assert_eq!(p[0], 255);
        assert_eq!(p[1], 0);
    }
}
