//! Arbitrary-angle rotation for RGBA bitmaps.
//!
//! Rotation uses inverse mapping: for each pixel of the output canvas the
//! source coordinates are found by rotating back, then sampled bilinearly.
//! The canvas expands to the bounding box of the rotated image (no
//! clipping); uncovered corners stay fully transparent.
//!
//! For rotation by angle θ the inverse transform is:
//! ```text
//! src_x = (dst_x - cx) * cos(-θ) - (dst_y - cy) * sin(-θ) + src_cx
//! src_y = (dst_x - cx) * sin(-θ) + (dst_y - cy) * cos(-θ) + src_cy
//! ```

use image::{imageops, RgbaImage};

/// Compute the bounding-box dimensions of an image rotated by
/// `angle_degrees`.
///
/// Multiples of 90° take exact fast paths; other angles use
/// `|w·cos| + |h·sin|` / `|w·sin| + |h·cos|`, rounded.
pub fn rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    let normalized = angle_degrees.rem_euclid(360.0);

    if normalized.abs() < 0.001 || (360.0 - normalized).abs() < 0.001 {
        return (width, height);
    }
    if (normalized - 90.0).abs() < 0.001 || (normalized - 270.0).abs() < 0.001 {
        return (height, width);
    }
    if (normalized - 180.0).abs() < 0.001 {
        return (width, height);
    }

    let rad = angle_degrees.to_radians();
    let (sin, cos) = (rad.sin().abs(), rad.cos().abs());
    let (w, h) = (width as f64, height as f64);

    let new_w = (w * cos + h * sin).round() as u32;
    let new_h = (w * sin + h * cos).round() as u32;
    (new_w.max(1), new_h.max(1))
}

/// Rotate an RGBA image by `angle_degrees` (positive = counter-clockwise)
/// around its center, onto an expanded canvas.
pub fn rotate(image: &RgbaImage, angle_degrees: f64) -> RgbaImage {
    let normalized = angle_degrees.rem_euclid(360.0);
    if normalized.abs() < 0.001 || (360.0 - normalized).abs() < 0.001 {
        return image.clone();
    }

    // Lossless fast paths for quarter turns. Positive angles are
    // counter-clockwise, so 90° CCW is imageops' rotate270 (90° CW).
    if (normalized - 90.0).abs() < 0.001 {
        return imageops::rotate270(image);
    }
    if (normalized - 180.0).abs() < 0.001 {
        return imageops::rotate180(image);
    }
    if (normalized - 270.0).abs() < 0.001 {
        return imageops::rotate90(image);
    }

    let (src_w, src_h) = (image.width() as f64, image.height() as f64);
    let (dst_w, dst_h) = rotated_bounds(image.width(), image.height(), angle_degrees);

    // Negate for correct visual direction: positive rotates counter-clockwise
    let rad = -angle_degrees.to_radians();
    let (sin, cos) = (rad.sin(), rad.cos());

    let src_cx = src_w / 2.0;
    let src_cy = src_h / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    let mut output = RgbaImage::new(dst_w, dst_h);

    for dst_y in 0..dst_h {
        for dst_x in 0..dst_w {
            let dx = dst_x as f64 - dst_cx;
            let dy = dst_y as f64 - dst_cy;

            let src_x = dx * cos - dy * sin + src_cx;
            let src_y = dx * sin + dy * cos + src_cy;

            let pixel = sample_bilinear(image, src_x, src_y);
            output.put_pixel(dst_x, dst_y, image::Rgba(pixel));
        }
    }

    output
}

#[inline]
fn pixel_f64(image: &RgbaImage, px: u32, py: u32) -> [f64; 4] {
    let p = image.get_pixel(px, py).0;
    [p[0] as f64, p[1] as f64, p[2] as f64, p[3] as f64]
}

/// Sample a pixel bilinearly; out-of-bounds coordinates read as fully
/// transparent.
fn sample_bilinear(image: &RgbaImage, x: f64, y: f64) -> [u8; 4] {
    let (w, h) = (image.width() as i64, image.height() as i64);

    if x < 0.0 || x >= (w - 1) as f64 || y < 0.0 || y >= (h - 1) as f64 {
        return [0, 0, 0, 0];
    }

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = pixel_f64(image, x0, y0);
    let p10 = pixel_f64(image, x0 + 1, y0);
    let p01 = pixel_f64(image, x0, y0 + 1);
    let p11 = pixel_f64(image, x0 + 1, y0 + 1);

    let mut result = [0u8; 4];
    for (i, slot) in result.iter_mut().enumerate() {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        *slot = v.clamp(0.0, 255.0).round() as u8;
    }
    result
}
