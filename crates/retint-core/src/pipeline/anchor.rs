//! Anchor-relative crop-origin resolution.
//!
//! A configured crop rectangle is an offset from one of five anchor points
//! of the source image. Resolution turns it into an absolute rectangle in
//! source pixel coordinates, always against the *pre-rotation* dimensions:
//! the crop stage runs first, so later stages never influence it.

use crate::backend::CropBox;
use crate::options::{CropAnchor, CropSpec};

/// Compute the absolute top-left crop origin for `crop` anchored at
/// `anchor` within an `image_w` x `image_h` source.
///
/// Offsets are additive from the configured `(x, y)`; the `Center` anchor
/// uses integer (floor) division of the pixel dimensions.
pub fn resolve_origin(
    crop: &CropSpec,
    anchor: CropAnchor,
    image_w: u32,
    image_h: u32,
) -> (i32, i32) {
    let w = image_w as i32;
    let h = image_h as i32;

    match anchor {
        CropAnchor::TopLeft => (crop.x, crop.y),
        CropAnchor::TopRight => (crop.x + w, crop.y),
        CropAnchor::BottomRight => (crop.x + w, crop.y + h),
        CropAnchor::BottomLeft => (crop.x, crop.y + h),
        CropAnchor::Center => (crop.x + w / 2, crop.y + h / 2),
    }
}

/// Resolve the absolute crop rectangle handed to the backend:
/// `[originX, originY, originX + width, originY + height]`.
///
/// Callers only invoke this for an active crop (`width >= 0 && height >= 0`).
pub fn resolve(crop: &CropSpec, anchor: CropAnchor, image_w: u32, image_h: u32) -> CropBox {
    let (x, y) = resolve_origin(crop, anchor, image_w, image_h);
    CropBox {
        left: x,
        top: y,
        right: x + crop.width,
        bottom: y + crop.height,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: every anchor is a pure translation of the top-left
        /// resolution by a multiple of the image dimensions.
        #[test]
        fn prop_anchor_offsets(
            x in -500i32..500, y in -500i32..500,
            w in 0i32..200, h in 0i32..200,
            image_w in 1u32..1000, image_h in 1u32..1000,
        ) {
            let c = CropSpec { x, y, width: w, height: h };
            let (tlx, tly) = resolve_origin(&c, CropAnchor::TopLeft, image_w, image_h);
            prop_assert_eq!((tlx, tly), (x, y));

            let iw = image_w as i32;
            let ih = image_h as i32;
            prop_assert_eq!(resolve_origin(&c, CropAnchor::TopRight, image_w, image_h), (x + iw, y));
            prop_assert_eq!(resolve_origin(&c, CropAnchor::BottomRight, image_w, image_h), (x + iw, y + ih));
            prop_assert_eq!(resolve_origin(&c, CropAnchor::BottomLeft, image_w, image_h), (x, y + ih));
            prop_assert_eq!(resolve_origin(&c, CropAnchor::Center, image_w, image_h), (x + iw / 2, y + ih / 2));
        }

        /// Property: the resolved rectangle always spans exactly the
        /// configured width and height.
        #[test]
        fn prop_rect_extent(
            x in -500i32..500, y in -500i32..500,
            w in 0i32..200, h in 0i32..200,
            image_w in 1u32..1000, image_h in 1u32..1000,
            anchor_idx in 0i64..5,
        ) {
            let c = CropSpec { x, y, width: w, height: h };
            let anchor = CropAnchor::from_config_value(anchor_idx).unwrap();
            let rect = resolve(&c, anchor, image_w, image_h);
            prop_assert_eq!(rect.width(), w);
            prop_assert_eq!(rect.height(), h);
        }
    }
}
