//! The fixed-order transform pipeline.
//!
//! [`plan`] turns a [`TransformOptions`] into an explicit ordered list of
//! [`Stage`]s; [`execute`] replays that list onto a backend effect stream
//! and materializes the derived bitmap.
//!
//! # Stage Order
//!
//! The order is a hard invariant because each stage's output is the next
//! stage's input:
//! 1. Crop (resolved against the pre-rotation dimensions)
//! 2. Rotation
//! 3. Flip (always staged; a `None` flip is a legal no-op)
//! 4. EXIF-orientation correction
//! 5. Color-matrix tint
//! 6. Greyscale tint (independent of, and after, any explicit tint)

pub mod anchor;

pub use anchor::{resolve, resolve_origin};

use serde::{Deserialize, Serialize};

use crate::backend::{BackendError, CropBox, EffectStream, RenderBackend};
use crate::matrix::ColorMatrix;
use crate::options::{FlipMode, TransformOptions};

/// One staged backend operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Stage {
    Crop(CropBox),
    Rotate(f32),
    Flip(FlipMode),
    ExifOrientation,
    Tint(ColorMatrix),
}

/// Build the ordered stage list for `options` against a source of
/// `src_w` x `src_h` pixels.
///
/// Activation conditions:
/// - Crop: transforms enabled and `width >= 0 && height >= 0`
/// - Rotation: transforms enabled and angle non-zero
/// - Flip: always staged, even `FlipMode::None`
/// - EXIF correction: when requested
/// - Tint: only when the matrix is not the identity
/// - Greyscale: when requested, as a second tint with
///   [`ColorMatrix::GREYSCALE`]
pub fn plan(options: &TransformOptions, src_w: u32, src_h: u32) -> Vec<Stage> {
    let mut stages = Vec::new();

    if !options.transforms_disabled() && options.crop.is_active() {
        stages.push(Stage::Crop(anchor::resolve(
            &options.crop,
            options.crop_anchor,
            src_w,
            src_h,
        )));
    }

    if !options.transforms_disabled() && options.rotation_degrees != 0.0 {
        stages.push(Stage::Rotate(options.rotation_degrees));
    }

    stages.push(Stage::Flip(options.flip));

    if options.use_exif_orientation {
        stages.push(Stage::ExifOrientation);
    }

    if !options.color_matrix.is_identity() {
        stages.push(Stage::Tint(options.color_matrix));
    }

    if options.grey_scale {
        stages.push(Stage::Tint(ColorMatrix::GREYSCALE));
    }

    stages
}

/// Run the pipeline: open a stream over `source`, stage the plan, and
/// materialize the derived bitmap.
///
/// The source is never mutated, and the result depends only on `source` and
/// `options`, so repeated calls with unchanged inputs produce identical
/// bitmaps.
pub fn execute<B: RenderBackend>(
    backend: &B,
    source: &B::Bitmap,
    options: &TransformOptions,
) -> Result<B::Bitmap, BackendError> {
    let (src_w, src_h) = backend.dimensions(source);
    let mut stream = backend.open_stream(source)?;

    for stage in plan(options, src_w, src_h) {
        match stage {
            Stage::Crop(rect) => stream.crop(rect),
            Stage::Rotate(degrees) => stream.rotate(degrees),
            Stage::Flip(mode) => stream.flip(mode),
            Stage::ExifOrientation => stream.apply_exif_orientation(),
            Stage::Tint(matrix) => stream.tint(&matrix),
        }
    }

    stream.materialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{CropAnchor, CropSpec};
    use crate::Color;

    fn options_with_crop() -> TransformOptions {
        let mut options = TransformOptions::new(false);
        options.crop = CropSpec {
            x: 10,
            y: 10,
            width: 20,
            height: 20,
        };
        options.crop_anchor = CropAnchor::BottomRight;
        options
    }

    #[test]
    fn test_default_plan_is_noop_flip_only() {
        let stages = plan(&TransformOptions::new(false), 100, 50);
        assert_eq!(stages, vec![Stage::Flip(FlipMode::None)]);
    }

    #[test]
    fn test_full_plan_order() {
        let mut options = options_with_crop();
        options.rotation_degrees = 45.0;
        options.flip = FlipMode::Horizontal;
        options.use_exif_orientation = true;
        options.color_matrix = ColorMatrix::build(Color::rgb(128, 0, 0), 255, &[None; 5]);
        options.grey_scale = true;

        let stages = plan(&options, 100, 50);
        assert_eq!(stages.len(), 6);
        assert!(matches!(stages[0], Stage::Crop(_)));
        assert!(matches!(stages[1], Stage::Rotate(d) if d == 45.0));
        assert_eq!(stages[2], Stage::Flip(FlipMode::Horizontal));
        assert_eq!(stages[3], Stage::ExifOrientation);
        assert!(matches!(stages[4], Stage::Tint(m) if !m.is_identity() && m != ColorMatrix::GREYSCALE));
        assert_eq!(stages[5], Stage::Tint(ColorMatrix::GREYSCALE));
    }

    #[test]
    fn test_crop_resolved_against_pre_rotation_dimensions() {
        // Rotation would change the bounds; the crop rect must not care
        let mut options = options_with_crop();
        options.rotation_degrees = 90.0;

        let stages = plan(&options, 100, 50);
        assert_eq!(
            stages[0],
            Stage::Crop(CropBox {
                left: 110,
                top: 60,
                right: 130,
                bottom: 80
            })
        );
        assert_eq!(stages[1], Stage::Rotate(90.0));
    }

    #[test]
    fn test_identity_matrix_elides_tint() {
        let mut options = TransformOptions::new(false);
        options.color_matrix = ColorMatrix::IDENTITY;
        let stages = plan(&options, 10, 10);
        assert!(!stages.iter().any(|s| matches!(s, Stage::Tint(_))));
    }

    #[test]
    fn test_greyscale_staged_after_explicit_tint() {
        let mut options = TransformOptions::new(false);
        options.color_matrix = ColorMatrix::build(Color::rgb(0, 255, 0), 255, &[None; 5]);
        options.grey_scale = true;

        let tints: Vec<_> = plan(&options, 10, 10)
            .into_iter()
            .filter_map(|s| match s {
                Stage::Tint(m) => Some(m),
                _ => None,
            })
            .collect();
        assert_eq!(tints.len(), 2);
        assert_ne!(tints[0], ColorMatrix::GREYSCALE);
        assert_eq!(tints[1], ColorMatrix::GREYSCALE);
    }

    #[test]
    fn test_disabled_transforms_never_stage_crop_or_rotation() {
        let mut options = TransformOptions::new(true);
        // Even force-fed values must not produce stages
        options.crop = CropSpec {
            x: 0,
            y: 0,
            width: 10,
            height: 10,
        };
        options.rotation_degrees = 90.0;
        options.grey_scale = true;

        let stages = plan(&options, 100, 50);
        assert_eq!(
            stages,
            vec![
                Stage::Flip(FlipMode::None),
                Stage::Tint(ColorMatrix::GREYSCALE)
            ]
        );
    }

    // A recording backend: streams collect their staged operations and
    // materialize into the recorded list, so order is observable without
    // any pixel work.
    #[derive(Debug, Clone, PartialEq)]
    struct FakeBitmap {
        width: u32,
        height: u32,
        ops: Vec<Stage>,
    }

    struct FakeStream {
        width: u32,
        height: u32,
        ops: Vec<Stage>,
        fail_materialize: bool,
    }

    impl EffectStream for FakeStream {
        type Bitmap = FakeBitmap;

        fn crop(&mut self, rect: CropBox) {
            self.ops.push(Stage::Crop(rect));
        }
        fn rotate(&mut self, degrees: f32) {
            self.ops.push(Stage::Rotate(degrees));
        }
        fn flip(&mut self, mode: FlipMode) {
            self.ops.push(Stage::Flip(mode));
        }
        fn apply_exif_orientation(&mut self) {
            self.ops.push(Stage::ExifOrientation);
        }
        fn tint(&mut self, matrix: &ColorMatrix) {
            self.ops.push(Stage::Tint(*matrix));
        }
        fn materialize(self) -> Result<FakeBitmap, BackendError> {
            if self.fail_materialize {
                return Err(BackendError::Materialize("forced failure".to_string()));
            }
            Ok(FakeBitmap {
                width: self.width,
                height: self.height,
                ops: self.ops,
            })
        }
    }

    struct FakeBackend {
        fail_materialize: bool,
    }

    impl RenderBackend for FakeBackend {
        type Bitmap = FakeBitmap;
        type Stream = FakeStream;

        fn open_stream(&self, source: &FakeBitmap) -> Result<FakeStream, BackendError> {
            Ok(FakeStream {
                width: source.width,
                height: source.height,
                ops: Vec::new(),
                fail_materialize: self.fail_materialize,
            })
        }

        fn dimensions(&self, bitmap: &FakeBitmap) -> (u32, u32) {
            (bitmap.width, bitmap.height)
        }
    }

    fn fake_source(width: u32, height: u32) -> FakeBitmap {
        FakeBitmap {
            width,
            height,
            ops: Vec::new(),
        }
    }

    #[test]
    fn test_execute_replays_plan_in_order() {
        let backend = FakeBackend {
            fail_materialize: false,
        };
        let source = fake_source(100, 50);

        let mut options = options_with_crop();
        options.rotation_degrees = 30.0;
        options.grey_scale = true;

        let derived = execute(&backend, &source, &options).unwrap();
        assert_eq!(derived.ops, plan(&options, 100, 50));
    }

    #[test]
    fn test_execute_is_deterministic() {
        let backend = FakeBackend {
            fail_materialize: false,
        };
        let source = fake_source(64, 64);
        let mut options = TransformOptions::new(false);
        options.flip = FlipMode::Both;
        options.grey_scale = true;

        let a = execute(&backend, &source, &options).unwrap();
        let b = execute(&backend, &source, &options).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_materialize_failure_propagates() {
        let backend = FakeBackend {
            fail_materialize: true,
        };
        let source = fake_source(8, 8);
        let result = execute(&backend, &source, &TransformOptions::new(false));
        assert!(matches!(result, Err(BackendError::Materialize(_))));
    }
}
