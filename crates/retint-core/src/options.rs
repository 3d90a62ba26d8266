//! Transform option model and its parsing contract.
//!
//! [`TransformOptions`] is the structured record of everything the pipeline
//! needs: crop rectangle and anchor, rotation, flip, greyscale, EXIF flag
//! and the color matrix. [`TransformOptions::read_from`] fills it from a
//! [`ConfigSource`](crate::ConfigSource) using a per-instance
//! [`OptionKeys`] table, so hosts can remap option names.
//!
//! Parsing is forgiving: malformed values fall back to documented defaults
//! and are reported through the diagnostics sink, never as errors.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigSource, Diagnostics};
use crate::matrix::ColorMatrix;
use crate::Color;

/// The configured crop rectangle, relative to the crop anchor.
///
/// Defaults to `(-1, -1, -1, -1)`, meaning no crop was requested. A crop is
/// active only when both width and height are non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropSpec {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl CropSpec {
    pub fn is_active(&self) -> bool {
        self.width >= 0 && self.height >= 0
    }
}

impl Default for CropSpec {
    fn default() -> Self {
        Self {
            x: -1,
            y: -1,
            width: -1,
            height: -1,
        }
    }
}

/// The reference point a crop offset is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum CropAnchor {
    #[default]
    TopLeft = 0,
    TopRight = 1,
    BottomRight = 2,
    BottomLeft = 3,
    Center = 4,
}

impl CropAnchor {
    /// Map a numeric config value onto an anchor. Out-of-range values are
    /// rejected so the caller can fall back and report.
    pub fn from_config_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(CropAnchor::TopLeft),
            1 => Some(CropAnchor::TopRight),
            2 => Some(CropAnchor::BottomRight),
            3 => Some(CropAnchor::BottomLeft),
            4 => Some(CropAnchor::Center),
            _ => None,
        }
    }
}

/// Mirror axis applied by the flip stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlipMode {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

impl FlipMode {
    /// Case-insensitive parse of the config spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "NONE" => Some(FlipMode::None),
            "HORIZONTAL" => Some(FlipMode::Horizontal),
            "VERTICAL" => Some(FlipMode::Vertical),
            "BOTH" => Some(FlipMode::Both),
            _ => None,
        }
    }
}

/// Option-name table used when reading from a config source.
///
/// [`OptionKeys::DEFAULT`] is the shared, statically-initialized table;
/// instances substitute individual names (or apply a common prefix) without
/// ever mutating the shared table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionKeys {
    pub crop: Cow<'static, str>,
    pub greyscale: Cow<'static, str>,
    pub tint: Cow<'static, str>,
    pub alpha: Cow<'static, str>,
    pub color_matrix: [Cow<'static, str>; 5],
    pub flip: Cow<'static, str>,
    pub rotate: Cow<'static, str>,
    pub use_exif: Cow<'static, str>,
}

impl OptionKeys {
    /// The documented default option names.
    pub const DEFAULT: OptionKeys = OptionKeys {
        crop: Cow::Borrowed("ImageCrop"),
        greyscale: Cow::Borrowed("Greyscale"),
        tint: Cow::Borrowed("ImageTint"),
        alpha: Cow::Borrowed("ImageAlpha"),
        color_matrix: [
            Cow::Borrowed("ColorMatrix1"),
            Cow::Borrowed("ColorMatrix2"),
            Cow::Borrowed("ColorMatrix3"),
            Cow::Borrowed("ColorMatrix4"),
            Cow::Borrowed("ColorMatrix5"),
        ],
        flip: Cow::Borrowed("ImageFlip"),
        rotate: Cow::Borrowed("ImageRotate"),
        use_exif: Cow::Borrowed("UseExifData"),
    };

    /// A table with every default name prefixed, for hosts that read several
    /// images out of one section (e.g. `MaskImageCrop`).
    pub fn prefixed(prefix: &str) -> Self {
        let key = |name: &str| Cow::Owned(format!("{prefix}{name}"));
        OptionKeys {
            crop: key("ImageCrop"),
            greyscale: key("Greyscale"),
            tint: key("ImageTint"),
            alpha: key("ImageAlpha"),
            color_matrix: [
                key("ColorMatrix1"),
                key("ColorMatrix2"),
                key("ColorMatrix3"),
                key("ColorMatrix4"),
                key("ColorMatrix5"),
            ],
            flip: key("ImageFlip"),
            rotate: key("ImageRotate"),
            use_exif: key("UseExifData"),
        }
    }
}

impl Default for OptionKeys {
    fn default() -> Self {
        OptionKeys::DEFAULT
    }
}

/// Parse a comma-delimited crop value into its positional fields.
///
/// Tokens map positionally onto `x, y, width, height, anchor`. Parsing is
/// strictly sequential: the first missing or non-numeric token stops the
/// parse and leaves that field and everything after it unset. Tokens past
/// the fifth are ignored.
pub fn parse_crop_list(raw: &str) -> [Option<i64>; 5] {
    let mut fields = [None; 5];
    for (slot, token) in fields.iter_mut().zip(raw.split(',')) {
        match token.trim().parse() {
            Ok(v) => *slot = Some(v),
            Err(_) => break,
        }
    }
    fields
}

/// Everything the transform pipeline needs to derive a bitmap.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformOptions {
    pub crop: CropSpec,
    pub crop_anchor: CropAnchor,
    pub color_matrix: ColorMatrix,
    pub grey_scale: bool,
    pub rotation_degrees: f32,
    pub flip: FlipMode,
    pub use_exif_orientation: bool,
    transforms_disabled: bool,
}

impl TransformOptions {
    /// A fresh option set. `transforms_disabled` is fixed for the lifetime
    /// of the instance: when true, crop and rotation are never parsed or
    /// applied.
    pub fn new(transforms_disabled: bool) -> Self {
        Self {
            transforms_disabled,
            ..Self::default()
        }
    }

    pub fn transforms_disabled(&self) -> bool {
        self.transforms_disabled
    }

    /// Re-read every option from `config` under `section`.
    ///
    /// Crop and rotation are skipped entirely in transform-disabled mode.
    /// The color matrix is read as five separate row options for config
    /// compatibility with the original format (`ColorMatrix1`..`5`); a row
    /// is accepted only when it has exactly 5 elements, and its reserved
    /// fifth element is dropped.
    pub fn read_from<C: ConfigSource + ?Sized>(
        &mut self,
        config: &C,
        keys: &OptionKeys,
        section: &str,
        diag: &dyn Diagnostics,
    ) {
        if !self.transforms_disabled {
            self.crop = CropSpec::default();
            self.crop_anchor = CropAnchor::TopLeft;

            let raw = config.read_string(section, &keys.crop, "");
            if !raw.is_empty() {
                let fields = parse_crop_list(&raw);
                if let Some(x) = fields[0] {
                    self.crop.x = x as i32;
                }
                if let Some(y) = fields[1] {
                    self.crop.y = y as i32;
                }
                if let Some(w) = fields[2] {
                    self.crop.width = w as i32;
                }
                if let Some(h) = fields[3] {
                    self.crop.height = h as i32;
                }
                if let Some(mode) = fields[4] {
                    match CropAnchor::from_config_value(mode) {
                        Some(anchor) => self.crop_anchor = anchor,
                        None => {
                            self.crop_anchor = CropAnchor::TopLeft;
                            diag.log_error(
                                section,
                                &format!("{}={raw} (origin) is not valid", keys.crop),
                            );
                        }
                    }
                }
            }
        }

        self.grey_scale = config.read_bool(section, &keys.greyscale, false);

        let tint = config.read_color(section, &keys.tint, Color::WHITE);
        // Alpha read separately for configs that predate alpha-carrying tints
        let alpha = config
            .read_int(section, &keys.alpha, tint.a as i64)
            .clamp(0, 255) as u8;

        let mut rows: [Option<[f32; 4]>; 5] = [None; 5];
        for (row, key) in rows.iter_mut().zip(&keys.color_matrix) {
            let list = config.read_floats(section, key);
            if list.len() == 5 {
                *row = Some([list[0], list[1], list[2], list[3]]);
            }
        }
        self.color_matrix = ColorMatrix::build(tint, alpha, &rows);

        let flip = config.read_string(section, &keys.flip, "NONE");
        match FlipMode::from_name(&flip) {
            Some(mode) => self.flip = mode,
            // Unrecognized spellings keep the previous mode
            None => diag.log_error(section, &format!("{}={flip} is not valid", keys.flip)),
        }

        if !self.transforms_disabled {
            self.rotation_degrees = config.read_float(section, &keys.rotate, 0.0) as f32;
        }

        self.use_exif_orientation = config.read_bool(section, &keys.use_exif, false);
    }
}
