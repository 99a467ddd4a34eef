//! Adjustment sliders and filter presets, compiled into a minimal chain
//! of pixel operations.

use crate::{
    blur::gaussian_blur,
    composite::{premultiply, unpremultiply},
    error::{PostweaveError, PostweaveResult},
    surface::Surface,
};

/// Brightness/contrast/saturation are percentages centered at 100
/// (100 = identity); blur is a pixel radius.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AdjustmentSet {
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub blur: f64,
}

impl Default for AdjustmentSet {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
            blur: 0.0,
        }
    }
}

impl AdjustmentSet {
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> PostweaveResult<()> {
        for (name, v) in [
            ("brightness", self.brightness),
            ("contrast", self.contrast),
            ("saturation", self.saturation),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(PostweaveError::validation(format!(
                    "{name} must be finite and >= 0, got {v}"
                )));
            }
        }
        if !self.blur.is_finite() || self.blur < 0.0 {
            return Err(PostweaveError::validation("blur must be finite and >= 0"));
        }
        if self.blur > 256.0 {
            return Err(PostweaveError::validation("blur radius must be <= 256"));
        }
        Ok(())
    }

    /// Reset-then-apply: the result is identity defaults with the
    /// preset's set fields on top. Prior manual tweaks never leak
    /// through a preset switch; this is user-observable and must hold.
    pub fn from_preset(preset: &FilterPreset) -> Self {
        let d = Self::default();
        Self {
            brightness: preset.brightness.unwrap_or(d.brightness),
            contrast: preset.contrast.unwrap_or(d.contrast),
            saturation: preset.saturation.unwrap_or(d.saturation),
            blur: preset.blur.unwrap_or(d.blur),
        }
    }
}

/// A partial [`AdjustmentSet`]; unset fields revert to identity when the
/// preset is applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FilterPreset {
    pub brightness: Option<f64>,
    pub contrast: Option<f64>,
    pub saturation: Option<f64>,
    pub blur: Option<f64>,
}

/// Named presets, lookup by key.
#[derive(Clone, Debug)]
pub struct PresetRegistry {
    presets: Vec<(String, FilterPreset)>,
}

impl PresetRegistry {
    pub fn builtin() -> Self {
        let p = |b: Option<f64>, c: Option<f64>, s: Option<f64>| FilterPreset {
            brightness: b,
            contrast: c,
            saturation: s,
            blur: None,
        };
        Self {
            presets: vec![
                ("none".to_string(), FilterPreset::default()),
                (
                    "professional".to_string(),
                    p(Some(105.0), Some(110.0), Some(95.0)),
                ),
                (
                    "vibrant".to_string(),
                    p(Some(110.0), Some(120.0), Some(130.0)),
                ),
                ("bw".to_string(), p(Some(100.0), Some(110.0), Some(0.0))),
                ("warm".to_string(), p(Some(108.0), Some(105.0), Some(115.0))),
                ("cool".to_string(), p(Some(102.0), Some(108.0), Some(110.0))),
            ],
        }
    }

    pub fn get(&self, key: &str) -> PostweaveResult<&FilterPreset> {
        self.presets
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, p)| p)
            .ok_or_else(|| PostweaveError::validation(format!("unknown filter preset '{key}'")))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|(k, _)| k.as_str())
    }
}

/// One compiled filter operation. Identity-valued adjustments never
/// appear in a chain.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum FilterOp {
    /// Channel multiplier, 1.0 = identity.
    Brightness(f32),
    /// Pivot around 50% grey, 1.0 = identity.
    Contrast(f32),
    /// Mix between luma and the original color, 1.0 = identity.
    Saturate(f32),
    /// Gaussian blur radius in pixels.
    Blur(u32),
}

/// Compiles an adjustment set into the ordered op sequence the surface
/// applies before drawing. Order matches the source sliders:
/// brightness, contrast, saturation, blur.
pub fn build_filter_chain(adjustments: &AdjustmentSet) -> PostweaveResult<Vec<FilterOp>> {
    adjustments.validate()?;

    let mut ops = Vec::new();
    if adjustments.brightness != 100.0 {
        ops.push(FilterOp::Brightness((adjustments.brightness / 100.0) as f32));
    }
    if adjustments.contrast != 100.0 {
        ops.push(FilterOp::Contrast((adjustments.contrast / 100.0) as f32));
    }
    if adjustments.saturation != 100.0 {
        ops.push(FilterOp::Saturate((adjustments.saturation / 100.0) as f32));
    }
    let blur_radius = adjustments.blur.round() as u32;
    if blur_radius > 0 {
        ops.push(FilterOp::Blur(blur_radius));
    }
    Ok(ops)
}

/// Applies a compiled chain to a surface in place.
#[tracing::instrument(skip(surface))]
pub fn apply_filter_chain(surface: &mut Surface, chain: &[FilterOp]) -> PostweaveResult<()> {
    for op in chain {
        match *op {
            FilterOp::Brightness(f) => map_colors(surface, |c| c * f),
            FilterOp::Contrast(f) => map_colors(surface, |c| (c - 0.5) * f + 0.5),
            FilterOp::Saturate(f) => {
                map_pixels(surface, |[r, g, b]| {
                    let luma = 0.2126 * r + 0.7152 * g + 0.0722 * b;
                    [
                        luma + (r - luma) * f,
                        luma + (g - luma) * f,
                        luma + (b - luma) * f,
                    ]
                });
            }
            FilterOp::Blur(radius) => {
                // Same sigma default the blur effect uses elsewhere.
                gaussian_blur(surface, radius, radius as f32 / 2.0)?;
            }
        }
    }
    Ok(())
}

fn map_colors(surface: &mut Surface, f: impl Fn(f32) -> f32) {
    map_pixels(surface, |[r, g, b]| [f(r), f(g), f(b)]);
}

/// Applies a straight-alpha color transform to every pixel, keeping the
/// buffer premultiplied.
fn map_pixels(surface: &mut Surface, f: impl Fn([f32; 3]) -> [f32; 3]) {
    for px in surface.data_mut().chunks_exact_mut(4) {
        let a = px[3];
        if a == 0 {
            continue;
        }
        let straight = unpremultiply([px[0], px[1], px[2], a]);
        let rgb = f([
            f32::from(straight[0]) / 255.0,
            f32::from(straight[1]) / 255.0,
            f32::from(straight[2]) / 255.0,
        ]);
        let back = premultiply([
            (rgb[0] * 255.0).round().clamp(0.0, 255.0) as u8,
            (rgb[1] * 255.0).round().clamp(0.0, 255.0) as u8,
            (rgb[2] * 255.0).round().clamp(0.0, 255.0) as u8,
            a,
        ]);
        px.copy_from_slice(&back);
    }
}
