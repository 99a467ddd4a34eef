//! Before/after comparison renderer: two images cover-fit to the full
//! canvas, each clipped to its half, with a divider and optional corner
//! labels.

use crate::{
    assets::DecodedImage,
    core::{Color, Rect},
    error::{PostweaveError, PostweaveResult},
    geometry::cover_fit_into,
    surface::Surface,
    template::Template,
    text::{FontCatalog, draw_label},
};

const LABEL_X: f64 = 40.0;
const LABEL_BASELINE: f64 = 60.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitOrientation {
    /// Side-by-side halves, divider runs vertically.
    Vertical,
    /// Stacked halves, divider runs horizontally.
    Horizontal,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ComparisonLabels {
    pub before: String,
    pub after: String,
    pub font_family: String,
    pub size_px: f32,
}

impl Default for ComparisonLabels {
    fn default() -> Self {
        Self {
            before: "BEFORE".to_string(),
            after: "AFTER".to_string(),
            font_family: "Inter".to_string(),
            size_px: 32.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ComparisonOptions {
    pub orientation: SplitOrientation,
    pub divider_width: f64,
    pub divider_color: Color,
    pub labels: Option<ComparisonLabels>,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            orientation: SplitOrientation::Vertical,
            divider_width: 4.0,
            divider_color: Color::WHITE,
            labels: None,
        }
    }
}

/// Renders the split view. Both images are framed identically (cover-fit
/// to the FULL template box) so the halves line up; each is then clipped
/// to its side of the divider.
#[tracing::instrument(skip_all, fields(template = %template.id))]
pub fn render_comparison(
    before: &DecodedImage,
    after: &DecodedImage,
    template: &Template,
    options: &ComparisonOptions,
    fonts: &FontCatalog,
) -> PostweaveResult<Surface> {
    if !options.divider_width.is_finite() || options.divider_width < 0.0 {
        return Err(PostweaveError::validation("divider width must be >= 0"));
    }

    let mut surface = Surface::new(template.width, template.height)?;
    let w = f64::from(template.width);
    let h = f64::from(template.height);
    let full = Rect::new(0.0, 0.0, w, h);

    let fit_before = cover_fit_into(f64::from(before.width()), f64::from(before.height()), full)?;
    let fit_after = cover_fit_into(f64::from(after.width()), f64::from(after.height()), full)?;

    let (clip_before, clip_after, divider) = match options.orientation {
        SplitOrientation::Vertical => {
            let half = w / 2.0;
            (
                Rect::new(0.0, 0.0, half, h),
                Rect::new(half, 0.0, w, h),
                Rect::new(
                    half - options.divider_width / 2.0,
                    0.0,
                    half + options.divider_width / 2.0,
                    h,
                ),
            )
        }
        SplitOrientation::Horizontal => {
            let half = h / 2.0;
            (
                Rect::new(0.0, 0.0, w, half),
                Rect::new(0.0, half, w, h),
                Rect::new(
                    0.0,
                    half - options.divider_width / 2.0,
                    w,
                    half + options.divider_width / 2.0,
                ),
            )
        }
    };

    surface.draw_image_clipped(
        before,
        fit_before.source_rect,
        fit_before.dest_rect,
        clip_before,
        1.0,
    );
    surface.draw_image_clipped(
        after,
        fit_after.source_rect,
        fit_after.dest_rect,
        clip_after,
        1.0,
    );

    if options.divider_width > 0.0 {
        surface.fill_rect(divider, options.divider_color);
    }

    if let Some(labels) = &options.labels {
        let font = fonts.resolve(&labels.font_family)?;
        let (after_x, after_baseline) = match options.orientation {
            SplitOrientation::Vertical => (w / 2.0 + LABEL_X, LABEL_BASELINE),
            SplitOrientation::Horizontal => (LABEL_X, h / 2.0 + LABEL_BASELINE),
        };
        draw_label(
            &mut surface,
            font,
            labels.size_px,
            &labels.before,
            LABEL_X,
            LABEL_BASELINE,
            Color::WHITE,
        )?;
        draw_label(
            &mut surface,
            font,
            labels.size_px,
            &labels.after,
            after_x,
            after_baseline,
            Color::WHITE,
        )?;
    }

    Ok(surface)
}
