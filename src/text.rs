//! Caption rendering baked into exported output: greedy word wrap,
//! anchored placement, fixed drop shadow.

use std::collections::HashMap;

use rusttype::{Font, Scale, point};

use crate::{
    blur::gaussian_blur,
    composite::premultiply,
    core::Color,
    error::{PostweaveError, PostweaveResult},
    surface::Surface,
};

/// Lines may occupy at most this fraction of the box width.
const MAX_WIDTH_FRAC: f64 = 0.9;
/// Distance from the top/bottom edge for anchored placement.
const EDGE_MARGIN: f64 = 40.0;
const LINE_HEIGHT_FACTOR: f64 = 1.2;

const SHADOW_OFFSET: f64 = 2.0;
const SHADOW_ALPHA: u8 = 204; // 0.8
const SHADOW_BLUR_RADIUS: u32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextPosition {
    Top,
    Center,
    Bottom,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TextOverlaySpec {
    pub text: String,
    pub font_family: String,
    pub size_px: f32,
    pub color: Color,
    pub position: TextPosition,
}

impl Default for TextOverlaySpec {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: "Inter".to_string(),
            size_px: 32.0,
            color: Color::WHITE,
            position: TextPosition::Bottom,
        }
    }
}

/// Fonts the caller has registered, resolved by family name at draw
/// time. The engine never loads font files itself.
#[derive(Default)]
pub struct FontCatalog {
    fonts: HashMap<String, Font<'static>>,
}

impl FontCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, family: impl Into<String>, bytes: Vec<u8>) -> PostweaveResult<()> {
        let family = family.into();
        let font = Font::try_from_vec(bytes)
            .ok_or_else(|| PostweaveError::decode(format!("unparsable font for '{family}'")))?;
        self.fonts.insert(family, font);
        Ok(())
    }

    pub fn resolve(&self, family: &str) -> PostweaveResult<&Font<'static>> {
        self.fonts
            .get(family)
            .ok_or_else(|| PostweaveError::validation(format!("unknown font family '{family}'")))
    }
}

/// Greedy word wrap: words accumulate into a line while the measured
/// width stays within `max_width`; the overflowing word starts the next
/// line. A single word wider than the box still becomes its own line.
pub fn wrap_text(text: &str, max_width: f64, measure: impl Fn(&str) -> f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let test = format!("{line}{word} ");
        if measure(&test) > max_width && !line.is_empty() {
            lines.push(line.trim_end().to_string());
            line = format!("{word} ");
        } else {
            line = test;
        }
    }

    let last = line.trim_end();
    if !last.is_empty() {
        lines.push(last.to_string());
    }
    lines
}

/// Baseline y-coordinates for a block of `line_count` lines.
pub fn line_baselines(
    line_count: usize,
    size_px: f64,
    box_height: f64,
    position: TextPosition,
) -> Vec<f64> {
    if line_count == 0 {
        return Vec::new();
    }
    let line_height = size_px * LINE_HEIGHT_FACTOR;
    let span = (line_count - 1) as f64 * line_height;

    let first = match position {
        TextPosition::Top => EDGE_MARGIN + size_px,
        TextPosition::Bottom => box_height - EDGE_MARGIN - span,
        TextPosition::Center => box_height / 2.0 - span / 2.0,
    };

    (0..line_count)
        .map(|i| first + i as f64 * line_height)
        .collect()
}

fn measure_line(font: &Font<'_>, scale: Scale, text: &str) -> f64 {
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|g| f64::from(g.position().x + g.unpositioned().h_metrics().advance_width))
        .unwrap_or(0.0)
}

fn draw_line(
    surface: &mut Surface,
    font: &Font<'_>,
    scale: Scale,
    text: &str,
    x: f64,
    baseline: f64,
    color: Color,
) {
    for glyph in font.layout(text, scale, point(x as f32, baseline as f32)) {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, coverage| {
                let px = i64::from(bb.min.x) + i64::from(gx);
                let py = i64::from(bb.min.y) + i64::from(gy);
                let a = (coverage * f32::from(color.a)).round().clamp(0.0, 255.0) as u8;
                if a == 0 {
                    return;
                }
                let src = premultiply([color.r, color.g, color.b, a]);
                surface.blend_pixel(px, py, src, 1.0);
            });
        }
    }
}

/// Bakes the caption into the surface. No-op when the text is empty.
/// The drop shadow is a fixed visual contract, not configurable.
#[tracing::instrument(skip_all, fields(position = ?spec.position))]
pub fn render_text(
    surface: &mut Surface,
    spec: &TextOverlaySpec,
    fonts: &FontCatalog,
) -> PostweaveResult<()> {
    if spec.text.trim().is_empty() {
        return Ok(());
    }
    if !spec.size_px.is_finite() || spec.size_px <= 0.0 {
        return Err(PostweaveError::validation("text size must be > 0"));
    }

    let font = fonts.resolve(&spec.font_family)?;
    let scale = Scale::uniform(spec.size_px);

    let box_width = f64::from(surface.width());
    let box_height = f64::from(surface.height());
    let max_width = box_width * MAX_WIDTH_FRAC;

    let lines = wrap_text(&spec.text, max_width, |s| measure_line(font, scale, s));
    let baselines = line_baselines(
        lines.len(),
        f64::from(spec.size_px),
        box_height,
        spec.position,
    );

    let placed: Vec<(f64, f64, &str)> = lines
        .iter()
        .zip(&baselines)
        .map(|(line, &baseline)| {
            let line_width = measure_line(font, scale, line);
            ((box_width - line_width) / 2.0, baseline, line.as_str())
        })
        .collect();

    // Shadow pass on an offscreen layer so the blur does not smear the
    // underlying image.
    let mut shadow = Surface::new(surface.width(), surface.height())?;
    let shadow_color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: SHADOW_ALPHA,
    };
    for &(x, baseline, line) in &placed {
        draw_line(
            &mut shadow,
            font,
            scale,
            line,
            x + SHADOW_OFFSET,
            baseline + SHADOW_OFFSET,
            shadow_color,
        );
    }
    gaussian_blur(&mut shadow, SHADOW_BLUR_RADIUS, SHADOW_BLUR_RADIUS as f32 / 2.0)?;
    surface.over_surface(&shadow, 1.0)?;

    for &(x, baseline, line) in &placed {
        draw_line(surface, font, scale, line, x, baseline, spec.color);
    }

    Ok(())
}

/// A short single-line label with the same fixed shadow treatment
/// (comparison corner labels).
pub(crate) fn draw_label(
    surface: &mut Surface,
    font: &Font<'_>,
    size_px: f32,
    text: &str,
    x: f64,
    baseline: f64,
    color: Color,
) -> PostweaveResult<()> {
    let scale = Scale::uniform(size_px);

    let mut shadow = Surface::new(surface.width(), surface.height())?;
    draw_line(
        &mut shadow,
        font,
        scale,
        text,
        x + SHADOW_OFFSET,
        baseline + SHADOW_OFFSET,
        Color {
            r: 0,
            g: 0,
            b: 0,
            a: SHADOW_ALPHA,
        },
    );
    gaussian_blur(&mut shadow, SHADOW_BLUR_RADIUS, SHADOW_BLUR_RADIUS as f32 / 2.0)?;
    surface.over_surface(&shadow, 1.0)?;

    draw_line(surface, font, scale, text, x, baseline, color);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // 10 units per character, the trailing space included, mirroring how
    // the real measurer sees the probe string.
    fn char_measure(s: &str) -> f64 {
        s.chars().count() as f64 * 10.0
    }

    #[test]
    fn wrap_keeps_lines_within_max_width() {
        let text = "one two three four five six seven";
        let max = 100.0;
        let lines = wrap_text(text, max, char_measure);
        assert!(lines.len() > 1);
        for line in &lines {
            // Committed lines obey the limit (measured with the trailing
            // space the accumulator carries).
            assert!(
                char_measure(line) <= max,
                "line '{line}' exceeds max width"
            );
        }
        // No words lost.
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn single_overwide_word_becomes_its_own_line() {
        let lines = wrap_text("supercalifragilistic", 50.0, char_measure);
        assert_eq!(lines, vec!["supercalifragilistic".to_string()]);

        let lines = wrap_text("a supercalifragilistic b", 50.0, char_measure);
        assert_eq!(
            lines,
            vec![
                "a".to_string(),
                "supercalifragilistic".to_string(),
                "b".to_string()
            ]
        );
    }

    #[test]
    fn wrap_of_empty_or_whitespace_text_is_empty() {
        assert!(wrap_text("", 100.0, char_measure).is_empty());
        assert!(wrap_text("   ", 100.0, char_measure).is_empty());
    }

    #[test]
    fn baselines_anchor_per_position() {
        let size = 30.0;
        let lh = size * LINE_HEIGHT_FACTOR;

        let top = line_baselines(3, size, 1000.0, TextPosition::Top);
        assert_eq!(top[0], EDGE_MARGIN + size);
        assert_eq!(top[2], EDGE_MARGIN + size + 2.0 * lh);

        let bottom = line_baselines(3, size, 1000.0, TextPosition::Bottom);
        assert_eq!(bottom[2], 1000.0 - EDGE_MARGIN);
        assert_eq!(bottom[0], 1000.0 - EDGE_MARGIN - 2.0 * lh);

        let center = line_baselines(3, size, 1000.0, TextPosition::Center);
        assert_eq!(center[1], 500.0);

        assert!(line_baselines(0, size, 1000.0, TextPosition::Top).is_empty());
    }

    #[test]
    fn empty_text_is_a_noop_even_without_fonts() {
        let mut surface = Surface::new(16, 16).unwrap();
        surface.fill(Color::BLACK);
        let before = surface.data().to_vec();

        let spec = TextOverlaySpec::default();
        render_text(&mut surface, &spec, &FontCatalog::new()).unwrap();
        assert_eq!(surface.data(), &before[..]);
    }

    #[test]
    fn unknown_font_family_is_rejected_when_text_present() {
        let mut surface = Surface::new(16, 16).unwrap();
        let spec = TextOverlaySpec {
            text: "hello".to_string(),
            ..TextOverlaySpec::default()
        };
        assert!(matches!(
            render_text(&mut surface, &spec, &FontCatalog::new()),
            Err(PostweaveError::Validation(_))
        ));
    }

    #[test]
    fn garbage_font_bytes_are_rejected() {
        let mut catalog = FontCatalog::new();
        assert!(matches!(
            catalog.register("Broken", vec![0u8; 16]),
            Err(PostweaveError::Decode(_))
        ));
    }
}
