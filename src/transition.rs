//! Transition functions: time-parameterized blends between two images,
//! shared by every multi-frame export path.

use crate::{
    assets::DecodedImage,
    core::Rect,
    error::{PostweaveError, PostweaveResult},
    geometry::cover_fit_into,
    surface::Surface,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    Fade,
    Slide,
    Zoom,
    Dissolve,
    Wipe,
    None,
}

pub fn parse_transition_kind(s: &str) -> PostweaveResult<TransitionKind> {
    match s.trim().to_ascii_lowercase().as_str() {
        "fade" | "crossfade" => Ok(TransitionKind::Fade),
        "slide" => Ok(TransitionKind::Slide),
        "zoom" => Ok(TransitionKind::Zoom),
        "dissolve" => Ok(TransitionKind::Dissolve),
        "wipe" => Ok(TransitionKind::Wipe),
        "none" | "cut" => Ok(TransitionKind::None),
        other => Err(PostweaveError::validation(format!(
            "unknown transition kind '{other}'"
        ))),
    }
}

/// Renders the blend of `from` and `to` at `progress` (0..1) onto the
/// whole surface. `seed` drives the dissolve threshold pattern; all
/// transitions are deterministic in their inputs.
pub fn compose_transition(
    dst: &mut Surface,
    from: &DecodedImage,
    to: &DecodedImage,
    kind: TransitionKind,
    progress: f64,
    seed: u64,
) -> PostweaveResult<()> {
    let progress = progress.clamp(0.0, 1.0);
    let w = f64::from(dst.width());
    let h = f64::from(dst.height());
    let full = Rect::new(0.0, 0.0, w, h);

    let cover = |img: &DecodedImage, dest: Rect| {
        cover_fit_into(f64::from(img.width()), f64::from(img.height()), dest)
    };

    match kind {
        TransitionKind::Fade => {
            let fit_a = cover(from, full)?;
            let fit_b = cover(to, full)?;
            dst.draw_cover(from, &fit_a, (1.0 - progress) as f32);
            dst.draw_cover(to, &fit_b, progress as f32);
        }
        TransitionKind::Slide => {
            let offset = w * progress;
            let fit_a = cover(from, Rect::new(-offset, 0.0, w - offset, h))?;
            let fit_b = cover(to, Rect::new(w - offset, 0.0, 2.0 * w - offset, h))?;
            dst.draw_cover(from, &fit_a, 1.0);
            dst.draw_cover(to, &fit_b, 1.0);
        }
        TransitionKind::Zoom => {
            // Old frame scales out, new frame settles from 1.5x, both
            // cross-fading.
            let scale_a = 1.0 + progress * 0.5;
            let scale_b = 1.5 - progress * 0.5;
            let fit_a = cover(from, scaled_centered(full, scale_a))?;
            let fit_b = cover(to, scaled_centered(full, scale_b))?;
            dst.draw_cover(from, &fit_a, (1.0 - progress) as f32);
            dst.draw_cover(to, &fit_b, progress as f32);
        }
        TransitionKind::Dissolve => {
            let fit_a = cover(from, full)?;
            dst.draw_cover(from, &fit_a, 1.0);

            let mut incoming = Surface::new(dst.width(), dst.height())?;
            let fit_b = cover(to, full)?;
            incoming.draw_cover(to, &fit_b, 1.0);

            dissolve_in_place(dst, &incoming, progress, seed);
        }
        TransitionKind::Wipe => {
            let fit_a = cover(from, full)?;
            let fit_b = cover(to, full)?;
            dst.draw_cover(from, &fit_a, 1.0);
            // Hard-edged reveal advancing left to right.
            dst.draw_image_clipped(
                to,
                fit_b.source_rect,
                fit_b.dest_rect,
                Rect::new(0.0, 0.0, w * progress, h),
                1.0,
            );
        }
        TransitionKind::None => {
            let fit_b = cover(to, full)?;
            dst.draw_cover(to, &fit_b, 1.0);
        }
    }
    Ok(())
}

fn scaled_centered(rect: Rect, scale: f64) -> Rect {
    let w = rect.width() * scale;
    let h = rect.height() * scale;
    let x0 = rect.x0 - (w - rect.width()) / 2.0;
    let y0 = rect.y0 - (h - rect.height()) / 2.0;
    Rect::new(x0, y0, x0 + w, y0 + h)
}

/// Replaces pixels whose per-pixel threshold falls below `progress`.
fn dissolve_in_place(dst: &mut Surface, incoming: &Surface, progress: f64, seed: u64) {
    let width = dst.width() as usize;
    let src = incoming.data();
    for (i, px) in dst.data_mut().chunks_exact_mut(4).enumerate() {
        let x = (i % width) as u64;
        let y = (i / width) as u64;
        if pixel_threshold(seed, x, y) < progress {
            px.copy_from_slice(&src[i * 4..i * 4 + 4]);
        }
    }
}

/// Seeded FNV-1a over the pixel coordinates, mapped into [0, 1).
fn pixel_threshold(seed: u64, x: u64, y: u64) -> f64 {
    let mut h = 0xcbf2_9ce4_8422_2325u64 ^ seed;
    for b in x.to_le_bytes().into_iter().chain(y.to_le_bytes()) {
        h ^= u64::from(b);
        h = h.wrapping_mul(0x0000_0100_0000_01B3);
    }
    (h >> 11) as f64 / (1u64 << 53) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Color;

    const RED: Color = Color::opaque(200, 0, 0);
    const BLUE: Color = Color::opaque(0, 0, 200);

    fn pair() -> (DecodedImage, DecodedImage) {
        (
            DecodedImage::solid(8, 8, RED).unwrap(),
            DecodedImage::solid(8, 8, BLUE).unwrap(),
        )
    }

    fn composed(kind: TransitionKind, progress: f64, seed: u64) -> Surface {
        let (from, to) = pair();
        let mut s = Surface::new(16, 16).unwrap();
        compose_transition(&mut s, &from, &to, kind, progress, seed).unwrap();
        s
    }

    #[test]
    fn parse_accepts_known_kinds_and_aliases() {
        assert_eq!(parse_transition_kind("fade").unwrap(), TransitionKind::Fade);
        assert_eq!(
            parse_transition_kind(" Crossfade ").unwrap(),
            TransitionKind::Fade
        );
        assert_eq!(parse_transition_kind("cut").unwrap(), TransitionKind::None);
        assert!(parse_transition_kind("swirl").is_err());
    }

    #[test]
    fn fade_endpoints_are_pure_frames() {
        let s = composed(TransitionKind::Fade, 0.0, 1);
        assert_eq!(s.pixel(8, 8), [200, 0, 0, 255]);
        let s = composed(TransitionKind::Fade, 1.0, 1);
        assert_eq!(s.pixel(8, 8), [0, 0, 200, 255]);
    }

    #[test]
    fn slide_splits_canvas_at_progress() {
        let s = composed(TransitionKind::Slide, 0.5, 1);
        assert_eq!(s.pixel(1, 8), [200, 0, 0, 255]);
        assert_eq!(s.pixel(14, 8), [0, 0, 200, 255]);
    }

    #[test]
    fn zoom_endpoints_are_pure_frames() {
        let s = composed(TransitionKind::Zoom, 0.0, 1);
        assert_eq!(s.pixel(8, 8), [200, 0, 0, 255]);
        let s = composed(TransitionKind::Zoom, 1.0, 1);
        assert_eq!(s.pixel(8, 8), [0, 0, 200, 255]);
    }

    #[test]
    fn wipe_reveals_left_portion() {
        let s = composed(TransitionKind::Wipe, 0.5, 1);
        assert_eq!(s.pixel(2, 8), [0, 0, 200, 255]);
        assert_eq!(s.pixel(13, 8), [200, 0, 0, 255]);
    }

    #[test]
    fn dissolve_is_deterministic_for_a_seed() {
        let a = composed(TransitionKind::Dissolve, 0.5, 42);
        let b = composed(TransitionKind::Dissolve, 0.5, 42);
        assert_eq!(a.data(), b.data());

        let c = composed(TransitionKind::Dissolve, 0.5, 43);
        assert_ne!(a.data(), c.data());
    }

    #[test]
    fn dissolve_endpoints_are_pure_frames() {
        let s = composed(TransitionKind::Dissolve, 0.0, 7);
        assert!(s.data().chunks_exact(4).all(|px| px == [200, 0, 0, 255]));
        let s = composed(TransitionKind::Dissolve, 1.0, 7);
        assert!(s.data().chunks_exact(4).all(|px| px == [0, 0, 200, 255]));
    }

    #[test]
    fn dissolve_mixes_both_frames_mid_way() {
        let s = composed(TransitionKind::Dissolve, 0.5, 7);
        let red = s
            .data()
            .chunks_exact(4)
            .filter(|px| *px == [200, 0, 0, 255])
            .count();
        let blue = s
            .data()
            .chunks_exact(4)
            .filter(|px| *px == [0, 0, 200, 255])
            .count();
        assert_eq!(red + blue, 16 * 16);
        assert!(red > 0 && blue > 0);
    }

    #[test]
    fn none_is_a_hard_cut_to_the_next_image() {
        let s = composed(TransitionKind::None, 0.3, 1);
        assert_eq!(s.pixel(8, 8), [0, 0, 200, 255]);
    }
}
